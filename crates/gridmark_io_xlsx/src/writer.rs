//! Workbook exporter that flushes rendered in-memory sheets into XLSX output.

use std::collections::BTreeSet;
use std::path::PathBuf;

use gridmark_render::sink::{MemorySheet, SpecSheetCell};
use log::debug;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::conf::N_LEN_EXCEL_SHEET_NAME_MAX;
use crate::spec::{SpecXlsxExportOptions, XlsxExportError};
use crate::util::{
    cast_col_num, cast_row_num, derive_sheet_emission_plan, derive_xlsx_error,
    derive_xlsx_format, sanitize_sheet_name,
};

/// Stateful workbook exporter.
///
/// The workbook is buffered in memory until [`Self::close`] is called.
pub struct XlsxExporter {
    path_file_out: PathBuf,
    workbook: Workbook,
    options: SpecXlsxExportOptions,
    set_sheet_names_existing: BTreeSet<String>,
    if_closed: bool,
}

impl XlsxExporter {
    /// Create an exporter bound to an output path.
    pub fn new(path_file_out: PathBuf, options: SpecXlsxExportOptions) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            options,
            set_sheet_names_existing: BTreeSet::new(),
            if_closed: false,
        }
    }

    /// Return the output file path as a string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Flush the workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), XlsxExportError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook
            .save(&self.path_file_out)
            .map_err(derive_xlsx_error)?;
        self.if_closed = true;
        Ok(())
    }

    /// Emit one rendered sheet as a worksheet named `sheet_name` (sanitized
    /// and uniqued).
    ///
    /// Cells inside merged regions are written through `merge_range` with the
    /// anchor cell's text and format; every other touched cell is written
    /// directly with its assigned style.
    pub fn add_sheet(
        &mut self,
        sheet: &MemorySheet,
        sheet_name: &str,
    ) -> Result<(), XlsxExportError> {
        if self.if_closed {
            return Err(XlsxExportError::ClosedWorkbook);
        }

        let sheet_name_unique =
            self.derive_unique_sheet_name(&sanitize_sheet_name(sheet_name, "_"));
        debug!("Emitting worksheet {sheet_name_unique:?}");

        let worksheet = self.workbook.add_worksheet();
        worksheet
            .set_name(&sheet_name_unique)
            .map_err(derive_xlsx_error)?;

        let plan = derive_sheet_emission_plan(sheet);

        for (x, y) in &plan.l_cells_direct {
            let Some(cell) = sheet.cell(*x, *y) else {
                continue;
            };
            write_sheet_cell(worksheet, *x, *y, cell)?;
        }

        for (region, text_anchor) in &plan.l_merges {
            let fmt_anchor = derive_xlsx_format(sheet.cell_style(region.x0, region.y0));

            if region.is_single_cell() {
                worksheet
                    .write_string_with_format(
                        cast_row_num(region.y0)?,
                        cast_col_num(region.x0)?,
                        text_anchor,
                        &fmt_anchor,
                    )
                    .map_err(derive_xlsx_error)?;
            } else {
                worksheet
                    .merge_range(
                        cast_row_num(region.y0)?,
                        cast_col_num(region.x0)?,
                        cast_row_num(region.y1)?,
                        cast_col_num(region.x1)?,
                        text_anchor,
                        &fmt_anchor,
                    )
                    .map_err(derive_xlsx_error)?;
            }
        }

        if let Some(n_width_col) = self.options.width_col {
            let (n_cols_touched, _) = sheet.bounds();
            for n_idx_col in 0..n_cols_touched {
                worksheet
                    .set_column_width(cast_col_num(n_idx_col)?, n_width_col)
                    .map_err(derive_xlsx_error)?;
            }
        }

        if self.options.freeze_rows > 0 || self.options.freeze_cols > 0 {
            worksheet
                .set_freeze_panes(
                    cast_row_num(self.options.freeze_rows)?,
                    cast_col_num(self.options.freeze_cols)?,
                )
                .map_err(derive_xlsx_error)?;
        }

        Ok(())
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        if !self.set_sheet_names_existing.contains(name) {
            self.set_sheet_names_existing.insert(name.to_string());
            return name.to_string();
        }

        let base_name: String = name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate: String = format!("{base_name}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect();
            if !self.set_sheet_names_existing.contains(&candidate) {
                self.set_sheet_names_existing.insert(candidate.clone());
                return candidate;
            }
            n_idx += 1;
        }
    }
}

fn write_sheet_cell(
    worksheet: &mut Worksheet,
    x: usize,
    y: usize,
    cell: &SpecSheetCell,
) -> Result<(), XlsxExportError> {
    let n_row = cast_row_num(y)?;
    let n_col = cast_col_num(x)?;

    match (&cell.text, &cell.style) {
        (Some(text), Some(style)) => {
            worksheet
                .write_string_with_format(n_row, n_col, text, &derive_xlsx_format(Some(style)))
                .map_err(derive_xlsx_error)?;
        }
        (Some(text), None) => {
            worksheet
                .write_string(n_row, n_col, text)
                .map_err(derive_xlsx_error)?;
        }
        (None, Some(style)) => {
            worksheet
                .write_blank(n_row, n_col, &derive_xlsx_format(Some(style)))
                .map_err(derive_xlsx_error)?;
        }
        (None, None) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use gridmark_render::layout::render_tree;
    use gridmark_render::spec::{EnumAttrValue, EnumMarkupNode};

    use super::*;

    struct TestDir {
        path: PathBuf,
    }

    impl TestDir {
        fn new() -> Self {
            static N_SEQ: AtomicUsize = AtomicUsize::new(0);
            let path = std::env::temp_dir().join(format!(
                "gridmark_io_xlsx_test_{}_{}",
                std::process::id(),
                N_SEQ.fetch_add(1, Ordering::SeqCst)
            ));
            std::fs::create_dir_all(&path).expect("create test dir");
            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TestDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    fn rendered_sheet() -> MemorySheet {
        let mut sheet = MemorySheet::new();
        let node = EnumMarkupNode::tagged(
            "table",
            vec![
                EnumMarkupNode::tagged(
                    "tr",
                    vec![EnumMarkupNode::Element(vec![
                        EnumMarkupNode::text("td"),
                        EnumMarkupNode::attrs(vec![
                            ("size".to_string(), EnumAttrValue::Integer(3)),
                            (
                                "text-align".to_string(),
                                EnumAttrValue::Text("center".to_string()),
                            ),
                        ]),
                        EnumMarkupNode::text("head"),
                    ])],
                ),
                EnumMarkupNode::tagged(
                    "tr",
                    vec![EnumMarkupNode::tagged(
                        "td",
                        vec![EnumMarkupNode::text("body")],
                    )],
                ),
            ],
        );
        render_tree(&mut sheet, 0, 0, &node).expect("render");
        sheet
    }

    #[test]
    fn export_smoke_writes_workbook_file() {
        let tmp = TestDir::new();
        let path_file_out = tmp.path().join("out.xlsx");

        let mut exporter = XlsxExporter::new(
            path_file_out.clone(),
            SpecXlsxExportOptions {
                width_col: Some(3.0),
                ..SpecXlsxExportOptions::default()
            },
        );
        exporter
            .add_sheet(&rendered_sheet(), "layout")
            .expect("add sheet");
        exporter.close().expect("close");
        exporter.close().expect("close is idempotent");

        let n_len_file = std::fs::metadata(&path_file_out).expect("metadata").len();
        assert!(n_len_file > 0);
    }

    #[test]
    fn centered_block_takes_merge_path_once() {
        let sheet = rendered_sheet();
        let plan = derive_sheet_emission_plan(&sheet);

        // One merge carrying the anchor text, covering the centered head.
        assert_eq!(plan.l_merges.len(), 1);
        let (region, text_anchor) = &plan.l_merges[0];
        assert_eq!((region.x0, region.y0, region.x1, region.y1), (0, 0, 2, 0));
        assert_eq!(text_anchor, "head");

        // Covered cells get no direct write; the body row does.
        for (x, y) in &plan.l_cells_direct {
            assert!(!region.contains(*x, *y));
        }
        assert!(plan.l_cells_direct.contains(&(0, 1)));
        assert!(plan.l_cells_direct.contains(&(2, 1)));
    }

    #[test]
    fn add_sheet_after_close_rejected() {
        let tmp = TestDir::new();
        let mut exporter = XlsxExporter::new(
            tmp.path().join("out.xlsx"),
            SpecXlsxExportOptions::default(),
        );
        exporter.close().expect("close");

        let err = exporter
            .add_sheet(&MemorySheet::new(), "late")
            .expect_err("must fail");
        assert!(matches!(err, XlsxExportError::ClosedWorkbook));
    }

    #[test]
    fn duplicate_sheet_names_are_uniqued() {
        let tmp = TestDir::new();
        let mut exporter = XlsxExporter::new(
            tmp.path().join("out.xlsx"),
            SpecXlsxExportOptions::default(),
        );

        assert_eq!(exporter.derive_unique_sheet_name("data"), "data");
        assert_eq!(exporter.derive_unique_sheet_name("data"), "data__2");
        assert_eq!(exporter.derive_unique_sheet_name("data"), "data__3");
    }

    #[test]
    fn illegal_sheet_name_exported_sanitized() {
        let tmp = TestDir::new();
        let path_file_out = tmp.path().join("out.xlsx");
        let mut exporter =
            XlsxExporter::new(path_file_out.clone(), SpecXlsxExportOptions::default());

        exporter
            .add_sheet(&rendered_sheet(), "a/b:c")
            .expect("add sheet");
        exporter.close().expect("close");
        assert!(path_file_out.exists());
    }
}
