//! Stateless helpers: sheet-name sanitizing, index casts, and style-to-format
//! conversion.

use std::collections::BTreeSet;

use gridmark_render::sink::{MemorySheet, SheetSink};
use gridmark_render::spec::{EnumBorderLine, EnumTextAlign, SpecCellStyle, SpecMergedRegion};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, XlsxError};

use crate::conf::{C_SHEET_NAME_FALLBACK, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::XlsxExportError;

////////////////////////////////////////////////////////////////////////////////
// #region SheetNaming

/// Replace invalid chars and trim to a valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = C_SHEET_NAME_FALLBACK.to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasts

/// Cast a grid row index to the worksheet row address space.
pub fn cast_row_num(value: usize) -> Result<u32, XlsxExportError> {
    u32::try_from(value)
        .map_err(|_| XlsxExportError::IndexOverflow(format!("row index overflow: {value}")))
}

/// Cast a grid column index to the worksheet column address space.
pub fn cast_col_num(value: usize) -> Result<u16, XlsxExportError> {
    u16::try_from(value)
        .map_err(|_| XlsxExportError::IndexOverflow(format!("column index overflow: {value}")))
}

/// Wrap an underlying workbook failure.
pub fn derive_xlsx_error(err: XlsxError) -> XlsxExportError {
    XlsxExportError::Workbook(err.to_string())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatConversion

/// Convert a rendered cell style into a workbook format.
pub fn derive_xlsx_format(style: Option<&SpecCellStyle>) -> Format {
    let mut format = Format::new();
    let Some(style) = style else {
        return format;
    };

    format = format.set_border_top(derive_format_border(style.top));
    format = format.set_border_right(derive_format_border(style.right));
    format = format.set_border_bottom(derive_format_border(style.bottom));
    format = format.set_border_left(derive_format_border(style.left));

    if let Some(color) = &style.fill_color {
        format = format.set_background_color(color.as_str());
    }
    if let Some(align) = style.align {
        format = format.set_align(derive_format_align(align));
    }

    format
}

fn derive_format_border(border: EnumBorderLine) -> FormatBorder {
    match border {
        EnumBorderLine::None => FormatBorder::None,
        EnumBorderLine::Thin => FormatBorder::Thin,
        EnumBorderLine::Medium => FormatBorder::Medium,
        EnumBorderLine::Dashed => FormatBorder::Dashed,
        EnumBorderLine::Dotted => FormatBorder::Dotted,
        EnumBorderLine::Thick => FormatBorder::Thick,
        EnumBorderLine::Double => FormatBorder::Double,
        EnumBorderLine::Hair => FormatBorder::Hair,
    }
}

fn derive_format_align(align: EnumTextAlign) -> FormatAlign {
    match align {
        EnumTextAlign::Left => FormatAlign::Left,
        EnumTextAlign::Center => FormatAlign::Center,
        EnumTextAlign::Right => FormatAlign::Right,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MergeTracking

/// Build the set of coordinates covered by merged regions (anchors included);
/// these cells are written through `merge_range` instead of per-cell writes.
pub fn derive_merge_cover_tracker(
    merged_regions: &[SpecMergedRegion],
) -> BTreeSet<(usize, usize)> {
    let mut set_covered = BTreeSet::new();
    for region in merged_regions {
        for y in region.y0..=region.y1 {
            for x in region.x0..=region.x1 {
                set_covered.insert((x, y));
            }
        }
    }
    set_covered
}

/// Per-worksheet emission plan: cells written directly, and merged regions
/// written through the merge path with their anchor text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetEmissionPlan {
    /// Touched coordinates outside every merged region, in `(x, y)` order.
    pub l_cells_direct: Vec<(usize, usize)>,
    /// Merged regions paired with the text of their anchor cell.
    pub l_merges: Vec<(SpecMergedRegion, String)>,
}

/// Split a rendered sheet into direct writes and merge-path regions.
///
/// Every coordinate covered by a merged region (anchor included) is excluded
/// from the direct list; each region is emitted exactly once, carrying its
/// anchor cell's text.
pub fn derive_sheet_emission_plan(sheet: &MemorySheet) -> SpecSheetEmissionPlan {
    let l_merged_regions = sheet.merged_regions();
    let set_covered = derive_merge_cover_tracker(&l_merged_regions);

    let l_cells_direct = sheet
        .cells()
        .map(|((x, y), _)| (*x, *y))
        .filter(|coord| !set_covered.contains(coord))
        .collect();

    let l_merges = l_merged_regions
        .into_iter()
        .map(|region| {
            let text_anchor = sheet
                .cell_text(region.x0, region.y0)
                .unwrap_or("")
                .to_string();
            (region, text_anchor)
        })
        .collect();

    SpecSheetEmissionPlan {
        l_cells_direct,
        l_merges,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
