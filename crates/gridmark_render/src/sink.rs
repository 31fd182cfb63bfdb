//! Sheet-sink boundary and the in-memory sheet implementation.

use std::collections::BTreeMap;

use crate::spec::{SpecCellStyle, SpecMergedRegion};

////////////////////////////////////////////////////////////////////////////////
// #region SinkBoundary

/// Minimal spreadsheet capability the layout engine renders into.
///
/// Cell writes, style assignments, and merge registrations happen directly
/// and synchronously; there is no batching or rollback. Failures are carried
/// as message strings and surface as
/// [`crate::spec::RenderTreeError::SinkFailure`].
pub trait SheetSink {
    /// Write `text` into the cell at `(x, y)`, creating it on first access.
    fn write_value(&mut self, x: usize, y: usize, text: &str) -> Result<(), String>;

    /// Assign `style` to the cell at `(x, y)`.
    fn set_cell_style(&mut self, x: usize, y: usize, style: &SpecCellStyle) -> Result<(), String>;

    /// Whether the cell at `(x, y)` currently carries a right-edge border.
    fn has_right_border(&self, x: usize, y: usize) -> bool;

    /// Record a merged region.
    fn add_merged_region(&mut self, region: SpecMergedRegion) -> Result<(), String>;

    /// Snapshot of all recorded merged regions.
    fn merged_regions(&self) -> Vec<SpecMergedRegion>;
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MemorySheet

/// One stored cell: value and/or style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecSheetCell {
    /// Cell text, when written.
    pub text: Option<String>,
    /// Cell style, when assigned.
    pub style: Option<SpecCellStyle>,
}

/// In-memory sheet sink backing tests and the XLSX export path.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    dict_cells: BTreeMap<(usize, usize), SpecSheetCell>,
    l_merged_regions: Vec<SpecMergedRegion>,
}

impl MemorySheet {
    /// Empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored cell at `(x, y)`, if any write or style touched it.
    pub fn cell(&self, x: usize, y: usize) -> Option<&SpecSheetCell> {
        self.dict_cells.get(&(x, y))
    }

    /// Cell text at `(x, y)`.
    pub fn cell_text(&self, x: usize, y: usize) -> Option<&str> {
        self.cell(x, y).and_then(|cell| cell.text.as_deref())
    }

    /// Cell style at `(x, y)`.
    pub fn cell_style(&self, x: usize, y: usize) -> Option<&SpecCellStyle> {
        self.cell(x, y).and_then(|cell| cell.style.as_ref())
    }

    /// Number of touched cells.
    pub fn cell_count(&self) -> usize {
        self.dict_cells.len()
    }

    /// Iterate touched cells in `(x, y)` order.
    pub fn cells(&self) -> impl Iterator<Item = (&(usize, usize), &SpecSheetCell)> {
        self.dict_cells.iter()
    }

    /// Exclusive `(width, height)` bounds of the touched area.
    pub fn bounds(&self) -> (usize, usize) {
        self.dict_cells.keys().fold((0, 0), |(w, h), (x, y)| {
            (usize::max(w, x + 1), usize::max(h, y + 1))
        })
    }

    /// Human-readable tab-separated dump of cell texts, for debugging.
    pub fn to_text_grid(&self) -> String {
        let (n_width, n_height) = self.bounds();
        let mut l_lines = Vec::with_capacity(n_height);
        for y in 0..n_height {
            let l_row: Vec<&str> = (0..n_width)
                .map(|x| self.cell_text(x, y).unwrap_or(""))
                .collect();
            l_lines.push(l_row.join("\t"));
        }
        l_lines.join("\n")
    }

    fn cell_mut(&mut self, x: usize, y: usize) -> &mut SpecSheetCell {
        self.dict_cells.entry((x, y)).or_default()
    }
}

impl SheetSink for MemorySheet {
    fn write_value(&mut self, x: usize, y: usize, text: &str) -> Result<(), String> {
        self.cell_mut(x, y).text = Some(text.to_string());
        Ok(())
    }

    fn set_cell_style(&mut self, x: usize, y: usize, style: &SpecCellStyle) -> Result<(), String> {
        self.cell_mut(x, y).style = Some(style.clone());
        Ok(())
    }

    fn has_right_border(&self, x: usize, y: usize) -> bool {
        self.cell_style(x, y)
            .is_some_and(SpecCellStyle::has_right_border)
    }

    fn add_merged_region(&mut self, region: SpecMergedRegion) -> Result<(), String> {
        if region.x1 < region.x0 || region.y1 < region.y0 {
            return Err(format!(
                "Degenerate merged region: ({}, {})..({}, {})",
                region.x0, region.y0, region.x1, region.y1
            ));
        }
        self.l_merged_regions.push(region);
        Ok(())
    }

    fn merged_regions(&self) -> Vec<SpecMergedRegion> {
        self.l_merged_regions.clone()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EnumBorderLine;

    #[test]
    fn write_value_creates_cell_on_first_access() {
        let mut sheet = MemorySheet::new();
        sheet.write_value(2, 1, "hello").expect("write");

        assert_eq!(sheet.cell_text(2, 1), Some("hello"));
        assert_eq!(sheet.cell_count(), 1);
        assert_eq!(sheet.bounds(), (3, 2));
    }

    #[test]
    fn has_right_border_reads_assigned_style() {
        let mut sheet = MemorySheet::new();
        assert!(!sheet.has_right_border(0, 0));

        let style = SpecCellStyle {
            right: EnumBorderLine::Thin,
            ..SpecCellStyle::default()
        };
        sheet.set_cell_style(0, 0, &style).expect("style");
        assert!(sheet.has_right_border(0, 0));
        assert!(!sheet.has_right_border(1, 0));
    }

    #[test]
    fn degenerate_merged_region_rejected() {
        let mut sheet = MemorySheet::new();
        let err = sheet
            .add_merged_region(SpecMergedRegion {
                x0: 3,
                y0: 0,
                x1: 1,
                y1: 0,
            })
            .expect_err("must fail");
        assert!(err.contains("Degenerate"));
    }

    #[test]
    fn text_grid_dumps_rows_in_order() {
        let mut sheet = MemorySheet::new();
        sheet.write_value(0, 0, "a").expect("write");
        sheet.write_value(1, 1, "b").expect("write");

        assert_eq!(sheet.to_text_grid(), "a\t\n\tb");
    }
}
