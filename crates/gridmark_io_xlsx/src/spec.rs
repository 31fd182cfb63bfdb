//! Export options and top-level error types.

use std::fmt;

/// Exporter-wide options applied to every emitted worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecXlsxExportOptions {
    /// Uniform column width applied over the touched area, when set.
    /// A small value (2-3) gives the square grid-paper look.
    pub width_col: Option<f64>,
    /// Rows frozen at the top of each sheet.
    pub freeze_rows: usize,
    /// Columns frozen at the left of each sheet.
    pub freeze_cols: usize,
}

impl Default for SpecXlsxExportOptions {
    fn default() -> Self {
        Self {
            width_col: None,
            freeze_rows: 0,
            freeze_cols: 0,
        }
    }
}

/// "Export failed" errors raised by [`crate::writer::XlsxExporter`].
#[derive(Debug)]
pub enum XlsxExportError {
    /// A sheet was added after `close()`.
    ClosedWorkbook,
    /// Underlying workbook write failure.
    Workbook(String),
    /// Row/column index does not fit the worksheet address space.
    IndexOverflow(String),
}

impl fmt::Display for XlsxExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClosedWorkbook => write!(f, "Cannot write after close()."),
            Self::Workbook(message) => write!(f, "xlsx write error: {message}"),
            Self::IndexOverflow(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for XlsxExportError {}
