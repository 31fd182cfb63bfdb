//! `gridmark_io_xlsx` v1:
//! XLSX export for rendered gridmark sheets.
//!
//! Architecture mirrors `gridmark_render`'s host boundary:
//! - `conf`   : constants and default presets
//! - `spec`   : options and error types
//! - `util`   : pure helper functions
//! - `writer` : workbook exporter

pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{C_SHEET_NAME_FALLBACK, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
pub use spec::{SpecXlsxExportOptions, XlsxExportError};
pub use util::{
    SpecSheetEmissionPlan, derive_merge_cover_tracker, derive_sheet_emission_plan,
    derive_xlsx_format, sanitize_sheet_name,
};
pub use writer::XlsxExporter;
