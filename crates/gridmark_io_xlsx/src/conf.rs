//! XLSX constants.

/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Sheet name used when sanitizing leaves nothing.
pub const C_SHEET_NAME_FALLBACK: &str = "Sheet";
