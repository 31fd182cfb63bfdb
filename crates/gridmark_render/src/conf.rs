//! Grid constants.

/// Highest addressable column index in the target sheet grid.
pub const N_COL_IDX_SHEET_MAX: usize = 255;
/// Bullet literal written by unordered lists when no override is given.
pub const C_BULLET_DEFAULT: &str = "・";
/// Style-class name always present in a render session.
pub const C_STYLE_CLASS_DEFAULT: &str = "default";
/// Number of edge-bitmask style variants per style class.
pub const N_STYLE_VARIANTS: usize = 16;
