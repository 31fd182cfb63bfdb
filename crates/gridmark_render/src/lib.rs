//! `gridmark_render` v1:
//! Markup-tree to spreadsheet-grid layout kernel.
//!
//! Renders a vector-notation markup tree (`[tag attrs? children...]`, tags
//! optionally carrying `#id`/`.class` shorthand) into two-dimensional cell
//! coordinates on a sheet sink: leaves land in cells, rows/columns size
//! themselves from the row above, blocks are bordered and merged through a
//! style-class registry.
//!
//! Architecture:
//! - `conf`   : constants and default presets
//! - `spec`   : models/options/errors
//! - `markup` : shorthand parsing and attribute normalization
//! - `sink`   : sheet-sink boundary and in-memory sheet
//! - `style`  : style-class registry and border painting
//! - `layout` : recursive layout engine and size inference

pub mod conf;
pub mod layout;
pub mod markup;
pub mod sink;
pub mod spec;
pub mod style;

pub use conf::{C_BULLET_DEFAULT, C_STYLE_CLASS_DEFAULT, N_COL_IDX_SHEET_MAX, N_STYLE_VARIANTS};
pub use layout::{infer_col_span, render_markup, render_tree};
pub use markup::{SpecTagShorthand, normalize, parse_tag_shorthand};
pub use sink::{MemorySheet, SheetSink, SpecSheetCell};
pub use spec::{
    EnumAttrValue, EnumBorderLine, EnumMarkupNode, EnumTextAlign, RenderTreeError, SpecCellStyle,
    SpecMergedRegion, SpecNodeAttrs, SpecRenderOptions, SpecRenderedNode,
};
pub use style::{RenderSession, SpecStyleClass, apply_style, derive_edge_mask};
