//! Shared markup/grid models, render options, and top-level error types.

use std::collections::BTreeMap;
use std::fmt;

use crate::conf::{C_BULLET_DEFAULT, N_COL_IDX_SHEET_MAX};

////////////////////////////////////////////////////////////////////////////////
// #region MarkupTree

/// Attribute value inside an explicit attributes mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumAttrValue {
    /// Text attribute value.
    Text(String),
    /// Integer attribute value.
    Integer(i64),
}

/// One markup expression in the vector notation `[tag attrs? children...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumMarkupNode {
    /// Tagged vector element; first item is the tag token.
    Element(Vec<EnumMarkupNode>),
    /// Attribute mapping (meaningful only as the second item of an element).
    Attrs(BTreeMap<String, EnumAttrValue>),
    /// Text literal.
    Text(String),
    /// Numeric literal.
    Number(i64),
    /// Untagged ordered sequence, stacked vertically.
    Seq(Vec<EnumMarkupNode>),
    /// Absent value.
    Empty,
}

impl EnumMarkupNode {
    /// Text literal node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Tagged element node with `tag` prepended as the head token.
    pub fn tagged(tag: impl Into<String>, children: Vec<EnumMarkupNode>) -> Self {
        let mut l_items = Vec::with_capacity(children.len() + 1);
        l_items.push(Self::Text(tag.into()));
        l_items.extend(children);
        Self::Element(l_items)
    }

    /// Attribute mapping node from key/value pairs.
    pub fn attrs<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, EnumAttrValue)>,
    {
        Self::Attrs(entries.into_iter().collect())
    }

    /// Literal text form used when a node is coerced to plain cell text.
    pub fn literal_form(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => value.to_string(),
            Self::Empty => String::new(),
            Self::Attrs(dict_entries) => {
                let l_pairs: Vec<String> = dict_entries
                    .iter()
                    .map(|(key, value)| match value {
                        EnumAttrValue::Text(text) => format!("{key}={text}"),
                        EnumAttrValue::Integer(num) => format!("{key}={num}"),
                    })
                    .collect();
                format!("{{{}}}", l_pairs.join(", "))
            }
            Self::Element(items) | Self::Seq(items) => {
                let l_parts: Vec<String> =
                    items.iter().map(EnumMarkupNode::literal_form).collect();
                l_parts.join(" ")
            }
        }
    }
}

/// Horizontal text alignment recognized by the style engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumTextAlign {
    /// Default alignment; per-cell bordering only, no merge.
    Left,
    /// Centered; block is merged and the anchor cell carries the alignment.
    Center,
    /// Right-aligned; block is merged like `Center`.
    Right,
}

/// Canonical attributes derived by the markup normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecNodeAttrs {
    /// Element id (explicit mapping wins over shorthand).
    pub id: Option<String>,
    /// Space-joined class list (shorthand classes first, explicit appended).
    pub class: Option<String>,
    /// Explicit column span in grid columns.
    pub size: Option<usize>,
    /// Requested number of row-above blocks to cover.
    pub colspan: Option<usize>,
    /// Horizontal alignment; unknown inputs fall back to `None` (left).
    pub text_align: Option<EnumTextAlign>,
    /// Rows skipped above the content.
    pub margin_top: usize,
    /// Columns skipped left of the content.
    pub margin_left: usize,
    /// Rows reserved below the content (consumed, not reported).
    pub margin_bottom: usize,
    /// Bullet literal override for unordered lists.
    pub list_style_type: Option<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GridModels

/// Border line kind applied to one cell edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumBorderLine {
    /// No border.
    #[default]
    None,
    /// Thin line (default for style classes).
    Thin,
    /// Medium line.
    Medium,
    /// Dashed line.
    Dashed,
    /// Dotted line.
    Dotted,
    /// Thick line.
    Thick,
    /// Double line.
    Double,
    /// Hairline.
    Hair,
}

/// Resolved per-cell style assigned through the sheet sink.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecCellStyle {
    /// Top edge border.
    pub top: EnumBorderLine,
    /// Right edge border.
    pub right: EnumBorderLine,
    /// Bottom edge border.
    pub bottom: EnumBorderLine,
    /// Left edge border.
    pub left: EnumBorderLine,
    /// Solid fill color (`#RRGGBB`).
    pub fill_color: Option<String>,
    /// Horizontal alignment carried on merged-block anchor cells.
    pub align: Option<EnumTextAlign>,
}

impl SpecCellStyle {
    /// Whether the right edge carries any border line.
    pub fn has_right_border(&self) -> bool {
        self.right != EnumBorderLine::None
    }
}

/// Inclusive rectangle of merged cells recorded on the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecMergedRegion {
    /// Leftmost column.
    pub x0: usize,
    /// Topmost row.
    pub y0: usize,
    /// Rightmost column (inclusive).
    pub x1: usize,
    /// Bottommost row (inclusive).
    pub y1: usize,
}

impl SpecMergedRegion {
    /// Whether `(x, y)` lies inside the region.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Number of columns covered by the region.
    pub fn col_span(&self) -> usize {
        self.x1 - self.x0 + 1
    }

    /// Whether the region covers exactly one cell.
    pub fn is_single_cell(&self) -> bool {
        self.x0 == self.x1 && self.y0 == self.y1
    }
}

/// Annotated output node produced by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRenderedNode {
    /// Canonical tag name for element nodes.
    pub tag: Option<String>,
    /// Resolved attributes (cell nodes carry the resolved `size`).
    pub attrs: SpecNodeAttrs,
    /// Grid origin of the rendered content.
    pub origin: (usize, usize),
    /// Occupied columns.
    pub width: usize,
    /// Occupied rows.
    pub height: usize,
    /// Literal payload for text/scalar nodes.
    pub literal: Option<String>,
    /// Rendered children in document order.
    pub children: Vec<SpecRenderedNode>,
}

impl SpecRenderedNode {
    /// Occupied extent as `(width, height)`.
    pub fn extent(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OptionsAndErrors

/// Render-wide options threaded through a [`crate::style::RenderSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRenderOptions {
    /// Bullet literal for unordered lists without `list-style-type`.
    pub bullet_default: String,
    /// Highest addressable column index; size inference clamps here.
    pub col_idx_max: usize,
}

impl Default for SpecRenderOptions {
    fn default() -> Self {
        Self {
            bullet_default: C_BULLET_DEFAULT.to_string(),
            col_idx_max: N_COL_IDX_SHEET_MAX,
        }
    }
}

/// "Render failed" errors. A render either completes fully or aborts at the
/// first error, leaving the sink partially written.
#[derive(Debug)]
pub enum RenderTreeError {
    /// Head token of an element is not an identifier shape.
    InvalidElementName(String),
    /// The host sheet sink rejected a write/style/merge call.
    SinkFailure {
        /// Column of the failed call.
        x: usize,
        /// Row of the failed call.
        y: usize,
        /// Underlying sink error text.
        message: String,
    },
}

impl fmt::Display for RenderTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidElementName(token) => {
                write!(f, "Invalid element name: {token:?}")
            }
            Self::SinkFailure { x, y, message } => {
                write!(f, "Sheet sink failure at ({x}, {y}): {message}")
            }
        }
    }
}

impl std::error::Error for RenderTreeError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////
