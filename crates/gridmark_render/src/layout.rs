//! Recursive layout engine: shape/tag classification, tag handlers,
//! horizontal/vertical composition, and row-above size inference.

use log::trace;

use crate::markup::normalize;
use crate::sink::SheetSink;
use crate::spec::{
    EnumMarkupNode, RenderTreeError, SpecNodeAttrs, SpecRenderedNode,
};
use crate::style::{RenderSession, apply_style};

////////////////////////////////////////////////////////////////////////////////
// #region TagClassification

/// Layout strategy selected from a canonical tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumTagKind {
    /// Block container; vertical composition of row children.
    Table,
    /// Table row; horizontal composition plus per-cell styling.
    Row,
    /// Table cell; content first, width resolved afterwards.
    Cell,
    /// Unordered list; stacked items with bullet literals.
    UnorderedList,
    /// Ordered list; stacked items with ordinal bullets.
    OrderedList,
    /// List item; reserves the bullet column.
    ListItem,
    /// Any other tag; default vertical container semantics.
    Generic,
}

fn classify_tag(tag: &str) -> EnumTagKind {
    match tag {
        "table" => EnumTagKind::Table,
        "tr" => EnumTagKind::Row,
        "td" => EnumTagKind::Cell,
        "ul" => EnumTagKind::UnorderedList,
        "ol" => EnumTagKind::OrderedList,
        "li" => EnumTagKind::ListItem,
        _ => EnumTagKind::Generic,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SizeInference

/// Infer the column span needed at `(x, y)` to cover `colspan` blocks of the
/// row directly above.
///
/// Each unit follows a merged region above when one exists (consuming that
/// region's full span), otherwise walks rightward until the first cell above
/// carrying a right-edge border (inclusive). The scan clamps at
/// `col_idx_max` and never errors past it. With no row above, each unit
/// contributes exactly one column.
pub fn infer_col_span(
    sink: &dyn SheetSink,
    x: usize,
    y: usize,
    colspan: usize,
    col_idx_max: usize,
) -> usize {
    let n_units = usize::max(1, colspan);
    if y == 0 {
        return n_units;
    }
    let y_above = y - 1;
    let l_merged_regions = sink.merged_regions();

    let mut n_total = 0;
    let mut n_col_cursor = x;
    for _ in 0..n_units {
        let region_above = l_merged_regions
            .iter()
            .find(|region| region.contains(n_col_cursor, y_above));

        if let Some(region) = region_above {
            n_total += region.col_span();
            n_col_cursor = region.x1 + 1;
        } else {
            let n_col_start = n_col_cursor;
            while n_col_cursor < col_idx_max && !sink.has_right_border(n_col_cursor, y_above) {
                n_col_cursor += 1;
            }
            n_total += n_col_cursor - n_col_start + 1;
            n_col_cursor += 1;
        }
    }

    trace!("Inferred span {n_total} at ({x}, {y}) for colspan {colspan}");
    n_total
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region EntryPoints

/// Render `node` at origin `(x, y)` with a fresh default session.
///
/// Style classes beyond `"default"` require a pre-populated session; use
/// [`render_markup`] for that.
pub fn render_tree(
    sink: &mut dyn SheetSink,
    x: usize,
    y: usize,
    node: &EnumMarkupNode,
) -> Result<SpecRenderedNode, RenderTreeError> {
    let mut session = RenderSession::new();
    render_markup(sink, &mut session, x, y, node)
}

/// Render `node` at origin `(x, y)`, dispatching on expression shape.
///
/// Returns the annotated rendered tree; its root extent is the occupied
/// `(width, height)`. The first error aborts the render with the sink left
/// partially written.
pub fn render_markup(
    sink: &mut dyn SheetSink,
    session: &mut RenderSession,
    x: usize,
    y: usize,
    node: &EnumMarkupNode,
) -> Result<SpecRenderedNode, RenderTreeError> {
    match node {
        EnumMarkupNode::Empty => Ok(literal_node(x, y, 1, String::new())),
        EnumMarkupNode::Text(text) => render_literal(sink, x, y, text),
        EnumMarkupNode::Number(num) => render_literal(sink, x, y, &num.to_string()),
        EnumMarkupNode::Seq(items) => render_sequence(sink, session, x, y, items),
        EnumMarkupNode::Element(items) => render_element(sink, session, x, y, items),
        EnumMarkupNode::Attrs(_) => render_literal(sink, x, y, &node.literal_form()),
    }
}

fn render_literal(
    sink: &mut dyn SheetSink,
    x: usize,
    y: usize,
    text: &str,
) -> Result<SpecRenderedNode, RenderTreeError> {
    let l_lines: Vec<&str> = text.split('\n').collect();
    for (n_idx_line, line) in l_lines.iter().enumerate() {
        sink.write_value(x, y + n_idx_line, line)
            .map_err(|message| RenderTreeError::SinkFailure {
                x,
                y: y + n_idx_line,
                message,
            })?;
    }
    Ok(literal_node(x, y, l_lines.len(), text.to_string()))
}

fn literal_node(x: usize, y: usize, height: usize, text: String) -> SpecRenderedNode {
    SpecRenderedNode {
        tag: None,
        attrs: SpecNodeAttrs::default(),
        origin: (x, y),
        width: 1,
        height,
        literal: Some(text),
        children: Vec::new(),
    }
}

fn render_sequence(
    sink: &mut dyn SheetSink,
    session: &mut RenderSession,
    x: usize,
    y: usize,
    items: &[EnumMarkupNode],
) -> Result<SpecRenderedNode, RenderTreeError> {
    let mut n_y_cursor = y;
    let mut l_children = Vec::with_capacity(items.len());
    for item in items {
        let rendered = render_markup(sink, session, x, n_y_cursor, item)?;
        n_y_cursor += rendered.height;
        l_children.push(rendered);
    }

    // Reports the last child's width, not the maximum. Kept as observed.
    let n_width = l_children.last().map_or(1, |child| child.width);
    Ok(SpecRenderedNode {
        tag: None,
        attrs: SpecNodeAttrs::default(),
        origin: (x, y),
        width: n_width,
        height: usize::max(1, n_y_cursor - y),
        literal: None,
        children: l_children,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Composition

/// Lay `content` left-to-right from `(x + margin_left, y + margin_top)`.
///
/// Returns total width consumed (margins included), the maximum child
/// height, and the child results in order.
fn layout_row(
    sink: &mut dyn SheetSink,
    session: &mut RenderSession,
    x: usize,
    y: usize,
    attrs: &SpecNodeAttrs,
    content: &[EnumMarkupNode],
) -> Result<(usize, usize, Vec<SpecRenderedNode>), RenderTreeError> {
    let y_content = y + attrs.margin_top;
    let mut n_x_cursor = x + attrs.margin_left;
    let mut n_height_max = 0;
    let mut l_children = Vec::with_capacity(content.len());

    for item in content {
        let rendered = render_markup(sink, session, n_x_cursor, y_content, item)?;
        n_x_cursor += rendered.width;
        n_height_max = usize::max(n_height_max, rendered.height);
        l_children.push(rendered);
    }

    Ok((
        usize::max(1, n_x_cursor - x),
        usize::max(1, n_height_max),
        l_children,
    ))
}

/// Lay `content` top-to-bottom from `(x + margin_left, y + margin_top)`.
///
/// Returns the maximum child width, the height consumed above the bottom
/// margin, and the child results in order.
fn layout_column(
    sink: &mut dyn SheetSink,
    session: &mut RenderSession,
    x: usize,
    y: usize,
    attrs: &SpecNodeAttrs,
    content: &[EnumMarkupNode],
) -> Result<(usize, usize, Vec<SpecRenderedNode>), RenderTreeError> {
    let x_content = x + attrs.margin_left;
    let mut n_y_cursor = y + attrs.margin_top;
    let mut n_width_max = 0;
    let mut l_children = Vec::with_capacity(content.len());

    for item in content {
        let rendered = render_markup(sink, session, x_content, n_y_cursor, item)?;
        n_y_cursor += rendered.height;
        n_width_max = usize::max(n_width_max, rendered.width);
        l_children.push(rendered);
    }

    Ok((
        usize::max(1, n_width_max),
        usize::max(1, n_y_cursor - y),
        l_children,
    ))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TagHandlers

fn render_element(
    sink: &mut dyn SheetSink,
    session: &mut RenderSession,
    x: usize,
    y: usize,
    items: &[EnumMarkupNode],
) -> Result<SpecRenderedNode, RenderTreeError> {
    let (tag, attrs, content) = normalize(items)?;
    match classify_tag(&tag) {
        EnumTagKind::Table | EnumTagKind::Generic => {
            render_stacked(sink, session, x, y, tag, attrs, content)
        }
        EnumTagKind::Row => render_table_row(sink, session, x, y, tag, attrs, content),
        EnumTagKind::Cell => render_table_cell(sink, session, x, y, tag, attrs, content),
        EnumTagKind::UnorderedList => {
            render_list(sink, session, x, y, tag, attrs, content, EnumListMode::Bullet)
        }
        EnumTagKind::OrderedList => {
            render_list(sink, session, x, y, tag, attrs, content, EnumListMode::Ordinal)
        }
        EnumTagKind::ListItem => render_list_item(sink, session, x, y, tag, attrs, content),
    }
}

fn render_stacked(
    sink: &mut dyn SheetSink,
    session: &mut RenderSession,
    x: usize,
    y: usize,
    tag: String,
    attrs: SpecNodeAttrs,
    content: &[EnumMarkupNode],
) -> Result<SpecRenderedNode, RenderTreeError> {
    let (n_width, n_height, l_children) = layout_column(sink, session, x, y, &attrs, content)?;
    Ok(SpecRenderedNode {
        tag: Some(tag),
        attrs,
        origin: (x, y),
        width: n_width,
        height: n_height,
        literal: None,
        children: l_children,
    })
}

fn render_table_row(
    sink: &mut dyn SheetSink,
    session: &mut RenderSession,
    x: usize,
    y: usize,
    tag: String,
    attrs: SpecNodeAttrs,
    content: &[EnumMarkupNode],
) -> Result<SpecRenderedNode, RenderTreeError> {
    let (n_width, n_height_row, l_children) =
        layout_row(sink, session, x, y, &attrs, content)?;

    // Cell extents are fixed; paint each cell rectangle to the row height.
    for child in &l_children {
        if child.tag.is_none() {
            continue;
        }
        apply_style(
            sink,
            session,
            child.origin.0,
            child.origin.1,
            child.width,
            n_height_row,
            child.attrs.class.as_deref(),
            child.attrs.text_align,
        )?;
    }

    Ok(SpecRenderedNode {
        tag: Some(tag),
        attrs,
        origin: (x, y),
        width: n_width,
        height: n_height_row,
        literal: None,
        children: l_children,
    })
}

fn render_table_cell(
    sink: &mut dyn SheetSink,
    session: &mut RenderSession,
    x: usize,
    y: usize,
    tag: String,
    attrs: SpecNodeAttrs,
    content: &[EnumMarkupNode],
) -> Result<SpecRenderedNode, RenderTreeError> {
    // Content first, to learn the intrinsic height.
    let mut n_y_cursor = y;
    let mut l_children = Vec::with_capacity(content.len());
    for item in content {
        let rendered = render_markup(sink, session, x, n_y_cursor, item)?;
        n_y_cursor += rendered.height;
        l_children.push(rendered);
    }
    let n_height = usize::max(1, n_y_cursor - y);

    let n_col_idx_max = session.options().col_idx_max;
    let n_width = if let Some(colspan) = attrs.colspan {
        infer_col_span(&*sink, x, y, colspan, n_col_idx_max)
    } else if let Some(size) = attrs.size {
        usize::max(1, size)
    } else {
        infer_col_span(&*sink, x, y, 1, n_col_idx_max)
    };

    let mut attrs_resolved = attrs;
    attrs_resolved.size = Some(n_width);

    Ok(SpecRenderedNode {
        tag: Some(tag),
        attrs: attrs_resolved,
        origin: (x, y),
        width: n_width,
        height: n_height,
        literal: None,
        children: l_children,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumListMode {
    Bullet,
    Ordinal,
}

#[allow(clippy::too_many_arguments)]
fn render_list(
    sink: &mut dyn SheetSink,
    session: &mut RenderSession,
    x: usize,
    y: usize,
    tag: String,
    attrs: SpecNodeAttrs,
    content: &[EnumMarkupNode],
    mode: EnumListMode,
) -> Result<SpecRenderedNode, RenderTreeError> {
    let (n_width, n_height, l_children) = layout_column(sink, session, x, y, &attrs, content)?;

    // Post-order bullet placement over the already-rendered items.
    let mut l_items = Vec::new();
    collect_list_items(&l_children, &mut l_items);

    for (n_idx_item, item) in l_items.iter().enumerate() {
        let bullet = match mode {
            EnumListMode::Bullet => attrs
                .list_style_type
                .clone()
                .unwrap_or_else(|| session.options().bullet_default.clone()),
            EnumListMode::Ordinal => (n_idx_item + 1).to_string(),
        };
        let Some(x_bullet) = item.origin.0.checked_sub(1) else {
            continue;
        };
        sink.write_value(x_bullet, item.origin.1, &bullet)
            .map_err(|message| RenderTreeError::SinkFailure {
                x: x_bullet,
                y: item.origin.1,
                message,
            })?;
    }

    Ok(SpecRenderedNode {
        tag: Some(tag),
        attrs,
        origin: (x, y),
        width: n_width,
        height: n_height,
        literal: None,
        children: l_children,
    })
}

/// Collect rendered list items depth-first in document order. Nested lists
/// place their own bullets, so the walk does not descend into them.
fn collect_list_items<'a>(
    children: &'a [SpecRenderedNode],
    out: &mut Vec<&'a SpecRenderedNode>,
) {
    for child in children {
        match child.tag.as_deref() {
            Some("li") => out.push(child),
            Some("ul") | Some("ol") => {}
            _ => collect_list_items(&child.children, out),
        }
    }
}

fn render_list_item(
    sink: &mut dyn SheetSink,
    session: &mut RenderSession,
    x: usize,
    y: usize,
    tag: String,
    attrs: SpecNodeAttrs,
    content: &[EnumMarkupNode],
) -> Result<SpecRenderedNode, RenderTreeError> {
    // Column x is reserved for the bullet; content starts one column right.
    let x_content = x + 1;
    let mut n_y_cursor = y;
    let mut n_width_content = 0;
    let mut l_children = Vec::with_capacity(content.len());
    for item in content {
        let rendered = render_markup(sink, session, x_content, n_y_cursor, item)?;
        n_y_cursor += rendered.height;
        n_width_content = usize::max(n_width_content, rendered.width);
        l_children.push(rendered);
    }

    Ok(SpecRenderedNode {
        tag: Some(tag),
        attrs,
        origin: (x_content, y),
        width: 1 + usize::max(1, n_width_content),
        height: usize::max(1, n_y_cursor - y),
        literal: None,
        children: l_children,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
