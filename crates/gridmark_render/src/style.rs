//! Style-class registry and rectangular border painting.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::conf::{C_STYLE_CLASS_DEFAULT, N_STYLE_VARIANTS};
use crate::sink::SheetSink;
use crate::spec::{
    EnumBorderLine, EnumTextAlign, RenderTreeError, SpecCellStyle, SpecMergedRegion,
    SpecRenderOptions,
};

////////////////////////////////////////////////////////////////////////////////
// #region EdgeBitmask

/// Top edge bit of the 4-bit edge bitmask.
pub const MASK_EDGE_TOP: usize = 0b0001;
/// Right edge bit.
pub const MASK_EDGE_RIGHT: usize = 0b0010;
/// Bottom edge bit.
pub const MASK_EDGE_BOTTOM: usize = 0b0100;
/// Left edge bit.
pub const MASK_EDGE_LEFT: usize = 0b1000;

/// Edge bitmask for cell `(cx, cy)` inside the rectangle `[x, x+w) x [y, y+h)`.
///
/// Purely positional: content never contributes.
pub fn derive_edge_mask(cx: usize, cy: usize, x: usize, y: usize, w: usize, h: usize) -> usize {
    let mut mask = 0;
    if cy == y {
        mask |= MASK_EDGE_TOP;
    }
    if cx == x + w - 1 {
        mask |= MASK_EDGE_RIGHT;
    }
    if cy == y + h - 1 {
        mask |= MASK_EDGE_BOTTOM;
    }
    if cx == x {
        mask |= MASK_EDGE_LEFT;
    }
    mask
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StyleClass

/// Named style class precomputed as sixteen edge-bitmask variants plus one
/// full-border variant used for merged-block anchor cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecStyleClass {
    l_variants: Vec<SpecCellStyle>,
    full_border: SpecCellStyle,
}

impl SpecStyleClass {
    /// Precompute all variants for one border kind and optional solid fill.
    pub fn build(border: EnumBorderLine, fill_color: Option<String>) -> Self {
        let mut l_variants = Vec::with_capacity(N_STYLE_VARIANTS);
        for mask in 0..N_STYLE_VARIANTS {
            l_variants.push(SpecCellStyle {
                top: edge_line(border, mask, MASK_EDGE_TOP),
                right: edge_line(border, mask, MASK_EDGE_RIGHT),
                bottom: edge_line(border, mask, MASK_EDGE_BOTTOM),
                left: edge_line(border, mask, MASK_EDGE_LEFT),
                fill_color: fill_color.clone(),
                align: None,
            });
        }

        let full_border = SpecCellStyle {
            top: border,
            right: border,
            bottom: border,
            left: border,
            fill_color,
            align: None,
        };

        Self {
            l_variants,
            full_border,
        }
    }

    /// Variant for one edge bitmask (low four bits).
    pub fn variant(&self, mask: usize) -> &SpecCellStyle {
        &self.l_variants[mask & (N_STYLE_VARIANTS - 1)]
    }

    /// Full-border variant used for merged blocks.
    pub fn full_border(&self) -> &SpecCellStyle {
        &self.full_border
    }

    /// Number of precomputed edge-bitmask variants.
    pub fn variant_count(&self) -> usize {
        self.l_variants.len()
    }
}

fn edge_line(border: EnumBorderLine, mask: usize, bit: usize) -> EnumBorderLine {
    if mask & bit != 0 {
        border
    } else {
        EnumBorderLine::None
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RenderSession

/// Per-invocation render state: the style-class registry and the
/// styled-coordinate dedupe set.
///
/// Created fresh for each independent render so classes and painted
/// coordinates never leak between renders. Reuse the same session only for
/// passes that intentionally share the dedupe set.
#[derive(Debug, Clone)]
pub struct RenderSession {
    dict_style_classes: BTreeMap<String, SpecStyleClass>,
    set_styled_cells: BTreeSet<(usize, usize)>,
    options: SpecRenderOptions,
}

impl RenderSession {
    /// Session with default options; the `"default"` class (thin borders,
    /// no fill) is always registered.
    pub fn new() -> Self {
        Self::with_options(SpecRenderOptions::default())
    }

    /// Session with explicit options.
    pub fn with_options(options: SpecRenderOptions) -> Self {
        let mut session = Self {
            dict_style_classes: BTreeMap::new(),
            set_styled_cells: BTreeSet::new(),
            options,
        };
        session.register_style_class(C_STYLE_CLASS_DEFAULT, EnumBorderLine::Thin, None);
        session
    }

    /// Register (or replace) a named style class.
    pub fn register_style_class(
        &mut self,
        class_name: &str,
        border: EnumBorderLine,
        fill_color: Option<String>,
    ) {
        self.dict_style_classes
            .insert(class_name.to_string(), SpecStyleClass::build(border, fill_color));
    }

    /// Registered class by name, falling back to the default class.
    pub fn style_class_or_default(&self, class_name: Option<&str>) -> &SpecStyleClass {
        if let Some(name) = class_name
            && let Some(style_class) = self.dict_style_classes.get(name)
        {
            return style_class;
        }
        if let Some(name) = class_name {
            debug!("Unknown style class {name:?}; using default");
        }
        &self.dict_style_classes[C_STYLE_CLASS_DEFAULT]
    }

    /// Number of coordinates painted so far in this session.
    pub fn styled_cell_count(&self) -> usize {
        self.set_styled_cells.len()
    }

    /// Clear the styled-coordinate set for a fresh pass over the same
    /// registry.
    pub fn reset_styled_cells(&mut self) {
        self.set_styled_cells.clear();
    }

    /// Render options threaded through the layout engine.
    pub fn options(&self) -> &SpecRenderOptions {
        &self.options
    }

    fn mark_styled(&mut self, x: usize, y: usize) -> bool {
        self.set_styled_cells.insert((x, y))
    }
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ApplyStyle

/// Paint the rectangle `[x, x+w) x [y, y+h)` with edge-bitmask variants of
/// `class_name` (or the default class).
///
/// Coordinates already painted in this session are skipped. Center/right
/// alignment additionally registers a merged region over the rectangle and
/// assigns the anchor cell the full-border variant carrying the alignment;
/// left (and unrecognized, normalized upstream to `None`) alignment paints
/// per-cell only.
#[allow(clippy::too_many_arguments)]
pub fn apply_style(
    sink: &mut dyn SheetSink,
    session: &mut RenderSession,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    class_name: Option<&str>,
    text_align: Option<EnumTextAlign>,
) -> Result<(), RenderTreeError> {
    if w == 0 || h == 0 {
        return Ok(());
    }

    let style_class = session.style_class_or_default(class_name).clone();

    for cy in y..y + h {
        for cx in x..x + w {
            if !session.mark_styled(cx, cy) {
                continue;
            }
            let mask = derive_edge_mask(cx, cy, x, y, w, h);
            sink.set_cell_style(cx, cy, style_class.variant(mask))
                .map_err(|message| RenderTreeError::SinkFailure { x: cx, y: cy, message })?;
        }
    }

    if matches!(
        text_align,
        Some(EnumTextAlign::Center) | Some(EnumTextAlign::Right)
    ) {
        let region = SpecMergedRegion {
            x0: x,
            y0: y,
            x1: x + w - 1,
            y1: y + h - 1,
        };
        sink.add_merged_region(region)
            .map_err(|message| RenderTreeError::SinkFailure { x, y, message })?;

        let mut style_anchor = style_class.full_border().clone();
        style_anchor.align = text_align;
        sink.set_cell_style(x, y, &style_anchor)
            .map_err(|message| RenderTreeError::SinkFailure { x, y, message })?;
    }

    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySheet;

    #[test]
    fn style_class_has_sixteen_variants() {
        let style_class = SpecStyleClass::build(EnumBorderLine::Thin, None);
        assert_eq!(style_class.variant_count(), 16);

        let bare = style_class.variant(0);
        assert_eq!(bare.top, EnumBorderLine::None);
        assert_eq!(bare.right, EnumBorderLine::None);
        assert_eq!(bare.bottom, EnumBorderLine::None);
        assert_eq!(bare.left, EnumBorderLine::None);

        let boxed = style_class.variant(15);
        assert_eq!(boxed.top, EnumBorderLine::Thin);
        assert_eq!(boxed.right, EnumBorderLine::Thin);
        assert_eq!(boxed.bottom, EnumBorderLine::Thin);
        assert_eq!(boxed.left, EnumBorderLine::Thin);

        assert_eq!(style_class.full_border(), style_class.variant(15));
    }

    #[test]
    fn style_class_fill_applies_to_every_variant() {
        let style_class =
            SpecStyleClass::build(EnumBorderLine::Thin, Some("#CCFFCC".to_string()));
        for mask in 0..16 {
            assert_eq!(
                style_class.variant(mask).fill_color.as_deref(),
                Some("#CCFFCC")
            );
        }
    }

    #[test]
    fn edge_mask_is_positional() {
        // 3x2 rectangle at (1, 1).
        assert_eq!(
            derive_edge_mask(1, 1, 1, 1, 3, 2),
            MASK_EDGE_TOP | MASK_EDGE_LEFT
        );
        assert_eq!(
            derive_edge_mask(3, 2, 1, 1, 3, 2),
            MASK_EDGE_RIGHT | MASK_EDGE_BOTTOM
        );
        assert_eq!(derive_edge_mask(2, 1, 1, 1, 3, 2), MASK_EDGE_TOP);
    }

    #[test]
    fn single_cell_rectangle_gets_all_edges() {
        assert_eq!(derive_edge_mask(4, 4, 4, 4, 1, 1), 0b1111);
    }

    #[test]
    fn adjacent_rectangles_paint_each_cell_once() {
        let mut sheet = MemorySheet::new();
        let mut session = RenderSession::new();

        apply_style(&mut sheet, &mut session, 0, 0, 2, 2, None, None).expect("first rect");
        apply_style(&mut sheet, &mut session, 2, 0, 2, 2, None, None).expect("second rect");

        // Union of two touching 2x2 blocks: every coordinate styled exactly once.
        assert_eq!(session.styled_cell_count(), 8);
    }

    #[test]
    fn overlapping_rectangle_keeps_first_paint() {
        let mut sheet = MemorySheet::new();
        let mut session = RenderSession::new();

        apply_style(&mut sheet, &mut session, 0, 0, 2, 2, None, None).expect("first rect");
        let style_first = sheet.cell_style(1, 1).cloned().expect("styled");

        apply_style(&mut sheet, &mut session, 1, 1, 2, 2, None, None).expect("second rect");
        assert_eq!(sheet.cell_style(1, 1), Some(&style_first));
        assert_eq!(session.styled_cell_count(), 7);
    }

    #[test]
    fn center_alignment_merges_and_aligns_anchor() {
        let mut sheet = MemorySheet::new();
        let mut session = RenderSession::new();

        apply_style(
            &mut sheet,
            &mut session,
            1,
            0,
            3,
            2,
            None,
            Some(EnumTextAlign::Center),
        )
        .expect("apply");

        let l_regions = sheet.merged_regions();
        assert_eq!(
            l_regions,
            vec![SpecMergedRegion {
                x0: 1,
                y0: 0,
                x1: 3,
                y1: 1,
            }]
        );

        let anchor = sheet.cell_style(1, 0).expect("anchor style");
        assert_eq!(anchor.align, Some(EnumTextAlign::Center));
        assert_eq!(anchor.top, EnumBorderLine::Thin);
        assert_eq!(anchor.left, EnumBorderLine::Thin);
        assert_eq!(anchor.right, EnumBorderLine::Thin);
        assert_eq!(anchor.bottom, EnumBorderLine::Thin);
    }

    #[test]
    fn left_alignment_registers_no_merge() {
        let mut sheet = MemorySheet::new();
        let mut session = RenderSession::new();

        apply_style(
            &mut sheet,
            &mut session,
            0,
            0,
            2,
            1,
            None,
            Some(EnumTextAlign::Left),
        )
        .expect("apply");

        assert!(sheet.merged_regions().is_empty());
    }

    #[test]
    fn unknown_class_falls_back_to_default() {
        let mut sheet = MemorySheet::new();
        let mut session = RenderSession::new();

        apply_style(&mut sheet, &mut session, 0, 0, 1, 1, Some("missing"), None)
            .expect("apply");
        assert_eq!(sheet.cell_style(0, 0).expect("styled").top, EnumBorderLine::Thin);
    }

    #[test]
    fn registered_class_border_and_fill_are_used() {
        let mut sheet = MemorySheet::new();
        let mut session = RenderSession::new();
        session.register_style_class("head", EnumBorderLine::Medium, Some("#EEEEEE".to_string()));

        apply_style(&mut sheet, &mut session, 0, 0, 1, 1, Some("head"), None).expect("apply");

        let style = sheet.cell_style(0, 0).expect("styled");
        assert_eq!(style.top, EnumBorderLine::Medium);
        assert_eq!(style.fill_color.as_deref(), Some("#EEEEEE"));
    }
}
