//! Markup shorthand parsing and attribute normalization.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::spec::{
    EnumAttrValue, EnumMarkupNode, EnumTextAlign, RenderTreeError, SpecNodeAttrs,
};

////////////////////////////////////////////////////////////////////////////////
// #region ShorthandGrammar

/// Parsed head token of the shorthand grammar `tag(#id)?(.class)*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTagShorthand {
    /// Bare tag name.
    pub tag: String,
    /// Shorthand id.
    pub id: Option<String>,
    /// Space-joined shorthand classes.
    pub class: Option<String>,
}

fn shorthand_regex() -> &'static Regex {
    static RE_SHORTHAND: OnceLock<Regex> = OnceLock::new();
    RE_SHORTHAND.get_or_init(|| {
        Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)(?:#([A-Za-z0-9_-]+))?((?:\.[A-Za-z0-9_-]+)*)$")
            .expect("shorthand grammar pattern")
    })
}

/// Parse one head token against the shorthand grammar.
///
/// Class separators (`.`) become single spaces, so `div#foo.a.b` yields
/// `tag="div"`, `id="foo"`, `class="a b"`.
pub fn parse_tag_shorthand(token: &str) -> Result<SpecTagShorthand, RenderTreeError> {
    let Some(caps) = shorthand_regex().captures(token) else {
        return Err(RenderTreeError::InvalidElementName(token.to_string()));
    };

    let tag = caps[1].to_string();
    let id = caps.get(2).map(|m| m.as_str().to_string());
    let class = caps.get(3).and_then(|m| {
        let joined = m.as_str().replace('.', " ").trim().to_string();
        if joined.is_empty() { None } else { Some(joined) }
    });

    Ok(SpecTagShorthand { tag, id, class })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region AttributeNormalization

/// Canonicalize one element body into a `(tag, attrs, content)` triple.
///
/// The head token must be a text identifier. When the second item is an
/// attributes mapping it is merged over the shorthand-derived id/class:
/// explicit `id` wins outright, `class` values concatenate (shorthand first),
/// and the remaining items are content. Otherwise all remaining items are
/// content and the shorthand attrs are used as-is.
pub fn normalize(
    items: &[EnumMarkupNode],
) -> Result<(String, SpecNodeAttrs, &[EnumMarkupNode]), RenderTreeError> {
    let Some(head) = items.first() else {
        return Err(RenderTreeError::InvalidElementName("<empty element>".to_string()));
    };
    let EnumMarkupNode::Text(token) = head else {
        return Err(RenderTreeError::InvalidElementName(head.literal_form()));
    };

    let shorthand = parse_tag_shorthand(token)?;
    let mut attrs = SpecNodeAttrs {
        id: shorthand.id,
        class: shorthand.class,
        ..SpecNodeAttrs::default()
    };

    if let Some(EnumMarkupNode::Attrs(dict_explicit)) = items.get(1) {
        merge_explicit_attrs(&mut attrs, dict_explicit);
        return Ok((shorthand.tag, attrs, &items[2..]));
    }

    Ok((shorthand.tag, attrs, &items[1..]))
}

fn merge_explicit_attrs(attrs: &mut SpecNodeAttrs, dict_explicit: &BTreeMap<String, EnumAttrValue>) {
    for (key, value) in dict_explicit {
        match key.as_str() {
            "id" => attrs.id = Some(attr_text(value)),
            "class" => {
                let explicit = attr_text(value);
                attrs.class = Some(match attrs.class.take() {
                    Some(derived) => format!("{derived} {explicit}"),
                    None => explicit,
                });
            }
            "size" => attrs.size = attr_count(value),
            "colspan" => attrs.colspan = attr_count(value),
            "text-align" => attrs.text_align = parse_text_align(&attr_text(value)),
            "margin-top" => attrs.margin_top = attr_count(value).unwrap_or(0),
            "margin-left" => attrs.margin_left = attr_count(value).unwrap_or(0),
            "margin-bottom" => attrs.margin_bottom = attr_count(value).unwrap_or(0),
            "list-style-type" => attrs.list_style_type = Some(attr_text(value)),
            _ => {
                debug!("Ignoring unrecognized attribute {key:?}");
            }
        }
    }
}

fn attr_text(value: &EnumAttrValue) -> String {
    match value {
        EnumAttrValue::Text(text) => text.clone(),
        EnumAttrValue::Integer(num) => num.to_string(),
    }
}

fn attr_count(value: &EnumAttrValue) -> Option<usize> {
    let num = match value {
        EnumAttrValue::Integer(num) => *num,
        EnumAttrValue::Text(text) => text.trim().parse::<i64>().ok()?,
    };
    usize::try_from(num).ok().filter(|n| *n >= 1)
}

/// Parse a `text-align` value; anything outside the known set behaves as
/// left alignment (per-cell bordering, no merge).
pub fn parse_text_align(value: &str) -> Option<EnumTextAlign> {
    match value {
        "left" => Some(EnumTextAlign::Left),
        "center" => Some(EnumTextAlign::Center),
        "right" => Some(EnumTextAlign::Right),
        other => {
            debug!("Unsupported text-align {other:?}; treating as left");
            None
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> EnumMarkupNode {
        EnumMarkupNode::text(value)
    }

    #[test]
    fn parse_tag_shorthand_splits_id_and_classes() {
        let parsed = parse_tag_shorthand("div#foo.bar.baz").expect("parse shorthand");
        assert_eq!(parsed.tag, "div");
        assert_eq!(parsed.id.as_deref(), Some("foo"));
        assert_eq!(parsed.class.as_deref(), Some("bar baz"));
    }

    #[test]
    fn parse_tag_shorthand_rejects_non_identifier() {
        assert!(parse_tag_shorthand("#nope").is_err());
        assert!(parse_tag_shorthand("").is_err());
        assert!(parse_tag_shorthand("1bad").is_err());
    }

    #[test]
    fn normalize_merges_shorthand_and_explicit_class() {
        let items = vec![
            text("div#foo.bar"),
            EnumMarkupNode::attrs(vec![(
                "class".to_string(),
                EnumAttrValue::Text("baz".to_string()),
            )]),
            text("body"),
        ];

        let (tag, attrs, content) = normalize(&items).expect("normalize");
        assert_eq!(tag, "div");
        assert_eq!(attrs.id.as_deref(), Some("foo"));
        assert_eq!(attrs.class.as_deref(), Some("bar baz"));
        assert_eq!(content, &[text("body")]);
    }

    #[test]
    fn normalize_explicit_id_wins_over_shorthand() {
        let items = vec![
            text("div#foo"),
            EnumMarkupNode::attrs(vec![(
                "id".to_string(),
                EnumAttrValue::Text("bar".to_string()),
            )]),
        ];

        let (_, attrs, content) = normalize(&items).expect("normalize");
        assert_eq!(attrs.id.as_deref(), Some("bar"));
        assert!(content.is_empty());
    }

    #[test]
    fn normalize_without_attrs_map_passes_content_through() {
        let items = vec![text("td"), text("a"), text("b")];

        let (tag, attrs, content) = normalize(&items).expect("normalize");
        assert_eq!(tag, "td");
        assert_eq!(attrs, SpecNodeAttrs::default());
        assert_eq!(content.len(), 2);
    }

    #[test]
    fn normalize_parses_layout_attributes() {
        let items = vec![
            text("td"),
            EnumMarkupNode::attrs(vec![
                ("size".to_string(), EnumAttrValue::Integer(3)),
                ("margin-left".to_string(), EnumAttrValue::Integer(2)),
                (
                    "text-align".to_string(),
                    EnumAttrValue::Text("center".to_string()),
                ),
            ]),
        ];

        let (_, attrs, _) = normalize(&items).expect("normalize");
        assert_eq!(attrs.size, Some(3));
        assert_eq!(attrs.margin_left, 2);
        assert_eq!(attrs.text_align, Some(EnumTextAlign::Center));
    }

    #[test]
    fn normalize_rejects_non_text_head() {
        let items = vec![EnumMarkupNode::Number(7)];
        let err = normalize(&items).expect_err("must fail");
        assert!(matches!(err, RenderTreeError::InvalidElementName(_)));
    }

    #[test]
    fn unknown_text_align_behaves_as_left() {
        assert_eq!(parse_text_align("justify"), None);
        assert_eq!(parse_text_align("right"), Some(EnumTextAlign::Right));
    }
}
