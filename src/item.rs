//! The typesetting primitives a paragraph is made of.
//!
//! A paragraph is a flat sequence of [`Item`] values. Boxes carry content
//! with a fixed width, glue is stretchable or shrinkable whitespace and
//! penalties mark potential break points.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bidi::TextDirection;

/// Penalty value at or above which a break is never taken.
pub const INFINITE_PENALTY: f64 = 10_000.0;

/// Penalty value at or below which a break is always taken.
pub const MINUS_INFINITE_PENALTY: f64 = -10_000.0;

/// Free-form key/value data attached to an item by its producer.
pub type Metadata = BTreeMap<String, serde_json::Value>;

fn is_false(b: &bool) -> bool {
    !*b
}

/// A run of literal text set in a single font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBox {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
    pub font_style: String,
    pub direction: TextDirection,
    /// Width of the rendered text; `None` until measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Set on boxes produced by [`TextBox::merge`].
    #[serde(default, skip_serializing_if = "is_false")]
    pub merged: bool,
    /// The two boxes a merged box was made of, in logical order. Each of
    /// them may be a merged box itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<TextBox>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl TextBox {
    /// Creates an unmeasured left-to-right text box with normal weight and style.
    pub fn new(text: impl Into<String>, font_family: impl Into<String>, font_size: f64) -> Self {
        TextBox {
            text: text.into(),
            font_family: font_family.into(),
            font_size,
            font_weight: "normal".to_string(),
            font_style: "normal".to_string(),
            direction: TextDirection::Ltr,
            width: None,
            merged: false,
            sources: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_weight(mut self, weight: impl Into<String>) -> Self {
        self.font_weight = weight.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.font_style = style.into();
        self
    }

    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    #[inline]
    pub fn is_measured(&self) -> bool {
        self.width.is_some()
    }

    /// Two text boxes can be merged iff font family, size, weight, style
    /// and text direction are all equal.
    pub fn is_mergeable_with(&self, other: &TextBox) -> bool {
        self.font_family == other.font_family
            && self.font_size == other.font_size
            && self.font_weight == other.font_weight
            && self.font_style == other.font_style
            && self.direction == other.direction
    }

    /// Concatenates `self` and `next` into a new, unmeasured box.
    ///
    /// The new box keeps the formatting and metadata of `self` and records
    /// both inputs in [`TextBox::sources`]. Neither input is modified. The
    /// caller is responsible for checking [`TextBox::is_mergeable_with`].
    pub fn merge(&self, next: &TextBox) -> TextBox {
        TextBox {
            text: format!("{}{}", self.text, next.text),
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            font_weight: self.font_weight.clone(),
            font_style: self.font_style.clone(),
            direction: self.direction,
            width: None,
            merged: true,
            sources: vec![self.clone(), next.clone()],
            metadata: self.metadata.clone(),
        }
    }

    /// The original, unmerged boxes this box stands for, in logical order.
    /// An unmerged box is its own only leaf.
    pub fn leaves(&self) -> Vec<&TextBox> {
        if self.sources.is_empty() {
            return vec![self];
        }
        self.sources.iter().flat_map(TextBox::leaves).collect()
    }
}

/// A box with a fixed, known width and no text, e.g. an image or a
/// blank of given size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedBox {
    pub width: f64,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

/// Whitespace with a natural width that may be stretched or shrunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glue {
    pub width: f64,
    pub stretch: f64,
    pub shrink: f64,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

/// A potential break point.
///
/// The semantics are defined by `.value`: at or above
/// [`INFINITE_PENALTY`] a break is forbidden, at or below
/// [`MINUS_INFINITE_PENALTY`] a break is mandatory, anything in between
/// is the cost of breaking here.
///
/// The `.flagged` attribute marks breaks of the same kind (typically
/// hyphenation) which should not be taken on many consecutive lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Penalty {
    pub value: f64,
    #[serde(default)]
    pub flagged: bool,
    /// Material set at the end of the line if the break is taken, e.g. a
    /// hyphen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_to_insert: Option<Box<Item>>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Penalty {
    #[inline]
    pub fn is_forced_break(&self) -> bool {
        self.value <= MINUS_INFINITE_PENALTY
    }

    #[inline]
    pub fn is_forbidden_break(&self) -> bool {
        self.value >= INFINITE_PENALTY
    }

    pub fn item_to_insert(&self) -> Option<&Item> {
        self.item_to_insert.as_deref()
    }
}

/// An element of a paragraph's item sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    /// A box holding text, measured by a
    /// [`TextBoxMeasurer`](crate::measure::TextBoxMeasurer).
    Text(TextBox),
    /// A box of known width.
    Box(FixedBox),
    Glue(Glue),
    Penalty(Penalty),
}

impl Item {
    /// Create new glue item.
    pub fn new_glue(width: f64, stretch: f64, shrink: f64) -> Item {
        Item::Glue(Glue {
            width,
            stretch,
            shrink,
            metadata: Metadata::new(),
        })
    }

    pub fn new_fixed_box(width: f64) -> Item {
        Item::Box(FixedBox {
            width,
            metadata: Metadata::new(),
        })
    }

    pub fn new_penalty(value: f64, flagged: bool) -> Item {
        Item::Penalty(Penalty {
            value,
            flagged,
            item_to_insert: None,
            metadata: Metadata::new(),
        })
    }

    /// Create an item which induces a forced break.
    pub fn new_forced_break() -> Item {
        Item::new_penalty(MINUS_INFINITE_PENALTY, false)
    }

    /// Create an item at which breaking is forbidden.
    pub fn new_no_break() -> Item {
        Item::new_penalty(INFINITE_PENALTY, false)
    }

    /// Creates an empty penalty, which is breakable without further costs.
    pub fn new_empty_penalty() -> Item {
        Item::new_penalty(0.0, false)
    }

    /// A flagged penalty that sets `insert` (typically a hyphen) at the end
    /// of the line when the break is taken.
    pub fn new_discretionary(value: f64, insert: Item) -> Item {
        Item::Penalty(Penalty {
            value,
            flagged: true,
            item_to_insert: Some(Box::new(insert)),
            metadata: Metadata::new(),
        })
    }

    /// Text boxes and fixed boxes are boxes.
    #[inline]
    pub fn is_box(&self) -> bool {
        matches!(self, Item::Text(_) | Item::Box(_))
    }

    #[inline]
    pub fn is_glue(&self) -> bool {
        matches!(self, Item::Glue(_))
    }

    #[inline]
    pub fn is_penalty(&self) -> bool {
        matches!(self, Item::Penalty(_))
    }

    #[inline]
    pub fn is_forced_break(&self) -> bool {
        match self {
            Item::Penalty(p) => p.is_forced_break(),
            _ => false,
        }
    }

    #[inline]
    pub fn is_forbidden_break(&self) -> bool {
        match self {
            Item::Penalty(p) => p.is_forbidden_break(),
            _ => false,
        }
    }

    pub fn is_flagged(&self) -> bool {
        match self {
            Item::Penalty(p) => p.flagged,
            _ => false,
        }
    }

    /// Whether the item's width is known. Only text boxes can be unmeasured.
    pub fn is_measured(&self) -> bool {
        match self {
            Item::Text(t) => t.is_measured(),
            _ => true,
        }
    }

    /// The natural width of the item inside a line.
    ///
    /// Penalties take no room; `None` means an unmeasured text box.
    #[inline]
    pub fn width(&self) -> Option<f64> {
        match self {
            Item::Text(t) => t.width,
            Item::Box(b) => Some(b.width),
            Item::Glue(g) => Some(g.width),
            Item::Penalty(_) => Some(0.0),
        }
    }

    #[inline]
    pub fn stretch(&self) -> f64 {
        match self {
            Item::Glue(g) => g.stretch,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn shrink(&self) -> f64 {
        match self {
            Item::Glue(g) => g.shrink,
            _ => 0.0,
        }
    }

    /// The text of a text box, empty for every other item.
    pub fn text(&self) -> &str {
        match self {
            Item::Text(t) => &t.text,
            _ => "",
        }
    }

    pub fn as_text_box(&self) -> Option<&TextBox> {
        match self {
            Item::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_penalty(&self) -> Option<&Penalty> {
        match self {
            Item::Penalty(p) => Some(p),
            _ => None,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            Item::Text(t) => &t.metadata,
            Item::Box(b) => &b.metadata,
            Item::Glue(g) => &g.metadata,
            Item::Penalty(p) => &p.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        match self {
            Item::Text(t) => &mut t.metadata,
            Item::Box(b) => &mut b.metadata,
            Item::Glue(g) => &mut g.metadata,
            Item::Penalty(p) => &mut p.metadata,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Item {
        self.metadata_mut().insert(key.into(), value);
        self
    }

    /// The JSON representation of the item.
    pub fn export(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Rebuilds an item from the value produced by [`Item::export`].
    pub fn from_export(value: serde_json::Value) -> Result<Item, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl From<TextBox> for Item {
    fn from(text_box: TextBox) -> Item {
        Item::Text(text_box)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn word(text: &str) -> TextBox {
        TextBox::new(text, "Serif", 12.0)
    }

    #[test]
    fn penalty_sentinels() {
        assert!(Item::new_forced_break().is_forced_break());
        assert!(!Item::new_forced_break().is_forbidden_break());
        assert!(Item::new_no_break().is_forbidden_break());
        assert!(Item::new_penalty(INFINITE_PENALTY + 1.0, false).is_forbidden_break());
        assert!(!Item::new_empty_penalty().is_forced_break());
        assert!(!Item::new_empty_penalty().is_forbidden_break());
        assert!(!Item::new_glue(1.0, 1.0, 1.0).is_forced_break());
    }

    #[test]
    fn widths() {
        assert_eq!(Item::from(word("a")).width(), None);
        assert_eq!(Item::from(word("a").with_width(3.0)).width(), Some(3.0));
        assert_eq!(Item::new_fixed_box(7.0).width(), Some(7.0));
        assert_eq!(Item::new_glue(5.0, 3.0, 1.0).width(), Some(5.0));
        assert_eq!(Item::new_forced_break().width(), Some(0.0));
        assert_eq!(Item::new_glue(5.0, 3.0, 1.0).stretch(), 3.0);
        assert_eq!(Item::new_glue(5.0, 3.0, 1.0).shrink(), 1.0);
        assert_eq!(Item::new_fixed_box(7.0).stretch(), 0.0);
    }

    #[test]
    fn mergeability_needs_all_five_attributes() {
        let a = word("a");
        assert!(a.is_mergeable_with(&word("b")));
        assert!(!a.is_mergeable_with(&TextBox::new("b", "Sans", 12.0)));
        assert!(!a.is_mergeable_with(&TextBox::new("b", "Serif", 10.0)));
        assert!(!a.is_mergeable_with(&word("b").with_weight("bold")));
        assert!(!a.is_mergeable_with(&word("b").with_style("italic")));
        assert!(!a.is_mergeable_with(&word("b").with_direction(TextDirection::Rtl)));
    }

    #[test]
    fn merge_records_sources_recursively() {
        let ab = word("a").with_width(1.0).merge(&word("b"));
        assert_eq!(ab.text, "ab");
        assert!(ab.merged);
        assert_eq!(ab.width, None);
        assert_eq!(ab.sources.len(), 2);

        let abc = ab.merge(&word("c"));
        assert_eq!(abc.text, "abc");
        assert_eq!(abc.sources.len(), 2);
        assert_eq!(abc.sources[0].sources.len(), 2);
        let leaves: Vec<&str> = abc.leaves().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(leaves, vec!["a", "b", "c"]);
    }

    #[test]
    fn export_and_import() {
        let hyphen = Item::from(word("-"));
        let item = Item::new_discretionary(50.0, hyphen).with_metadata("origin", json!(4));
        let exported = item.export().unwrap();
        assert_eq!(exported["type"], "penalty");
        assert_eq!(exported["itemToInsert"]["text"], "-");
        assert_eq!(exported["metadata"]["origin"], 4);
        assert_eq!(Item::from_export(exported).unwrap(), item);
    }
}
