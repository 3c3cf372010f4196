//! Item lists: a paragraph or one line of it, with item provenance.

use serde::{Deserialize, Serialize};

use crate::adjustment;
use crate::item::Item;
use crate::item_array;

/// Layout direction of an item list. Only horizontal lists are produced by
/// the line breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// Where an item of a produced line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Origin {
    /// The item at this index of the input item array.
    Input(usize),
    /// The item inserted by the penalty at this index of the input, taken
    /// as a break.
    Inserted(usize),
    /// Not related to any input item.
    Detached,
}

/// An ordered list of items: a paragraph or one line of it.
///
/// Every item carries an [`Origin`] in a side table kept parallel to the
/// items.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemList {
    direction: ListDirection,
    items: Vec<Item>,
    origins: Vec<Origin>,
}

impl ItemList {
    pub fn new(direction: ListDirection) -> ItemList {
        ItemList {
            direction,
            items: Vec::new(),
            origins: Vec::new(),
        }
    }

    pub fn horizontal() -> ItemList {
        ItemList::new(ListDirection::Horizontal)
    }

    /// A horizontal list holding `items`, all of them detached.
    pub fn from_items(items: Vec<Item>) -> ItemList {
        let origins = vec![Origin::Detached; items.len()];
        ItemList {
            direction: ListDirection::Horizontal,
            items,
            origins,
        }
    }

    pub fn direction(&self) -> ListDirection {
        self.direction
    }

    pub fn push(&mut self, item: Item) {
        self.push_with_origin(item, Origin::Detached);
    }

    pub fn push_with_origin(&mut self, item: Item, origin: Origin) {
        self.items.push(item);
        self.origins.push(origin);
    }

    /// Keeps only the items for which `f` returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Item) -> bool,
    {
        let mut origins = self.origins.iter();
        let (items, kept): (Vec<Item>, Vec<Origin>) = self
            .items
            .drain(..)
            .filter_map(|item| {
                let origin = origins.next().copied().unwrap_or(Origin::Detached);
                if f(&item) {
                    Some((item, origin))
                } else {
                    None
                }
            })
            .unzip();
        self.items = items;
        self.origins = kept;
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    pub fn origins(&self) -> &[Origin] {
        &self.origins
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Item, Origin)> {
        self.items.iter().zip(self.origins.iter().copied())
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the natural widths, or `None` if a text box is unmeasured.
    pub fn natural_width(&self) -> Option<f64> {
        item_array::natural_width(&self.items)
    }

    /// The ratio by which the glue of this line has to be stretched
    /// (positive) or shrunk (negative) to fill `line_width`.
    pub fn adjustment_ratio(&self, line_width: f64) -> Option<f64> {
        adjustment::horizontal_adjustment_ratio(&self.items, line_width)
    }

    /// The text of the line, glue rendered as a single space.
    pub fn text(&self) -> String {
        item_array::text(&self.items)
    }

    pub fn export(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
