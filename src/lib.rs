//! Paragraph line breaking with a greedy "first fit" algorithm.
//!
//! A paragraph is given as a sequence of [`Item`]s: boxes (text or fixed
//! width material), glue and penalties, together with bidi order
//! information. [`FirstFitLineBreaker`] partitions it into [`ItemList`]
//! lines using a [`TextBoxMeasurer`] for text widths. The
//! [`compact`] module merges compatible text boxes beforehand.

pub mod adjustment;
pub mod bidi;
pub mod compact;
pub mod error;
pub mod item;
pub mod item_array;
pub mod item_list;
pub mod linebreak;
pub mod measure;

pub use crate::bidi::{BidiOrderInfo, LevelInfo, TextDirection};
pub use crate::compact::{compact_item_array, CompactItemArray};
pub use crate::error::{Error, MeasureError};
pub use crate::item::{
    FixedBox, Glue, Item, Metadata, Penalty, TextBox, INFINITE_PENALTY, MINUS_INFINITE_PENALTY,
};
pub use crate::item_list::{ItemList, ListDirection, Origin};
pub use crate::linebreak::{break_into_lines, FirstFitLineBreaker, Parameters};
pub use crate::measure::{CachedMeasurer, MonospaceMeasurer, TextBoxMeasurer};
