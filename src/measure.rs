//! Text measurement.
//!
//! The line breaker never looks at glyphs; it asks a [`TextBoxMeasurer`]
//! for the width of every text box it needs to evaluate. Calls are
//! sequential and blocking from the breaker's point of view.

use std::collections::HashMap;

use crate::bidi::TextDirection;
use crate::error::MeasureError;
use crate::item::TextBox;

/// Supplies font-metrics-backed widths for text boxes.
pub trait TextBoxMeasurer {
    /// The width of `text_box` as rendered with its font attributes.
    fn text_width(&mut self, text_box: &TextBox) -> Result<f64, MeasureError>;
}

impl<M: TextBoxMeasurer + ?Sized> TextBoxMeasurer for &mut M {
    fn text_width(&mut self, text_box: &TextBox) -> Result<f64, MeasureError> {
        (**self).text_width(text_box)
    }
}

impl<M: TextBoxMeasurer + ?Sized> TextBoxMeasurer for Box<M> {
    fn text_width(&mut self, text_box: &TextBox) -> Result<f64, MeasureError> {
        (**self).text_width(text_box)
    }
}

/// Measures every character as `em_advance` times the font size.
#[derive(Debug, Clone)]
pub struct MonospaceMeasurer {
    em_advance: f64,
    calls: usize,
}

impl MonospaceMeasurer {
    pub fn new(em_advance: f64) -> MonospaceMeasurer {
        MonospaceMeasurer {
            em_advance,
            calls: 0,
        }
    }

    /// Number of boxes measured so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl TextBoxMeasurer for MonospaceMeasurer {
    fn text_width(&mut self, text_box: &TextBox) -> Result<f64, MeasureError> {
        self.calls += 1;
        Ok(text_box.text.chars().count() as f64 * self.em_advance * text_box.font_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text: String,
    font_family: String,
    font_size: u64,
    font_weight: String,
    font_style: String,
    direction: TextDirection,
}

impl CacheKey {
    fn new(text_box: &TextBox) -> CacheKey {
        CacheKey {
            text: text_box.text.clone(),
            font_family: text_box.font_family.clone(),
            font_size: text_box.font_size.to_bits(),
            font_weight: text_box.font_weight.clone(),
            font_style: text_box.font_style.clone(),
            direction: text_box.direction,
        }
    }
}

/// Remembers the widths returned by an inner measurer, so that equal
/// boxes are only measured once across paragraphs.
///
/// Entries are never evicted. The cache grows with every distinct box until
/// the caller releases it with [`CachedMeasurer::clear`], e.g. after each
/// document, or by dropping the measurer.
#[derive(Debug)]
pub struct CachedMeasurer<M> {
    inner: M,
    widths: HashMap<CacheKey, f64>,
    hits: usize,
    misses: usize,
}

impl<M: TextBoxMeasurer> CachedMeasurer<M> {
    pub fn new(inner: M) -> CachedMeasurer<M> {
        CachedMeasurer {
            inner,
            widths: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Number of cached widths.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Forgets all cached widths.
    pub fn clear(&mut self) {
        self.widths.clear();
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: TextBoxMeasurer> TextBoxMeasurer for CachedMeasurer<M> {
    fn text_width(&mut self, text_box: &TextBox) -> Result<f64, MeasureError> {
        let key = CacheKey::new(text_box);
        if let Some(width) = self.widths.get(&key) {
            self.hits += 1;
            return Ok(*width);
        }
        let width = self.inner.text_width(text_box)?;
        self.misses += 1;
        self.widths.insert(key, width);
        Ok(width)
    }
}

#[cfg(feature = "fonts")]
pub use self::fonts::FontMeasurer;

#[cfg(feature = "fonts")]
mod fonts {
    use std::collections::HashMap;

    use font_kit::source::SystemSource;
    use skribo::{FontCollection, FontFamily, TextStyle};

    use super::TextBoxMeasurer;
    use crate::error::{Error, MeasureError};
    use crate::item::TextBox;

    /// Measures text boxes with system fonts. Font families used by text
    /// boxes must be registered with [`FontMeasurer::load`] first.
    #[derive(Default)]
    pub struct FontMeasurer {
        collections: HashMap<String, FontCollection>,
    }

    impl FontMeasurer {
        pub fn new() -> FontMeasurer {
            FontMeasurer::default()
        }

        /// Loads the system font `postscript_name` and registers it as
        /// `family`.
        pub fn load(&mut self, family: &str, postscript_name: &str) -> Result<(), Error> {
            let font = SystemSource::new()
                .select_by_postscript_name(postscript_name)
                .map_err(|e| Error::Font(format!("{}: {:?}", postscript_name, e)))?
                .load()
                .map_err(|e| Error::Font(format!("{}: {:?}", postscript_name, e)))?;
            let mut collection = FontCollection::new();
            collection.add_family(FontFamily::new_from_font(font));
            log::debug!("Loaded font {} as family '{}'", postscript_name, family);
            self.collections.insert(family.to_string(), collection);
            Ok(())
        }
    }

    impl TextBoxMeasurer for FontMeasurer {
        fn text_width(&mut self, text_box: &TextBox) -> Result<f64, MeasureError> {
            let collection = self
                .collections
                .get(&text_box.font_family)
                .ok_or_else(|| MeasureError::UnknownFont(text_box.font_family.clone()))?;
            let style = TextStyle {
                size: text_box.font_size as f32,
            };
            let layout = skribo::layout(&style, collection, &text_box.text);
            Ok(layout.advance.x() as f64)
        }
    }
}
