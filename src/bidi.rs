//! Display order of bidirectional paragraphs.
//!
//! Items are ordered logically in an item array. [`BidiOrderInfo`] records
//! describe, for every item, its embedding level, the direction it is
//! displayed in and its position in visual order. Runs of equal embedding
//! level are summarised as [`LevelInfo`] values.

use serde::{Deserialize, Serialize};
use unicode_bidi::{bidi_class, BidiClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    /// The embedding level a paragraph in this direction starts with.
    pub fn base_level(self) -> u8 {
        match self {
            TextDirection::Ltr => 0,
            TextDirection::Rtl => 1,
        }
    }

    /// Even levels are left-to-right, odd levels right-to-left.
    pub fn from_level(level: u8) -> TextDirection {
        if level % 2 == 0 {
            TextDirection::Ltr
        } else {
            TextDirection::Rtl
        }
    }
}

/// The direction a piece of text has on its own, before looking at its
/// surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrinsicDirection {
    Ltr,
    Rtl,
    /// Numbers such as `1980` or `1,923.25`; they take the direction of
    /// the run they are in.
    EuropeanNumber,
    /// Whitespace and punctuation.
    Neutral,
}

impl IntrinsicDirection {
    fn strong(self) -> Option<TextDirection> {
        match self {
            IntrinsicDirection::Ltr => Some(TextDirection::Ltr),
            IntrinsicDirection::Rtl => Some(TextDirection::Rtl),
            _ => None,
        }
    }
}

/// Determines the intrinsic direction of `text` from the Unicode bidi
/// classes of its characters: the first strong character decides,
/// otherwise digits make it a number, otherwise it is neutral.
pub fn intrinsic_direction(text: &str) -> IntrinsicDirection {
    let mut has_digits = false;
    for c in text.chars() {
        match bidi_class(c) {
            BidiClass::L => return IntrinsicDirection::Ltr,
            BidiClass::R | BidiClass::AL => return IntrinsicDirection::Rtl,
            BidiClass::EN | BidiClass::AN => has_digits = true,
            _ => (),
        }
    }
    if has_digits {
        IntrinsicDirection::EuropeanNumber
    } else {
        IntrinsicDirection::Neutral
    }
}

/// Order information for one item of an item array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidiOrderInfo {
    /// Index of the item in the item array.
    pub input_index: usize,
    pub embedding_level: u8,
    pub text_direction: TextDirection,
    /// Position of the item in visual order.
    pub display_order: usize,
}

impl BidiOrderInfo {
    /// Order info for a left-to-right paragraph where logical and visual
    /// order coincide.
    pub fn ltr(index: usize) -> BidiOrderInfo {
        BidiOrderInfo {
            input_index: index,
            embedding_level: 0,
            text_direction: TextDirection::Ltr,
            display_order: index,
        }
    }
}

/// A maximal run of items with equal embedding level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub start: usize,
    /// Inclusive.
    pub end: usize,
    pub level: u8,
    pub text_direction: TextDirection,
}

impl LevelInfo {
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }
}

/// Left-to-right order info for `len` items.
pub fn ltr_order_info(len: usize) -> Vec<BidiOrderInfo> {
    (0..len).map(BidiOrderInfo::ltr).collect()
}

/// Splits an order info array into maximal runs of equal embedding level.
/// The direction of each run is taken from its first item.
pub fn level_info(infos: &[BidiOrderInfo]) -> Vec<LevelInfo> {
    let mut runs: Vec<LevelInfo> = Vec::new();
    for (index, info) in infos.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.level == info.embedding_level => run.end = index,
            _ => runs.push(LevelInfo {
                start: index,
                end: index,
                level: info.embedding_level,
                text_direction: info.text_direction,
            }),
        }
    }
    runs
}

/// Detects the base direction of a paragraph from its level runs.
///
/// Embedded runs alternate with runs in the base direction, so the
/// direction with more runs wins; a tie goes to the direction of the first
/// run. Returns `None` for an empty paragraph.
pub fn detect_default_direction(runs: &[LevelInfo]) -> Option<TextDirection> {
    let first = runs.first()?;
    let ltr = runs
        .iter()
        .filter(|run| run.text_direction == TextDirection::Ltr)
        .count();
    let rtl = runs.len() - ltr;
    Some(if ltr > rtl {
        TextDirection::Ltr
    } else if rtl > ltr {
        TextDirection::Rtl
    } else {
        first.text_direction
    })
}

/// Computes the display order of `items`.
///
/// `intrinsic` reports the direction of every item on its own. If
/// `default_direction` is `None`, the direction of the first strong item
/// is used; when there is none, an empty vector is returned.
///
/// Items opposite to the current direction open a new embedding level;
/// neutrals at the end of such a level fall back to the default level.
/// Runs in the default direction keep their order, the others are
/// reversed. The result is parallel to `items`.
pub fn display_order<T, F>(
    items: &[T],
    default_direction: Option<TextDirection>,
    intrinsic: F,
) -> Vec<BidiOrderInfo>
where
    F: Fn(&T) -> IntrinsicDirection,
{
    if items.is_empty() {
        return Vec::new();
    }
    let intrinsics: Vec<IntrinsicDirection> = items.iter().map(&intrinsic).collect();

    let default_direction = match default_direction {
        Some(direction) => direction,
        None => match intrinsics.iter().find_map(|d| d.strong()) {
            Some(direction) => {
                log::debug!("Detected default text direction {:?}", direction);
                direction
            }
            None => {
                log::warn!("Cannot detect text direction of {} items", items.len());
                return Vec::new();
            }
        },
    };
    let default_level = default_direction.base_level();

    // Embedding levels
    let mut current = default_direction;
    let mut infos: Vec<BidiOrderInfo> = intrinsics
        .iter()
        .enumerate()
        .map(|(index, d)| {
            if let Some(strong) = d.strong() {
                current = strong;
            }
            BidiOrderInfo {
                input_index: index,
                embedding_level: current.base_level(),
                text_direction: current,
                display_order: index,
            }
        })
        .collect();

    for run in level_info(&infos) {
        if run.level == default_level {
            continue;
        }
        for i in (run.start..=run.end).rev() {
            if intrinsics[i] != IntrinsicDirection::Neutral {
                break;
            }
            infos[i].embedding_level = default_level;
        }
    }

    let runs = level_info(&infos);
    let mut position = 0;
    for run in &runs {
        let direction = TextDirection::from_level(run.level);
        let reversed = run.level != default_level;
        for i in run.start..=run.end {
            infos[i].text_direction = direction;
            infos[i].display_order = if reversed {
                position + (run.end - i)
            } else {
                position + (i - run.start)
            };
        }
        position += run.len();
    }
    infos
}

/// Input indices in visual order.
pub fn visual_order(infos: &[BidiOrderInfo]) -> Vec<usize> {
    let mut order: Vec<&BidiOrderInfo> = infos.iter().collect();
    order.sort_by_key(|info| info.display_order);
    order.iter().map(|info| info.input_index).collect()
}
