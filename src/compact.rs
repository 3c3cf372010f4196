//! Compaction of item arrays.
//!
//! Adjacent text boxes with equal formatting inside one embedding-level run
//! are merged, so that fewer and larger boxes have to be measured and
//! rendered. Merged boxes remember what they were made of (see
//! [`TextBox::sources`](crate::item::TextBox::sources)).

use crate::bidi::{detect_default_direction, level_info, BidiOrderInfo, TextDirection};
use crate::error::Error;
use crate::item::Item;

/// An item array and its order info after compaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompactItemArray {
    pub items: Vec<Item>,
    pub bidi_order_info: Vec<BidiOrderInfo>,
}

/// Merges `item` with `next` if both are mergeable text boxes.
pub fn merge_items(item: &Item, next: &Item) -> Option<Item> {
    match (item, next) {
        (Item::Text(a), Item::Text(b)) if a.is_mergeable_with(b) => Some(Item::Text(a.merge(b))),
        _ => None,
    }
}

/// Greedily merges neighbouring items of a single level run.
pub fn compact_level_run(items: &[Item]) -> Vec<Item> {
    let mut compacted: Vec<Item> = Vec::with_capacity(items.len());
    for item in items {
        if let Some(last) = compacted.last_mut() {
            if let Some(merged) = merge_items(last, item) {
                *last = merged;
                continue;
            }
        }
        compacted.push(item.clone());
    }
    compacted
}

/// Compacts `items` run by run and rebuilds the parallel order info.
///
/// Display order is ascending within runs in the paragraph's base
/// direction and mirrored within the other runs.
pub fn compact_item_array(
    items: &[Item],
    bidi_order_info: &[BidiOrderInfo],
) -> Result<CompactItemArray, Error> {
    if items.len() != bidi_order_info.len() {
        return Err(Error::LengthMismatch {
            items: items.len(),
            bidi: bidi_order_info.len(),
        });
    }
    if items.len() <= 1 {
        return Ok(CompactItemArray {
            items: items.to_vec(),
            bidi_order_info: bidi_order_info.to_vec(),
        });
    }

    let runs = level_info(bidi_order_info);
    let default_direction = detect_default_direction(&runs).unwrap_or(TextDirection::Ltr);
    log::trace!(
        "Compacting {} items in {} runs, base direction {:?}",
        items.len(),
        runs.len(),
        default_direction
    );

    let mut result = CompactItemArray {
        items: Vec::with_capacity(items.len()),
        bidi_order_info: Vec::with_capacity(items.len()),
    };
    for run in &runs {
        let compacted = compact_level_run(&items[run.start..=run.end]);
        let start = result.items.len();
        let end = start + compacted.len() - 1;
        for offset in 0..compacted.len() {
            result.bidi_order_info.push(BidiOrderInfo {
                input_index: start + offset,
                embedding_level: run.level,
                text_direction: run.text_direction,
                display_order: if run.text_direction == default_direction {
                    start + offset
                } else {
                    end - offset
                },
            });
        }
        result.items.extend(compacted);
    }
    log::debug!(
        "Compacted {} items into {}",
        items.len(),
        result.items.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidi::ltr_order_info;
    use crate::item::TextBox;

    fn ltr(text: &str) -> TextBox {
        TextBox::new(text, "Serif", 12.0)
    }

    fn rtl(text: &str) -> TextBox {
        TextBox::new(text, "Serif", 12.0).with_direction(TextDirection::Rtl)
    }

    fn info(index: usize, level: u8) -> BidiOrderInfo {
        BidiOrderInfo {
            input_index: index,
            embedding_level: level,
            text_direction: TextDirection::from_level(level),
            display_order: index,
        }
    }

    #[test]
    fn merges_only_compatible_text_boxes() {
        let items = vec![
            Item::from(ltr("a")),
            Item::from(ltr("b")),
            Item::from(ltr("c").with_style("italic")),
            Item::new_glue(1.0, 1.0, 1.0),
            Item::from(ltr("d")),
            Item::new_fixed_box(3.0),
            Item::new_fixed_box(3.0),
        ];
        let compacted = compact_level_run(&items);
        let texts: Vec<&str> = compacted.iter().map(Item::text).collect();
        assert_eq!(texts, vec!["ab", "c", "", "d", "", ""]);
        assert_eq!(compacted.len(), 6);
    }

    #[test]
    fn merged_item_keeps_sources() {
        let items = vec![
            Item::from(ltr("x")),
            Item::from(ltr("y")),
            Item::from(ltr("z")),
        ];
        let compacted = compact_level_run(&items);
        assert_eq!(compacted.len(), 1);
        let merged = compacted[0].as_text_box().unwrap();
        assert!(merged.merged);
        assert_eq!(merged.text, "xyz");
        let leaves: Vec<&str> = merged.leaves().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(leaves, vec!["x", "y", "z"]);

        let exported = compacted[0].export().unwrap();
        assert_eq!(exported["sources"][0]["sources"][1]["text"], "y");
    }

    #[test]
    fn runs_are_compacted_separately_and_mirrored() {
        let items = vec![
            Item::from(ltr("a")),
            Item::from(ltr("b")),
            Item::new_glue(1.0, 1.0, 1.0),
            Item::from(rtl("X")),
            Item::from(rtl("Y").with_weight("bold")),
            Item::new_glue(1.0, 1.0, 1.0),
            Item::from(ltr("c")),
        ];
        let infos: Vec<BidiOrderInfo> = [0, 0, 0, 1, 1, 0, 0]
            .iter()
            .enumerate()
            .map(|(i, &level)| info(i, level))
            .collect();
        let result = compact_item_array(&items, &infos).unwrap();
        let texts: Vec<&str> = result.items.iter().map(Item::text).collect();
        assert_eq!(texts, vec!["ab", "", "X", "Y", "", "c"]);
        let display: Vec<usize> = result.bidi_order_info.iter().map(|i| i.display_order).collect();
        assert_eq!(display, vec![0, 1, 3, 2, 4, 5]);
        let inputs: Vec<usize> = result.bidi_order_info.iter().map(|i| i.input_index).collect();
        assert_eq!(inputs, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(result.bidi_order_info[2].text_direction, TextDirection::Rtl);
    }

    #[test]
    fn does_not_merge_across_runs() {
        let items = vec![Item::from(ltr("a")), Item::from(ltr("b"))];
        let infos = vec![info(0, 0), info(1, 2)];
        let result = compact_item_array(&items, &infos).unwrap();
        assert_eq!(result.items.len(), 2);
    }

    #[test]
    fn compaction_is_idempotent() {
        let items = vec![
            Item::from(ltr("a")),
            Item::from(ltr("b")),
            Item::new_glue(1.0, 1.0, 1.0),
            Item::from(rtl("X")),
            Item::from(rtl("Y")),
            Item::from(rtl("Z").with_style("italic")),
            Item::new_glue(1.0, 1.0, 1.0),
            Item::from(ltr("c")),
            Item::from(ltr("d")),
        ];
        let infos: Vec<BidiOrderInfo> = [0, 0, 0, 1, 1, 1, 0, 0, 0]
            .iter()
            .enumerate()
            .map(|(i, &level)| info(i, level))
            .collect();
        let once = compact_item_array(&items, &infos).unwrap();
        let twice = compact_item_array(&once.items, &once.bidi_order_info).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn trivial_arrays() {
        let result = compact_item_array(&[], &[]).unwrap();
        assert!(result.items.is_empty());
        let single = vec![Item::from(ltr("a"))];
        let result = compact_item_array(&single, &ltr_order_info(1)).unwrap();
        assert_eq!(result.items, single);
        assert!(matches!(
            compact_item_array(&single, &[]),
            Err(Error::LengthMismatch { items: 1, bidi: 0 })
        ));
    }
}
