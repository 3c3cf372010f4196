//! Helpers over plain item slices.

use crate::error::MeasureError;
use crate::item::Item;
use crate::measure::TextBoxMeasurer;

/// Measures `item` if it is an unmeasured text box, or the unmeasured
/// text box a penalty would insert. Returns whether the measurer was
/// called.
pub fn measure_item<M>(item: &mut Item, measurer: &mut M) -> Result<bool, MeasureError>
where
    M: TextBoxMeasurer + ?Sized,
{
    match item {
        Item::Text(text_box) if !text_box.is_measured() => {
            text_box.width = Some(measurer.text_width(text_box)?);
            Ok(true)
        }
        Item::Penalty(penalty) => match penalty.item_to_insert.as_deref_mut() {
            Some(insert) => measure_item(insert, measurer),
            None => Ok(false),
        },
        _ => Ok(false),
    }
}

/// Measures all unmeasured text boxes in `items`, including the ones
/// penalties would insert. Already measured boxes are left alone.
/// Returns the number of measurer calls.
pub fn measure_text_boxes<M>(items: &mut [Item], measurer: &mut M) -> Result<usize, MeasureError>
where
    M: TextBoxMeasurer + ?Sized,
{
    let mut calls = 0;
    for item in items.iter_mut() {
        if measure_item(item, measurer)? {
            calls += 1;
        }
    }
    Ok(calls)
}

/// The index of the first box in `items[start..=end]`, or `end + 1` if
/// there is none.
pub fn first_box_from(items: &[Item], start: usize, end: usize) -> usize {
    let mut index = start;
    while index <= end && index < items.len() && !items[index].is_box() {
        index += 1;
    }
    index.min(end + 1)
}

/// Sum of the natural widths, `None` if a text box is unmeasured.
pub fn natural_width(items: &[Item]) -> Option<f64> {
    items.iter().map(Item::width).sum()
}

/// Concatenated text of all text boxes, glue rendered as a single space.
pub fn text(items: &[Item]) -> String {
    items
        .iter()
        .map(|item| match item {
            Item::Glue(_) => " ",
            _ => item.text(),
        })
        .collect()
}
