//! Adjustment ratio of a line.

use crate::item::Item;

/// Computes the ratio by which the glue in `items` must stretch (ratio > 0)
/// or shrink (ratio < 0) for the line to be exactly `line_width` wide.
///
/// Returns `None` if the line cannot be fitted at all, i.e. it is too short
/// and has no stretchability, or too long and has no shrinkability. All
/// text boxes must be measured; an unmeasured box also yields `None`.
pub fn horizontal_adjustment_ratio<'a, I>(items: I, line_width: f64) -> Option<f64>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut width = 0.0;
    let mut stretch = 0.0;
    let mut shrink = 0.0;
    for item in items {
        match item.width() {
            Some(w) => width += w,
            None => {
                log::warn!("Adjustment ratio requested for a line with unmeasured items");
                return None;
            }
        }
        stretch += item.stretch();
        shrink += item.shrink();
    }

    if width == line_width {
        Some(0.0)
    } else if width < line_width {
        if stretch <= 0.0 {
            None
        } else {
            Some((line_width - width) / stretch)
        }
    } else if shrink <= 0.0 {
        None
    } else {
        Some((line_width - width) / shrink)
    }
}

/// Width of the item after applying the adjustment ratio.
pub fn adjusted_width(item: &Item, adj_ratio: f64) -> f64 {
    let width = item.width().unwrap_or(0.0);
    if adj_ratio > 0.0 {
        width + adj_ratio * item.stretch()
    } else {
        width + adj_ratio * item.shrink()
    }
}
