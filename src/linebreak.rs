//! This module provides a greedy "first fit" line breaker.
//!
//! The breaker scans a paragraph once, from left to right. Every glue
//! after a box and every finite penalty is a tentative breakpoint whose
//! badness is evaluated as if the line ended there. As soon as the badness
//! starts to increase, the best tentative breakpoint seen so far is
//! committed and the scan continues with the next line. There is no
//! backtracking: the result is a local, not a global, optimum.
//!
//! Beginners should use the 'simple' function [break_into_lines].

use serde::{Deserialize, Serialize};

use crate::adjustment::horizontal_adjustment_ratio;
use crate::bidi::BidiOrderInfo;
use crate::error::{Error, MeasureError};
use crate::item::{Item, Penalty};
use crate::item_array::{first_box_from, measure_item, measure_text_boxes};
use crate::item_list::{ItemList, Origin};
use crate::measure::TextBoxMeasurer;

/// Badness of a line that cannot be fitted. A finite number, so that
/// badness values stay totally ordered.
pub const INFINITE_BADNESS: f64 = 100_000_000.0;

/// Added, once per flagged break in a row plus one, to the badness of
/// breaking at a flagged penalty.
pub const FLAG_PENALTY: f64 = 3000.0;

/// Line-breaking parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parameters {
    pub infinite_badness: f64,
    pub flag_penalty: f64,
}

impl Default for Parameters {
    fn default() -> Parameters {
        Parameters {
            infinite_badness: INFINITE_BADNESS,
            flag_penalty: FLAG_PENALTY,
        }
    }
}

impl Parameters {
    /// Reads parameters from a JSON object; missing keys keep their
    /// default values.
    pub fn from_json(json: &str) -> Result<Parameters, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Badness of a line with adjustment ratio `adj_ratio`, ending at
/// `penalty` if given.
///
/// # Rules
///
/// * No ratio, or a ratio below -1 (shrinking past the maximum), is
///   infinitely bad.
/// * Otherwise the badness is `100 * |ratio|^3`, capped at infinite badness.
/// * A penalty adds its value, and if it is flagged another
///   `(flags_in_a_row + 1) * flag_penalty`. Infinite badness stays infinite,
///   but the sum is not capped: a fitting line with a large penalty can be
///   worse than a line that does not fit at all.
pub fn badness(
    adj_ratio: Option<f64>,
    penalty: Option<&Penalty>,
    flags_in_a_row: usize,
    parameters: &Parameters,
) -> f64 {
    let ratio = match adj_ratio {
        Some(ratio) if ratio >= -1.0 => ratio,
        _ => return parameters.infinite_badness,
    };
    let badness = 100.0 * ratio.abs().powi(3);
    if badness >= parameters.infinite_badness {
        return parameters.infinite_badness;
    }
    let penalty_value = match penalty {
        Some(p) if p.flagged => p.value + (flags_in_a_row + 1) as f64 * parameters.flag_penalty,
        Some(p) => p.value,
        None => 0.0,
    };
    badness + penalty_value
}

/// Badness of breaking after `line`, optionally at `penalty`.
///
/// Works on copies: unmeasured text boxes of `line` and the item the
/// penalty would insert are measured before the adjustment ratio is
/// computed.
pub fn horizontal_badness<M>(
    line: &[Item],
    line_width: f64,
    measurer: &mut M,
    penalty: Option<&Penalty>,
    flags_in_a_row: usize,
    parameters: &Parameters,
) -> Result<f64, MeasureError>
where
    M: TextBoxMeasurer + ?Sized,
{
    let mut items = line.to_vec();
    measure_text_boxes(&mut items, measurer)?;
    let mut penalty = penalty.cloned();
    if let Some(insert) = penalty.as_mut().and_then(|p| p.item_to_insert.as_deref_mut()) {
        measure_item(insert, measurer)?;
    }
    Ok(measured_badness(
        &items,
        penalty.as_ref(),
        flags_in_a_row,
        line_width,
        parameters,
    ))
}

/// Badness of a line of measured items ending at `penalty`, including the
/// item the penalty inserts.
fn measured_badness<'a, I>(
    line: I,
    penalty: Option<&'a Penalty>,
    flags_in_a_row: usize,
    line_width: f64,
    parameters: &Parameters,
) -> f64
where
    I: IntoIterator<Item = &'a Item>,
{
    let inserted = penalty.and_then(Penalty::item_to_insert);
    let ratio = horizontal_adjustment_ratio(line.into_iter().chain(inserted), line_width);
    badness(ratio, penalty, flags_in_a_row, parameters)
}

/// Gets one line per breakpoint from `items`.
///
/// A line runs from the item after the previous breakpoint to the
/// breakpoint, without leading glue and penalties. The breakpoint itself
/// is consumed unless it is a box (which only happens for the end of a
/// paragraph that has no final penalty); a penalty taken as a break
/// contributes its item to insert. Lines never contain penalties.
pub fn lines_from_break_points(items: &[Item], break_points: &[usize]) -> Vec<ItemList> {
    let mut lines = Vec::with_capacity(break_points.len());
    let mut start = 0;
    for &break_index in break_points {
        if break_index >= items.len() || break_index < start {
            log::warn!("Ignoring out of order breakpoint {}", break_index);
            continue;
        }
        let mut line = ItemList::horizontal();
        let first = first_box_from(items, start, break_index);
        for (index, item) in items.iter().enumerate().take(break_index).skip(first) {
            line.push_with_origin(item.clone(), Origin::Input(index));
        }
        match &items[break_index] {
            Item::Penalty(penalty) => {
                if let Some(insert) = penalty.item_to_insert() {
                    line.push_with_origin(insert.clone(), Origin::Inserted(break_index));
                }
            }
            item if item.is_box() => {
                line.push_with_origin(item.clone(), Origin::Input(break_index))
            }
            _ => (),
        }
        line.retain(|item| !item.is_penalty());
        lines.push(line);
        start = break_index + 1;
    }
    lines
}

/// Increases or resets `flags_in_a_row` after a break at `item`.
fn updated_flags_in_a_row(item: &Item, flags_in_a_row: usize) -> usize {
    match item {
        Item::Penalty(penalty) if penalty.flagged => flags_in_a_row + 1,
        Item::Penalty(_) => flags_in_a_row,
        _ => 0,
    }
}

/// The items of a line started at `break_point` and scanned up to
/// `current`, without the leading non-box items.
fn initialize_line(items: &[Item], break_point: usize, current: usize) -> Vec<usize> {
    (first_box_from(items, break_point, current)..=current).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Candidate {
    Glue,
    Penalty,
}

/// The first-fit line breaker.
#[derive(Debug, Clone, Default)]
pub struct FirstFitLineBreaker {
    parameters: Parameters,
}

impl FirstFitLineBreaker {
    pub fn new(parameters: Parameters) -> FirstFitLineBreaker {
        FirstFitLineBreaker { parameters }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Breaks `items` into lines of width `line_width`.
    ///
    /// `bidi_order_info` must be parallel to `items`. On any error,
    /// including a length mismatch, the error is logged and no lines are
    /// returned.
    pub fn break_into_lines<M>(
        &self,
        items: &[Item],
        line_width: f64,
        measurer: &mut M,
        bidi_order_info: &[BidiOrderInfo],
    ) -> Vec<ItemList>
    where
        M: TextBoxMeasurer + ?Sized,
    {
        match self.try_break_into_lines(items, line_width, measurer, bidi_order_info) {
            Ok(lines) => lines,
            Err(e) => {
                log::error!("Cannot break paragraph into lines: {}", e);
                Vec::new()
            }
        }
    }

    /// Like [`FirstFitLineBreaker::break_into_lines`], but reports errors.
    ///
    /// The items of the produced lines are measured; their origins refer
    /// to indices into `items`, which is not modified.
    pub fn try_break_into_lines<M>(
        &self,
        items: &[Item],
        line_width: f64,
        measurer: &mut M,
        bidi_order_info: &[BidiOrderInfo],
    ) -> Result<Vec<ItemList>, Error>
    where
        M: TextBoxMeasurer + ?Sized,
    {
        if items.len() != bidi_order_info.len() {
            return Err(Error::LengthMismatch {
                items: items.len(),
                bidi: bidi_order_info.len(),
            });
        }
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut measured = items.to_vec();
        let mut break_points = self.scan(&mut measured, line_width, measurer)?;
        let last = items.len() - 1;
        if break_points.last() != Some(&last) {
            break_points.push(last);
        }
        log::debug!("Break points: {:?}", break_points);

        let mut lines = lines_from_break_points(&measured, &break_points);
        for (line_no, line) in lines.iter_mut().enumerate() {
            measure_text_boxes(line.items_mut(), measurer)?;
            match (line.natural_width(), line.adjustment_ratio(line_width)) {
                (Some(width), ratio) if width > line_width && ratio.map_or(true, |r| r < -1.0) => {
                    log::warn!(
                        "Line {} is overfull: {} > {} ('{}')",
                        line_no,
                        width,
                        line_width,
                        line.text()
                    );
                }
                (_, ratio) => log::trace!("Line {}: ratio {:?}", line_no, ratio),
            }
        }
        Ok(lines)
    }

    /// Determines the breakpoints of `items` without building lines.
    ///
    /// The last item is not added as a breakpoint unless the scan chose it.
    pub fn break_points<M>(
        &self,
        items: &[Item],
        line_width: f64,
        measurer: &mut M,
    ) -> Result<Vec<usize>, MeasureError>
    where
        M: TextBoxMeasurer + ?Sized,
    {
        let mut measured = items.to_vec();
        self.scan(&mut measured, line_width, measurer)
    }

    /// The scan proper. Text boxes in `items` are measured in place as
    /// they become part of a tentative line, so no box is measured twice.
    fn scan<M>(
        &self,
        items: &mut [Item],
        line_width: f64,
        measurer: &mut M,
    ) -> Result<Vec<usize>, MeasureError>
    where
        M: TextBoxMeasurer + ?Sized,
    {
        log::debug!(
            "Getting break points of a paragraph with {} items",
            items.len()
        );
        let infinite = self.parameters.infinite_badness;
        let mut breaks = Vec::new();
        let mut current_badness = infinite;
        let mut current_line: Vec<usize> = Vec::new();
        let mut best_break_point: Option<usize> = None;
        let mut flags_in_a_row = 0;

        for i in 0..items.len() {
            let candidate = match &items[i] {
                Item::Text(_) | Item::Box(_) => {
                    current_line.push(i);
                    continue;
                }
                Item::Penalty(penalty) if penalty.is_forced_break() => {
                    log::trace!("Forced break at {}", i);
                    breaks.push(i);
                    flags_in_a_row = 0;
                    current_line.clear();
                    current_badness = infinite;
                    best_break_point = None;
                    continue;
                }
                Item::Penalty(penalty) => {
                    if current_line.is_empty() || penalty.is_forbidden_break() {
                        continue;
                    }
                    Candidate::Penalty
                }
                Item::Glue(_) => {
                    if i > 0 && items[i - 1].is_box() {
                        Candidate::Glue
                    } else {
                        if !current_line.is_empty() {
                            current_line.push(i);
                        }
                        continue;
                    }
                }
            };

            let badness = self.line_badness(
                items,
                &current_line,
                (candidate == Candidate::Penalty).then_some(i),
                flags_in_a_row,
                line_width,
                measurer,
            )?;
            log::trace!("Badness breaking at {} is {}", i, badness);

            match best_break_point {
                Some(best) if badness > current_badness => {
                    // Passed a local minimum: commit the best break so far.
                    log::debug!(
                        "Badness {} at {} exceeds {}, breaking at {}",
                        badness,
                        i,
                        current_badness,
                        best
                    );
                    breaks.push(best);
                    flags_in_a_row = updated_flags_in_a_row(&items[best], flags_in_a_row);
                    current_line = initialize_line(items, best, i);
                    current_badness = infinite;
                    best_break_point = None;
                }
                _ => {
                    // Ties go to the later candidate.
                    best_break_point = Some(i);
                    current_badness = badness;
                    if candidate == Candidate::Glue {
                        current_line.push(i);
                    }
                }
            }
        }
        Ok(breaks)
    }

    /// Badness of ending the line made of `line` (indices into `items`),
    /// at the penalty at index `penalty_index` if given.
    fn line_badness<M>(
        &self,
        items: &mut [Item],
        line: &[usize],
        penalty_index: Option<usize>,
        flags_in_a_row: usize,
        line_width: f64,
        measurer: &mut M,
    ) -> Result<f64, MeasureError>
    where
        M: TextBoxMeasurer + ?Sized,
    {
        for &index in line {
            if items[index].is_box() {
                measure_item(&mut items[index], measurer)?;
            }
        }
        if let Some(index) = penalty_index {
            measure_item(&mut items[index], measurer)?;
        }

        let items = &*items;
        let penalty = penalty_index.and_then(|index| items[index].as_penalty());
        Ok(measured_badness(
            line.iter().map(|&index| &items[index]),
            penalty,
            flags_in_a_row,
            line_width,
            &self.parameters,
        ))
    }
}

/// Breaks `items` into lines of width `line_width` with default
/// parameters. See [`FirstFitLineBreaker::break_into_lines`].
pub fn break_into_lines<M>(
    items: &[Item],
    line_width: f64,
    measurer: &mut M,
    bidi_order_info: &[BidiOrderInfo],
) -> Vec<ItemList>
where
    M: TextBoxMeasurer + ?Sized,
{
    FirstFitLineBreaker::default().break_into_lines(items, line_width, measurer, bidi_order_info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidi::ltr_order_info;
    use crate::item::TextBox;
    use crate::measure::MonospaceMeasurer;

    // 5 units per character
    fn measurer() -> MonospaceMeasurer {
        MonospaceMeasurer::new(0.5)
    }

    fn word(text: &str) -> Item {
        Item::from(TextBox::new(text, "Mono", 10.0))
    }

    fn space() -> Item {
        Item::new_glue(5.0, 3.0, 1.0)
    }

    fn words(n: usize) -> Vec<Item> {
        let mut items = Vec::new();
        for i in 0..n {
            if i > 0 {
                items.push(space());
            }
            items.push(word("aa"));
        }
        items.push(Item::new_forced_break());
        items
    }

    fn penalty(value: f64, flagged: bool) -> Penalty {
        match Item::new_penalty(value, flagged) {
            Item::Penalty(p) => p,
            _ => unreachable!(),
        }
    }

    #[test]
    fn badness_rules() {
        let p = Parameters::default();
        assert_eq!(badness(Some(0.0), None, 0, &p), 0.0);
        assert_eq!(badness(Some(1.0), None, 0, &p), 100.0);
        assert_eq!(badness(Some(-1.0), None, 0, &p), 100.0);
        assert_eq!(badness(Some(-1.01), None, 0, &p), INFINITE_BADNESS);
        assert_eq!(badness(None, None, 0, &p), INFINITE_BADNESS);
        assert_eq!(badness(Some(1000.0), None, 0, &p), INFINITE_BADNESS);
        assert_eq!(badness(Some(1.0), Some(&penalty(50.0, false)), 7, &p), 150.0);
        assert_eq!(badness(None, Some(&penalty(50.0, true)), 0, &p), INFINITE_BADNESS);
    }

    #[test]
    fn penalty_is_added_beyond_infinite_badness() {
        let p = Parameters {
            infinite_badness: 1000.0,
            ..Parameters::default()
        };
        assert_eq!(badness(Some(0.0), Some(&penalty(5000.0, false)), 0, &p), 5000.0);
        assert_eq!(badness(Some(-2.0), Some(&penalty(5000.0, false)), 0, &p), 1000.0);
    }

    #[test]
    fn flagged_penalty_grows_linearly() {
        let p = Parameters::default();
        let flagged = penalty(50.0, true);
        let b: Vec<f64> = (0..3).map(|flags| badness(Some(0.0), Some(&flagged), flags, &p)).collect();
        assert_eq!(b, vec![3050.0, 6050.0, 9050.0]);
        assert!(b[2] > b[0]);
        assert_eq!(b[1] - b[0], b[2] - b[1]);
    }

    #[test]
    fn horizontal_badness_counts_inserted_item() {
        let p = Parameters::default();
        let line = vec![word("aaaa")];
        let hyphen = match Item::new_discretionary(0.0, word("-")) {
            Item::Penalty(p) => p,
            _ => unreachable!(),
        };
        let mut m = measurer();
        // 20 + 5 == 25, exact fit
        let b = horizontal_badness(&line, 25.0, &mut m, Some(&hyphen), 0, &p).unwrap();
        assert_eq!(b, FLAG_PENALTY);
        let b = horizontal_badness(&line, 20.0, &mut m, None, 0, &p).unwrap();
        assert_eq!(b, 0.0);
    }

    #[test]
    fn parameters_from_json() {
        let p = Parameters::from_json(r#"{ "flagPenalty": 500 }"#).unwrap();
        assert_eq!(p.flag_penalty, 500.0);
        assert_eq!(p.infinite_badness, INFINITE_BADNESS);
        assert!(Parameters::from_json("[").is_err());
    }

    #[test]
    fn three_words_per_line() {
        let items = words(6);
        let breaker = FirstFitLineBreaker::default();
        let mut m = measurer();
        assert_eq!(breaker.break_points(&items, 45.0, &mut m).unwrap(), vec![5, 11]);

        let mut m = measurer();
        let lines = breaker.break_into_lines(&items, 45.0, &mut m, &ltr_order_info(items.len()));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "aa aa aa");
        assert_eq!(lines[1].text(), "aa aa aa");
        assert_eq!(lines[1].origins()[0], Origin::Input(6));
        assert_eq!(lines[0].natural_width(), Some(40.0));
        // every word measured exactly once
        assert_eq!(m.calls(), 6);
    }

    #[test]
    fn ties_prefer_the_later_break() {
        let items = vec![
            Item::new_fixed_box(10.0),
            Item::new_glue(0.0, 1.0, 0.0),
            Item::new_empty_penalty(),
            Item::new_empty_penalty(),
            Item::new_fixed_box(100.0),
            Item::new_glue(0.0, 1.0, 0.0),
            Item::new_forced_break(),
        ];
        let breaker = FirstFitLineBreaker::default();
        assert_eq!(
            breaker.break_points(&items, 20.0, &mut measurer()).unwrap(),
            vec![3, 6]
        );
    }

    // Material for the flag tests: at width 20 every 20 wide box fills a
    // line exactly, and glue of zero width can neither stretch nor shrink.
    fn block() -> Item {
        Item::new_fixed_box(20.0)
    }

    fn rigid_glue() -> Item {
        Item::new_glue(0.0, 0.0, 0.0)
    }

    fn flagged() -> Item {
        Item::new_penalty(0.0, true)
    }

    // Beats a flagged break after one flagged break in a row, loses to it
    // after none.
    fn alternative() -> Item {
        Item::new_penalty(1.5 * FLAG_PENALTY, false)
    }

    #[test]
    fn flags_accumulate_over_committed_breaks() {
        let items = vec![
            block(),
            flagged(),
            block(),
            rigid_glue(),
            flagged(),
            alternative(),
            block(),
            rigid_glue(),
            flagged(),
            alternative(),
            block(),
            rigid_glue(),
            Item::new_forced_break(),
        ];
        let breaker = FirstFitLineBreaker::default();
        // The first flagged break raises the count, so the second flagged
        // penalty costs 2 * FLAG_PENALTY and loses. Breaking at the
        // unflagged alternative keeps the count, so the third one loses too.
        assert_eq!(
            breaker.break_points(&items, 20.0, &mut measurer()).unwrap(),
            vec![1, 5, 9, 12]
        );
    }

    #[test]
    fn glue_break_resets_flags() {
        let items = vec![
            block(),
            flagged(),
            block(),
            rigid_glue(),
            Item::new_fixed_box(0.0),
            rigid_glue(),
            block(),
            rigid_glue(),
            flagged(),
            alternative(),
            block(),
            Item::new_forced_break(),
        ];
        let breaker = FirstFitLineBreaker::default();
        assert_eq!(
            breaker.break_points(&items, 20.0, &mut measurer()).unwrap(),
            vec![1, 5, 8, 11]
        );
    }

    #[test]
    fn forced_break_resets_flags() {
        let items = vec![
            block(),
            flagged(),
            block(),
            rigid_glue(),
            Item::new_forced_break(),
            block(),
            flagged(),
            alternative(),
            block(),
            Item::new_forced_break(),
        ];
        let breaker = FirstFitLineBreaker::default();
        assert_eq!(
            breaker.break_points(&items, 20.0, &mut measurer()).unwrap(),
            vec![1, 4, 6, 9]
        );
    }

    #[test]
    fn hyphenation_inserts_item() {
        let items = vec![
            word("aaaa"),
            Item::new_discretionary(50.0, word("-")),
            word("bb"),
            space(),
            word("cc"),
            Item::new_forced_break(),
        ];
        let lines = break_into_lines(&items, 25.0, &mut measurer(), &ltr_order_info(items.len()));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "aaaa-");
        assert_eq!(lines[0].origins(), &[Origin::Input(0), Origin::Inserted(1)]);
        assert_eq!(lines[0].natural_width(), Some(25.0));
        assert_eq!(lines[1].text(), "bb cc");
    }

    #[test]
    fn lines_from_break_points_skips_leading_glue() {
        let items = vec![
            word("a"),
            space(),
            Item::new_empty_penalty(),
            space(),
            word("b"),
            Item::new_forced_break(),
        ];
        let lines = lines_from_break_points(&items, &[1, 5]);
        assert_eq!(lines[0].origins(), &[Origin::Input(0)]);
        assert_eq!(lines[1].origins(), &[Origin::Input(4)]);
    }

    #[test]
    fn mismatched_lengths() {
        let items = words(2);
        let breaker = FirstFitLineBreaker::default();
        let result = breaker.try_break_into_lines(&items, 100.0, &mut measurer(), &ltr_order_info(1));
        assert!(matches!(result, Err(Error::LengthMismatch { items: 4, bidi: 1 })));
        assert!(breaker
            .break_into_lines(&items, 100.0, &mut measurer(), &[])
            .is_empty());
    }

    #[test]
    fn empty_paragraph() {
        assert!(break_into_lines(&[], 100.0, &mut measurer(), &[]).is_empty());
    }
}
