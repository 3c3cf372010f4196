use std::error::Error as StdError;
use std::io::BufRead;
use std::time::Instant;

use firstfit::adjustment::adjusted_width;
use firstfit::bidi::{display_order, intrinsic_direction, ltr_order_info, IntrinsicDirection};
use firstfit::linebreak::badness;
use firstfit::*;

const FAMILY: &str = "main";

struct Options {
    line_width: Option<f64>,
    font_name: String,
    font_size: f64,
    hyphenate: bool,
    compact: bool,
    json: bool,
    parameters: Parameters,
}

fn parse_args() -> Result<Options, Box<dyn StdError>> {
    let mut args = std::env::args();
    args.next();

    let mut options = Options {
        line_width: None,
        font_name: "DejaVuSans".to_string(),
        font_size: 32.0,
        hyphenate: true,
        compact: false,
        json: false,
        parameters: Parameters::default(),
    };
    while let Some(arg) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("missing value for {}", arg));
        match arg.as_str() {
            "-w" => options.line_width = Some(value()?.parse()?),
            "-f" => options.font_name = value()?,
            "-s" => options.font_size = value()?.parse()?,
            "-c" => options.parameters = Parameters::from_json(&std::fs::read_to_string(value()?)?)?,
            "-nohyphen" => options.hyphenate = false,
            "-compact" => options.compact = true,
            "-json" => options.json = true,
            other => return Err(format!("unknown argument {}", other).into()),
        }
    }
    Ok(options)
}

#[cfg(feature = "fonts")]
fn measurer(options: &Options) -> Result<Box<dyn TextBoxMeasurer>, Box<dyn StdError>> {
    let mut fonts = firstfit::measure::FontMeasurer::new();
    fonts.load(FAMILY, &options.font_name)?;
    Ok(Box::new(CachedMeasurer::new(fonts)))
}

#[cfg(not(feature = "fonts"))]
fn measurer(options: &Options) -> Result<Box<dyn TextBoxMeasurer>, Box<dyn StdError>> {
    log::info!(
        "Built without fonts, measuring '{}' as monospace",
        options.font_name
    );
    Ok(Box::new(CachedMeasurer::new(MonospaceMeasurer::new(0.6))))
}

/// Turns a line of text into a paragraph: words separated by glue,
/// syllables (split at soft hyphens) separated by hyphenation penalties,
/// and a final forced break.
fn paragraph(
    line: &str,
    options: &Options,
    measurer: &mut dyn TextBoxMeasurer,
) -> Result<Vec<Item>, MeasureError> {
    let text_box = |text: &str| TextBox::new(text, FAMILY, options.font_size);
    let space = measurer.text_width(&text_box(" "))?;

    let mut items = Vec::new();
    for word in line.split(' ').filter(|w| !w.is_empty()) {
        if !items.is_empty() {
            items.push(Item::new_glue(space, space / 2.0, space / 3.0));
        }
        for (i, syllable) in word.split('\u{00ad}').enumerate() {
            if i > 0 && options.hyphenate {
                items.push(Item::new_discretionary(40.0, Item::from(text_box("\u{2010}"))));
            }
            items.push(Item::from(text_box(syllable)));
        }
    }
    items.push(Item::new_forced_break());
    Ok(items)
}

/// Order info for `items`, setting the direction of every text box.
fn bidi_order_info(items: &mut [Item]) -> Vec<BidiOrderInfo> {
    let infos = display_order(&*items, None, |item| match item {
        Item::Text(t) => intrinsic_direction(&t.text),
        _ => IntrinsicDirection::Neutral,
    });
    if infos.is_empty() {
        return ltr_order_info(items.len());
    }
    for (item, info) in items.iter_mut().zip(&infos) {
        if let Item::Text(t) = item {
            t.direction = info.text_direction;
        }
    }
    infos
}

fn print_line(line_no: usize, line: &ItemList, line_width: f64, space: f64) {
    let ratio = line.adjustment_ratio(line_width);
    print!("[n={:<5}]", line_no);
    match ratio {
        Some(r) => print!("[r={:+.2}]", r),
        None => print!("[r=  n/a]"),
    }
    print!("[b={:+.2}] ", badness(ratio, None, 0, &Parameters::default()));
    for item in line.items() {
        match item {
            Item::Glue(_) => {
                let glue_size = adjusted_width(item, ratio.unwrap_or(0.0)) / space;
                let glue_size = (glue_size.round() as usize).max(1);
                print!("{}", " ".repeat(glue_size));
            }
            _ => print!("{}", item.text()),
        }
    }
    println!();
}

fn main() -> Result<(), Box<dyn StdError>> {
    env_logger::init();
    let options = parse_args()?;
    let mut measurer = measurer(&options)?;
    let line_width = options.line_width.unwrap_or(60.0 * options.font_size);
    let breaker = FirstFitLineBreaker::new(options.parameters.clone());
    let space = measurer.text_width(&TextBox::new(" ", FAMILY, options.font_size))?;

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut items = paragraph(&line, &options, measurer.as_mut())?;
        let mut bidi = bidi_order_info(&mut items);
        if options.compact {
            let compacted = compact_item_array(&items, &bidi)?;
            items = compacted.items;
            bidi = compacted.bidi_order_info;
        }

        let now = Instant::now();
        let lines = breaker.try_break_into_lines(&items, line_width, measurer.as_mut(), &bidi)?;
        let elapsed = now.elapsed();

        if options.json {
            let exported = lines
                .iter()
                .map(ItemList::export)
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::Value::Array(exported));
        } else {
            for (line_no, line) in lines.iter().enumerate() {
                print_line(line_no + 1, line, line_width, space);
            }
        }
        log::info!("Layouting {} items took {:?}", items.len(), elapsed);
    }
    Ok(())
}
