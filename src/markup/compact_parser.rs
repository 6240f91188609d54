use anyhow::{bail, ensure, Context, Result};
use std::mem;
use tracing::{debug, trace};

use crate::{
    kana::mora_count,
    markup::{
        accent::Accent,
        scanner::read_until,
        unit::{Segment, Unit},
    },
    utility::str::replace_nbsp,
};

enum ParsedSegment {
    // [text|reading]
    Ruby(Segment),
    // [text=base]
    Base { text: String, base: String },
}

// 単位記法: 自由テキストと {…;アクセント} の列
pub fn parse_compact(line: &str) -> Result<Vec<Unit>> {
    let line = replace_nbsp(line);
    let chars: Vec<char> = line.chars().collect();

    let mut units = Vec::new();
    let mut free_segments = Vec::new();

    let mut index = 0;
    while index < chars.len() {
        let (stop_index, stop, text) = read_until(&chars, index, &['[', '{', '}'])?;
        index = stop_index;

        if !text.is_empty() {
            free_segments.push(Segment::plain(&text));
        }

        match stop {
            Some('{') => {
                if !free_segments.is_empty() {
                    units.push(Unit::bare(mem::take(&mut free_segments)));
                }

                let (next_index, unit) = parse_unit(&chars, index)?;
                index = next_index;
                trace!(?unit, "parsed unit");
                units.push(unit);
            }

            Some('[') => {
                let (next_index, segment) = parse_segment(&chars, index)?;
                index = next_index;
                match segment {
                    ParsedSegment::Ruby(segment) => free_segments.push(segment),
                    ParsedSegment::Base { .. } => {
                        bail!("base form segment outside of unit: {}", line)
                    }
                }
            }

            Some(_) => bail!("closing brace outside of unit: {}", line),

            None => {}
        }
    }

    if !free_segments.is_empty() {
        units.push(Unit::bare(free_segments));
    }

    debug!(units = units.len(), "parsed compact line");

    Ok(units)
}

// '[' text ('|' reading | '=' base) ']'
fn parse_segment(chars: &[char], start: usize) -> Result<(usize, ParsedSegment)> {
    let (separator_index, separator, text) = read_until(chars, start + 1, &['|', '='])?;
    let separator = separator.with_context(|| format!("invalid segment: {}", source(chars)))?;

    let (end_index, end, reading) = read_until(chars, separator_index + 1, &[']'])?;
    ensure!(
        end.is_some(),
        "segment is missing closing bracket: {}",
        source(chars)
    );

    let segment = match separator {
        '=' => ParsedSegment::Base {
            text,
            base: reading,
        },
        _ => ParsedSegment::Ruby(Segment::new(&text, Some(&reading))),
    };

    Ok((end_index + 1, segment))
}

// '{' (text | segment)* [';' ['!'] ['Y'] accents ['|' base]] '}'
fn parse_unit(chars: &[char], start: usize) -> Result<(usize, Unit)> {
    let mut segments = Vec::new();
    let mut base_reading = String::new();

    let mut pos = start + 1;
    let mut closed_by = None;
    while pos < chars.len() {
        let (stop_index, stop, text) = read_until(chars, pos, &['[', ';', '}'])?;
        pos = stop_index;

        if !text.is_empty() {
            segments.push(Segment::plain(&text));
            base_reading.push_str(&text);
        }

        match stop {
            Some('[') => {
                let (next_pos, segment) = parse_segment(chars, pos)?;
                pos = next_pos;
                match segment {
                    ParsedSegment::Ruby(segment) => {
                        base_reading.push_str(segment.reading_or_text());
                        segments.push(segment);
                    }
                    ParsedSegment::Base { text, base } => {
                        if !text.is_empty() {
                            segments.push(Segment::plain(&text));
                        }
                        base_reading.push_str(&base);
                    }
                }
            }
            Some(c) => {
                closed_by = Some(c);
                break;
            }
            None => break,
        }
    }
    let closed_by = closed_by.with_context(|| format!("unclosed unit: {}", source(chars)))?;

    ensure!(!segments.is_empty(), "unit has no text: {}", source(chars));

    let mut accent_str = String::new();
    let mut special_base = None;
    let mut uncertain = false;
    let mut is_yougen = false;
    if closed_by == ';' {
        pos += 1;
        if chars.get(pos) == Some(&'!') {
            uncertain = true;
            pos += 1;
        }
        if chars.get(pos) == Some(&'Y') {
            is_yougen = true;
            pos += 1;
        }

        let (end_index, end, accents) = read_until(chars, pos, &['|', '}'])?;
        match end {
            Some('|') => {
                let (unit_end_index, unit_end, base) = read_until(chars, end_index + 1, &['}'])?;
                ensure!(unit_end.is_some(), "unclosed unit: {}", source(chars));
                pos = unit_end_index;
                special_base = Some(base);
            }
            Some(_) => pos = end_index,
            None => bail!("unclosed unit: {}", source(chars)),
        }
        accent_str = accents;
    }

    // 特別な基本形があればそちらを優先する
    let base_reading = special_base.unwrap_or(base_reading);

    let accents = if accent_str.trim().is_empty() {
        Vec::new()
    } else {
        let moras = mora_count(&base_reading);
        accent_str
            .split(',')
            .map(|token| Accent::from_str(token.trim(), Some(moras)))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("invalid accent: {}", source(chars)))?
    };

    let unit = Unit {
        segments,
        accents,
        is_yougen,
        uncertain,
        base_reading: Some(base_reading),
        was_bare: false,
    };

    Ok((pos + 1, unit))
}

fn source(chars: &[char]) -> String {
    chars.iter().collect()
}
