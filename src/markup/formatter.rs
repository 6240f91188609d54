use anyhow::Result;

use crate::{
    kana::is_kana,
    markup::unit::{Segment, Unit},
    utility::str::escape_text,
};

// 単位記法で書き出す
pub fn format_compact(units: &[Unit]) -> String {
    units.iter().map(format_compact_unit).collect()
}

fn format_compact_segment(segment: &Segment) -> String {
    match segment.reading() {
        Some(reading) => format!(
            "[{}|{}]",
            escape_text("|=]", segment.text()),
            escape_text("]", reading)
        ),
        None => escape_text("{[;}", segment.text()),
    }
}

fn format_compact_unit(unit: &Unit) -> String {
    let segments: String = unit.segments.iter().map(format_compact_segment).collect();
    if unit.was_bare && unit.accents.is_empty() {
        return segments;
    }

    let reading = unit.reading();
    let special_base = unit
        .base_reading
        .as_deref()
        .filter(|&base_reading| base_reading != reading);

    let mut ret = format!("{{{}", segments);
    if !unit.accents.is_empty() || unit.uncertain || unit.is_yougen || special_base.is_some() {
        ret.push(';');
        if unit.uncertain {
            ret.push('!');
        }
        if unit.is_yougen {
            ret.push('Y');
        }

        let accents: Vec<String> = unit.accents.iter().map(|a| a.to_string()).collect();
        ret.push_str(&accents.join(","));

        if let Some(special_base) = special_base {
            ret.push('|');
            ret.push_str(&escape_text("}", special_base));
        }
    }
    ret.push('}');

    ret
}

// タグ記法で書き出す（単位は空白区切り）
// 空白と '<' は区切りや HTML タグと読まれないようエスケープする
pub fn format_tagged(units: &[Unit]) -> Result<String> {
    let units = units
        .iter()
        .map(format_tagged_unit)
        .collect::<Result<Vec<_>>>()?;
    Ok(units.join(" "))
}

fn format_tagged_unit(unit: &Unit) -> Result<String> {
    let segments = &unit.segments;

    // 空白だけの単位は区切りと区別するため en space にする
    if let [segment] = &segments[..] {
        let text = segment.text();
        if !text.is_empty() && text.chars().all(char::is_whitespace) {
            return Ok(text.replace(' ', "\u{2002}"));
        }
    }

    let mut tag = String::new();
    if !unit.accents.is_empty() {
        let mut flags = String::new();
        if unit.uncertain {
            flags.push('!');
        }
        match &unit.base_reading {
            Some(base_reading) if unit.is_yougen => {
                tag.push(',');
                tag.push_str(&escape_text(";]<", base_reading));
            }
            _ if unit.is_yougen => flags.push('Y'),
            _ => {}
        }

        let moras = unit.mora_count();
        let codes = unit
            .accents
            .iter()
            .map(|accent| accent.tagged_code(moras, unit.is_yougen))
            .collect::<Result<Vec<_>>>()?;

        tag.push(';');
        tag.push_str(&flags);
        tag.push_str(&codes.join(","));
    }

    let (head, suffix) = match &segments[..] {
        [segment] if is_kana(segment.text()) || segment.reading().is_none() => {
            return Ok(with_tag(&escape_text("[ <", segment.text()), "", &tag, ""));
        }
        [head @ .., last] if !head.is_empty() && is_kana(last.text()) => {
            (head, escape_text(" <", last.text()))
        }
        _ => (&segments[..], String::new()),
    };

    let text: String = head.iter().map(|s| s.text()).collect();
    let reading: String = head.iter().map(|s| s.reading_or_text()).collect();

    Ok(with_tag(
        &escape_text("[ <", &text),
        &escape_text(",;]<", &reading),
        &tag,
        &suffix,
    ))
}

fn with_tag(text: &str, reading: &str, tag: &str, suffix: &str) -> String {
    if reading.is_empty() && tag.is_empty() {
        format!("{}{}", text, suffix)
    } else {
        format!("{}[{}{}]{}", text, reading, tag, suffix)
    }
}
