use anyhow::{bail, ensure, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::{
    markup::{
        accent::Accent,
        scanner::read_until,
        unit::{Segment, Unit},
    },
    utility::str::replace_nbsp,
};

// タグ記法: 空白区切りの `前[読み,基本形;アクセント]後`
pub fn parse_tagged(line: &str) -> Result<Vec<Unit>> {
    let mut parser = Parser::new(&replace_nbsp(line));

    let mut units = Vec::new();
    loop {
        parser.skip_space();
        if parser.is_at_end() {
            break;
        }

        let unit = parser.parse_unit()?;
        trace!(?unit, "parsed unit");
        units.push(unit);
    }

    debug!(units = units.len(), "parsed tagged line");

    Ok(units)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BaseReading,
    Accents,
    Suffix,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(line: &str) -> Self {
        Parser {
            chars: line.chars().collect(),
            pos: 0,
        }
    }

    fn source(&self) -> String {
        self.chars.iter().collect()
    }

    fn is_at_end(&self) -> bool {
        self.chars.len() <= self.pos
    }

    fn skip_space(&mut self) {
        while self.chars.get(self.pos) == Some(&' ') {
            self.pos += 1;
        }
    }

    // HTML タグ `<…>` は停止文字を含んでいてもそのまま読む
    fn read_text(&mut self, stop: &[char]) -> Result<(Option<char>, String)> {
        let mut full_stop = stop.to_vec();
        full_stop.push('<');

        let mut text = String::new();
        loop {
            let (stop_pos, stop_char, part) = read_until(&self.chars, self.pos, &full_stop)?;
            text.push_str(&part);

            if stop_char != Some('<') {
                self.pos = stop_pos + 1;
                return Ok((stop_char, text));
            }

            let (tag_end_pos, tag_end, tag) = read_until(&self.chars, stop_pos, &['>'])?;
            ensure!(tag_end.is_some(), "unclosed HTML tag: {}", tag);
            text.push_str(&tag);
            text.push('>');
            self.pos = tag_end_pos + 1;
        }
    }

    fn parse_unit(&mut self) -> Result<Unit> {
        let (prefix_end, prefix) = self.read_text(&['[', ' '])?;
        // 空白だけの単位は en space で書き出される
        let prefix = prefix.replace('\u{2002}', " ");
        if prefix_end != Some('[') {
            return Ok(Unit::bare(vec![Segment::plain(&prefix)]));
        }

        let (reading_end, prefix_reading) = self.read_text(&[',', ';', ']'])?;
        let mut state = match reading_end {
            Some(',') => State::BaseReading,
            Some(';') => State::Accents,
            Some(']') => State::Suffix,
            _ => bail!("unclosed Migaku tag: {}", self.source()),
        };

        let mut base_reading = String::new();
        if state == State::BaseReading {
            let (base_end, base) = self.read_text(&[';', ']'])?;
            base_reading = base;
            state = match base_end {
                Some(';') => State::Accents,
                Some(']') => State::Suffix,
                _ => bail!("unclosed Migaku tag: {}", self.source()),
            };
        }

        let mut accent_str = String::new();
        let mut uncertain = false;
        let mut marked_yougen = false;
        if state == State::Accents {
            if self.chars.get(self.pos) == Some(&'!') {
                uncertain = true;
                self.pos += 1;
            }
            if self.chars.get(self.pos) == Some(&'Y') {
                marked_yougen = true;
                self.pos += 1;
            }

            let (accents_end_pos, accents_end, accents) =
                read_until(&self.chars, self.pos, &[']'])?;
            ensure!(
                accents_end.is_some(),
                "closing ] missing: {}",
                self.source()
            );
            self.pos = accents_end_pos + 1;
            accent_str = accents;
            state = State::Suffix;
        }

        let mut suffix = String::new();
        if state == State::Suffix {
            let (_, text) = self.read_text(&[' '])?;
            suffix = text;
        }

        let mut segments = vec![Segment::new(&prefix, Some(&prefix_reading))];
        if !suffix.is_empty() {
            segments.push(Segment::plain(&suffix));
        }

        let base_reading = if base_reading.is_empty() {
            None
        } else {
            Some(base_reading)
        };

        let mut unit = Unit {
            segments,
            accents: Vec::new(),
            is_yougen: base_reading.is_some() || marked_yougen,
            uncertain,
            base_reading,
            was_bare: false,
        };

        if !accent_str.is_empty() {
            unit.accents = parse_tagged_accents(&accent_str, unit.mora_count())?;
        }

        Ok(unit)
    }
}

fn parse_tagged_accents(accent_str: &str, moras: usize) -> Result<Vec<Accent>> {
    static REGEX_ACCENT_TAG: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?P<pattern>[A-Za-z])(?P<downstep>\d*)$").unwrap());

    accent_str
        .split(',')
        .map(|tag| -> Result<Accent> {
            let tag = tag.trim();

            // 形が違うものは不明扱い（"?" など）
            let caps = match REGEX_ACCENT_TAG.captures(tag) {
                Some(caps) => caps,
                None => return Ok(Accent::Unknown),
            };
            let downstep = caps.name("downstep").map_or("", |m| m.as_str());

            match caps.name("pattern").map_or("", |m| m.as_str()) {
                "h" => Ok(Accent::Single(0)),
                "a" => Ok(Accent::Single(1)),
                "k" | "n" => {
                    ensure!(!downstep.is_empty(), "missing downstep number: {}", tag);
                    Accent::from_str(downstep, Some(moras))
                }
                "o" => Ok(Accent::Single(moras)),
                _ => bail!("invalid Migaku accent pattern: {}", tag),
            }
        })
        .collect()
}
