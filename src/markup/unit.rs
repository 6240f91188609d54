use serde::{Deserialize, Serialize};

use crate::{
    kana::{kana_equal, mora_count},
    markup::accent::Accent,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Segment {
    text: String,
    reading: Option<String>,
}

impl Segment {
    // 空の読みや本文と同じ仮名の読みは持たない
    pub fn new(text: &str, reading: Option<&str>) -> Self {
        let reading = reading
            .filter(|reading| !reading.is_empty() && !kana_equal(text, &[reading]))
            .map(|reading| reading.to_owned());

        Segment {
            text: text.to_owned(),
            reading,
        }
    }

    pub fn plain(text: &str) -> Self {
        Self::new(text, None)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn reading(&self) -> Option<&str> {
        self.reading.as_deref()
    }

    pub fn reading_or_text(&self) -> &str {
        self.reading().unwrap_or(&self.text)
    }
}

// 単語（または地の文）とそのアクセント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Unit {
    pub segments: Vec<Segment>,
    pub accents: Vec<Accent>,
    pub is_yougen: bool,
    pub uncertain: bool,
    // 用言の場合などに，アクセントの対象となる読み（辞書形）
    pub base_reading: Option<String>,
    pub was_bare: bool,
}

impl Unit {
    pub fn bare(segments: Vec<Segment>) -> Self {
        Unit {
            segments,
            accents: Vec::new(),
            is_yougen: false,
            uncertain: false,
            base_reading: None,
            was_bare: true,
        }
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text()).collect()
    }

    pub fn reading(&self) -> String {
        self.segments.iter().map(|s| s.reading_or_text()).collect()
    }

    // アクセントのモーラを数える読み
    pub fn accent_reading(&self) -> String {
        match &self.base_reading {
            Some(base_reading) => base_reading.clone(),
            None => self.reading(),
        }
    }

    pub fn mora_count(&self) -> usize {
        mora_count(&self.accent_reading())
    }
}
