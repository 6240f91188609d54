// 日本語の単語・読み・アクセントを記述する記法の解析
//
// 2 種類の記法がある：
// - 単位記法 (compact): 自由テキストと `{[食|た]べる;2}` のような単位
// - タグ記法 (tagged): 空白区切りの `食[た,たべる;k2]べる`（Migaku 形式）
//
// どちらも 1 行ずつ独立に解析し，1 行の中で一つでも誤りがあれば行全体を失敗とする

pub mod accent;
pub mod compact_parser;
pub mod formatter;
pub mod scanner;
pub mod settings_parser;
pub mod syntax_detector;
pub mod tagged_parser;
pub mod unit;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::markup::{
    compact_parser::parse_compact, settings_parser::Settings, syntax_detector::split_lines,
    tagged_parser::parse_tagged, unit::Unit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Syntax {
    Compact,
    Tagged,
}

impl Syntax {
    pub fn parse(&self, line: &str) -> Result<Vec<Unit>> {
        match self {
            Syntax::Compact => parse_compact(line),
            Syntax::Tagged => parse_tagged(line),
        }
    }
}

pub fn parse_line(line: &str, settings: &Settings) -> Result<Vec<Unit>> {
    settings.syntax().parse(line)
}

// <br> で区切った行ごとに解析する
pub fn parse_lines(text: &str, settings: &Settings) -> Vec<Result<Vec<Unit>>> {
    split_lines(text)
        .into_iter()
        .map(|line| parse_line(line, settings))
        .collect()
}
