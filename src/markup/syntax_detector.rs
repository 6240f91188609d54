use once_cell::sync::Lazy;
use regex::Regex;

use crate::markup::Syntax;

// 記法を推定する．どちらとも判断できなければ None
pub fn detect_syntax(text: &str) -> Option<Syntax> {
    // エスケープされていない '{'
    static REGEX_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|[^\\])\{").unwrap());
    // エスケープされていない '[…]'
    static REGEX_TAG: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?:^|[^\\])\[((?:[^\]]|\\\])+)\]").unwrap());

    if REGEX_BRACE.is_match(text) {
        return Some(Syntax::Compact);
    }

    if let Some(caps) = REGEX_TAG.captures(text) {
        let content = caps.get(1).map_or("", |m| m.as_str());
        if content.contains('|') || content.contains('=') {
            return Some(Syntax::Compact);
        }
        return Some(Syntax::Tagged);
    }

    let len = text.chars().count();
    let spaces = text.chars().filter(|&c| c == ' ').count();
    if 0 < len && len < spaces * 5 {
        return Some(Syntax::Tagged);
    }

    None
}

// 改行とその前後の空白を半角空白一つにまとめる
pub fn squash_newlines(text: &str) -> String {
    static REGEX_NEWLINE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[^\S\r\n]*[\r\n]+[^\S\r\n]*").unwrap());
    REGEX_NEWLINE.replace_all(text, " ").into_owned()
}

pub fn split_lines(text: &str) -> Vec<&str> {
    static REGEX_BR: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br[\t\n\f\r ]*/?>").unwrap());
    REGEX_BR.split(text).collect()
}
