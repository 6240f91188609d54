use anyhow::{bail, ensure, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

// 全角数字も受け付ける
pub fn parse_number(s: &str) -> Result<usize> {
    ensure!(!s.is_empty(), "not a valid integer: {:?}", s);

    let mut ret: usize = 0;
    for c in s.chars() {
        let zero = match c {
            '0'..='9' => '0',
            '０'..='９' => '０',
            _ => bail!("not a valid integer: {:?}", s),
        } as usize;

        let d = (c as usize) - zero;

        ret = ret
            .checked_mul(10)
            .and_then(|r| r.checked_add(d))
            .with_context(|| format!("integer out of range: {:?}", s))?;
    }
    Ok(ret)
}

// `chars` とバックスラッシュの前にバックスラッシュを入れる
pub fn escape_text(chars: &str, text: &str) -> String {
    let mut ret = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || chars.contains(c) {
            ret.push('\\');
        }
        ret.push(c);
    }
    ret
}

pub fn replace_nbsp(text: &str) -> String {
    static REGEX_NBSP: Lazy<Regex> = Lazy::new(|| Regex::new("&nbsp;|\u{a0}").unwrap());
    REGEX_NBSP.replace_all(text, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ascii_and_fullwidth_digits() {
        assert_eq!(parse_number("12").unwrap(), 12);
        assert_eq!(parse_number("１２").unwrap(), 12);
        assert_eq!(parse_number("0").unwrap(), 0);
    }

    #[test]
    fn rejects_empty_and_non_digits() {
        assert!(parse_number("").is_err());
        assert!(parse_number("1a").is_err());
        assert!(parse_number("-1").is_err());
        assert!(parse_number("99999999999999999999999999").is_err());
    }

    #[test]
    fn escapes_listed_chars_and_backslash() {
        assert_eq!(escape_text("[]", r"a[b]\c"), r"a\[b\]\\c");
        assert_eq!(escape_text("", "かな"), "かな");
    }

    #[test]
    fn replaces_nbsp() {
        assert_eq!(replace_nbsp("a&nbsp;b\u{a0}c"), "a b c");
    }
}
