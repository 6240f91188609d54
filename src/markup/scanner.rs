use anyhow::{bail, Result};

// start から，エスケープされていない stop のいずれかの文字の手前まで読む
// 返り値は (停止位置, 停止文字, 読んだ文字列)．末尾まで読んだら (chars.len(), None, _)
// '\' の次の文字は何であってもそのまま読む
pub fn read_until(
    chars: &[char],
    start: usize,
    stop: &[char],
) -> Result<(usize, Option<char>, String)> {
    let mut text = String::new();

    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        if stop.contains(&c) {
            return Ok((i, Some(c), text));
        }

        if c == '\\' {
            i += 1;
            match chars.get(i) {
                Some(&escaped) => text.push(escaped),
                None => bail!("backslash at end of input"),
            }
        } else {
            text.push(c);
        }

        i += 1;
    }

    Ok((chars.len(), None, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn stops_at_first_stop_char() {
        let input = chars("食べ[る|る]");
        let (end, stop, text) = read_until(&input, 0, &['[', '{']).unwrap();
        assert_eq!((end, stop, text.as_str()), (2, Some('['), "食べ"));
    }

    #[test]
    fn reaches_end_without_stop_char() {
        let input = chars("かな");
        let (end, stop, text) = read_until(&input, 0, &[']']).unwrap();
        assert_eq!((end, stop, text.as_str()), (2, None, "かな"));

        let (end, stop, text) = read_until(&input, 5, &[']']).unwrap();
        assert_eq!((end, stop, text.as_str()), (2, None, ""));
    }

    #[test]
    fn escapes_stop_chars_and_backslashes() {
        let input = chars(r"a\[b\\c[d");
        let (end, stop, text) = read_until(&input, 0, &['[']).unwrap();
        assert_eq!((end, stop, text.as_str()), (7, Some('['), r"a[b\c"));
    }

    #[test]
    fn fails_on_trailing_backslash() {
        let input = chars(r"abc\");
        assert!(read_until(&input, 0, &[']']).is_err());
    }
}
