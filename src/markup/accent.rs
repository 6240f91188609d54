use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utility::str::parse_number;

// 複合アクセントの一部分: moras モーラのうち downstep 番目の後で下がる（0 は平板）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccentPart {
    pub downstep: usize,
    pub moras: usize,
}

impl AccentPart {
    pub fn pattern(&self, is_yougen: bool) -> AccentPattern {
        AccentPattern::classify(self.downstep, self.moras, is_yougen)
    }

    // index 番目（0 始まり）のモーラが高いか
    pub fn is_high(&self, index: usize) -> bool {
        match self.downstep {
            0 => index != 0,
            1 => index == 0,
            downstep => index != 0 && index < downstep,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type", content = "value")]
pub enum Accent {
    Unknown,
    Single(usize),
    Compound(Vec<AccentPart>),
}

impl Accent {
    // "?", "2", "1@2-0@3", "1@2-0"
    // mora_count は対象の読みのモーラ数で，@ のない最後の部分の長さはここから求める
    pub fn from_str(token: &str, mora_count: Option<usize>) -> Result<Self> {
        if token == "?" {
            return Ok(Self::Unknown);
        }

        let parts: Vec<&str> = token.split('-').collect();

        if parts.len() == 1 && !token.contains('@') {
            let downstep =
                parse_number(token).with_context(|| format!("invalid accent: {:?}", token))?;
            if let Some(mora_count) = mora_count {
                ensure!(
                    downstep <= mora_count,
                    "downstep {} is past the last mora ({} moras): {:?}",
                    downstep,
                    mora_count,
                    token
                );
            }
            return Ok(Self::Single(downstep));
        }

        let mut resolved = Vec::with_capacity(parts.len());
        let mut span_sum: usize = 0;
        for (i, part) in parts.iter().enumerate() {
            let (downstep, moras) = parse_part(part, token)?;

            let moras = match moras {
                Some(moras) => moras,
                None => {
                    ensure!(
                        i == parts.len() - 1,
                        "only the last part of a compound accent can omit @: {:?}",
                        token
                    );
                    let mora_count = mora_count.with_context(|| {
                        format!("cannot infer the span of the last part: {:?}", token)
                    })?;
                    mora_count.checked_sub(span_sum).with_context(|| {
                        format!(
                            "compound accent spans {} moras but the reading has {}: {:?}",
                            span_sum, mora_count, token
                        )
                    })?
                }
            };

            ensure!(
                downstep <= moras,
                "downstep {} is past the end of its {}-mora span: {:?}",
                downstep,
                moras,
                token
            );

            span_sum = span_sum
                .checked_add(moras)
                .with_context(|| format!("compound accent is too long: {:?}", token))?;
            resolved.push(AccentPart { downstep, moras });
        }

        Ok(Self::Compound(resolved))
    }

    // 不明なら None
    pub fn parts(&self, mora_count: usize) -> Option<Vec<AccentPart>> {
        match self {
            Self::Unknown => None,
            Self::Single(downstep) => Some(vec![AccentPart {
                downstep: *downstep,
                moras: mora_count,
            }]),
            Self::Compound(parts) => Some(parts.clone()),
        }
    }

    pub fn pattern(&self, mora_count: usize, is_yougen: bool) -> Option<AccentPattern> {
        self.parts(mora_count)?
            .first()
            .map(|part| part.pattern(is_yougen))
    }

    // タグ記法での表記 (h, a, o, nN, kN)
    pub fn tagged_code(&self, mora_count: usize, is_yougen: bool) -> Result<String> {
        let code = match self {
            Self::Unknown => "?".to_owned(),
            Self::Single(0) => "h".to_owned(),
            Self::Single(1) => "a".to_owned(),
            Self::Single(downstep) if *downstep == mora_count && !is_yougen => "o".to_owned(),
            Self::Single(downstep) if is_yougen => format!("k{}", downstep),
            Self::Single(downstep) => format!("n{}", downstep),
            Self::Compound(_) => bail!("compound accent has no tagged form: {}", self),
        };
        Ok(code)
    }
}

// "2" or "2@3"
fn parse_part(part: &str, token: &str) -> Result<(usize, Option<usize>)> {
    let split: Vec<&str> = part.split('@').collect();
    let parsed = match split[..] {
        [downstep] => (parse_number(downstep)?, None),
        [downstep, moras] => (parse_number(downstep)?, Some(parse_number(moras)?)),
        _ => bail!("invalid accent tag: {:?}", token),
    };
    Ok(parsed)
}

impl fmt::Display for Accent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "?"),
            Self::Single(downstep) => write!(f, "{}", downstep),
            Self::Compound(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if 0 < i {
                        write!(f, "-")?;
                    }
                    write!(f, "{}@{}", part.downstep, part.moras)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccentPattern {
    Heiban,    // 平板
    Atamadaka, // 頭高
    Nakadaka,  // 中高
    Odaka,     // 尾高
    Kifuku,    // 起伏（用言）
}

impl AccentPattern {
    pub fn classify(downstep: usize, mora_count: usize, is_yougen: bool) -> Self {
        if downstep == 0 {
            Self::Heiban
        } else if is_yougen {
            Self::Kifuku
        } else if downstep == 1 {
            Self::Atamadaka
        } else if downstep == mora_count {
            Self::Odaka
        } else {
            Self::Nakadaka
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unknown_and_single() {
        assert_eq!(Accent::from_str("?", None).unwrap(), Accent::Unknown);
        assert_eq!(Accent::from_str("0", None).unwrap(), Accent::Single(0));
        assert_eq!(Accent::from_str("2", Some(3)).unwrap(), Accent::Single(2));
        assert_eq!(Accent::from_str("3", Some(3)).unwrap(), Accent::Single(3));
    }

    #[test]
    fn rejects_downstep_past_reading() {
        assert!(Accent::from_str("4", Some(3)).is_err());
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = Accent::from_str("x", None).unwrap_err();
        assert!(format!("{:#}", err).contains("\"x\""));
        assert!(Accent::from_str("", None).is_err());
        assert!(Accent::from_str("1@2@3", None).is_err());
        assert!(Accent::from_str("1-", Some(3)).is_err());
    }

    #[test]
    fn parses_compound_with_explicit_spans() {
        assert_eq!(
            Accent::from_str("1@2-0@3", None).unwrap(),
            Accent::Compound(vec![
                AccentPart { downstep: 1, moras: 2 },
                AccentPart { downstep: 0, moras: 3 },
            ])
        );
    }

    #[test]
    fn infers_last_span_from_mora_count() {
        assert_eq!(
            Accent::from_str("1@2-3", Some(6)).unwrap(),
            Accent::Compound(vec![
                AccentPart { downstep: 1, moras: 2 },
                AccentPart { downstep: 3, moras: 4 },
            ])
        );
    }

    #[test]
    fn rejects_invalid_compounds() {
        // @ のない部分が最後以外にある
        assert!(Accent::from_str("1-0@3", Some(5)).is_err());
        // モーラ数が分からない
        assert!(Accent::from_str("1@2-0", None).is_err());
        // 前の部分だけでモーラ数を超える
        assert!(Accent::from_str("1@4-0", Some(3)).is_err());
        // 下がり目が部分の外
        assert!(Accent::from_str("3@2-0@1", None).is_err());
    }

    #[test]
    fn displays_in_markup_form() {
        assert_eq!(Accent::Unknown.to_string(), "?");
        assert_eq!(Accent::Single(2).to_string(), "2");
        assert_eq!(
            Accent::from_str("1@2-0", Some(5)).unwrap().to_string(),
            "1@2-0@3"
        );
    }

    #[test]
    fn classifies_patterns() {
        assert_eq!(AccentPattern::classify(0, 3, false), AccentPattern::Heiban);
        assert_eq!(AccentPattern::classify(1, 3, false), AccentPattern::Atamadaka);
        assert_eq!(AccentPattern::classify(2, 3, false), AccentPattern::Nakadaka);
        assert_eq!(AccentPattern::classify(3, 3, false), AccentPattern::Odaka);
        assert_eq!(AccentPattern::classify(2, 3, true), AccentPattern::Kifuku);
        assert_eq!(Accent::Unknown.pattern(3, false), None);
        assert_eq!(
            Accent::Single(0).pattern(3, true),
            Some(AccentPattern::Heiban)
        );
    }

    #[test]
    fn computes_pitch_heights() {
        let heiban = AccentPart { downstep: 0, moras: 3 };
        assert_eq!(
            (0..3).map(|i| heiban.is_high(i)).collect::<Vec<_>>(),
            vec![false, true, true]
        );

        let nakadaka = AccentPart { downstep: 3, moras: 4 };
        assert_eq!(
            (0..4).map(|i| nakadaka.is_high(i)).collect::<Vec<_>>(),
            vec![false, true, true, false]
        );

        let atamadaka = AccentPart { downstep: 1, moras: 2 };
        assert!(atamadaka.is_high(0));
        assert!(!atamadaka.is_high(1));
    }

    #[test]
    fn renders_tagged_codes() {
        assert_eq!(Accent::Single(0).tagged_code(3, false).unwrap(), "h");
        assert_eq!(Accent::Single(1).tagged_code(3, false).unwrap(), "a");
        assert_eq!(Accent::Single(3).tagged_code(3, false).unwrap(), "o");
        assert_eq!(Accent::Single(2).tagged_code(3, false).unwrap(), "n2");
        assert_eq!(Accent::Single(2).tagged_code(3, true).unwrap(), "k2");
        assert_eq!(Accent::Unknown.tagged_code(3, true).unwrap(), "?");
        assert!(Accent::from_str("1@2-0@1", None)
            .unwrap()
            .tagged_code(3, false)
            .is_err());
    }
}
