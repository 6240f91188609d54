use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::markup::{scanner::read_until, Syntax};

pub const MIGAKU: &str = "migaku";
pub const BARE_EMPTY_UNITS: &str = "bare-empty-units";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Flag,
    Value(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    attributes: HashMap<String, SettingValue>,
}

impl Settings {
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.attributes.get(name)
    }

    pub fn set(&mut self, name: &str, value: SettingValue) {
        self.attributes.insert(name.to_owned(), value);
    }

    // 値が空なら無効
    pub fn is_enabled(&self, name: &str) -> bool {
        match self.get(name) {
            Some(SettingValue::Flag) => true,
            Some(SettingValue::Value(value)) => !value.is_empty(),
            None => false,
        }
    }

    pub fn syntax(&self) -> Syntax {
        if self.is_enabled(MIGAKU) {
            Syntax::Tagged
        } else {
            Syntax::Compact
        }
    }

    pub fn bare_empty_units(&self) -> bool {
        self.is_enabled(BARE_EMPTY_UNITS)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

// name[:value](;name[:value])*
pub fn parse_settings(attr: &str) -> Result<Settings> {
    let chars: Vec<char> = attr.chars().collect();
    let mut settings = Settings::default();

    let mut index = 0;
    while index < chars.len() {
        let (stop_index, _, text) = read_until(&chars, index, &[';'])?;
        index = stop_index + 1;

        // "a;;b" や末尾の ';' は無視する
        if text.is_empty() {
            continue;
        }

        let split: Vec<&str> = text.split(':').collect();
        match split[..] {
            [name] => settings.set(name, SettingValue::Flag),
            [name, value] => settings.set(name, SettingValue::Value(value.to_owned())),
            _ => bail!("invalid config attribute: {}", attr),
        }
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_flags() {
        let settings = parse_settings("migaku;bare-empty-units").unwrap();
        assert_eq!(settings.len(), 2);
        assert_eq!(settings.get("migaku"), Some(&SettingValue::Flag));
        assert_eq!(settings.get("bare-empty-units"), Some(&SettingValue::Flag));
        assert_eq!(settings.syntax(), Syntax::Tagged);
        assert!(settings.bare_empty_units());
    }

    #[test]
    fn decodes_values_and_overwrites_duplicates() {
        let settings = parse_settings("size:2;size:3;migaku:").unwrap();
        assert_eq!(
            settings.get("size"),
            Some(&SettingValue::Value("3".to_owned()))
        );
        // 空の値は無効扱い
        assert_eq!(settings.syntax(), Syntax::Compact);
    }

    #[test]
    fn honors_escapes() {
        let settings = parse_settings(r"sep:\;").unwrap();
        assert_eq!(
            settings.get("sep"),
            Some(&SettingValue::Value(";".to_owned()))
        );
    }

    #[test]
    fn rejects_malformed_attributes() {
        assert!(parse_settings("a:b:c").is_err());
        assert!(parse_settings("a\\").is_err());
    }

    #[test]
    fn empty_string_is_default() {
        let settings = parse_settings("").unwrap();
        assert!(settings.is_empty());
        assert_eq!(settings.syntax(), Syntax::Compact);
    }
}
