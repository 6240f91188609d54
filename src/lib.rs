pub mod kana;
pub mod markup;
pub mod utility;
