// 平仮名・片仮名の判定と変換，モーラ分割
//
// 表はすべて初回使用時に一度だけ構築し，以後変更しない

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// 小書き文字を含む平仮名と片仮名の対応（同じ位置の文字が対応する）
const HIRAGANA: &str = "ぁあぃいぅうぇえぉおかがきぎくぐけげこごさざしじすずせぜそぞただちぢっつづてでとどなにぬねのはばぱひびぴふぶぷへべぺほぼぽまみむめもゃやゅゆょよらりるれろゎわゐゑをんゔゕゖゝゞ";
const KATAKANA: &str = "ァアィイゥウェエォオカガキギクグケゲコゴサザシジスズセゼソゾタダチヂッツヅテデトドナニヌネノハバパヒビピフブプヘベペホボポマミムメモャヤュユョヨラリルレロヮワヰヱヲンヴヵヶヽヾ";

// 長音符と中黒はどちらの文字種にも属する
const SCRIPT_NEUTRAL: &str = "ー・";

static TO_HIRAGANA: Lazy<HashMap<char, char>> =
    Lazy::new(|| KATAKANA.chars().zip(HIRAGANA.chars()).collect());

static TO_KATAKANA: Lazy<HashMap<char, char>> =
    Lazy::new(|| HIRAGANA.chars().zip(KATAKANA.chars()).collect());

static HIRAGANA_SET: Lazy<HashSet<char>> =
    Lazy::new(|| HIRAGANA.chars().chain(SCRIPT_NEUTRAL.chars()).collect());

static KATAKANA_SET: Lazy<HashSet<char>> =
    Lazy::new(|| KATAKANA.chars().chain(SCRIPT_NEUTRAL.chars()).collect());

// イ段
const I_DAN: &str = "キギシジチヂニヒビピミリ";

// (小書き文字, その前に来ると 1 モーラになる文字)
// イ段 + ャュョ はここに含めない
static DIGRAPH_RULES: &[(char, &str)] = &[
    ('ャ', "フヴ"),
    ('ュ', "テデフウヴ"),
    ('ョ', "フヴ"),
    ('ヮ', "クグ"),
    ('ァ', "ツフヴ"),
    ('ィ', "クグスズテツデフイウヴ"),
    ('ゥ', "トドホウ"),
    ('ェ', "イウキギクグシジチツニヒビピフミリヴ"),
    ('ォ', "クグツフウヴ"),
];

static DIGRAPHS: Lazy<HashSet<(char, char)>> = Lazy::new(|| {
    let youon = I_DAN
        .chars()
        .flat_map(|head| "ャュョ".chars().map(move |small| (head, small)));

    DIGRAPH_RULES
        .iter()
        .flat_map(|&(small, heads)| heads.chars().map(move |head| (head, small)))
        .chain(youon)
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Script {
    Hiragana,
    Katakana,
}

pub fn is_hiragana(s: &str) -> bool {
    s.chars().all(|c| HIRAGANA_SET.contains(&c))
}

pub fn is_katakana(s: &str) -> bool {
    s.chars().all(|c| KATAKANA_SET.contains(&c))
}

// 平仮名・片仮名（混在可）のみからなるか
pub fn is_kana(s: &str) -> bool {
    is_katakana(&to_katakana(s))
}

// 長音符・中黒以外の仮名を一つでも含むか
pub fn has_kana(s: &str) -> bool {
    s.chars()
        .any(|c| TO_KATAKANA.contains_key(&c) || TO_HIRAGANA.contains_key(&c))
}

pub fn to_hiragana(s: &str) -> String {
    s.chars()
        .map(|c| *TO_HIRAGANA.get(&c).unwrap_or(&c))
        .collect()
}

pub fn to_katakana(s: &str) -> String {
    s.chars()
        .map(|c| *TO_KATAKANA.get(&c).unwrap_or(&c))
        .collect()
}

pub fn convert(s: &str, script: Script) -> String {
    match script {
        Script::Hiragana => to_hiragana(s),
        Script::Katakana => to_katakana(s),
    }
}

// 平仮名と片仮名の違いを無視して比較する
pub fn kana_equal(first: &str, others: &[&str]) -> bool {
    let first = to_katakana(first);
    others.iter().all(|&other| to_katakana(other) == first)
}

// モーラに分割する
// 小書き文字は DIGRAPHS にある組み合わせのときだけ前の文字とまとめる
// ッ ン ー や仮名以外の文字はそれぞれ 1 モーラ
pub fn split_moras(reading: &str, script: Script) -> Vec<String> {
    let kana: Vec<char> = to_katakana(reading).chars().collect();

    let mut moras = Vec::new();
    let mut kana: &[char] = &kana;
    while !kana.is_empty() {
        let len = match kana.get(1) {
            Some(&next) if DIGRAPHS.contains(&(kana[0], next)) => 2,
            _ => 1,
        };

        let mora: String = kana[..len].iter().collect();
        moras.push(convert(&mora, script));
        kana = &kana[len..];
    }
    moras
}

pub fn mora_count(reading: &str) -> usize {
    split_moras(reading, Script::Katakana).len()
}
