// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Kana folding for phonetic substring search.

use std::ops::RangeInclusive;

const HIRAGANA: RangeInclusive<char> = '\u{3041}'..='\u{3096}';
const FULLWIDTH_ASCII: RangeInclusive<char> = '\u{FF01}'..='\u{FF5E}';
const HALFWIDTH_KATAKANA: RangeInclusive<char> = '\u{FF61}'..='\u{FF9D}';
const KATAKANA: RangeInclusive<char> = '\u{3099}'..='\u{30FF}';

const HIRAGANA_TO_KATAKANA: u32 = 0x60;
const FULLWIDTH_TO_ASCII: u32 = 0xFEE0;

const HALFWIDTH_VOICED_MARK: char = '\u{FF9E}';
const HALFWIDTH_SEMI_VOICED_MARK: char = '\u{FF9F}';
const COMBINING_VOICED_MARK: char = '\u{3099}';
const COMBINING_SEMI_VOICED_MARK: char = '\u{309A}';

// U+FF61..=U+FF9D in order.
const HALFWIDTH_TABLE: &str = "。「」、・ヲァィゥェォャュョッーアイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワン";

pub fn is_katakana(ch: char) -> bool {
    KATAKANA.contains(&ch)
}

/// Folds one character: hiragana to katakana, fullwidth ASCII to ASCII,
/// halfwidth katakana to fullwidth katakana.
fn fold_char(ch: char) -> char {
    if HIRAGANA.contains(&ch) {
        return shift(ch, HIRAGANA_TO_KATAKANA, true);
    }
    if FULLWIDTH_ASCII.contains(&ch) {
        return shift(ch, FULLWIDTH_TO_ASCII, false);
    }
    if HALFWIDTH_KATAKANA.contains(&ch) {
        let offset = (ch as u32 - *HALFWIDTH_KATAKANA.start() as u32) as usize;
        return HALFWIDTH_TABLE.chars().nth(offset).unwrap_or(ch);
    }
    match ch {
        HALFWIDTH_VOICED_MARK => COMBINING_VOICED_MARK,
        HALFWIDTH_SEMI_VOICED_MARK => COMBINING_SEMI_VOICED_MARK,
        other => other,
    }
}

fn shift(ch: char, delta: u32, up: bool) -> char {
    let code = if up {
        ch as u32 + delta
    } else {
        ch as u32 - delta
    };
    char::from_u32(code).unwrap_or(ch)
}

/// Composes a katakana base with a following combining sound mark when a
/// precomposed form exists.
fn compose(base: char, mark: char) -> Option<char> {
    let code = base as u32;
    let voiced_pair = |start: u32, end: u32| (start..=end).contains(&code) && (code - start) % 2 == 0;
    match mark {
        COMBINING_VOICED_MARK => {
            if base == 'ウ' {
                Some('ヴ')
            } else if voiced_pair(0x30AB, 0x30C1) || voiced_pair(0x30C6, 0x30C8) {
                // カ..チ and テ..ト sit before their voiced forms.
                char::from_u32(code + 1)
            } else if base == 'ツ' {
                Some('ヅ')
            } else if (0x30CF..=0x30DB).contains(&code) && (code - 0x30CF) % 3 == 0 {
                char::from_u32(code + 1)
            } else {
                None
            }
        }
        COMBINING_SEMI_VOICED_MARK => {
            if (0x30CF..=0x30DB).contains(&code) && (code - 0x30CF) % 3 == 0 {
                char::from_u32(code + 2)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Kana-folds and lowercases `value` without stripping anything.
pub fn fold(value: &str) -> String {
    let mut out: Vec<char> = Vec::with_capacity(value.len());
    for ch in value.chars().map(fold_char) {
        if let Some(last) = out.last_mut()
            && let Some(composed) = compose(*last, ch)
        {
            *last = composed;
            continue;
        }
        out.push(ch);
    }
    out.into_iter().collect::<String>().to_lowercase()
}

/// Normalizes a search query. A query containing any katakana keeps only its
/// katakana characters.
pub fn normalize_query(query: &str) -> String {
    let folded = fold(query);
    if folded.chars().any(is_katakana) {
        folded.chars().filter(|ch| is_katakana(*ch)).collect()
    } else {
        folded
    }
}

#[cfg(test)]
mod tests {
    use super::{fold, normalize_query};

    #[test]
    fn hiragana_folds_to_katakana() {
        assert_eq!(normalize_query("しんぼり"), "シンボリ");
    }

    #[test]
    fn halfwidth_katakana_becomes_fullwidth() {
        assert_eq!(normalize_query("ｼﾝ"), "シン");
        assert_eq!(normalize_query("ｼﾝﾎﾞﾘ"), "シンボリ");
        assert_eq!(normalize_query("ﾊﾟｰﾏｰ"), "パーマー");
        assert_eq!(normalize_query("ｳﾞｨ"), "ヴィ");
    }

    #[test]
    fn fullwidth_ascii_folds_and_lowercases() {
        assert_eq!(normalize_query("ＳＰＥＣＩＡＬ"), "special");
        assert_eq!(normalize_query("Week"), "week");
    }

    #[test]
    fn mixed_query_degrades_to_kana_only() {
        assert_eq!(normalize_query("ｼﾝ ボリ rudolf"), "シンボリ");
        assert_eq!(normalize_query("特別しゅう"), "シュウ");
    }

    #[test]
    fn chinese_text_passes_through() {
        assert_eq!(normalize_query("特別週"), "特別週");
        assert_eq!(normalize_query(""), "");
    }

    #[test]
    fn fold_keeps_non_kana_text() {
        assert_eq!(fold("ゴールドシップ Gold"), "ゴールドシップ gold");
    }
}
