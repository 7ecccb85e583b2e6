// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::*;

/// Translation provenance, ordered from least to most confident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Unnamed,
    Temporary,
    Enquiry,
    Newspaper,
    Confirmed,
}

impl Status {
    pub const ALL: [Self; 5] = [
        Self::Unnamed,
        Self::Temporary,
        Self::Enquiry,
        Self::Newspaper,
        Self::Confirmed,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unnamed => "Unnamed",
            Self::Temporary => "Temporary",
            Self::Enquiry => "Enquiry",
            Self::Newspaper => "Newspaper",
            Self::Confirmed => "Confirmed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Unnamed" => Some(Self::Unnamed),
            "Temporary" => Some(Self::Temporary),
            "Enquiry" => Some(Self::Enquiry),
            "Newspaper" => Some(Self::Newspaper),
            "Confirmed" => Some(Self::Confirmed),
            _ => None,
        }
    }

    pub const fn rank(self) -> usize {
        self as usize
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Unnamed => {
                "未命名：該馬匹未有已被命名的證據，此處顯示的名稱為網絡上的通稱或根據香港賽馬會馬匹命名規範構擬的馬名；"
            }
            Self::Temporary => {
                "來源請求：該馬匹有線索顯示已被命名，但缺乏來源或來源可信度不足，需要加入來源；"
            }
            Self::Enquiry => "查詢：該名稱為向香港賽馬會進行查詢的回答；",
            Self::Newspaper => "報紙：有資料顯示該馬匹已被命名，且該來源為指定報章之一；",
            Self::Confirmed => "已確認：香港賽馬會網站有該馬匹的譯名。",
        }
    }

    /// Description with its trailing clause separator removed.
    pub fn tooltip(self) -> &'static str {
        let text = self.description();
        match text.char_indices().last() {
            Some((index, _)) => &text[..index],
            None => text,
        }
    }
}

/// Whether the horse is still around, as far as the dataset knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Living {
    Unknown,
    Retired,
    Active,
}

impl Living {
    pub const fn code(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Retired => 1,
            Self::Active => 2,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            1 => Some(Self::Retired),
            2 => Some(Self::Active),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorseRow {
    pub index: HorseIndex,
    pub japanese: String,
    pub english: String,
    /// `name` or `name;reading`, readings are space separated, one per character.
    pub chinese: String,
    pub status: Status,
    pub birth: String,
    pub living: Living,
    pub voice: Option<String>,
    pub source: Option<String>,
    pub note: Option<String>,
}

impl HorseRow {
    pub fn chinese_name(&self) -> &str {
        split_reading(&self.chinese).0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRow {
    pub index: TermIndex,
    pub japanese: String,
    pub chinese: String,
    pub note: Option<String>,
}

/// Splits `text;reading` at the first separator.
pub fn split_reading(value: &str) -> (&str, Option<&str>) {
    match value.split_once(';') {
        Some((text, reading)) => (text, Some(reading)),
        None => (value, None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    Names,
    Terms,
    Chars,
}

impl Section {
    pub const ALL: [Self; 3] = [Self::Names, Self::Terms, Self::Chars];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Names => "馬名",
            Self::Terms => "術語",
            Self::Chars => "新字",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Names => "馬名翻譯",
            Self::Terms => "術語對照",
            Self::Chars => "新字提案",
        }
    }

    pub const fn fragment(self) -> &'static str {
        match self {
            Self::Names => "#names",
            Self::Terms => "#terms",
            Self::Chars => "#chars",
        }
    }

    /// Accepts `names` as well as `#names`.
    pub fn from_fragment(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let name = trimmed.strip_prefix('#').unwrap_or(trimmed);
        Self::ALL
            .into_iter()
            .find(|section| &section.fragment()[1..] == name)
    }

    pub fn from_fragment_or_first(value: &str) -> Self {
        Self::from_fragment(value).unwrap_or(Self::ALL[0])
    }
}
