// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{HorseRow, Living, Status, split_reading};
use crate::view::ViewPrefs;

pub const CONTRIBUTE_URL: &str = "https://github.com/umrax/umrax.github.io/issues";
pub const CONTRIBUTE_LABEL: &str = "貢獻資料來源";
pub const UNKNOWN_SOURCE_MARKER: &str = "來源不明";
pub const MISSING_SOURCE_LABEL: &str = "未有出處";

/// Columns of the names table, declared in canonical rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnId {
    Index,
    Japanese,
    English,
    Chinese,
    Status,
    Birth,
    Living,
    Voice,
    Source,
    Note,
}

impl ColumnId {
    pub const ALL: [Self; 10] = [
        Self::Index,
        Self::Japanese,
        Self::English,
        Self::Chinese,
        Self::Status,
        Self::Birth,
        Self::Living,
        Self::Voice,
        Self::Source,
        Self::Note,
    ];

    pub const fn rank(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "Index",
            Self::Japanese => "Japanese",
            Self::English => "English",
            Self::Chinese => "Chinese",
            Self::Status => "Status",
            Self::Birth => "Birth",
            Self::Living => "Living",
            Self::Voice => "Voice",
            Self::Source => "Source",
            Self::Note => "Note",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.as_str() == value)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Index => "#",
            Self::Japanese => "日文馬名",
            Self::English => "英文馬名",
            Self::Chinese => "中文馬名",
            Self::Status => "譯名類別",
            Self::Birth => "出生日期",
            Self::Living => "目前狀態",
            Self::Voice => "出演聲優",
            Self::Source => "資料來源",
            Self::Note => "備註",
        }
    }

    pub fn render(self, row: &HorseRow, prefs: &ViewPrefs) -> Content {
        match self {
            Self::Index => Content::text(row.index.to_string()),
            Self::Japanese => Content::text(&row.japanese).with_lang(Lang::Japanese),
            Self::English => Content::text(&row.english).with_lang(Lang::English),
            Self::Chinese => render_chinese(&row.chinese, prefs.show_pronunciation),
            Self::Status => render_status(row.status),
            Self::Birth => Content::text(format_birth(&row.birth)),
            Self::Living => render_living(row.living),
            Self::Voice => render_voice(row.voice.as_deref(), prefs.show_pronunciation),
            Self::Source => render_source(row.source.as_deref()),
            Self::Note => Content::text(row.note.as_deref().unwrap_or_default()),
        }
    }

    /// Ascending order of two rows under this column, without the index tie-break.
    pub fn compare(self, left: &HorseRow, right: &HorseRow, prefs: &ViewPrefs) -> Ordering {
        match self {
            Self::Index => left.index.cmp(&right.index),
            Self::Japanese => left.japanese.cmp(&right.japanese),
            Self::English => left.english.cmp(&right.english),
            Self::Chinese => left.chinese_name().cmp(right.chinese_name()),
            Self::Status => left.status.rank().cmp(&right.status.rank()),
            Self::Birth => {
                if prefs.full_date_sort {
                    left.birth.cmp(&right.birth)
                } else {
                    month_day(&left.birth).cmp(month_day(&right.birth))
                }
            }
            Self::Living => left.living.code().cmp(&right.living.code()),
            Self::Voice => voice_reading(left).cmp(voice_reading(right)),
            Self::Source => optional_text(&left.source).cmp(optional_text(&right.source)),
            Self::Note => optional_text(&left.note).cmp(optional_text(&right.note)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    Japanese,
    English,
    Chinese,
}

impl Lang {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Japanese => "ja",
            Self::English => "en",
            Self::Chinese => "zh-Hant-HK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Bold(String),
    Ruby { base: String, annotation: String },
    Link { text: String, href: String },
}

/// Rendered cell: fragments plus the metadata a front end may surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Content {
    pub lang: Option<Lang>,
    pub tooltip: Option<String>,
    pub fragments: Vec<Fragment>,
}

impl Content {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            return Self::empty();
        }
        Self {
            fragments: vec![Fragment::Text(value)],
            ..Self::default()
        }
    }

    pub fn with_lang(mut self, lang: Lang) -> Self {
        self.lang = Some(lang);
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Flattens the content the way a ruby-unaware reader shows it.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) | Fragment::Bold(text) => out.push_str(text),
                Fragment::Ruby { base, annotation } => {
                    out.push_str(base);
                    out.push('（');
                    out.push_str(annotation);
                    out.push('）');
                }
                Fragment::Link { text, .. } => out.push_str(text),
            }
        }
        out
    }

    pub fn links(&self) -> Vec<&str> {
        self.fragments
            .iter()
            .filter_map(|fragment| match fragment {
                Fragment::Link { href, .. } => Some(href.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn render_chinese(value: &str, show_pronunciation: bool) -> Content {
    if value.is_empty() {
        return Content::empty();
    }
    let (name, reading) = split_reading(value);
    let content = Content {
        lang: Some(Lang::Chinese),
        ..Content::default()
    };
    let Some(reading) = reading.filter(|reading| !reading.is_empty()) else {
        return Content {
            fragments: vec![Fragment::Text(name.to_owned())],
            ..content
        };
    };

    if !show_pronunciation {
        return Content {
            fragments: vec![Fragment::Text(name.to_owned())],
            ..content
        }
        .with_tooltip(reading);
    }

    let mut chars = name.chars();
    let mut fragments = reading
        .split(' ')
        .map(|syllable| Fragment::Ruby {
            base: chars.next().map(String::from).unwrap_or_default(),
            annotation: syllable.to_owned(),
        })
        .collect::<Vec<_>>();
    let rest = chars.as_str();
    if !rest.is_empty() {
        fragments.push(Fragment::Text(rest.to_owned()));
    }
    Content {
        fragments,
        ..content
    }
}

fn render_voice(value: Option<&str>, show_pronunciation: bool) -> Content {
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return Content::empty();
    };
    let (name, reading) = split_reading(value);
    let base = Content::text(name).with_lang(Lang::Japanese);
    match reading.filter(|reading| !reading.is_empty()) {
        Some(reading) if show_pronunciation => Content {
            fragments: vec![Fragment::Ruby {
                base: name.to_owned(),
                annotation: reading.to_owned(),
            }],
            ..base
        },
        Some(reading) => base.with_tooltip(reading),
        None => base,
    }
}

fn render_status(status: Status) -> Content {
    let glyph = status
        .as_str()
        .chars()
        .next()
        .map(String::from)
        .unwrap_or_default();
    Content::text(glyph).with_tooltip(status.tooltip())
}

fn render_living(living: Living) -> Content {
    match living {
        Living::Unknown => Content::empty(),
        Living::Retired => Content::text("健在"),
        Living::Active => Content {
            fragments: vec![Fragment::Bold("現役".to_owned())],
            ..Content::default()
        },
    }
}

fn contribute_fragments(prefix: &str) -> [Fragment; 3] {
    [
        Fragment::Text(format!("{prefix}［")),
        Fragment::Link {
            text: CONTRIBUTE_LABEL.to_owned(),
            href: CONTRIBUTE_URL.to_owned(),
        },
        Fragment::Text("］".to_owned()),
    ]
}

fn render_source(value: Option<&str>) -> Content {
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return Content {
            fragments: contribute_fragments(MISSING_SOURCE_LABEL).into(),
            ..Content::default()
        };
    };

    let (description, link) = split_reading(value);
    let (head, tail) = match description.split_once('，') {
        Some((head, tail)) => (head, Some(tail)),
        None => (description, None),
    };

    let mut fragments = Vec::new();
    match link.filter(|link| !link.is_empty()) {
        Some(href) => fragments.push(Fragment::Link {
            text: head.to_owned(),
            href: href.to_owned(),
        }),
        None => fragments.push(Fragment::Text(head.to_owned())),
    }
    if let Some(tail) = tail {
        fragments.push(Fragment::Text(format!("，{tail}")));
    }
    if head.contains(UNKNOWN_SOURCE_MARKER) {
        fragments.extend(contribute_fragments(""));
    }
    Content {
        fragments,
        ..Content::default()
    }
}

/// `1995-05-02` becomes `1995年5月2日`; missing parts are left as they are.
pub fn format_birth(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(value.len() + 9);
    let mut rest = value;
    for marker in ["年", "月"] {
        let Some(position) = rest.find('-') else {
            break;
        };
        out.push_str(&rest[..position]);
        out.push_str(marker);
        rest = &rest[position + 1..];
        rest = rest.strip_prefix('0').unwrap_or(rest);
    }
    out.push_str(rest);
    out.push('日');
    out
}

fn month_day(birth: &str) -> &str {
    birth.split_once('-').map(|(_, rest)| rest).unwrap_or("")
}

fn voice_reading(row: &HorseRow) -> &str {
    row.voice
        .as_deref()
        .and_then(|voice| split_reading(voice).1)
        .unwrap_or("")
}

fn optional_text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::{CONTRIBUTE_URL, ColumnId, Content, Fragment, Lang, format_birth};
    use crate::ids::HorseIndex;
    use crate::model::{HorseRow, Living, Status};
    use crate::view::ViewPrefs;
    use std::cmp::Ordering;

    fn row(index: i64) -> HorseRow {
        HorseRow {
            index: HorseIndex::new(index),
            japanese: "スペシャルウィーク".to_owned(),
            english: "Special Week".to_owned(),
            chinese: "特別週;dak6 bit6 zau1".to_owned(),
            status: Status::Confirmed,
            birth: "1995-05-02".to_owned(),
            living: Living::Unknown,
            voice: Some("和氣あず未;わけあずみ".to_owned()),
            source: None,
            note: None,
        }
    }

    #[test]
    fn registry_is_in_canonical_rank_order() {
        for (position, column) in ColumnId::ALL.into_iter().enumerate() {
            assert_eq!(column.rank(), position);
            assert_eq!(ColumnId::parse(column.as_str()), Some(column));
        }
        assert_eq!(ColumnId::parse("index"), None);
    }

    #[test]
    fn birth_is_reformatted_without_leading_zeros() {
        assert_eq!(format_birth("1995-05-02"), "1995年5月2日");
        assert_eq!(format_birth("1998-10-20"), "1998年10月20日");
        assert_eq!(format_birth("????-04-01"), "????年4月1日");
        assert_eq!(format_birth(""), "");
    }

    #[test]
    fn chinese_renders_ruby_per_character_when_pronunciation_on() {
        let prefs = ViewPrefs {
            show_pronunciation: true,
            ..ViewPrefs::default()
        };
        let content = ColumnId::Chinese.render(&row(1), &prefs);
        assert_eq!(content.lang, Some(Lang::Chinese));
        assert_eq!(content.tooltip, None);
        assert_eq!(
            content.fragments,
            vec![
                Fragment::Ruby {
                    base: "特".to_owned(),
                    annotation: "dak6".to_owned()
                },
                Fragment::Ruby {
                    base: "別".to_owned(),
                    annotation: "bit6".to_owned()
                },
                Fragment::Ruby {
                    base: "週".to_owned(),
                    annotation: "zau1".to_owned()
                },
            ]
        );
        assert_eq!(content.plain_text(), "特（dak6）別（bit6）週（zau1）");
    }

    #[test]
    fn chinese_uses_tooltip_when_pronunciation_off() {
        let content = ColumnId::Chinese.render(&row(1), &ViewPrefs::default());
        assert_eq!(content.plain_text(), "特別週");
        assert_eq!(content.tooltip.as_deref(), Some("dak6 bit6 zau1"));
    }

    #[test]
    fn empty_chinese_renders_nothing() {
        let mut horse = row(1);
        horse.chinese.clear();
        assert!(ColumnId::Chinese.render(&horse, &ViewPrefs::default()).is_empty());
    }

    #[test]
    fn voice_renders_single_ruby() {
        let prefs = ViewPrefs {
            show_pronunciation: true,
            ..ViewPrefs::default()
        };
        let content = ColumnId::Voice.render(&row(1), &prefs);
        assert_eq!(content.lang, Some(Lang::Japanese));
        assert_eq!(
            content.fragments,
            vec![Fragment::Ruby {
                base: "和氣あず未".to_owned(),
                annotation: "わけあずみ".to_owned()
            }]
        );
    }

    #[test]
    fn status_renders_glyph_with_description_tooltip() {
        let content = ColumnId::Status.render(&row(1), &ViewPrefs::default());
        assert_eq!(content.plain_text(), "C");
        assert_eq!(
            content.tooltip.as_deref(),
            Some("已確認：香港賽馬會網站有該馬匹的譯名")
        );
    }

    #[test]
    fn living_maps_tri_state() {
        let prefs = ViewPrefs::default();
        let mut horse = row(1);
        assert!(ColumnId::Living.render(&horse, &prefs).is_empty());
        horse.living = Living::Retired;
        assert_eq!(ColumnId::Living.render(&horse, &prefs), Content::text("健在"));
        horse.living = Living::Active;
        assert_eq!(
            ColumnId::Living.render(&horse, &prefs).fragments,
            vec![Fragment::Bold("現役".to_owned())]
        );
    }

    #[test]
    fn source_links_head_and_appends_tail() {
        let mut horse = row(1);
        horse.source = Some("香港賽馬會，2021年報道;https://example.org/a".to_owned());
        let content = ColumnId::Source.render(&horse, &ViewPrefs::default());
        assert_eq!(
            content.fragments,
            vec![
                Fragment::Link {
                    text: "香港賽馬會".to_owned(),
                    href: "https://example.org/a".to_owned()
                },
                Fragment::Text("，2021年報道".to_owned()),
            ]
        );
    }

    #[test]
    fn unknown_and_missing_sources_invite_contributions() {
        let mut horse = row(1);
        horse.source = Some("來源不明;https://example.org/b".to_owned());
        let unknown = ColumnId::Source.render(&horse, &ViewPrefs::default());
        assert_eq!(unknown.plain_text(), "來源不明［貢獻資料來源］");
        assert_eq!(unknown.links(), vec!["https://example.org/b", CONTRIBUTE_URL]);

        horse.source = None;
        let missing = ColumnId::Source.render(&horse, &ViewPrefs::default());
        assert_eq!(missing.plain_text(), "未有出處［貢獻資料來源］");
        assert_eq!(missing.links(), vec![CONTRIBUTE_URL]);
    }

    #[test]
    fn birth_compare_switches_between_full_and_month_day() {
        let mut older = row(1);
        older.birth = "1990-12-01".to_owned();
        let mut younger = row(2);
        younger.birth = "1995-03-15".to_owned();

        let full = ViewPrefs::default();
        assert_eq!(
            ColumnId::Birth.compare(&older, &younger, &full),
            Ordering::Less
        );

        let month_day = ViewPrefs {
            full_date_sort: false,
            ..ViewPrefs::default()
        };
        assert_eq!(
            ColumnId::Birth.compare(&older, &younger, &month_day),
            Ordering::Greater
        );
    }

    #[test]
    fn voice_compare_uses_reading_and_treats_missing_as_empty() {
        let mut left = row(1);
        left.voice = None;
        let right = row(2);
        assert_eq!(
            ColumnId::Voice.compare(&left, &right, &ViewPrefs::default()),
            Ordering::Less
        );
    }
}
