// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use umaeki_app::{HorseIndex, HorseRow, Living, Status, TermIndex, TermRow};

const KANA_SYLLABLES: [&str; 24] = [
    "シン", "ボリ", "スズ", "カ", "ゴー", "ルド", "トウ", "カイ", "テイ", "オー", "キタ", "サン",
    "ウオ", "ッカ", "マル", "ゼン", "スキー", "ダイ", "ワ", "メジロ", "ライ", "アン", "ミホ", "ノ",
];
const ENGLISH_WORDS: [&str; 16] = [
    "Symboli", "Gold", "Silence", "Special", "Tokai", "Kitasan", "Mejiro", "Daiwa", "Rice",
    "Shower", "Black", "Ship", "Week", "Teio", "Ryan", "Bourbon",
];
const CHINESE_SYLLABLES: [(&str, &str); 12] = [
    ("特", "dak6"),
    ("別", "bit6"),
    ("週", "zau1"),
    ("黃", "wong4"),
    ("金", "gam1"),
    ("船", "syun4"),
    ("東", "dung1"),
    ("海", "hoi2"),
    ("帝", "dai3"),
    ("王", "wong4"),
    ("北", "bak1"),
    ("山", "saan1"),
];
const VOICES: [&str; 6] = [
    "和氣あず未;わけあずみ",
    "高野麻里佳;こうのまりか",
    "Machico;まちこ",
    "上田瞳;うえだひとみ",
    "大橋彩香;おおはしあやか",
    "Lynn;りん",
];
const SOURCES: [&str; 4] = [
    "香港賽馬會，馬匹資料;https://racing.hkjc.com/",
    "《星島日報》，報道",
    "來源不明",
    "香港賽馬會查詢回覆",
];

pub const NAMES_HEADER: &str = "Index,Japanese,English,Chinese,Status,Birth,Living,Voice,Source,Note";
pub const TERMS_HEADER: &str = "Index,Japanese,Chinese,Note";

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of plausible horse rows.
#[derive(Debug, Clone)]
pub struct HorseFaker {
    rng: DeterministicRng,
    next_index: i64,
}

impl HorseFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_index: 1,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn horse(&mut self) -> HorseRow {
        let index = self.next_index;
        self.next_index += 1;

        let japanese = (0..2 + self.int_n(2))
            .map(|_| self.pick(&KANA_SYLLABLES))
            .collect::<String>();
        let english = format!(
            "{} {}",
            self.pick(&ENGLISH_WORDS),
            self.pick(&ENGLISH_WORDS)
        );
        let syllables = (0..2 + self.int_n(3))
            .map(|_| CHINESE_SYLLABLES[self.int_n(CHINESE_SYLLABLES.len())])
            .collect::<Vec<_>>();
        let name = syllables.iter().map(|(ch, _)| *ch).collect::<String>();
        let chinese = if self.rng.bool() {
            let reading = syllables
                .iter()
                .map(|(_, reading)| *reading)
                .collect::<Vec<_>>()
                .join(" ");
            format!("{name};{reading}")
        } else {
            name
        };

        let year = if self.int_n(8) == 0 {
            "????".to_owned()
        } else {
            (1970 + self.int_n(50)).to_string()
        };
        let birth = format!("{year}-{:02}-{:02}", 1 + self.int_n(12), 1 + self.int_n(28));

        HorseRow {
            index: HorseIndex::new(index),
            japanese,
            english,
            chinese,
            status: Status::ALL[self.int_n(Status::ALL.len())],
            birth,
            living: [Living::Unknown, Living::Retired, Living::Active][self.int_n(3)],
            voice: self
                .rng
                .bool()
                .then(|| self.pick(&VOICES).to_owned()),
            source: self
                .rng
                .bool()
                .then(|| self.pick(&SOURCES).to_owned()),
            note: (self.int_n(4) == 0).then(|| "備註".to_owned()),
        }
    }

    pub fn horses(&mut self, count: usize) -> Vec<HorseRow> {
        (0..count).map(|_| self.horse()).collect()
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.int_n(values.len())]
    }
}

/// A small fixed table with known names, useful for filter and sort checks.
pub fn sample_horses() -> Vec<HorseRow> {
    vec![
        sample(
            1,
            "スペシャルウィーク",
            "Special Week",
            "特別週;dak6 bit6 zau1",
            Status::Confirmed,
            "1995-05-02",
        ),
        sample(
            2,
            "サイレンススズカ",
            "Silence Suzuka",
            "無聲鈴鹿",
            Status::Newspaper,
            "1994-05-01",
        ),
        sample(
            3,
            "トウカイテイオー",
            "Tokai Teio",
            "東海帝王",
            Status::Confirmed,
            "1988-04-20",
        ),
        sample(
            4,
            "シンボリルドルフ",
            "Symboli Rudolf",
            "魯道夫象徵",
            Status::Enquiry,
            "1981-03-13",
        ),
        sample(
            5,
            "しんざん",
            "Shinzan",
            "新山",
            Status::Unnamed,
            "1961-05-02",
        ),
    ]
}

fn sample(
    index: i64,
    japanese: &str,
    english: &str,
    chinese: &str,
    status: Status,
    birth: &str,
) -> HorseRow {
    HorseRow {
        index: HorseIndex::new(index),
        japanese: japanese.to_owned(),
        english: english.to_owned(),
        chinese: chinese.to_owned(),
        status,
        birth: birth.to_owned(),
        living: Living::Unknown,
        voice: None,
        source: None,
        note: None,
    }
}

pub fn sample_terms() -> Vec<TermRow> {
    [("芝", "草地", None), ("ダート", "泥地", None), ("逃げ", "領放", Some("跑法"))]
        .into_iter()
        .enumerate()
        .map(|(position, (japanese, chinese, note))| TermRow {
            index: TermIndex::new(position as i64 + 1),
            japanese: japanese.to_owned(),
            chinese: chinese.to_owned(),
            note: note.map(str::to_owned),
        })
        .collect()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|error| anyhow!("flush csv fixture: {}", error.error()))?;
    String::from_utf8(bytes).context("csv fixture is not utf-8")
}

pub fn names_csv(rows: &[HorseRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(NAMES_HEADER.split(','))?;
    for row in rows {
        writer.write_record([
            row.index.to_string().as_str(),
            row.japanese.as_str(),
            row.english.as_str(),
            row.chinese.as_str(),
            row.status.as_str(),
            row.birth.as_str(),
            row.living.code().to_string().as_str(),
            row.voice.as_deref().unwrap_or_default(),
            row.source.as_deref().unwrap_or_default(),
            row.note.as_deref().unwrap_or_default(),
        ])?;
    }
    finish(writer)
}

pub fn terms_csv(rows: &[TermRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TERMS_HEADER.split(','))?;
    for row in rows {
        writer.write_record([
            row.index.to_string().as_str(),
            row.japanese.as_str(),
            row.chinese.as_str(),
            row.note.as_deref().unwrap_or_default(),
        ])?;
    }
    finish(writer)
}

pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("write fixture {}", path.display()))?;
    Ok(path)
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("umaeki.db");
    Ok((dir, db_path))
}
