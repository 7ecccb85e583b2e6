// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use umaeki_app::{HorseIndex, HorseRow, Living, Status, TermIndex, TermRow};

pub const NAME_FIELDS: [&str; 10] = [
    "Index", "Japanese", "English", "Chinese", "Status", "Birth", "Living", "Voice", "Source",
    "Note",
];
pub const TERM_FIELDS: [&str; 4] = ["Index", "Japanese", "Chinese", "Note"];

pub const BUNDLED_NAMES: &str = include_str!("../../../data/names.csv");
pub const BUNDLED_TERMS: &str = include_str!("../../../data/terms.csv");
pub const BUNDLED_CHARS: &str = include_str!("../../../data/chars.txt");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    InvalidIndex(String),
    UnknownStatus(String),
    InvalidLiving(String),
    DuplicateIndex(i64),
    FieldCount { expected: usize, found: usize },
    Malformed(String),
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIndex(value) => write!(f, "invalid index {value:?}"),
            Self::UnknownStatus(value) => write!(
                f,
                "unknown status {value:?}; expected one of Unnamed, Temporary, Enquiry, Newspaper, Confirmed"
            ),
            Self::InvalidLiving(value) => {
                write!(f, "invalid living value {value:?}; expected 0, 1, 2 or empty")
            }
            Self::DuplicateIndex(index) => write!(f, "duplicate index {index}"),
            Self::FieldCount { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            Self::Malformed(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for FieldError {}

/// One names.csv row as written; columns are matched by header name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NameRecord {
    index: String,
    japanese: String,
    english: String,
    chinese: String,
    status: String,
    birth: String,
    living: String,
    voice: Option<String>,
    source: Option<String>,
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TermRecord {
    index: String,
    japanese: String,
    chinese: String,
    note: Option<String>,
}

fn check_header(headers: &StringRecord, names: &[&str], origin: &str) -> Result<()> {
    if headers.is_empty() {
        bail!("{origin}: file is empty; expected a header row");
    }
    for name in names {
        if !headers.iter().any(|field| field == *name) {
            bail!(
                "{origin}: line 1: header is missing column `{name}`; expected {}",
                names.join(",")
            );
        }
    }
    Ok(())
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map_or(0, |position| position.line())
}

fn parse_index(value: &str) -> Result<i64, FieldError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| FieldError::InvalidIndex(value.to_owned()))
}

fn decode_horse(record: NameRecord) -> Result<HorseRow, FieldError> {
    let status = Status::parse(record.status.trim())
        .ok_or_else(|| FieldError::UnknownStatus(record.status.clone()))?;
    let living = match record.living.trim() {
        "" => Living::Unknown,
        code => code
            .parse::<i64>()
            .ok()
            .and_then(Living::from_code)
            .ok_or_else(|| FieldError::InvalidLiving(code.to_owned()))?,
    };
    Ok(HorseRow {
        index: HorseIndex::new(parse_index(&record.index)?),
        japanese: record.japanese,
        english: record.english,
        chinese: record.chinese,
        status,
        birth: record.birth.trim().to_owned(),
        living,
        voice: record.voice,
        source: record.source,
        note: record.note,
    })
}

fn decode_term(record: TermRecord) -> Result<TermRow, FieldError> {
    Ok(TermRow {
        index: TermIndex::new(parse_index(&record.index)?),
        japanese: record.japanese,
        chinese: record.chinese,
        note: record.note,
    })
}

fn deserialize_record<R: DeserializeOwned>(
    record: &StringRecord,
    headers: &StringRecord,
) -> Result<R, FieldError> {
    if record.len() != headers.len() {
        return Err(FieldError::FieldCount {
            expected: headers.len(),
            found: record.len(),
        });
    }
    record
        .deserialize(Some(headers))
        .map_err(|error| FieldError::Malformed(error.to_string()))
}

fn decode_all<R: DeserializeOwned, T>(
    input: &str,
    origin: &str,
    names: &[&str],
    decode: impl Fn(R) -> Result<T, FieldError>,
    index_of: impl Fn(&T) -> i64,
) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(input.as_bytes());
    let headers = reader
        .headers()
        .with_context(|| format!("{origin}: read header row"))?
        .clone();
    check_header(&headers, names, origin)?;

    let mut seen = BTreeSet::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("parse {origin}"))?;
        let row = deserialize_record(&record, &headers)
            .and_then(&decode)
            .and_then(|row| {
                let index = index_of(&row);
                if seen.insert(index) {
                    Ok(row)
                } else {
                    Err(FieldError::DuplicateIndex(index))
                }
            })
            .map_err(|error| anyhow!("{origin}: line {}: {error}", record_line(&record)))?;
        rows.push(row);
    }
    debug!(origin, rows = rows.len(), "dataset parsed");
    Ok(rows)
}

pub fn parse_names(input: &str, origin: &str) -> Result<Vec<HorseRow>> {
    decode_all(input, origin, &NAME_FIELDS, decode_horse, |row: &HorseRow| {
        row.index.get()
    })
}

pub fn parse_terms(input: &str, origin: &str) -> Result<Vec<TermRow>> {
    decode_all(input, origin, &TERM_FIELDS, decode_term, |row: &TermRow| {
        row.index.get()
    })
}

fn read_dataset(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| {
        format!(
            "read dataset {}; check [data] paths in your config or pass --data",
            path.display()
        )
    })
}

pub fn load_names(path: &Path) -> Result<Vec<HorseRow>> {
    let input = read_dataset(path)?;
    parse_names(&input, &path.display().to_string())
}

pub fn load_terms(path: &Path) -> Result<Vec<TermRow>> {
    let input = read_dataset(path)?;
    parse_terms(&input, &path.display().to_string())
}

pub fn bundled_names() -> Result<Vec<HorseRow>> {
    parse_names(BUNDLED_NAMES, "bundled names.csv")
}

pub fn bundled_terms() -> Result<Vec<TermRow>> {
    parse_terms(BUNDLED_TERMS, "bundled terms.csv")
}
