// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::columns::{ColumnId, Content};
use crate::ids::HorseIndex;
use crate::kana;
use crate::model::HorseRow;
use crate::view::ViewPrefs;

const SORT_ASCENDING_MARK: &str = " ↑";
const SORT_DESCENDING_MARK: &str = " ↓";

/// A normalized search query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameFilter {
    query: String,
}

impl NameFilter {
    pub fn new(search: &str) -> Self {
        Self {
            query: kana::normalize_query(search),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    pub fn matches(&self, row: &HorseRow) -> bool {
        if self.query.is_empty() {
            return true;
        }
        kana::fold(&row.japanese).contains(&self.query)
            || row.english.to_lowercase().contains(&self.query)
            || row.chinese_name().contains(&self.query)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRowProjection {
    pub index: HorseIndex,
    pub cells: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProjection {
    pub columns: Vec<ColumnId>,
    pub rows: Vec<TableRowProjection>,
    /// Rows in the dataset before filtering.
    pub total: usize,
}

impl TableProjection {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Content> {
        self.rows.get(row)?.cells.get(column)
    }

    pub fn position_of(&self, index: HorseIndex) -> Option<usize> {
        self.rows.iter().position(|row| row.index == index)
    }

    /// Header line plus one line per row, tab separated.
    pub fn to_tsv(&self, prefs: &ViewPrefs) -> String {
        let mut out = self
            .columns
            .iter()
            .map(|column| header_label(*column, prefs))
            .collect::<Vec<_>>()
            .join("\t");
        out.push('\n');
        for row in &self.rows {
            let line = row
                .cells
                .iter()
                .map(|cell| cell.plain_text().replace(['\t', '\n'], " "))
                .collect::<Vec<_>>()
                .join("\t");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

/// Orders by the active column, then by index ascending regardless of direction.
pub fn compare_rows(left: &HorseRow, right: &HorseRow, prefs: &ViewPrefs) -> Ordering {
    let primary = prefs.sort_column.compare(left, right, prefs);
    let primary = if prefs.ascending {
        primary
    } else {
        primary.reverse()
    };
    primary.then_with(|| left.index.cmp(&right.index))
}

pub fn sorted_matches<'a>(rows: &'a [HorseRow], prefs: &ViewPrefs) -> Vec<&'a HorseRow> {
    let filter = NameFilter::new(&prefs.search);
    let mut visible = rows
        .iter()
        .filter(|row| filter.matches(row))
        .collect::<Vec<_>>();
    visible.sort_by(|left, right| compare_rows(left, right, prefs));
    visible
}

pub fn project_names(rows: &[HorseRow], prefs: &ViewPrefs) -> TableProjection {
    let projected = sorted_matches(rows, prefs)
        .into_iter()
        .map(|row| TableRowProjection {
            index: row.index,
            cells: prefs
                .display
                .iter()
                .map(|column| column.render(row, prefs))
                .collect(),
        })
        .collect();
    TableProjection {
        columns: prefs.display.clone(),
        rows: projected,
        total: rows.len(),
    }
}

pub fn header_label(column: ColumnId, prefs: &ViewPrefs) -> String {
    let mut label = column.label().to_owned();
    if prefs.sort_column == column {
        label.push_str(if prefs.ascending {
            SORT_ASCENDING_MARK
        } else {
            SORT_DESCENDING_MARK
        });
    }
    label
}
