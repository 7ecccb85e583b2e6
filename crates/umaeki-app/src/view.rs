// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::columns::ColumnId;

/// Display preferences that survive restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPrefs {
    pub display: Vec<ColumnId>,
    pub hidden: Vec<ColumnId>,
    pub sort_column: ColumnId,
    pub ascending: bool,
    pub search: String,
    pub show_pronunciation: bool,
    /// Birth dates compare as full dates when set, month-day only otherwise.
    pub full_date_sort: bool,
}

impl Default for ViewPrefs {
    fn default() -> Self {
        Self {
            display: vec![
                ColumnId::Index,
                ColumnId::Japanese,
                ColumnId::English,
                ColumnId::Chinese,
                ColumnId::Status,
                ColumnId::Source,
            ],
            hidden: vec![
                ColumnId::Birth,
                ColumnId::Living,
                ColumnId::Voice,
                ColumnId::Note,
            ],
            sort_column: ColumnId::Index,
            ascending: true,
            search: String::new(),
            show_pronunciation: false,
            full_date_sort: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnList {
    #[default]
    Display,
    Hidden,
}

impl ViewPrefs {
    pub fn list_of(&self, column: ColumnId) -> Option<ColumnList> {
        if self.display.contains(&column) {
            Some(ColumnList::Display)
        } else if self.hidden.contains(&column) {
            Some(ColumnList::Hidden)
        } else {
            None
        }
    }

    fn list_mut(&mut self, list: ColumnList) -> &mut Vec<ColumnId> {
        match list {
            ColumnList::Display => &mut self.display,
            ColumnList::Hidden => &mut self.hidden,
        }
    }

    /// Swaps `column` with its predecessor in whichever list holds it.
    pub fn move_up(&mut self, column: ColumnId) -> bool {
        let Some(list) = self.list_of(column) else {
            return false;
        };
        let columns = self.list_mut(list);
        match columns.iter().position(|entry| *entry == column) {
            Some(position) if position > 0 => {
                columns.swap(position - 1, position);
                true
            }
            _ => false,
        }
    }

    /// Swaps `column` with its successor in whichever list holds it.
    pub fn move_down(&mut self, column: ColumnId) -> bool {
        let Some(list) = self.list_of(column) else {
            return false;
        };
        let columns = self.list_mut(list);
        match columns.iter().position(|entry| *entry == column) {
            Some(position) if position + 1 < columns.len() => {
                columns.swap(position, position + 1);
                true
            }
            _ => false,
        }
    }

    /// Moves a hidden column into `display`, before the first displayed
    /// column of higher canonical rank.
    pub fn promote(&mut self, column: ColumnId) -> bool {
        let Some(position) = self.hidden.iter().position(|entry| *entry == column) else {
            return false;
        };
        self.hidden.remove(position);
        let insert_at = rank_insertion_point(&self.display, column);
        self.display.insert(insert_at, column);
        true
    }

    /// Moves a displayed column into `hidden`. At least one column stays visible.
    pub fn demote(&mut self, column: ColumnId) -> bool {
        if self.display.len() <= 1 {
            return false;
        }
        let Some(position) = self.display.iter().position(|entry| *entry == column) else {
            return false;
        };
        self.display.remove(position);
        let insert_at = rank_insertion_point(&self.hidden, column);
        self.hidden.insert(insert_at, column);
        true
    }

    pub fn change_sort(&mut self, column: ColumnId) {
        if self.sort_column == column {
            self.ascending = !self.ascending;
        } else {
            self.sort_column = column;
            self.ascending = column != ColumnId::Birth;
        }
    }

    /// Switching the birth comparison flips the direction so the row on top
    /// stays on top.
    pub fn set_full_date_sort(&mut self, full: bool) -> bool {
        if self.full_date_sort == full {
            return false;
        }
        self.full_date_sort = full;
        self.ascending = !self.ascending;
        true
    }

    pub fn has_valid_columns(&self) -> bool {
        is_partition(&self.display, &self.hidden)
    }

    /// Rebuilds preferences from stored values, one key at a time. A missing
    /// or malformed key keeps its default without affecting the others.
    pub fn restore(mut read: impl FnMut(PrefKey) -> Option<String>) -> Self {
        let mut prefs = Self::default();
        let mut display = None;
        let mut hidden = None;

        for key in PrefKey::ALL {
            let Some(raw) = read(key) else {
                continue;
            };
            let result = match key {
                PrefKey::Display => {
                    decode_columns(&raw, true).map(|columns| display = Some(columns))
                }
                PrefKey::Hidden => {
                    decode_columns(&raw, false).map(|columns| hidden = Some(columns))
                }
                PrefKey::SortColumn => decode(&raw).map(|value| prefs.sort_column = value),
                PrefKey::Ascending => decode(&raw).map(|value| prefs.ascending = value),
                PrefKey::Search => decode(&raw).map(|value| prefs.search = value),
                PrefKey::Pronunciation => {
                    decode(&raw).map(|value| prefs.show_pronunciation = value)
                }
                PrefKey::FullDateSort => decode(&raw).map(|value| prefs.full_date_sort = value),
            };
            if let Err(error) = result {
                warn!(key = key.as_str(), error = %error, "ignoring malformed view preference");
            }
        }

        let defaults = Self::default();
        (prefs.display, prefs.hidden) = match (display, hidden) {
            (Some(display), Some(hidden)) if is_partition(&display, &hidden) => (display, hidden),
            (Some(display), _) => {
                let hidden = complement(&display);
                (display, hidden)
            }
            (None, Some(hidden)) if hidden.len() < ColumnId::ALL.len() => {
                (complement(&hidden), hidden)
            }
            _ => (defaults.display, defaults.hidden),
        };
        prefs
    }

    /// Every persisted field, encoded for storage.
    pub fn encode_all(&self) -> Result<Vec<(PrefKey, String)>> {
        PrefKey::ALL
            .into_iter()
            .map(|key| Ok((key, key.encode(self)?)))
            .collect()
    }
}

fn rank_insertion_point(columns: &[ColumnId], column: ColumnId) -> usize {
    columns
        .iter()
        .position(|entry| entry.rank() > column.rank())
        .unwrap_or(columns.len())
}

/// Columns missing from `columns`, in canonical order.
fn complement(columns: &[ColumnId]) -> Vec<ColumnId> {
    ColumnId::ALL
        .into_iter()
        .filter(|column| !columns.contains(column))
        .collect()
}

fn is_partition(display: &[ColumnId], hidden: &[ColumnId]) -> bool {
    if display.is_empty() || display.len() + hidden.len() != ColumnId::ALL.len() {
        return false;
    }
    ColumnId::ALL.iter().all(|column| {
        display.iter().chain(hidden).filter(|entry| *entry == column).count() == 1
    })
}

fn decode<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).with_context(|| format!("decode {raw:?}"))
}

fn decode_columns(raw: &str, require_non_empty: bool) -> Result<Vec<ColumnId>> {
    let columns: Vec<ColumnId> = decode(raw)?;
    if require_non_empty && columns.is_empty() {
        bail!("column list must not be empty");
    }
    for (position, column) in columns.iter().enumerate() {
        if columns[..position].contains(column) {
            bail!("column {} listed twice", column.as_str());
        }
    }
    Ok(columns)
}

/// Storage keys of the persisted view fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    Display,
    Hidden,
    SortColumn,
    Ascending,
    Search,
    Pronunciation,
    FullDateSort,
}

impl PrefKey {
    pub const ALL: [Self; 7] = [
        Self::Display,
        Self::Hidden,
        Self::SortColumn,
        Self::Ascending,
        Self::Search,
        Self::Pronunciation,
        Self::FullDateSort,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Display => "view.display",
            Self::Hidden => "view.hidden",
            Self::SortColumn => "view.sort",
            Self::Ascending => "view.ascending",
            Self::Search => "view.search",
            Self::Pronunciation => "view.pronunciation",
            Self::FullDateSort => "view.full_date",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }

    pub fn encode(self, prefs: &ViewPrefs) -> Result<String> {
        let encoded = match self {
            Self::Display => serde_json::to_string(&prefs.display),
            Self::Hidden => serde_json::to_string(&prefs.hidden),
            Self::SortColumn => serde_json::to_string(&prefs.sort_column),
            Self::Ascending => serde_json::to_string(&prefs.ascending),
            Self::Search => serde_json::to_string(&prefs.search),
            Self::Pronunciation => serde_json::to_string(&prefs.show_pronunciation),
            Self::FullDateSort => serde_json::to_string(&prefs.full_date_sort),
        };
        encoded.with_context(|| format!("encode {}", self.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Closed,
    Open,
}

/// Column editor state that is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorSession {
    pub mode: EditorMode,
    pub focus: Option<ColumnId>,
}

impl EditorSession {
    pub fn is_open(&self) -> bool {
        self.mode == EditorMode::Open
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub prefs: ViewPrefs,
    pub session: EditorSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    OpenEditor,
    CloseEditor,
    Focus(ColumnId),
    MoveUp,
    MoveDown,
    Promote,
    Demote,
    ChangeSort(ColumnId),
    SetFullDateSort(bool),
    Reset,
    SetSearch(String),
    SetPronunciation(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EditorClosed,
    NoFocus,
    AtBoundary,
    NotHidden,
    NotDisplayed,
    KeepOneColumn,
}

impl Rejection {
    pub const fn message(self) -> &'static str {
        match self {
            Self::EditorClosed => "open the column editor first",
            Self::NoFocus => "select a column first",
            Self::AtBoundary => "column cannot move further",
            Self::NotHidden => "column is already shown",
            Self::NotDisplayed => "column is already hidden",
            Self::KeepOneColumn => "keep one column visible",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    EditorOpened,
    EditorClosed,
    FocusChanged(ColumnId),
    ColumnMoved(ColumnId),
    ColumnShown(ColumnId),
    ColumnHidden(ColumnId),
    SortChanged { column: ColumnId, ascending: bool },
    DateSortChanged { full: bool },
    SearchChanged,
    PronunciationChanged(bool),
    ResetToDefaults,
    Rejected(Rejection),
    /// Emitted after any transition that touched a persisted field.
    PrefsChanged,
}

impl ViewState {
    pub fn new(prefs: ViewPrefs) -> Self {
        Self {
            prefs,
            session: EditorSession::default(),
        }
    }

    pub fn dispatch(&mut self, command: ViewCommand) -> Vec<ViewEvent> {
        let before = self.prefs.clone();
        let mut events = self.apply(command);
        if self.prefs != before {
            events.push(ViewEvent::PrefsChanged);
        }
        events
    }

    fn apply(&mut self, command: ViewCommand) -> Vec<ViewEvent> {
        match command {
            ViewCommand::OpenEditor => {
                self.session = EditorSession {
                    mode: EditorMode::Open,
                    focus: None,
                };
                vec![ViewEvent::EditorOpened]
            }
            ViewCommand::CloseEditor => {
                self.session = EditorSession::default();
                vec![ViewEvent::EditorClosed]
            }
            ViewCommand::Focus(column) => {
                if !self.session.is_open() {
                    return vec![ViewEvent::Rejected(Rejection::EditorClosed)];
                }
                self.session.focus = Some(column);
                vec![ViewEvent::FocusChanged(column)]
            }
            ViewCommand::MoveUp => self.with_focus(|prefs, column| {
                if prefs.move_up(column) {
                    ViewEvent::ColumnMoved(column)
                } else {
                    ViewEvent::Rejected(Rejection::AtBoundary)
                }
            }),
            ViewCommand::MoveDown => self.with_focus(|prefs, column| {
                if prefs.move_down(column) {
                    ViewEvent::ColumnMoved(column)
                } else {
                    ViewEvent::Rejected(Rejection::AtBoundary)
                }
            }),
            ViewCommand::Promote => self.with_focus(|prefs, column| {
                if prefs.promote(column) {
                    ViewEvent::ColumnShown(column)
                } else {
                    ViewEvent::Rejected(Rejection::NotHidden)
                }
            }),
            ViewCommand::Demote => self.with_focus(|prefs, column| {
                if prefs.list_of(column) != Some(ColumnList::Display) {
                    ViewEvent::Rejected(Rejection::NotDisplayed)
                } else if prefs.demote(column) {
                    ViewEvent::ColumnHidden(column)
                } else {
                    ViewEvent::Rejected(Rejection::KeepOneColumn)
                }
            }),
            ViewCommand::ChangeSort(column) => {
                self.prefs.change_sort(column);
                vec![ViewEvent::SortChanged {
                    column: self.prefs.sort_column,
                    ascending: self.prefs.ascending,
                }]
            }
            ViewCommand::SetFullDateSort(full) => {
                if self.prefs.set_full_date_sort(full) {
                    vec![ViewEvent::DateSortChanged { full }]
                } else {
                    Vec::new()
                }
            }
            ViewCommand::Reset => {
                self.prefs = ViewPrefs::default();
                self.session.focus = None;
                vec![ViewEvent::ResetToDefaults]
            }
            ViewCommand::SetSearch(search) => {
                self.prefs.search = search;
                vec![ViewEvent::SearchChanged]
            }
            ViewCommand::SetPronunciation(show) => {
                self.prefs.show_pronunciation = show;
                vec![ViewEvent::PronunciationChanged(show)]
            }
        }
    }

    fn with_focus(
        &mut self,
        operation: impl FnOnce(&mut ViewPrefs, ColumnId) -> ViewEvent,
    ) -> Vec<ViewEvent> {
        match self.session.focus {
            Some(column) => vec![operation(&mut self.prefs, column)],
            None => vec![ViewEvent::Rejected(Rejection::NoFocus)],
        }
    }
}

pub fn prefs_changed(events: &[ViewEvent]) -> bool {
    events.contains(&ViewEvent::PrefsChanged)
}
