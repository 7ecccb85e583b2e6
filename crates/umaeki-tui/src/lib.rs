// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use std::io;
use std::ops::Range;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use umaeki_app::{
    AppCommand, AppEvent, AppMode, AppState, ColumnId, ColumnList, Content, Fragment,
    HelpVisibility, HorseIndex, HorseRow, Section, TableProjection, TermRow, ViewCommand,
    ViewEvent, ViewPrefs, ViewState, header_label, prefs_changed, project_names,
};

const APP_TITLE: &str = "umaeki 馬驛";
const HALF_PAGE_ROWS: isize = 10;
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Everything the UI needs from the outside world.
pub trait AppRuntime {
    fn load_names(&mut self) -> Result<Vec<HorseRow>>;
    fn load_terms(&mut self) -> Result<Vec<TermRow>>;
    fn load_chars(&mut self) -> Result<String>;
    fn load_view_prefs(&mut self) -> Result<ViewPrefs>;
    fn save_view_prefs(&mut self, prefs: &ViewPrefs) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CursorState {
    selected_row: usize,
    selected_col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    names: Vec<HorseRow>,
    terms: Vec<TermRow>,
    chars: String,
    view: ViewState,
    names_cursor: CursorState,
    terms_cursor: CursorState,
    chars_scroll: u16,
    editor_list: ColumnList,
    status_token: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NamesCommand {
    MoveRow(isize),
    MoveColumn(isize),
    FirstRow,
    LastRow,
    SortByCursor,
    ToggleDateSort,
    TogglePronunciation,
    StartSearch,
    OpenEditor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorCommand {
    FocusStep(isize),
    SelectList(ColumnList),
    MoveUp,
    MoveDown,
    Promote,
    Demote,
    TogglePronunciation,
    Reset,
    Close,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    let mut view_data = load_view_data(runtime)?;
    restore_selection(&mut view_data, None);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    let (internal_tx, internal_rx) = mpsc::channel();
    info!(section = state.active_section.label(), "ui started");

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        match next_event(|| event::poll(Duration::from_millis(120)), event::read) {
            Ok(Some(Event::Key(key))) => {
                if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!("ui stopped");
    result
}

/// Reads one event if `poll` reports one ready.
fn next_event(
    poll: impl FnOnce() -> io::Result<bool>,
    read: impl FnOnce() -> io::Result<Event>,
) -> Result<Option<Event>> {
    if !poll().context("poll event")? {
        return Ok(None);
    }
    read().context("read event").map(Some)
}

fn load_view_data<R: AppRuntime>(runtime: &mut R) -> Result<ViewData> {
    let names = runtime.load_names().context("load names dataset")?;
    let terms = runtime.load_terms().context("load terms dataset")?;
    let chars = runtime.load_chars().context("load character notes")?;
    let prefs = match runtime.load_view_prefs() {
        Ok(prefs) => prefs,
        Err(error) => {
            warn!(error = %format!("{error:#}"), "view preferences unavailable; using defaults");
            ViewPrefs::default()
        }
    };
    debug!(names = names.len(), terms = terms.len(), "datasets loaded");
    Ok(ViewData {
        names,
        terms,
        chars,
        view: ViewState::new(prefs),
        ..ViewData::default()
    })
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn dispatch_app(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn dispatch_view<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: ViewCommand,
) {
    let anchor = selected_horse(view_data);
    let events = view_data.view.dispatch(command);
    if prefs_changed(&events) {
        persist_prefs(runtime, &view_data.view.prefs);
        restore_selection(view_data, anchor);
    }
    if let Some(focus) = view_data.view.session.focus
        && let Some(list) = view_data.view.prefs.list_of(focus)
    {
        view_data.editor_list = list;
    }
    if let Some(message) = events.iter().find_map(view_event_message) {
        emit_status(state, view_data, internal_tx, message);
    }
}

fn persist_prefs<R: AppRuntime>(runtime: &mut R, prefs: &ViewPrefs) {
    if let Err(error) = runtime.save_view_prefs(prefs) {
        warn!(error = %format!("{error:#}"), "failed to persist view preferences");
    }
}

fn view_event_message(event: &ViewEvent) -> Option<String> {
    match event {
        ViewEvent::EditorOpened => Some("column editor open".to_owned()),
        ViewEvent::EditorClosed => Some("column editor closed".to_owned()),
        ViewEvent::ColumnMoved(column) => Some(format!("{} moved", column.label())),
        ViewEvent::ColumnShown(column) => Some(format!("{} shown", column.label())),
        ViewEvent::ColumnHidden(column) => Some(format!("{} hidden", column.label())),
        ViewEvent::SortChanged { column, ascending } => Some(format!(
            "sorted by {} {}",
            column.label(),
            if *ascending { "↑" } else { "↓" }
        )),
        ViewEvent::DateSortChanged { full: true } => Some("birth sorts by full date".to_owned()),
        ViewEvent::DateSortChanged { full: false } => {
            Some("birth sorts by month and day".to_owned())
        }
        ViewEvent::PronunciationChanged(true) => Some("pronunciation shown".to_owned()),
        ViewEvent::PronunciationChanged(false) => Some("pronunciation hidden".to_owned()),
        ViewEvent::ResetToDefaults => Some("view reset to defaults".to_owned()),
        ViewEvent::Rejected(rejection) => Some(rejection.message().to_owned()),
        ViewEvent::FocusChanged(_) | ViewEvent::SearchChanged | ViewEvent::PrefsChanged => None,
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if state.help == HelpVisibility::Visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            dispatch_app(state, view_data, internal_tx, AppCommand::ToggleHelp);
        }
        return false;
    }

    if state.mode == AppMode::Search {
        handle_search_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.view.session.is_open() {
        if let Some(command) = editor_command_for_key(key) {
            apply_editor_command(state, runtime, view_data, internal_tx, command);
        }
        return false;
    }

    match key.code {
        KeyCode::Tab | KeyCode::Char('f') => {
            dispatch_app(state, view_data, internal_tx, AppCommand::NextSection);
            return false;
        }
        KeyCode::BackTab | KeyCode::Char('b') => {
            dispatch_app(state, view_data, internal_tx, AppCommand::PrevSection);
            return false;
        }
        KeyCode::Char('?') => {
            dispatch_app(state, view_data, internal_tx, AppCommand::ToggleHelp);
            return false;
        }
        _ => {}
    }

    match state.active_section {
        Section::Names => {
            if let Some(command) = names_command_for_key(key) {
                apply_names_command(state, runtime, view_data, internal_tx, command);
            }
        }
        Section::Terms => handle_terms_key(view_data, key),
        Section::Chars => handle_chars_key(view_data, key),
    }
    false
}

fn handle_search_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let mut search = view_data.view.prefs.search.clone();
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            dispatch_app(state, view_data, internal_tx, AppCommand::FinishSearch);
            return;
        }
        KeyCode::Backspace => {
            search.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => search.clear(),
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            search.push(ch);
        }
        _ => return,
    }
    dispatch_view(
        state,
        runtime,
        view_data,
        internal_tx,
        ViewCommand::SetSearch(search),
    );
}

fn names_command_for_key(key: KeyEvent) -> Option<NamesCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('d') => Some(NamesCommand::MoveRow(HALF_PAGE_ROWS)),
            KeyCode::Char('u') => Some(NamesCommand::MoveRow(-HALF_PAGE_ROWS)),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Some(NamesCommand::MoveRow(1)),
        KeyCode::Char('k') | KeyCode::Up => Some(NamesCommand::MoveRow(-1)),
        KeyCode::Char('l') | KeyCode::Right => Some(NamesCommand::MoveColumn(1)),
        KeyCode::Char('h') | KeyCode::Left => Some(NamesCommand::MoveColumn(-1)),
        KeyCode::PageDown => Some(NamesCommand::MoveRow(HALF_PAGE_ROWS)),
        KeyCode::PageUp => Some(NamesCommand::MoveRow(-HALF_PAGE_ROWS)),
        KeyCode::Char('g') | KeyCode::Home => Some(NamesCommand::FirstRow),
        KeyCode::Char('G') | KeyCode::End => Some(NamesCommand::LastRow),
        KeyCode::Char('s') => Some(NamesCommand::SortByCursor),
        KeyCode::Char('y') => Some(NamesCommand::ToggleDateSort),
        KeyCode::Char('p') => Some(NamesCommand::TogglePronunciation),
        KeyCode::Char('/') => Some(NamesCommand::StartSearch),
        KeyCode::Char('e') => Some(NamesCommand::OpenEditor),
        _ => None,
    }
}

fn apply_names_command<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: NamesCommand,
) {
    let row_count = names_projection(view_data).row_count();
    let cursor = &mut view_data.names_cursor;
    let command = match command {
        NamesCommand::MoveRow(delta) => {
            cursor.selected_row = step(cursor.selected_row, delta, row_count);
            return;
        }
        NamesCommand::MoveColumn(delta) => {
            let columns = view_data.view.prefs.display.len();
            cursor.selected_col = step(cursor.selected_col, delta, columns);
            return;
        }
        NamesCommand::FirstRow => {
            cursor.selected_row = 0;
            return;
        }
        NamesCommand::LastRow => {
            cursor.selected_row = row_count.saturating_sub(1);
            return;
        }
        NamesCommand::SortByCursor => {
            let Some(column) = selected_column(view_data) else {
                return;
            };
            ViewCommand::ChangeSort(column)
        }
        NamesCommand::ToggleDateSort => {
            if !view_data.view.prefs.display.contains(&ColumnId::Birth) {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "show the birth column to change its sort mode",
                );
                return;
            }
            ViewCommand::SetFullDateSort(!view_data.view.prefs.full_date_sort)
        }
        NamesCommand::TogglePronunciation => {
            ViewCommand::SetPronunciation(!view_data.view.prefs.show_pronunciation)
        }
        NamesCommand::StartSearch => {
            dispatch_app(state, view_data, internal_tx, AppCommand::StartSearch);
            return;
        }
        NamesCommand::OpenEditor => {
            view_data.editor_list = ColumnList::Display;
            ViewCommand::OpenEditor
        }
    };
    dispatch_view(state, runtime, view_data, internal_tx, command);
}

fn editor_command_for_key(key: KeyEvent) -> Option<EditorCommand> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Some(EditorCommand::FocusStep(1)),
        KeyCode::Char('k') | KeyCode::Up => Some(EditorCommand::FocusStep(-1)),
        KeyCode::Char('h') => Some(EditorCommand::SelectList(ColumnList::Display)),
        KeyCode::Char('l') => Some(EditorCommand::SelectList(ColumnList::Hidden)),
        KeyCode::Char('K') => Some(EditorCommand::MoveUp),
        KeyCode::Char('J') => Some(EditorCommand::MoveDown),
        KeyCode::Char('a') | KeyCode::Right => Some(EditorCommand::Promote),
        KeyCode::Char('d') | KeyCode::Left => Some(EditorCommand::Demote),
        KeyCode::Char('p') => Some(EditorCommand::TogglePronunciation),
        KeyCode::Char('R') => Some(EditorCommand::Reset),
        KeyCode::Esc | KeyCode::Char('e') => Some(EditorCommand::Close),
        _ => None,
    }
}

fn apply_editor_command<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: EditorCommand,
) {
    let command = match command {
        EditorCommand::FocusStep(delta) => {
            let Some(column) = focus_target(view_data, delta) else {
                return;
            };
            ViewCommand::Focus(column)
        }
        EditorCommand::SelectList(list) => {
            view_data.editor_list = list;
            let Some(column) = editor_columns(view_data, list).first().copied() else {
                return;
            };
            ViewCommand::Focus(column)
        }
        EditorCommand::MoveUp => ViewCommand::MoveUp,
        EditorCommand::MoveDown => ViewCommand::MoveDown,
        EditorCommand::Promote => ViewCommand::Promote,
        EditorCommand::Demote => ViewCommand::Demote,
        EditorCommand::TogglePronunciation => {
            ViewCommand::SetPronunciation(!view_data.view.prefs.show_pronunciation)
        }
        EditorCommand::Reset => {
            view_data.editor_list = ColumnList::Display;
            ViewCommand::Reset
        }
        EditorCommand::Close => ViewCommand::CloseEditor,
    };
    dispatch_view(state, runtime, view_data, internal_tx, command);
}

fn editor_columns(view_data: &ViewData, list: ColumnList) -> &[ColumnId] {
    match list {
        ColumnList::Display => &view_data.view.prefs.display,
        ColumnList::Hidden => &view_data.view.prefs.hidden,
    }
}

/// Next column to focus when stepping through the active editor list.
fn focus_target(view_data: &ViewData, delta: isize) -> Option<ColumnId> {
    let columns = editor_columns(view_data, view_data.editor_list);
    if columns.is_empty() {
        return None;
    }
    let current = view_data
        .view
        .session
        .focus
        .and_then(|focus| columns.iter().position(|column| *column == focus));
    let next = match current {
        Some(position) => step(position, delta, columns.len()),
        None if delta.is_negative() => columns.len() - 1,
        None => 0,
    };
    columns.get(next).copied()
}

fn handle_terms_key(view_data: &mut ViewData, key: KeyEvent) {
    let row_count = view_data.terms.len();
    let cursor = &mut view_data.terms_cursor;
    let half_page = if key.modifiers.contains(KeyModifiers::CONTROL) {
        HALF_PAGE_ROWS
    } else {
        0
    };
    cursor.selected_row = match key.code {
        KeyCode::Char('j') | KeyCode::Down => step(cursor.selected_row, 1, row_count),
        KeyCode::Char('k') | KeyCode::Up => step(cursor.selected_row, -1, row_count),
        KeyCode::Char('d') if half_page > 0 => step(cursor.selected_row, half_page, row_count),
        KeyCode::Char('u') if half_page > 0 => step(cursor.selected_row, -half_page, row_count),
        KeyCode::Char('g') | KeyCode::Home => 0,
        KeyCode::Char('G') | KeyCode::End => row_count.saturating_sub(1),
        _ => return,
    };
}

fn handle_chars_key(view_data: &mut ViewData, key: KeyEvent) {
    view_data.chars_scroll = match key.code {
        KeyCode::Char('j') | KeyCode::Down => view_data.chars_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => view_data.chars_scroll.saturating_sub(1),
        KeyCode::Char('g') | KeyCode::Home => 0,
        _ => return,
    };
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    };
    next.min(len - 1)
}

fn names_projection(view_data: &ViewData) -> TableProjection {
    project_names(&view_data.names, &view_data.view.prefs)
}

fn selected_horse(view_data: &ViewData) -> Option<HorseIndex> {
    names_projection(view_data)
        .rows
        .get(view_data.names_cursor.selected_row)
        .map(|row| row.index)
}

fn selected_column(view_data: &ViewData) -> Option<ColumnId> {
    view_data
        .view
        .prefs
        .display
        .get(view_data.names_cursor.selected_col)
        .copied()
}

/// Keeps the cursor on the same horse after the view changes, clamping when
/// that horse is no longer visible.
fn restore_selection(view_data: &mut ViewData, anchor: Option<HorseIndex>) {
    let projection = names_projection(view_data);
    let cursor = &mut view_data.names_cursor;
    let clamped = cursor
        .selected_row
        .min(projection.row_count().saturating_sub(1));
    cursor.selected_row = anchor
        .and_then(|index| projection.position_of(index))
        .unwrap_or(clamped);
    cursor.selected_col = cursor
        .selected_col
        .min(projection.column_count().saturating_sub(1));
}

/// Rows to draw so that `selected` stays visible, centered where possible.
fn visible_window(selected: usize, total: usize, height: usize) -> Range<usize> {
    if total <= height {
        return 0..total;
    }
    let start = selected
        .saturating_sub(height / 2)
        .min(total.saturating_sub(height));
    start..start + height
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = Section::ALL
        .iter()
        .position(|section| *section == state.active_section)
        .unwrap_or(0);
    let tab_titles = Section::ALL
        .iter()
        .map(|section| section.label().to_owned())
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title(APP_TITLE).borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.active_section {
        Section::Names => render_names(frame, layout[1], state, view_data),
        Section::Terms => render_terms(frame, layout[1], view_data),
        Section::Chars => {
            let chars = Paragraph::new(view_data.chars.as_str())
                .wrap(Wrap { trim: false })
                .scroll((view_data.chars_scroll, 0))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(Section::Chars.title()),
                );
            frame.render_widget(chars, layout[1]);
        }
    }

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[2]);

    if view_data.view.session.is_open() {
        render_editor(frame, view_data);
    }

    if state.help == HelpVisibility::Visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .wrap(Wrap { trim: false })
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_names(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(area);

    let prefs = &view_data.view.prefs;
    let projection = names_projection(view_data);
    frame.render_widget(
        Paragraph::new(search_line(state, prefs, &projection)),
        layout[0],
    );

    let cursor = view_data.names_cursor;
    let widths = projection
        .columns
        .iter()
        .map(|column| column_width(*column))
        .collect::<Vec<_>>();
    let header = Row::new(projection.columns.iter().map(|column| {
        Cell::from(header_label(*column, prefs)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let height = usize::from(layout[1].height.saturating_sub(3));
    let window = visible_window(cursor.selected_row, projection.row_count(), height);
    let rows = projection.rows[window.clone()]
        .iter()
        .zip(window)
        .map(|(row, row_index)| {
            let selected_row = row_index == cursor.selected_row;
            let cells = row
                .cells
                .iter()
                .enumerate()
                .map(|(column_index, content)| {
                    let mut style = Style::default();
                    if selected_row {
                        style = style.bg(Color::DarkGray);
                    }
                    if selected_row && column_index == cursor.selected_col {
                        style = Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD);
                    }
                    Cell::from(Line::from(content_spans(content))).style(style)
                })
                .collect::<Vec<_>>();
            Row::new(cells)
        });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(names_title(&projection))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, layout[1]);

    let detail = Paragraph::new(detail_text(view_data, &projection))
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, layout[2]);
}

fn column_width(column: ColumnId) -> Constraint {
    match column {
        ColumnId::Index => Constraint::Length(5),
        ColumnId::Status | ColumnId::Living => Constraint::Length(9),
        ColumnId::Birth => Constraint::Length(17),
        _ => Constraint::Min(8),
    }
}

fn search_line(state: &AppState, prefs: &ViewPrefs, projection: &TableProjection) -> Line<'static> {
    let editing = state.mode == AppMode::Search;
    let label_style = if editing {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![
        Span::styled("搜尋 / ", label_style),
        Span::raw(prefs.search.clone()),
    ];
    if editing {
        spans.push(Span::styled("▏", Style::default().fg(Color::Cyan)));
    }
    if !prefs.search.is_empty() {
        spans.push(Span::styled(
            format!("  {} / {}", projection.row_count(), projection.total),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn names_title(projection: &TableProjection) -> String {
    format!(
        "{} · 共 {} 匹",
        Section::Names.title(),
        projection.total
    )
}

/// Tooltip and link targets of the cell under the cursor.
fn detail_text(view_data: &ViewData, projection: &TableProjection) -> String {
    let cursor = view_data.names_cursor;
    let Some(content) = projection.cell(cursor.selected_row, cursor.selected_col) else {
        return String::new();
    };
    let mut parts = Vec::new();
    if let Some(tooltip) = &content.tooltip {
        parts.push(tooltip.clone());
    }
    let links = content.links();
    if !links.is_empty() {
        parts.push(format!("→ {}", links.join("  ")));
    }
    parts.join("  ")
}

fn content_spans(content: &Content) -> Vec<Span<'static>> {
    content
        .fragments
        .iter()
        .flat_map(|fragment| match fragment {
            Fragment::Text(text) => vec![Span::raw(text.clone())],
            Fragment::Bold(text) => vec![Span::styled(
                text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )],
            Fragment::Ruby { base, annotation } => vec![
                Span::raw(base.clone()),
                Span::styled(
                    format!("（{annotation}）"),
                    Style::default().fg(Color::DarkGray),
                ),
            ],
            Fragment::Link { text, .. } => vec![Span::styled(
                text.clone(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            )],
        })
        .collect()
}

fn render_terms(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let header = Row::new(["#", "日文", "中文", "備註"].map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let selected = view_data.terms_cursor.selected_row;
    let height = usize::from(area.height.saturating_sub(3));
    let window = visible_window(selected, view_data.terms.len(), height);
    let rows = view_data.terms[window.clone()]
        .iter()
        .zip(window)
        .map(|(term, row_index)| {
            let style = if row_index == selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new([
                Cell::from(term.index.to_string()),
                Cell::from(term.japanese.clone()),
                Cell::from(term.chinese.clone()),
                Cell::from(term.note.clone().unwrap_or_default()),
            ])
            .style(style)
        });
    let widths = [
        Constraint::Length(5),
        Constraint::Min(10),
        Constraint::Min(10),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths).header(header).column_spacing(1).block(
        Block::default()
            .title(format!(
                "{} · 共 {} 項",
                Section::Terms.title(),
                view_data.terms.len()
            ))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn render_editor(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let area = centered_rect(64, 60, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default().title("columns").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);
    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[0]);

    for (list, area) in [ColumnList::Display, ColumnList::Hidden]
        .into_iter()
        .zip(lists.iter())
    {
        let title = match list {
            ColumnList::Display => "顯示",
            ColumnList::Hidden => "隱藏",
        };
        let border_style = if view_data.editor_list == list {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let widget = Paragraph::new(editor_list_lines(view_data, list)).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        frame.render_widget(widget, *area);
    }

    let pronunciation = if view_data.view.prefs.show_pronunciation {
        "on"
    } else {
        "off"
    };
    frame.render_widget(
        Paragraph::new(format!("pronunciation: {pronunciation}"))
            .style(Style::default().fg(Color::Gray)),
        layout[1],
    );
}

fn editor_list_lines(view_data: &ViewData, list: ColumnList) -> Vec<Line<'static>> {
    let focus = view_data.view.session.focus;
    editor_columns(view_data, list)
        .iter()
        .map(|column| {
            let focused = focus == Some(*column);
            let marker = if focused { "▸ " } else { "  " };
            let style = if focused {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(
                format!("{marker}{} ({})", column.label(), column.as_str()),
                style,
            ))
        })
        .collect()
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | tab/f next section | b prev section | ? help\n\
names: j/k rows | h/l column | g/G first/last | ctrl+d/u half page\n\
names: s sort by column (again reverses) | y birth full date / month-day (birth shown)\n\
names: p pronunciation | / search | e columns\n\
search: type to filter | backspace delete | ctrl+u clear | enter/esc done\n\
columns: j/k focus | h/l switch list | K/J move | a/→ show | d/← hide\n\
columns: p pronunciation | R reset | esc/e close\n\
terms: j/k rows | g/G first/last\n\
chars: j/k scroll"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let (mode, hints) = if view_data.view.session.is_open() {
        ("COLUMNS", "j/k h/l | K/J move | a/d show/hide | R reset | esc close")
    } else if state.mode == AppMode::Search {
        ("SEARCH", "type | backspace | ctrl+u clear | enter done")
    } else {
        match state.active_section {
            Section::Names => (
                "BROWSE",
                "j/k/h/l | s sort | y date | p pron | / search | e cols | ? help",
            ),
            Section::Terms => ("BROWSE", "j/k g/G | tab/b sections | ? help"),
            Section::Chars => ("BROWSE", "j/k scroll | tab/b sections | ? help"),
        }
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, ViewData, centered_rect, content_spans, detail_text,
        editor_list_lines, handle_key_event, help_overlay_text, load_view_data, names_projection,
        next_event, restore_selection, selected_horse, status_text, visible_window,
    };
    use anyhow::{Result, bail};
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use ratatui::layout::Rect;
    use std::sync::mpsc::{self, Sender};
    use umaeki_app::{
        AppMode, AppState, ColumnId, ColumnList, HelpVisibility, HorseIndex, HorseRow, Section,
        TermRow, ViewPrefs,
    };
    use umaeki_testkit::{sample_horses, sample_terms};

    #[derive(Debug, Default)]
    struct TestRuntime {
        saved: Vec<ViewPrefs>,
        fail_saves: bool,
        stored: Option<ViewPrefs>,
    }

    impl AppRuntime for TestRuntime {
        fn load_names(&mut self) -> Result<Vec<HorseRow>> {
            Ok(sample_horses())
        }

        fn load_terms(&mut self) -> Result<Vec<TermRow>> {
            Ok(sample_terms())
        }

        fn load_chars(&mut self) -> Result<String> {
            Ok("character notes".to_owned())
        }

        fn load_view_prefs(&mut self) -> Result<ViewPrefs> {
            match &self.stored {
                Some(prefs) => Ok(prefs.clone()),
                None => bail!("settings table unreadable"),
            }
        }

        fn save_view_prefs(&mut self, prefs: &ViewPrefs) -> Result<()> {
            if self.fail_saves {
                bail!("disk full");
            }
            self.saved.push(prefs.clone());
            Ok(())
        }
    }

    fn view_data_for_test() -> ViewData {
        let mut runtime = TestRuntime {
            stored: Some(ViewPrefs::default()),
            ..TestRuntime::default()
        };
        let mut view_data = load_view_data(&mut runtime).expect("sample data loads");
        restore_selection(&mut view_data, None);
        view_data
    }

    fn internal_tx() -> Sender<InternalEvent> {
        let (tx, _rx) = mpsc::channel();
        tx
    }

    fn press(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        code: KeyCode,
    ) -> bool {
        let tx = internal_tx();
        handle_key_event(
            state,
            runtime,
            view_data,
            &tx,
            KeyEvent::new(code, KeyModifiers::NONE),
        )
    }

    fn press_chars(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        keys: &str,
    ) {
        for ch in keys.chars() {
            press(state, runtime, view_data, KeyCode::Char(ch));
        }
    }

    fn visible_indices(view_data: &ViewData) -> Vec<i64> {
        names_projection(view_data)
            .rows
            .iter()
            .map(|row| row.index.get())
            .collect()
    }

    #[test]
    fn ctrl_q_quits() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        let tx = internal_tx();
        let quit = handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        assert!(quit);
    }

    #[test]
    fn tab_and_b_cycle_sections() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Tab);
        assert_eq!(state.active_section, Section::Terms);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('f'));
        assert_eq!(state.active_section, Section::Chars);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('f'));
        assert_eq!(state.active_section, Section::Names);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('b'));
        assert_eq!(state.active_section, Section::Chars);
    }

    #[test]
    fn sort_key_uses_cursor_column_and_persists() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();

        press_chars(&mut state, &mut runtime, &mut view_data, "ls");
        assert_eq!(view_data.view.prefs.sort_column, ColumnId::Japanese);
        assert!(view_data.view.prefs.ascending);
        assert_eq!(runtime.saved.len(), 1);
        assert!(
            state
                .status_line
                .as_deref()
                .is_some_and(|status| status.contains("日文馬名"))
        );

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('s'));
        assert!(!view_data.view.prefs.ascending);
        assert_eq!(runtime.saved.len(), 2);
    }

    #[test]
    fn selection_follows_the_same_horse_across_a_resort() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();

        press_chars(&mut state, &mut runtime, &mut view_data, "jj");
        assert_eq!(selected_horse(&view_data), Some(HorseIndex::new(3)));

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('s'));
        assert!(!view_data.view.prefs.ascending);
        assert_eq!(visible_indices(&view_data), vec![5, 4, 3, 2, 1]);
        assert_eq!(selected_horse(&view_data), Some(HorseIndex::new(3)));
        assert_eq!(view_data.names_cursor.selected_row, 2);
    }

    #[test]
    fn search_mode_captures_keys() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('/'));
        assert_eq!(state.mode, AppMode::Search);

        press_chars(&mut state, &mut runtime, &mut view_data, "weeks");
        assert_eq!(view_data.view.prefs.search, "weeks");
        assert_eq!(view_data.view.prefs.sort_column, ColumnId::Index);
        assert!(visible_indices(&view_data).is_empty());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Backspace);
        assert_eq!(visible_indices(&view_data), vec![1]);
        assert_eq!(
            runtime.saved.last().map(|prefs| prefs.search.as_str()),
            Some("week")
        );

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Enter);
        assert_eq!(state.mode, AppMode::Browse);
        assert_eq!(view_data.view.prefs.search, "week");
    }

    #[test]
    fn kana_search_then_ctrl_u_clears() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        let tx = internal_tx();

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('/'));
        press_chars(&mut state, &mut runtime, &mut view_data, "ｼﾝ");
        assert_eq!(visible_indices(&view_data), vec![4, 5]);
        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
        );
        assert!(view_data.view.prefs.search.is_empty());
        assert_eq!(visible_indices(&view_data).len(), 5);
    }

    #[test]
    fn search_is_names_only() {
        let mut state = AppState::new(Section::Terms);
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('/'));
        assert_eq!(state.mode, AppMode::Browse);
    }

    #[test]
    fn editor_promotes_hidden_column_and_cursor_follows() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('e'));
        assert!(view_data.view.session.is_open());

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('l'));
        assert_eq!(view_data.editor_list, ColumnList::Hidden);
        assert_eq!(view_data.view.session.focus, Some(ColumnId::Birth));

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('a'));
        assert!(view_data.view.prefs.display.contains(&ColumnId::Birth));
        assert_eq!(view_data.editor_list, ColumnList::Display);
        assert_eq!(runtime.saved.len(), 1);

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('K'));
        let position = view_data
            .view
            .prefs
            .display
            .iter()
            .position(|column| *column == ColumnId::Birth);
        assert_eq!(position, Some(4));

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Esc);
        assert!(!view_data.view.session.is_open());
        assert_eq!(view_data.view.session.focus, None);
    }

    #[test]
    fn editor_keys_do_not_reach_the_table() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('e'));
        press_chars(&mut state, &mut runtime, &mut view_data, "jjs");
        assert_eq!(view_data.names_cursor.selected_row, 0);
        assert_eq!(view_data.view.prefs.sort_column, ColumnId::Index);
        assert_eq!(view_data.view.session.focus, Some(ColumnId::Japanese));

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Tab);
        assert_eq!(state.active_section, Section::Names);
    }

    #[test]
    fn demoting_the_last_column_is_refused_with_a_message() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime {
            stored: Some(ViewPrefs {
                display: vec![ColumnId::English],
                hidden: ColumnId::ALL
                    .into_iter()
                    .filter(|column| *column != ColumnId::English)
                    .collect(),
                ..ViewPrefs::default()
            }),
            ..TestRuntime::default()
        };
        let mut view_data = load_view_data(&mut runtime).expect("loads");

        press_chars(&mut state, &mut runtime, &mut view_data, "ejd");
        assert_eq!(view_data.view.prefs.display, vec![ColumnId::English]);
        assert!(runtime.saved.is_empty());
        assert_eq!(
            state.status_line.as_deref(),
            Some("keep one column visible")
        );
    }

    #[test]
    fn editor_reset_restores_defaults_and_stays_open() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();

        press_chars(&mut state, &mut runtime, &mut view_data, "ejdR");
        assert!(view_data.view.session.is_open());
        assert_eq!(view_data.view.prefs, ViewPrefs::default());
        assert_eq!(view_data.editor_list, ColumnList::Display);
    }

    #[test]
    fn date_mode_toggle_flips_direction() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        assert!(view_data.view.prefs.promote(ColumnId::Birth));

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('y'));
        assert!(!view_data.view.prefs.full_date_sort);
        assert!(!view_data.view.prefs.ascending);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('y'));
        assert!(view_data.view.prefs.full_date_sort);
        assert!(view_data.view.prefs.ascending);
    }

    #[test]
    fn event_source_errors_are_returned_not_raised() {
        let error = next_event(
            || Err(std::io::Error::other("tty gone")),
            || panic!("read without a ready event"),
        )
        .expect_err("poll failure");
        assert!(format!("{error:#}").contains("poll event: tty gone"));

        let error = next_event(|| Ok(true), || Err(std::io::Error::other("eof")))
            .expect_err("read failure");
        assert!(format!("{error:#}").contains("read event: eof"));

        let idle = next_event(|| Ok(false), || panic!("read without a ready event"))
            .expect("idle poll");
        assert!(idle.is_none());

        let resized = next_event(|| Ok(true), || Ok(Event::Resize(80, 24))).expect("resize");
        assert_eq!(resized, Some(Event::Resize(80, 24)));
    }

    #[test]
    fn date_mode_needs_a_visible_birth_column() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        assert!(!view_data.view.prefs.display.contains(&ColumnId::Birth));

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('y'));
        assert!(view_data.view.prefs.full_date_sort);
        assert!(view_data.view.prefs.ascending);
        assert!(runtime.saved.is_empty());
        assert_eq!(
            state.status_line.as_deref(),
            Some("show the birth column to change its sort mode")
        );
    }

    #[test]
    fn failed_save_keeps_the_change() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime {
            fail_saves: true,
            ..TestRuntime::default()
        };
        let mut view_data = view_data_for_test();

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('p'));
        assert!(view_data.view.prefs.show_pronunciation);
        assert_eq!(state.status_line.as_deref(), Some("pronunciation shown"));
    }

    #[test]
    fn unreadable_prefs_fall_back_to_defaults() -> Result<()> {
        let mut runtime = TestRuntime::default();
        let view_data = load_view_data(&mut runtime)?;
        assert_eq!(view_data.view.prefs, ViewPrefs::default());
        assert_eq!(view_data.names.len(), 5);
        Ok(())
    }

    #[test]
    fn help_overlay_swallows_keys_until_closed() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();

        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('?'));
        assert_eq!(state.help, HelpVisibility::Visible);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('j'));
        assert_eq!(view_data.names_cursor.selected_row, 0);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Esc);
        assert_eq!(state.help, HelpVisibility::Hidden);
    }

    #[test]
    fn row_and_column_movement_clamps() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();

        press_chars(&mut state, &mut runtime, &mut view_data, "kh");
        assert_eq!(view_data.names_cursor.selected_row, 0);
        assert_eq!(view_data.names_cursor.selected_col, 0);
        press_chars(&mut state, &mut runtime, &mut view_data, "Gllllllll");
        assert_eq!(view_data.names_cursor.selected_row, 4);
        assert_eq!(view_data.names_cursor.selected_col, 5);
        press(&mut state, &mut runtime, &mut view_data, KeyCode::Char('g'));
        assert_eq!(view_data.names_cursor.selected_row, 0);
    }

    #[test]
    fn terms_cursor_moves_independently() {
        let mut state = AppState::new(Section::Terms);
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();

        press_chars(&mut state, &mut runtime, &mut view_data, "jjj");
        assert_eq!(view_data.terms_cursor.selected_row, 2);
        assert_eq!(view_data.names_cursor.selected_row, 0);
    }

    #[test]
    fn visible_window_keeps_selection_in_view() {
        assert_eq!(visible_window(0, 3, 10), 0..3);
        assert_eq!(visible_window(0, 100, 10), 0..10);
        assert_eq!(visible_window(50, 100, 10), 45..55);
        assert_eq!(visible_window(99, 100, 10), 90..100);
        assert_eq!(visible_window(5, 100, 0), 5..5);
    }

    #[test]
    fn content_spans_match_plain_text() {
        let view_data = view_data_for_test();
        let prefs = ViewPrefs {
            show_pronunciation: true,
            ..ViewPrefs::default()
        };
        let content = ColumnId::Chinese.render(&view_data.names[0], &prefs);
        let joined = content_spans(&content)
            .iter()
            .map(|span| span.content.as_ref())
            .collect::<String>();
        assert_eq!(joined, content.plain_text());
        assert!(joined.contains("dak6"));
    }

    #[test]
    fn detail_shows_status_tooltip() {
        let mut view_data = view_data_for_test();
        view_data.names_cursor.selected_col = 4;
        let projection = names_projection(&view_data);
        let detail = detail_text(&view_data, &projection);
        assert!(!detail.is_empty());
    }

    #[test]
    fn editor_lines_mark_focus() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        press_chars(&mut state, &mut runtime, &mut view_data, "ej");

        let lines = editor_list_lines(&view_data, ColumnList::Display);
        assert_eq!(lines.len(), 6);
        assert!(lines[0].to_string().starts_with("▸ #"));
        assert!(lines[1].to_string().starts_with("  日文馬名"));
    }

    #[test]
    fn status_text_reports_mode_and_message() {
        let mut state = AppState::default();
        let view_data = view_data_for_test();
        assert!(status_text(&state, &view_data).starts_with("BROWSE | "));
        state.mode = AppMode::Search;
        state.status_line = Some("saved".to_owned());
        assert!(status_text(&state, &view_data).starts_with("SEARCH | saved | "));
    }

    #[test]
    fn help_lists_every_mode() {
        let help = help_overlay_text();
        for prefix in ["global:", "names:", "search:", "columns:", "terms:", "chars:"] {
            assert!(help.contains(prefix), "missing {prefix}");
        }
        assert!(help.contains("ctrl+q quit"));
    }

    #[test]
    fn centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 50, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
        assert_eq!(popup.width, 50);
    }
}
