// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Browse,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HelpVisibility {
    #[default]
    Hidden,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub mode: AppMode,
    pub active_section: Section,
    pub help: HelpVisibility,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextSection,
    PrevSection,
    SelectSection(Section),
    StartSearch,
    FinishSearch,
    ToggleHelp,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    SectionChanged(Section),
    HelpVisibilityChanged(HelpVisibility),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn new(section: Section) -> Self {
        Self {
            active_section: section,
            ..Self::default()
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextSection => self.rotate_section(1),
            AppCommand::PrevSection => self.rotate_section(-1),
            AppCommand::SelectSection(section) => {
                self.mode = AppMode::Browse;
                self.active_section = section;
                vec![AppEvent::SectionChanged(section)]
            }
            AppCommand::StartSearch => {
                if self.active_section != Section::Names {
                    return vec![self.set_status("search applies to the names table")];
                }
                self.mode = AppMode::Search;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::FinishSearch => {
                self.mode = AppMode::Browse;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ToggleHelp => {
                self.help = match self.help {
                    HelpVisibility::Hidden => HelpVisibility::Visible,
                    HelpVisibility::Visible => HelpVisibility::Hidden,
                };
                vec![AppEvent::HelpVisibilityChanged(self.help)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_section(&mut self, delta: isize) -> Vec<AppEvent> {
        let sections = Section::ALL;
        let current = sections
            .iter()
            .position(|section| *section == self.active_section)
            .unwrap_or(0) as isize;
        let len = sections.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.mode = AppMode::Browse;
        self.active_section = sections[next];
        vec![AppEvent::SectionChanged(self.active_section)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
