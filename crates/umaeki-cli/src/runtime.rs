// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::path::PathBuf;
use umaeki_app::{HorseRow, TermRow, ViewPrefs};
use umaeki_db::Store;

/// Datasets come from the configured files, or the bundled copies when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSources {
    pub names_path: Option<PathBuf>,
    pub terms_path: Option<PathBuf>,
}

impl DataSources {
    pub fn load_names(&self) -> Result<Vec<HorseRow>> {
        match &self.names_path {
            Some(path) => umaeki_db::load_names(path),
            None => umaeki_db::bundled_names(),
        }
    }

    pub fn load_terms(&self) -> Result<Vec<TermRow>> {
        match &self.terms_path {
            Some(path) => umaeki_db::load_terms(path),
            None => umaeki_db::bundled_terms(),
        }
    }
}

pub struct DbRuntime<'a> {
    store: &'a Store,
    sources: DataSources,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store, sources: DataSources) -> Self {
        Self { store, sources }
    }
}

impl umaeki_tui::AppRuntime for DbRuntime<'_> {
    fn load_names(&mut self) -> Result<Vec<HorseRow>> {
        self.sources.load_names()
    }

    fn load_terms(&mut self) -> Result<Vec<TermRow>> {
        self.sources.load_terms()
    }

    fn load_chars(&mut self) -> Result<String> {
        Ok(umaeki_db::BUNDLED_CHARS.to_owned())
    }

    fn load_view_prefs(&mut self) -> Result<ViewPrefs> {
        Ok(self.store.load_view_prefs())
    }

    fn save_view_prefs(&mut self, prefs: &ViewPrefs) -> Result<()> {
        self.store.save_view_prefs(prefs)
    }
}
