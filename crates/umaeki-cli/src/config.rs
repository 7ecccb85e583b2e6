// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use umaeki_app::Section;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            data: Data::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

/// Dataset overrides; the bundled copies are used when unset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub names_path: Option<String>,
    pub terms_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub section: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("UMAEKI_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set UMAEKI_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(umaeki_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version; add `version = 1` at the top",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            umaeki_db::validate_db_path(db_path)?;
        }

        for (key, value) in [
            ("data.names_path", &self.data.names_path),
            ("data.terms_path", &self.data.terms_path),
            ("log.path", &self.log.path),
        ] {
            if value.as_deref().is_some_and(|value| value.trim().is_empty()) {
                bail!(
                    "{key} in {} must not be empty; remove the key to use the default",
                    path.display()
                );
            }
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!(
                    "log.level {level:?} in {} is not a valid filter; use a level such as info or debug",
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => umaeki_db::default_db_path(),
        }
    }

    pub fn names_path(&self) -> Option<PathBuf> {
        self.data.names_path.as_deref().map(PathBuf::from)
    }

    pub fn terms_path(&self) -> Option<PathBuf> {
        self.data.terms_path.as_deref().map(PathBuf::from)
    }

    pub fn section(&self) -> Option<&str> {
        self.ui.section.as_deref()
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let cache_root = dirs::cache_dir().ok_or_else(|| {
            anyhow!("cannot resolve cache directory; set [log].path in the config")
        })?;
        Ok(cache_root.join(umaeki_db::APP_NAME).join("umaeki.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# umaeki config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/umaeki/umaeki.db)\n# db_path = \"/absolute/path/to/umaeki.db\"\n\n[data]\n# Optional. The bundled datasets are used when unset.\n# names_path = \"/absolute/path/to/names.csv\"\n# terms_path = \"/absolute/path/to/terms.csv\"\n\n[ui]\n# names, terms or chars\nsection = \"{}\"\n\n[log]\nlevel = \"{}\"\n# path = \"/absolute/path/to/umaeki.log\"\n",
            path.display(),
            Section::default().fragment().trim_start_matches('#'),
            DEFAULT_LOG_LEVEL,
        )
    }
}
