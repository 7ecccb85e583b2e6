// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod log;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use runtime::{DataSources, DbRuntime};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use umaeki_app::{AppState, Section, project_names};
use umaeki_db::Store;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `umaeki --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let db_path = config.db_path()?;
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let _log_guard = log::init(
        &config.log_path()?,
        &log::directive_from_env(config.log_level()),
    )?;
    info!(config = %options.config_path.display(), db = %db_path.display(), "starting");

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {}; if this path is wrong, set [storage].db_path or UMAEKI_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;

    if options.reset_view {
        let removed = store.clear_view_prefs()?;
        info!(removed, "view preferences reset");
        println!("cleared {removed} saved view settings");
        return Ok(());
    }

    let sources = DataSources {
        names_path: options.data_path.clone().or_else(|| config.names_path()),
        terms_path: config.terms_path(),
    };

    if options.check_only {
        let names = sources.load_names()?;
        let terms = sources.load_terms()?;
        info!(names = names.len(), terms = terms.len(), "check passed");
        return Ok(());
    }

    if options.print_table {
        let names = sources.load_names()?;
        let prefs = store.load_view_prefs();
        print!("{}", project_names(&names, &prefs).to_tsv(&prefs));
        return Ok(());
    }

    let section = resolve_section(options.section.as_deref().or(config.section()));
    let mut state = AppState::new(section);
    let mut runtime = DbRuntime::new(&store, sources);
    umaeki_tui::run_app(&mut state, &mut runtime)
}

fn resolve_section(value: Option<&str>) -> Section {
    let Some(value) = value else {
        return Section::default();
    };
    Section::from_fragment(value).unwrap_or_else(|| {
        warn!(section = value, "unknown section; opening the first one");
        Section::from_fragment_or_first(value)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    data_path: Option<PathBuf>,
    section: Option<String>,
    print_config_path: bool,
    print_db_path: bool,
    print_example: bool,
    print_table: bool,
    reset_view: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        data_path: None,
        section: None,
        print_config_path: false,
        print_db_path: false,
        print_example: false,
        print_table: false,
        reset_view: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--data" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--data requires a names CSV path"))?;
                options.data_path = Some(PathBuf::from(value.as_ref()));
            }
            "--section" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("--section requires one of names, terms, chars")
                })?;
                options.section = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--print-table" => {
                options.print_table = true;
            }
            "--reset-view" => {
                options.reset_view = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("umaeki: horse name translation browser");
    println!("  --config <path>          Use a specific config path");
    println!("  --data <csv>             Read horse names from this CSV");
    println!("  --section <name>         Open names, terms or chars");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a config template");
    println!("  --print-table            Print the names table as TSV with saved view settings");
    println!("  --reset-view             Forget saved view settings");
    println!("  --check                  Validate config, database and datasets");
    println!("  --help                   Show this help");
}
