//! `amrtrack` - CLI for amrtracker
//!
//! This binary is the front end for the record store: it parses a command,
//! opens the store, and lets a [`Tracker`] carry the command out.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use amrtracker::cli::{
    ClearCommand, Cli, Command, ConfigCommand, ExportCommand, ListCommand, OutputFormat,
};
use amrtracker::store::seed_samples;
use amrtracker::{
    init_logging, Config, ConsoleChart, ConsoleNotifier, ExportTarget, RecordStore, RiskTier,
    SqliteStore, Tracker,
};

type ConsoleTracker = Tracker<SqliteStore, ConsoleNotifier<io::Stdout>, ConsoleChart<io::Stdout>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    let open = || open_tracker(&config, !cli.no_seed, cli.quiet);

    match cli.command {
        Command::Config(cmd) => handle_config(&config, cmd)?,
        Command::Add(add) => {
            let mut tracker = open()?;
            match tracker.submit(&add.pathogen, &add.antibiotic, &add.resistance) {
                Ok(_) => {}
                Err(e) if e.is_validation() => {
                    for field_error in e.field_errors() {
                        eprintln!("{}: {}", field_error.field, field_error.reason);
                    }
                    return Ok(ExitCode::from(2));
                }
                Err(e) => return Err(e).context("saving record"),
            }
        }
        Command::Summary(summary) => {
            let mut tracker = open()?;
            if summary.json {
                let stats = tracker.store().statistics();
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                tracker.render_summary();
            }
        }
        Command::Chart => open()?.render_chart(),
        Command::List(list) => handle_list(&open()?, &list)?,
        Command::Clear(clear) => handle_clear(&mut open()?, &clear)?,
        Command::Export(export) => handle_export(&mut open()?, &config, &export)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn open_tracker(config: &Config, seed: bool, quiet: bool) -> anyhow::Result<ConsoleTracker> {
    let path = config.database_path();
    let mut backend = SqliteStore::open(&path)
        .with_context(|| format!("opening store at {}", path.display()))?;

    if seed && config.bootstrap.seed_samples {
        let seeded = seed_samples(&mut backend, &config.storage.key)?;
        debug!(seeded, "First-run seeding checked");
    }

    let store = RecordStore::load(backend, config.storage.key.clone());
    Ok(Tracker::new(
        store,
        ConsoleNotifier::new(io::stdout()).quiet(quiet),
        ConsoleChart::new(io::stdout(), config.chart.width),
    ))
}

fn handle_list(tracker: &ConsoleTracker, cmd: &ListCommand) -> anyhow::Result<()> {
    let entries = tracker.store().entries();
    match cmd.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entries)?);
        }
        OutputFormat::Plain => {
            for entry in entries {
                println!("{}\t{}", entry.label, entry.resistance);
            }
        }
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("{}", amrtracker::ui::NO_DATA_MESSAGE);
                return Ok(());
            }
            let width = entries
                .iter()
                .map(|e| e.label.chars().count())
                .max()
                .unwrap_or(0)
                .max("Pathogen / Antibiotic".len());
            println!("{:<width$}  {:>10}  Risk", "Pathogen / Antibiotic", "Resistance");
            println!("{}  {}  {}", "-".repeat(width), "-".repeat(10), "-".repeat(13));
            for entry in entries {
                println!(
                    "{:<width$}  {:>9.1}%  {}",
                    entry.label,
                    entry.resistance,
                    RiskTier::classify(entry.resistance)
                );
            }
        }
    }
    Ok(())
}

fn handle_clear(tracker: &mut ConsoleTracker, cmd: &ClearCommand) -> anyhow::Result<()> {
    let yes = cmd.yes;
    let confirmed = || {
        yes || confirm("Are you sure you want to clear all data? This action cannot be undone.")
    };
    tracker.clear(confirmed).context("clearing records")?;
    Ok(())
}

fn handle_export(
    tracker: &mut ConsoleTracker,
    config: &Config,
    cmd: &ExportCommand,
) -> anyhow::Result<()> {
    if cmd.stdout {
        if let Some(json) = tracker.export_json()? {
            println!("{json}");
        }
        return Ok(());
    }

    let target = match &cmd.output {
        Some(path) => ExportTarget::File(path.clone()),
        None => ExportTarget::Directory(config.export_dir()),
    };
    if let Some(path) = tracker.export_to(&target).context("writing export")? {
        println!("{}", path.display());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Storage key:        {}", config.storage.key);
                println!();
                println!("[Bootstrap]");
                println!("  Seed samples:       {}", config.bootstrap.seed_samples);
                println!();
                println!("[Export]");
                println!("  Directory:          {}", config.export_dir().display());
                println!();
                println!("[Chart]");
                println!("  Width:              {}", config.chart.width);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

/// Ask a yes/no question on the terminal; anything but "y"/"yes" is no.
fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
