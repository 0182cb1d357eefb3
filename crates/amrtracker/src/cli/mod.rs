//! Command-line interface for amrtracker.
//!
//! This module provides the CLI structure for the `amrtrack` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ClearCommand, ConfigCommand, ExportCommand, ListCommand, OutputFormat,
    SummaryCommand,
};

use crate::logging::Verbosity;

/// amrtrack - Track antimicrobial resistance observations
///
/// Records resistance percentages per pathogen/antibiotic pair, draws them
/// as a bar chart and summarises them by risk tier.
#[derive(Debug, Parser)]
#[command(name = "amrtrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress status messages and all logs except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Do not write sample records on first run
    #[arg(long, global = true)]
    pub no_seed: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add or update a resistance observation
    Add(AddCommand),

    /// Show total, average and risk-tier counts
    Summary(SummaryCommand),

    /// Draw the resistance bar chart
    Chart,

    /// List stored observations
    List(ListCommand),

    /// Remove all observations
    Clear(ClearCommand),

    /// Export observations as JSON
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
