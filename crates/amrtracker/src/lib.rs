//! `amrtracker` - Track antimicrobial resistance observations
//!
//! This library records resistance percentages keyed by pathogen and
//! antibiotic, keeps them in a local key-value store, and derives a
//! risk-tier summary from them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod record;
pub mod stats;
pub mod storage;
pub mod store;
pub mod tracker;
pub mod ui;

pub use config::Config;
pub use error::{Error, Result};
pub use export::{ExportEntry, ExportPayload};
pub use logging::init_logging;
pub use record::{Field, Record, ValidationError};
pub use stats::{RiskTier, Statistics, Summary};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use store::{Entry, RecordStore, UpsertOutcome};
pub use tracker::{ExportTarget, Tracker};
pub use ui::{ChartRenderer, ConsoleChart, ConsoleNotifier, Notice, Notifier, Severity};
