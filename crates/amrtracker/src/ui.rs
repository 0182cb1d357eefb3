//! Presentation collaborators.
//!
//! The record store never draws anything. Whatever front end drives it
//! supplies a [`Notifier`] for short status messages and a [`ChartRenderer`]
//! for the bar chart and summary panel. Console implementations of both
//! live here.

use std::io::Write;

use serde::Serialize;
use tracing::{debug, warn};

use crate::stats::{RiskTier, Summary, HIGH_RISK_THRESHOLD, MODERATE_RISK_THRESHOLD};

/// Message shown when there is nothing to chart or summarise.
pub const NO_DATA_MESSAGE: &str =
    "No data entries yet. Add your first entry to see the visualization.";

/// Longest label drawn before truncation, in characters.
const MAX_LABEL_CHARS: usize = 40;

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The action succeeded.
    Success,
    /// The action succeeded but changed existing data.
    Warning,
    /// Nothing went wrong; for information only.
    Info,
}

impl Severity {
    fn icon(self) -> &'static str {
        match self {
            Self::Success => "✔",
            Self::Warning => "⚠",
            Self::Info => "ℹ",
        }
    }
}

/// A short, fire-and-forget status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Text shown to the user.
    pub message: String,
    /// Presentation hint.
    pub severity: Severity,
}

impl Notice {
    /// Create a notice.
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    /// Success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    /// Warning notice.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    /// Informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }
}

/// Receives status messages.
pub trait Notifier {
    /// Show a notice. Nothing is returned to the caller.
    fn notify(&mut self, notice: &Notice);
}

/// Draws the record collection.
pub trait ChartRenderer {
    /// Redraw the chart from aligned labels and values.
    fn render_chart(&mut self, labels: &[&str], values: &[f64]);

    /// Redraw the summary panel.
    fn render_summary(&mut self, summary: &Summary);
}

/// Writes notices as single lines prefixed with an icon.
///
/// A quiet notifier only logs notices at debug level.
#[derive(Debug)]
pub struct ConsoleNotifier<W> {
    out: W,
    quiet: bool,
}

impl<W: Write> ConsoleNotifier<W> {
    /// Create a notifier writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, quiet: false }
    }

    /// Stop writing notices to the output.
    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    fn notify(&mut self, notice: &Notice) {
        if self.quiet {
            debug!(severity = ?notice.severity, message = %notice.message, "Notice suppressed");
            return;
        }
        if let Err(e) = writeln!(self.out, "{} {}", notice.severity.icon(), notice.message) {
            warn!(error = %e, "Failed to write notice");
        }
    }
}

/// Draws horizontal bars scaled to 0-100% and a plain-text summary.
#[derive(Debug)]
pub struct ConsoleChart<W> {
    out: W,
    width: usize,
}

impl<W: Write> ConsoleChart<W> {
    /// Create a chart writing to `out`, where a 100% bar is `width` cells.
    pub fn new(out: W, width: usize) -> Self {
        Self { out, width }
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_chart(&mut self, labels: &[&str], values: &[f64]) -> std::io::Result<()> {
        if labels.is_empty() {
            return writeln!(self.out, "{NO_DATA_MESSAGE}");
        }

        let labels: Vec<String> = labels.iter().map(|l| truncate(l, MAX_LABEL_CHARS)).collect();
        let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        writeln!(self.out, "Resistance (%)")?;
        for (label, &value) in labels.iter().zip(values) {
            let filled = bar_cells(value, self.width);
            writeln!(
                self.out,
                "{label:<label_width$}  {}{}  {value:>5.1}%  {}",
                "█".repeat(filled),
                "·".repeat(self.width - filled),
                RiskTier::classify(value).label(),
            )?;
        }
        Ok(())
    }

    fn write_summary(&mut self, summary: &Summary) -> std::io::Result<()> {
        let Some(stats) = summary.statistics() else {
            return writeln!(self.out, "{NO_DATA_MESSAGE}");
        };

        writeln!(self.out, "Total entries:       {}", stats.total)?;
        writeln!(self.out, "Average resistance:  {:.1}%", stats.average)?;
        writeln!(
            self.out,
            "High risk (≥{HIGH_RISK_THRESHOLD}%):     {}",
            stats.high
        )?;
        writeln!(
            self.out,
            "Moderate risk ({MODERATE_RISK_THRESHOLD}-{}%): {}",
            HIGH_RISK_THRESHOLD - 1.0,
            stats.moderate
        )?;
        writeln!(
            self.out,
            "Low risk (<{MODERATE_RISK_THRESHOLD}%):      {}",
            stats.low
        )
    }
}

impl<W: Write> ChartRenderer for ConsoleChart<W> {
    fn render_chart(&mut self, labels: &[&str], values: &[f64]) {
        if let Err(e) = self.write_chart(labels, values) {
            warn!(error = %e, "Failed to draw chart");
        }
    }

    fn render_summary(&mut self, summary: &Summary) {
        if let Err(e) = self.write_summary(summary) {
            warn!(error = %e, "Failed to draw summary");
        }
    }
}

/// Number of filled cells for a percentage, clamped to `width`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar_cells(value: f64, width: usize) -> usize {
    let cells = (value.clamp(0.0, 100.0) / 100.0 * width as f64).round() as usize;
    cells.min(width)
}

fn truncate(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(max - 1).collect();
        short.push('…');
        short
    }
}
