//! Front-end adapter.
//!
//! [`Tracker`] turns user actions into [`RecordStore`] calls and turns the
//! results into notices and redraws. It holds no state of its own beyond
//! the store and its two collaborators.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::Record;
use crate::storage::KeyValueStore;
use crate::store::{RecordStore, UpsertOutcome};
use crate::ui::{ChartRenderer, Notice, Notifier};

/// Where an export should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Write into a directory under the default dated file name.
    Directory(PathBuf),
    /// Write to this exact file.
    File(PathBuf),
}

/// Drives a record store on behalf of a user interface.
#[derive(Debug)]
pub struct Tracker<S, N, C> {
    store: RecordStore<S>,
    notifier: N,
    chart: C,
}

impl<S, N, C> Tracker<S, N, C>
where
    S: KeyValueStore,
    N: Notifier,
    C: ChartRenderer,
{
    /// Wrap a loaded store.
    pub fn new(store: RecordStore<S>, notifier: N, chart: C) -> Self {
        Self {
            store,
            notifier,
            chart,
        }
    }

    /// Handle a form submission of raw field text.
    ///
    /// Every field is validated before anything changes. On success the
    /// record is stored, a notice is sent and the view is redrawn.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSubmission`] listing every invalid field, or a
    /// storage error if the record cannot be saved.
    pub fn submit(
        &mut self,
        pathogen: &str,
        antibiotic: &str,
        resistance: &str,
    ) -> Result<UpsertOutcome> {
        let record = Record::from_form(pathogen, antibiotic, resistance)
            .map_err(|errors| Error::InvalidSubmission { errors })?;

        let outcome = self.store.upsert_record(record)?;
        self.notifier.notify(&match outcome {
            UpsertOutcome::Created => Notice::success("Data added successfully!"),
            UpsertOutcome::Updated => Notice::warning("Data updated successfully!"),
        });
        self.refresh();
        Ok(outcome)
    }

    /// Clear every record after asking `confirm`.
    ///
    /// An empty store is reported without asking. Returns whether the
    /// records were cleared.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the empty collection cannot be saved.
    pub fn clear(&mut self, confirm: impl FnOnce() -> bool) -> Result<bool> {
        if self.store.is_empty() {
            self.notifier.notify(&Notice::info("No data to clear"));
            return Ok(false);
        }
        if !confirm() {
            debug!("Clear declined");
            return Ok(false);
        }

        self.store.clear()?;
        self.refresh();
        self.notifier
            .notify(&Notice::info("All data cleared successfully"));
        Ok(true)
    }

    /// Export the collection to a file.
    ///
    /// Returns the written path, or `None` if there was nothing to export.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export_to(&mut self, target: &ExportTarget) -> Result<Option<PathBuf>> {
        let Some(payload) = self.export_payload()? else {
            return Ok(None);
        };

        let path = match target {
            ExportTarget::Directory(dir) => payload.write_into(dir)?,
            ExportTarget::File(path) => {
                payload.write_to(path)?;
                path.clone()
            }
        };
        self.notifier
            .notify(&Notice::success("Data exported successfully!"));
        Ok(Some(path))
    }

    /// Export the collection as pretty JSON text.
    ///
    /// Returns `None` if there was nothing to export.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&mut self) -> Result<Option<String>> {
        match self.export_payload()? {
            Some(payload) => payload.to_json_pretty().map(Some),
            None => Ok(None),
        }
    }

    fn export_payload(&mut self) -> Result<Option<crate::export::ExportPayload>> {
        match self.store.export() {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.is_empty_store() => {
                self.notifier.notify(&Notice::info("No data to export"));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Redraw the chart and the summary.
    pub fn refresh(&mut self) {
        self.render_chart();
        self.render_summary();
    }

    /// Redraw only the chart.
    pub fn render_chart(&mut self) {
        let labels = self.store.labels();
        let values = self.store.values();
        self.chart.render_chart(&labels, &values);
    }

    /// Redraw only the summary.
    pub fn render_summary(&mut self) {
        self.chart.render_summary(&self.store.statistics());
    }

    /// The wrapped store.
    #[must_use]
    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    /// The notifier.
    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The chart renderer.
    #[must_use]
    pub fn chart(&self) -> &C {
        &self.chart
    }

    /// Export into `dir` under the default dated file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export_into(&mut self, dir: &Path) -> Result<Option<PathBuf>> {
        self.export_to(&ExportTarget::Directory(dir.to_path_buf()))
    }
}
