//! Train Log - thread-safe, step-indexed metric accumulator
//!
//! A [`TrainLog`] buffers scalar metrics in memory and writes them to a
//! Parquet snapshot (see [`crate::snapshot`]), either on an explicit
//! [`TrainLog::save`] or from [`TrainLog::record`] once the flush interval
//! has passed since the last automatic flush.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use runlog::train_log::TrainLog;
//!
//! let log = TrainLog::new("results/train/2024-01-01_00-00-00/0", "validation");
//! log.record(100, [("loss", 0.42), ("top1", 0.87)])?;
//! log.record_single(100, "epoch", 3)?;
//! log.save()?;
//! # Ok::<(), runlog::Error>(())
//! ```

mod table;
mod value;

pub use table::{MetricRow, MetricTable};
pub use value::MetricValue;

use crate::config::{SnapshotCompression, DEFAULT_FLUSH_INTERVAL_SECS};
use crate::snapshot::{self, SNAPSHOT_EXTENSION, STEP_COLUMN};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Shared state guarded by the train log lock.
#[derive(Debug)]
struct LogState {
    table: MetricTable,
    /// `None` until the first automatic flush, so the first record flushes.
    last_flush: Option<Instant>,
}

/// Step-indexed metric log backed by a snapshot file.
///
/// `TrainLog` is `Send + Sync`: a training thread and an evaluation thread
/// can record into the same log. Each public call takes the lock once; a
/// flush triggered by `record` runs while the lock is held, so other
/// recorders wait for the write to finish.
#[derive(Debug)]
pub struct TrainLog {
    log_file_path: PathBuf,
    flush_interval: Duration,
    compression: SnapshotCompression,
    state: Mutex<LogState>,
}

impl TrainLog {
    /// Create a log writing to `<directory>/<name>.parquet` with default
    /// flush interval (300 s) and gzip compression.
    ///
    /// `name` should be a plain file stem. It is appended to `directory`, so
    /// even a name with a leading separator stays under `directory`.
    #[must_use]
    pub fn new(directory: impl AsRef<Path>, name: &str) -> Self {
        TrainLogBuilder::new(directory, name).build()
    }

    /// Create a builder for a log with custom flush interval or compression.
    #[must_use]
    pub fn builder(directory: impl AsRef<Path>, name: &str) -> TrainLogBuilder {
        TrainLogBuilder::new(directory, name)
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.log_file_path
    }

    /// Minimum time between automatic flushes.
    #[must_use]
    pub const fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Record a single metric at `step`.
    ///
    /// Equivalent to `record(step, [(column, value)])`.
    ///
    /// # Errors
    ///
    /// Same as [`TrainLog::record`]
    pub fn record_single(
        &self,
        step: i64,
        column: impl Into<String>,
        value: impl Into<MetricValue>,
    ) -> Result<()> {
        self.record(step, [(column, value)])
    }

    /// Merge `fields` into the row for `step`, flushing if the interval has
    /// elapsed since the last automatic flush.
    ///
    /// Columns already recorded for `step` but absent from `fields` are
    /// kept; columns present in both take the new value.
    ///
    /// # Errors
    ///
    /// Returns error if a field is named like the step index column, if the
    /// lock is poisoned, or if a triggered flush fails. A rejected call
    /// merges nothing.
    pub fn record<I, K, V>(&self, step: i64, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<MetricValue>,
    {
        let fields = fields
            .into_iter()
            .map(|(name, value)| {
                let name = name.into();
                if name == STEP_COLUMN {
                    return Err(Error::InvalidInput(format!(
                        "'{STEP_COLUMN}' is reserved for the step index of {}",
                        self.log_file_path.display()
                    )));
                }
                Ok((name, value.into()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut state = self.lock()?;
        state.table.merge(step, fields);

        let due = state
            .last_flush
            .map_or(true, |at| at.elapsed() >= self.flush_interval);
        if due {
            state.last_flush = Some(Instant::now());
            self.write_locked(&state.table)?;
        }
        Ok(())
    }

    /// Write the full table to the snapshot file, replacing its contents.
    ///
    /// Does not reset the automatic flush timer.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned or the write fails
    pub fn save(&self) -> Result<()> {
        let state = self.lock()?;
        self.write_locked(&state.table)
    }

    /// Copy of the metrics recorded so far.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned
    pub fn table(&self) -> Result<MetricTable> {
        Ok(self.lock()?.table.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, LogState>> {
        self.state
            .lock()
            .map_err(|_| Error::LockPoisoned(self.log_file_path.display().to_string()))
    }

    /// Caller must hold the state lock.
    fn write_locked(&self, table: &MetricTable) -> Result<()> {
        snapshot::write_snapshot(&self.log_file_path, table, self.compression)?;
        tracing::debug!(
            "Flushed {} steps x {} metrics to {}",
            table.len(),
            table.columns().len(),
            self.log_file_path.display()
        );
        Ok(())
    }
}

/// `<directory>/<name>.parquet`, appended rather than joined so that a
/// leading separator in `name` cannot leave `directory`.
fn snapshot_path(directory: &Path, name: &str) -> PathBuf {
    let mut path = directory.as_os_str().to_owned();
    path.push("/");
    path.push(name);
    path.push(".");
    path.push(SNAPSHOT_EXTENSION);
    PathBuf::from(path)
}

/// Builder for `TrainLog`.
#[derive(Debug)]
pub struct TrainLogBuilder {
    log_file_path: PathBuf,
    flush_interval: Duration,
    compression: SnapshotCompression,
}

impl TrainLogBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(directory: impl AsRef<Path>, name: &str) -> Self {
        Self {
            log_file_path: snapshot_path(directory.as_ref(), name),
            flush_interval: Duration::from_secs(DEFAULT_FLUSH_INTERVAL_SECS),
            compression: SnapshotCompression::default(),
        }
    }

    /// Set the minimum time between automatic flushes.
    #[must_use]
    pub const fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Set the snapshot compression.
    #[must_use]
    pub const fn compression(mut self, compression: SnapshotCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Build the `TrainLog`.
    #[must_use]
    pub fn build(self) -> TrainLog {
        TrainLog {
            log_file_path: self.log_file_path,
            flush_interval: self.flush_interval,
            compression: self.compression,
            state: Mutex::new(LogState {
                table: MetricTable::new(),
                last_flush: None,
            }),
        }
    }
}
