//! Run Context - per-run output directories
//!
//! A [`RunContext`] owns the result directory of one training run and hands
//! out [`TrainLog`]s that write their snapshots into it.
//!
//! ## Layout
//!
//! ```text
//! results/
//! └── <program stem>/
//!     └── <YYYY-MM-DD_HH-MM-SS>/
//!         └── <run index>/          result_dir
//!             ├── train.parquet     one file per TrainLog
//!             └── transient/        scratch space
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use runlog::RunContext;
//!
//! let context = RunContext::new("experiments/cifar10_train.py", 0)?;
//! let training_log = context.create_train_log("training");
//! let validation_log = context.create_train_log("validation");
//!
//! training_log.record(1, [("class_loss", 2.31), ("lr", 0.2)])?;
//! validation_log.record_single(1, "top1", 0.11)?;
//! # Ok::<(), runlog::Error>(())
//! ```

mod layout;

pub use layout::{
    program_stem, result_dir, validate_run_index, validate_segment, TIMESTAMP_FORMAT,
};

use crate::config::RunConfig;
use crate::train_log::TrainLog;
use crate::Result;
use chrono::{Local, NaiveDateTime};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

/// Directories of a single training run.
#[derive(Debug, Clone)]
pub struct RunContext {
    result_dir: PathBuf,
    transient_dir: PathBuf,
    started_at: NaiveDateTime,
    config: RunConfig,
}

impl RunContext {
    /// Create the run directories under `results/` with the default config
    /// and the current local time.
    ///
    /// # Errors
    ///
    /// Returns error if the program path or run index cannot name a
    /// directory, if the result directory already exists, or if the
    /// filesystem refuses to create it
    pub fn new(program_path: impl AsRef<Path>, run_index: impl Display) -> Result<Self> {
        RunContextBuilder::new(program_path, run_index).create()
    }

    /// Create a builder for a run with custom config or start time.
    #[must_use]
    pub fn builder(program_path: impl AsRef<Path>, run_index: impl Display) -> RunContextBuilder {
        RunContextBuilder::new(program_path, run_index)
    }

    /// Directory holding this run's snapshots.
    #[must_use]
    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// Scratch subdirectory of the result directory.
    #[must_use]
    pub fn transient_dir(&self) -> &Path {
        &self.transient_dir
    }

    /// Local time used in the directory name.
    #[must_use]
    pub const fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    /// Configuration this run was created with.
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Create a train log writing to `<result_dir>/<name>.parquet`.
    ///
    /// `name` should be a plain file stem; it is appended to the result
    /// directory, so a leading separator cannot place the file elsewhere.
    /// Each name should be used once per run; two logs with the same name
    /// would overwrite each other's snapshot.
    #[must_use]
    pub fn create_train_log(&self, name: &str) -> TrainLog {
        TrainLog::builder(&self.result_dir, name)
            .flush_interval(self.config.flush_interval())
            .compression(self.config.compression)
            .build()
    }
}

/// Builder for `RunContext`.
#[derive(Debug)]
pub struct RunContextBuilder {
    program_path: PathBuf,
    run_index: String,
    config: RunConfig,
    started_at: Option<NaiveDateTime>,
}

impl RunContextBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(program_path: impl AsRef<Path>, run_index: impl Display) -> Self {
        Self {
            program_path: program_path.as_ref().to_path_buf(),
            run_index: run_index.to_string(),
            config: RunConfig::default(),
            started_at: None,
        }
    }

    /// Use a full configuration.
    #[must_use]
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the root directory for runs.
    #[must_use]
    pub fn results_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.results_root = root.into();
        self
    }

    /// Set the timestamp used in the directory name (defaults to now).
    #[must_use]
    pub const fn started_at(mut self, started_at: NaiveDateTime) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Create the run directories and return the context.
    ///
    /// Parent directories are created as needed; the result directory
    /// itself must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns error if the program path, run index or transient directory
    /// name is invalid, or if either directory cannot be created
    pub fn create(self) -> Result<RunContext> {
        let stem = program_stem(&self.program_path)?;
        validate_run_index(&self.run_index)?;
        validate_segment("Transient directory name", &self.config.transient_dir_name)?;

        let started_at = self
            .started_at
            .unwrap_or_else(|| Local::now().naive_local());
        let result_dir = result_dir(&self.config.results_root, &stem, started_at, &self.run_index);
        let transient_dir = result_dir.join(&self.config.transient_dir_name);

        if let Some(parent) = result_dir.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir(&result_dir)?;
        fs::create_dir(&transient_dir)?;

        tracing::info!("Results of run {} in {}", self.run_index, result_dir.display());

        Ok(RunContext {
            result_dir,
            transient_dir,
            started_at,
            config: self.config,
        })
    }
}
