//! # runlog: Run Directories and Training Metric Logs
//!
//! **Version**: 0.1.0
//!
//! runlog is the bookkeeping layer of a training script: it creates a
//! timestamped result directory per run and buffers scalar metrics keyed by
//! training step, flushing them periodically to a compressed Parquet
//! snapshot.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: Every I/O or encoding failure stops the call that hit it
//! - **Poka-Yoke**: Existing run directories are never reused
//! - **Heijunka**: Snapshot writes are rate-limited by a flush interval
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use runlog::{logging, RunContext};
//! use tracing::Level;
//!
//! logging::init(Level::INFO)?;
//!
//! let context = RunContext::new("experiments/cifar10.py", 0)?;
//! let log = context.create_train_log("training");
//!
//! for step in 0..1000_i64 {
//!     let loss = 1.0 / (step as f64 + 1.0);
//!     log.record(step, [("class_loss", loss), ("lr", 0.05)])?;
//! }
//! log.save()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod snapshot;
pub mod train_log;

pub use config::{RunConfig, SnapshotCompression};
pub use context::{RunContext, RunContextBuilder};
pub use error::{Error, Result};
pub use train_log::{MetricTable, MetricValue, TrainLog, TrainLogBuilder};
