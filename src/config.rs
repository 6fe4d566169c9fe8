//! Run configuration
//!
//! Every field has a default matching the classic layout, so an empty JSON
//! object (or no config at all) yields `results/<stem>/<timestamp>/<run>`
//! with a five minute flush interval and gzip snapshots.

use crate::Result;
use parquet::basic::{Compression, GzipLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default root under which run directories are created
pub const DEFAULT_RESULTS_ROOT: &str = "results";

/// Default name of the scratch subdirectory inside a run directory
pub const DEFAULT_TRANSIENT_DIR: &str = "transient";

/// Default time between automatic flushes (5 minutes)
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 300;

/// Default gzip level for snapshots
pub const DEFAULT_GZIP_LEVEL: u32 = 6;

/// Compression codec used when writing metric snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "codec", rename_all = "snake_case")]
pub enum SnapshotCompression {
    /// Plain Parquet pages.
    Uncompressed,
    /// Deflate (zlib family) pages at the given level (0-10).
    Gzip {
        /// Compression level
        level: u32,
    },
}

impl Default for SnapshotCompression {
    fn default() -> Self {
        Self::Gzip {
            level: DEFAULT_GZIP_LEVEL,
        }
    }
}

impl SnapshotCompression {
    /// Convert to the Parquet writer setting.
    ///
    /// # Errors
    ///
    /// Returns error if the gzip level is out of range
    pub fn to_parquet(self) -> Result<Compression> {
        match self {
            Self::Uncompressed => Ok(Compression::UNCOMPRESSED),
            Self::Gzip { level } => Ok(Compression::GZIP(GzipLevel::try_new(level).map_err(
                |e| crate::Error::InvalidInput(format!("gzip level {level}: {e}")),
            )?)),
        }
    }
}

/// Configuration for a run and the train logs it hands out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Root directory for all runs
    pub results_root: PathBuf,
    /// Scratch subdirectory name
    pub transient_dir_name: String,
    /// Seconds between automatic flushes triggered by `record`
    pub flush_interval_secs: u64,
    /// Snapshot codec
    pub compression: SnapshotCompression,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            results_root: PathBuf::from(DEFAULT_RESULTS_ROOT),
            transient_dir_name: DEFAULT_TRANSIENT_DIR.to_string(),
            flush_interval_secs: DEFAULT_FLUSH_INTERVAL_SECS,
            compression: SnapshotCompression::default(),
        }
    }
}

impl RunConfig {
    /// Flush interval as a `Duration`.
    #[must_use]
    pub const fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }

    /// Parse a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or has wrongly-typed fields
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }
}
