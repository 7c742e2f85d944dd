//! Writer configuration.
//!
//! Per-writer settings live in `WriterConfig`. The process-wide default
//! row-group size is kept apart from it: `set_default_max_row_group_size`
//! only affects writers constructed after the call, and any writer whose
//! config names an explicit size ignores it.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 512 MiB.
pub const DEFAULT_MAX_ROW_GROUP_SIZE: u64 = 512 * 1024 * 1024;

pub const ENV_MAX_ROW_GROUP_SIZE: &str = "PQSTREAM_MAX_ROW_GROUP_SIZE";
pub const ENV_COMPRESSION: &str = "PQSTREAM_COMPRESSION";

static DEFAULT_ROW_GROUP_SIZE: AtomicU64 = AtomicU64::new(DEFAULT_MAX_ROW_GROUP_SIZE);

/// Set the row-group size used by writers constructed from now on that do not
/// configure their own. Intended to be called once at startup; 0 disables
/// size-based rotation for those writers.
pub fn set_default_max_row_group_size(max_size: u64) {
    DEFAULT_ROW_GROUP_SIZE.store(max_size, Ordering::Relaxed);
}

pub fn default_max_row_group_size() -> u64 {
    DEFAULT_ROW_GROUP_SIZE.load(Ordering::Relaxed)
}

/// Compression codec applied by the storage engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Uncompressed,
    #[default]
    Snappy,
    Gzip,
    Zstd,
    Lz4,
    Brotli,
}

impl std::str::FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "uncompressed" | "none" => Ok(Codec::Uncompressed),
            "snappy" => Ok(Codec::Snappy),
            "gzip" => Ok(Codec::Gzip),
            "zstd" => Ok(Codec::Zstd),
            "lz4" => Ok(Codec::Lz4),
            "brotli" => Ok(Codec::Brotli),
            other => Err(Error::Config(format!("unknown compression codec '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Row-group rotation threshold in bytes. `None` uses the process default;
    /// `Some(0)` disables size-based rotation.
    pub max_row_group_size: Option<u64>,
    pub compression: Codec,
}

impl WriterConfig {
    /// Build a config from `PQSTREAM_MAX_ROW_GROUP_SIZE` and `PQSTREAM_COMPRESSION`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut cfg = WriterConfig::default();
        if let Ok(raw) = std::env::var(ENV_MAX_ROW_GROUP_SIZE) {
            let size = raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("{}='{}': {}", ENV_MAX_ROW_GROUP_SIZE, raw, e))
            })?;
            cfg.max_row_group_size = Some(size);
        }
        if let Ok(raw) = std::env::var(ENV_COMPRESSION) {
            cfg.compression = raw.trim().parse()?;
        }
        Ok(cfg)
    }

    pub fn with_max_row_group_size(mut self, max_size: u64) -> Self {
        self.max_row_group_size = Some(max_size);
        self
    }

    pub fn with_compression(mut self, compression: Codec) -> Self {
        self.compression = compression;
        self
    }

    /// Threshold a writer constructed now should use.
    pub fn effective_max_row_group_size(&self) -> u64 {
        self.max_row_group_size
            .unwrap_or_else(default_max_row_group_size)
    }
}
