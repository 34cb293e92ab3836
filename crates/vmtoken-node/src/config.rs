//! # Node Configuration
//!
//! Spawn parameters and persistence settings for the hosted instance.
//!
//! Loaded from a JSON file named by the first CLI argument or `VT_CONFIG`,
//! then overridden from the environment:
//!
//! - `VT_CHECKPOINT_PATH`: checkpoint directory
//! - `VT_CHECKPOINT_EVERY`: committed actions between checkpoints (0 disables)

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vmtoken_ledger::{SpawnParams, TokenKind};

/// Default number of committed actions between checkpoints.
pub const DEFAULT_CHECKPOINT_EVERY: u64 = 100;

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeConfig {
    /// Instance kind (`basic` or `cross-chain`).
    #[serde(default)]
    pub kind: TokenKind,
    /// Instance id, creator and spawn params.
    pub spawn: SpawnParams,
    /// Directory holding checkpoint blobs. No persistence when absent.
    #[serde(default)]
    pub checkpoint_path: Option<PathBuf>,
    /// Committed actions between checkpoints.
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: u64,
}

fn default_checkpoint_every() -> u64 {
    DEFAULT_CHECKPOINT_EVERY
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither a CLI argument nor `VT_CONFIG` named a file.
    #[error("no configuration file given (pass a path or set VT_CONFIG)")]
    Missing,

    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not a valid configuration.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// An environment override has the wrong shape.
    #[error("invalid value for {name}: {value}")]
    Override {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
}

impl NodeConfig {
    /// Parse a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and parse `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Load from `arg` (or `VT_CONFIG`) and apply environment overrides.
    pub fn load(arg: Option<String>) -> Result<Self, ConfigError> {
        let path = arg
            .or_else(|| std::env::var("VT_CONFIG").ok())
            .ok_or(ConfigError::Missing)?;
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("VT_CHECKPOINT_PATH").filter(|p| !p.is_empty()) {
            self.checkpoint_path = Some(PathBuf::from(path));
        }
        if let Some(every) = lookup("VT_CHECKPOINT_EVERY") {
            self.checkpoint_every = every.parse().map_err(|_| ConfigError::Override {
                name: "VT_CHECKPOINT_EVERY",
                value: every,
            })?;
        }
        Ok(())
    }
}
