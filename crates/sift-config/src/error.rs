//! Error types for sift configuration.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::de;

/// Errors raised while loading `.sift.toml` files or compiling their settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    ReadFile {
        /// The unreadable file.
        path: PathBuf,
        /// I/O failure.
        source: io::Error,
    },

    /// A config file is not valid TOML or has fields of the wrong type.
    #[error("invalid configuration in {path}: {source}")]
    ParseToml {
        /// The rejected file.
        path: PathBuf,
        /// Deserialization failure, with line and column.
        source: de::Error,
    },

    /// An `[index]` include or exclude glob does not compile.
    #[error("invalid path pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Glob compilation failure.
        source: globset::Error,
    },

    /// A `~` path was configured but no home directory is known.
    #[error("cannot expand '~': home directory unknown")]
    NoHomeDirectory,
}
