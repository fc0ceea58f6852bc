//! Configuration file parsing.
//!
//! Parses individual `.sift.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};

use crate::{BackendKind, ConfigError, FacetScope};

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Indexing section.
    pub index: Option<RawIndexSettings>,
    /// Elasticsearch connection section.
    pub elasticsearch: Option<RawElasticsearchSettings>,
    /// Search section.
    pub search: Option<RawSearchSettings>,
}

/// Raw indexing settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawIndexSettings {
    /// Backend name.
    pub backend: Option<BackendKind>,
    /// Index directory, relative to the config file.
    pub path: Option<String>,
    /// Maximum indexed file size in bytes.
    pub max_file_size: Option<u64>,
    /// Include pattern(s). Accepts a single string or an array.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub include: Option<Vec<String>>,
    /// Exclude pattern(s). Accepts a single string or an array.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub exclude: Option<Vec<String>>,
}

/// Raw Elasticsearch settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawElasticsearchSettings {
    /// Base URL of the cluster.
    pub url: Option<String>,
    /// Index name.
    pub index_name: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Raw search settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Results per page.
    pub page_size: Option<usize>,
    /// Lines of context around matched lines.
    pub context_lines: Option<usize>,
    /// Facet scope.
    pub facet_scope: Option<FacetScope>,
    /// Maximum number of language facets.
    pub facet_limit: Option<usize>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
