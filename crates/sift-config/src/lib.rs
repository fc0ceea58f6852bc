//! Configuration system for sift.
//!
//! sift uses TOML configuration files named `.sift.toml`. Configuration is resolved by walking
//! up the directory tree from the current working directory, collecting any `.sift.toml` files
//! found, then loading `~/.sift.toml` as the global config with lowest precedence.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod patterns;
mod resolve;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use directories::BaseDirs;
pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawElasticsearchSettings, RawIndexSettings, RawSearchSettings, parse_config_file,
    parse_config_str,
};
pub use patterns::PathFilter;
pub use resolve::resolve_path;
use serde::{Deserialize, Serialize};
pub use templates::config_template;
pub use validate::ConfigWarning;
use validate::validate_config;

/// Directory name for sift data (sibling to `.sift.toml`).
const SIFT_DIR: &str = ".sift";
/// Subdirectory within `.sift` for the embedded index.
const INDEX_DIR: &str = "index";

/// Top-level merged configuration for sift.
///
/// This represents the fully resolved configuration after merging all discovered `.sift.toml`
/// files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Indexing settings.
    pub index: IndexSettings,
    /// Connection settings for the Elasticsearch backend.
    pub elasticsearch: ElasticsearchSettings,
    /// Search and rendering settings.
    pub search: SearchSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.sift.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Compiles the include/exclude patterns that decide which paths are indexed.
    pub fn path_filter(&self) -> Result<PathFilter, ConfigError> {
        PathFilter::compile(&self.index.include, &self.index.exclude)
    }

    /// Returns the directory holding the embedded index.
    ///
    /// An explicit `index.path` wins. Otherwise the index lives in `.sift/index/` next to the
    /// most specific config file, or in `~/.sift/index/` when no config file was found.
    pub fn index_directory(&self) -> Option<PathBuf> {
        if let Some(path) = &self.index.path {
            return Some(path.clone());
        }
        match &self.config_root {
            Some(root) => Some(root.join(SIFT_DIR).join(INDEX_DIR)),
            None => global_data_directory().map(|dir| dir.join(INDEX_DIR)),
        }
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML format.
    pub fn settings_to_toml(&self) -> Result<String, toml::ser::Error> {
        let serializable = SerializableSettings {
            index: SerializableIndexSettings::from(&self.index),
            elasticsearch: self.elasticsearch.clone(),
            search: self.search.clone(),
        };
        toml::to_string_pretty(&serializable)
    }
}

/// Returns `~/.sift`, the data directory used when no local config exists.
pub fn global_data_directory() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(SIFT_DIR))
}

/// The full-text engine behind the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Embedded Tantivy index stored on local disk.
    #[default]
    Tantivy,
    /// Remote Elasticsearch cluster.
    Elasticsearch,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tantivy" => Ok(Self::Tantivy),
            "elasticsearch" | "elastic" => Ok(Self::Elasticsearch),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tantivy => write!(f, "tantivy"),
            Self::Elasticsearch => write!(f, "elasticsearch"),
        }
    }
}

/// Which result set the language facet counts describe.
///
/// With `Unfiltered`, a language-filtered search still reports counts for every language
/// matching the keyword, so sibling filters stay visible. With `Filtered`, counts only cover
/// the filtered results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetScope {
    /// Facets ignore the language filter.
    #[default]
    Unfiltered,
    /// Facets reflect the language filter.
    Filtered,
}

/// Indexing settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Which backend stores the index.
    pub backend: BackendKind,
    /// Resolved directory for the embedded index, if set explicitly.
    pub path: Option<PathBuf>,
    /// Files larger than this many bytes are not indexed.
    pub max_file_size: u64,
    /// Glob patterns selecting which repository paths are indexed.
    pub include: Vec<String>,
    /// Glob patterns for repository paths that are never indexed.
    pub exclude: Vec<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: None,
            max_file_size: 1024 * 1024,
            include: vec![String::from("**")],
            exclude: Vec::new(),
        }
    }
}

/// Connection settings for the Elasticsearch backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ElasticsearchSettings {
    /// Base URL of the cluster.
    pub url: String,
    /// Name of the index holding code documents.
    pub index_name: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ElasticsearchSettings {
    fn default() -> Self {
        Self {
            url: String::from("http://localhost:9200"),
            index_name: String::from("sift_codes"),
            timeout_secs: 30,
        }
    }
}

/// Search and rendering settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Results per page.
    pub page_size: usize,
    /// Lines of context shown around the matched lines.
    pub context_lines: usize,
    /// Which result set language facets describe.
    pub facet_scope: FacetScope,
    /// Maximum number of language facets returned.
    pub facet_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            context_lines: 2,
            facet_scope: FacetScope::default(),
            facet_limit: 10,
        }
    }
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings {
    /// Indexing settings.
    index: SerializableIndexSettings,
    /// Elasticsearch settings.
    elasticsearch: ElasticsearchSettings,
    /// Search settings.
    search: SearchSettings,
}

/// Index settings with the path rendered as a string.
///
/// TOML cannot represent `None`, so an unset path is omitted.
#[derive(Serialize)]
struct SerializableIndexSettings {
    /// Backend name.
    backend: BackendKind,
    /// Explicit index directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    /// Maximum indexed file size in bytes.
    max_file_size: u64,
    /// Include patterns.
    include: Vec<String>,
    /// Exclude patterns.
    exclude: Vec<String>,
}

impl From<&IndexSettings> for SerializableIndexSettings {
    fn from(index: &IndexSettings) -> Self {
        Self {
            backend: index.backend,
            path: index.path.as_ref().map(|p| p.display().to_string()),
            max_file_size: index.max_file_size,
            include: index.include.clone(),
            exclude: index.exclude.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_defaults() {
        let index = IndexSettings::default();
        assert_eq!(index.backend, BackendKind::Tantivy);
        assert_eq!(index.max_file_size, 1024 * 1024);
        assert_eq!(index.include, vec!["**"]);
        assert!(index.exclude.is_empty());
        assert!(index.path.is_none());
    }

    #[test]
    fn test_search_settings_defaults() {
        let search = SearchSettings::default();
        assert_eq!(search.page_size, 10);
        assert_eq!(search.context_lines, 2);
        assert_eq!(search.facet_scope, FacetScope::Unfiltered);
        assert_eq!(search.facet_limit, 10);
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("tantivy".parse::<BackendKind>(), Ok(BackendKind::Tantivy));
        assert_eq!(
            "Elasticsearch".parse::<BackendKind>(),
            Ok(BackendKind::Elasticsearch)
        );
        assert!("solr".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_index_directory_prefers_explicit_path() {
        let config = Config {
            index: IndexSettings {
                path: Some(PathBuf::from("/srv/sift")),
                ..Default::default()
            },
            config_root: Some(PathBuf::from("/work/project")),
            ..Default::default()
        };
        assert_eq!(config.index_directory(), Some(PathBuf::from("/srv/sift")));
    }

    #[test]
    fn test_index_directory_under_config_root() {
        let config = Config {
            config_root: Some(PathBuf::from("/work/project")),
            ..Default::default()
        };
        assert_eq!(
            config.index_directory(),
            Some(PathBuf::from("/work/project/.sift/index"))
        );
    }

    #[test]
    fn test_settings_to_toml() {
        let config = Config::default();
        let toml = config.settings_to_toml().unwrap();

        assert!(toml.contains("[index]"));
        assert!(toml.contains("[elasticsearch]"));
        assert!(toml.contains("[search]"));
        assert!(toml.contains("backend = \"tantivy\""));
        assert!(toml.contains("facet_scope = \"unfiltered\""));

        let parsed: toml::Value =
            toml::from_str(&toml).expect("settings_to_toml should produce valid TOML");
        assert!(parsed.get("index").is_some());
        assert!(parsed.get("search").is_some());
    }
}
