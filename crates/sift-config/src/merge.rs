//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules and resolving paths.

use std::path::{Path, PathBuf};

use crate::{
    Config, ConfigError, ElasticsearchSettings, IndexSettings, SearchSettings,
    parse::{RawConfig, RawElasticsearchSettings, RawIndexSettings, RawSearchSettings},
    resolve::resolve_path,
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

impl ParsedConfig {
    /// Directory containing this config file.
    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config). For every scalar setting the first defined value
/// wins; pattern lists are replaced wholesale, never concatenated.
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    let mut index = IndexSettings::default();
    let mut elasticsearch = ElasticsearchSettings::default();
    let mut search = SearchSettings::default();

    // Lowest precedence first so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(ref raw) = parsed.config.index {
            apply_raw_index(&mut index, raw, parsed.dir())?;
        }
        if let Some(ref raw) = parsed.config.elasticsearch {
            apply_raw_elasticsearch(&mut elasticsearch, raw);
        }
        if let Some(ref raw) = parsed.config.search {
            apply_raw_search(&mut search, raw);
        }
    }

    let config_root = configs.first().map(|c| c.dir().to_path_buf());

    Ok(Config {
        index,
        elasticsearch,
        search,
        config_root,
    })
}

/// Applies raw index settings, resolving the index path against the file's directory.
fn apply_raw_index(
    result: &mut IndexSettings,
    raw: &RawIndexSettings,
    config_dir: &Path,
) -> Result<(), ConfigError> {
    if let Some(v) = raw.backend {
        result.backend = v;
    }
    if let Some(ref v) = raw.path {
        result.path = Some(resolve_path(v, config_dir)?);
    }
    if let Some(v) = raw.max_file_size {
        result.max_file_size = v;
    }
    if let Some(ref v) = raw.include {
        result.include.clone_from(v);
    }
    if let Some(ref v) = raw.exclude {
        result.exclude.clone_from(v);
    }
    Ok(())
}

/// Applies raw Elasticsearch settings.
fn apply_raw_elasticsearch(result: &mut ElasticsearchSettings, raw: &RawElasticsearchSettings) {
    if let Some(ref v) = raw.url {
        result.url.clone_from(v);
    }
    if let Some(ref v) = raw.index_name {
        result.index_name.clone_from(v);
    }
    if let Some(v) = raw.timeout_secs {
        result.timeout_secs = v;
    }
}

/// Applies raw search settings.
fn apply_raw_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(v) = raw.page_size {
        result.page_size = v;
    }
    if let Some(v) = raw.context_lines {
        result.context_lines = v;
    }
    if let Some(v) = raw.facet_scope {
        result.facet_scope = v;
    }
    if let Some(v) = raw.facet_limit {
        result.facet_limit = v;
    }
}
