//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use globset::Glob;

use crate::{BackendKind, Config};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The Elasticsearch backend is selected but the URL is not an HTTP(S) URL.
    InvalidElasticsearchUrl {
        /// The configured URL.
        url: String,
    },
    /// `max_file_size` is zero, so every file is treated as oversized.
    ZeroMaxFileSize,
    /// `page_size` is zero, so every search returns an empty page.
    ZeroPageSize,
    /// The include list is empty.
    NoIncludePatterns,
    /// An include or exclude pattern does not compile.
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidElasticsearchUrl { url } => {
                write!(f, "elasticsearch url is not an http(s) url: {url}")
            }
            Self::ZeroMaxFileSize => {
                write!(f, "index.max_file_size is 0; no file will be indexed")
            }
            Self::ZeroPageSize => write!(f, "search.page_size is 0; searches return no results"),
            Self::NoIncludePatterns => {
                write!(f, "index.include is empty; every path will be indexed")
            }
            Self::InvalidPattern { pattern } => write!(f, "invalid glob pattern: {pattern}"),
        }
    }
}

/// Validates a configuration and returns all warnings found.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.index.backend == BackendKind::Elasticsearch {
        let url = config.elasticsearch.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(ConfigWarning::InvalidElasticsearchUrl {
                url: config.elasticsearch.url.clone(),
            });
        }
    }

    if config.index.max_file_size == 0 {
        warnings.push(ConfigWarning::ZeroMaxFileSize);
    }

    if config.search.page_size == 0 {
        warnings.push(ConfigWarning::ZeroPageSize);
    }

    if config.index.include.is_empty() {
        warnings.push(ConfigWarning::NoIncludePatterns);
    }

    for pattern in config.index.include.iter().chain(&config.index.exclude) {
        if Glob::new(pattern).is_err() {
            warnings.push(ConfigWarning::InvalidPattern {
                pattern: pattern.clone(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElasticsearchSettings, IndexSettings, SearchSettings};

    #[test]
    fn test_default_config_has_no_warnings() {
        assert!(validate_config(&Config::default()).is_empty());
    }

    #[test]
    fn test_bad_url_only_flagged_for_elasticsearch() {
        let mut config = Config {
            elasticsearch: ElasticsearchSettings {
                url: "localhost:9200".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_empty());

        config.index.backend = BackendKind::Elasticsearch;
        assert_eq!(
            validate_config(&config),
            vec![ConfigWarning::InvalidElasticsearchUrl {
                url: "localhost:9200".into()
            }]
        );
    }

    #[test]
    fn test_zero_sizes() {
        let config = Config {
            index: IndexSettings {
                max_file_size: 0,
                ..Default::default()
            },
            search: SearchSettings {
                page_size: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let warnings = validate_config(&config);
        assert!(warnings.contains(&ConfigWarning::ZeroMaxFileSize));
        assert!(warnings.contains(&ConfigWarning::ZeroPageSize));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = Config {
            index: IndexSettings {
                exclude: vec!["a/[".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            validate_config(&config),
            vec![ConfigWarning::InvalidPattern {
                pattern: "a/[".into()
            }]
        );
    }
}
