//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use sift_config::Config;
use sift_index::{IndexError, Indexer, open_indexer};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
    /// Backend opened for this invocation.
    indexer: Option<Arc<dyn Indexer>>,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self {
            cwd,
            config,
            indexer: None,
        })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used for `init`, which should work even when an existing config file is invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
            indexer: None,
        })
    }

    /// Returns the configured backend, opening it on first use.
    pub fn indexer(&mut self) -> Result<Arc<dyn Indexer>, ExitCode> {
        if let Some(indexer) = &self.indexer {
            return Ok(Arc::clone(indexer));
        }

        let opened = open_indexer(&self.config).map_err(|e| {
            eprintln!("error: failed to open index: {e}");
            ExitCode::FAILURE
        })?;
        self.indexer = Some(Arc::clone(&opened.indexer));
        Ok(opened.indexer)
    }

    /// Closes the backend if it was opened.
    pub fn close(&mut self) -> Result<(), IndexError> {
        match self.indexer.take() {
            Some(indexer) => indexer.close(),
            None => Ok(()),
        }
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
