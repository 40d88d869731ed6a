//! Global context for extresolve operations.
//!
//! Provides centralized access to the project root, configuration, and
//! output settings.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::config::{global_config_path, load_config, project_config_path, Config};

/// Default build output directory, relative to the project root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Project root holding the version trees
    root: PathBuf,

    /// Merged global + project configuration
    config: Config,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a context rooted at `root`, or at the current directory.
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir().context("failed to get current directory")?,
        };

        let global = global_config_path();
        let config = load_config(global.as_deref(), &project_config_path(&root));

        Ok(GlobalContext {
            root,
            config,
            color: std::io::stderr().is_terminal(),
        })
    }

    /// Disable colors regardless of the terminal.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = self.color && color;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Project config file, listed as a build dependency of the extension.
    pub fn project_config_path(&self) -> PathBuf {
        project_config_path(&self.root)
    }

    /// Build output directory; relative settings are taken from the root.
    pub fn build_dir(&self) -> PathBuf {
        match &self.config.build.build_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.root.join(dir),
            None => self.root.join(DEFAULT_BUILD_DIR),
        }
    }
}
