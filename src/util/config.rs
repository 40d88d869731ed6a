//! Configuration file support for extresolve.
//!
//! Two configuration file locations are merged:
//! - Global: `~/.extresolve/config.toml` - User-wide defaults
//! - Project: `<root>/.extresolve/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config; command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::resolver::DEFAULT_MINOR_FLOOR;

/// Package whose extension is built when nothing is configured.
pub const DEFAULT_PACKAGE: &str = "multiprocess";

/// Optional runtime dependency checked after the install.
pub const DEFAULT_DEPENDENCY: &str = "dill>=0.3.5.1";

/// Configuration directory name, both under `$HOME` and the project root.
pub const CONFIG_DIR: &str = ".extresolve";

/// extresolve configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package settings
    pub package: PackageConfig,

    /// Optional runtime dependency
    pub dependency: DependencyConfig,

    /// Version tree lookup
    pub resolver: ResolverConfig,

    /// Build settings
    pub build: BuildConfig,

    /// Compiler overrides
    pub toolchain: ToolchainSettings,
}

/// Package-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Package name; the extension is `_<name>` built from `Modules/_<name>`
    pub name: Option<String>,
}

/// The optional dependency probed after the install.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Requirement shown in the advisory (e.g. `dill>=0.3.5.1`)
    pub requirement: Option<String>,

    /// Module imported to check availability (defaults to the requirement's name)
    pub module: Option<String>,
}

/// Version tree lookup settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Lowest minor version searched before giving up
    pub minor_floor: Option<u32>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Compile the extension on runtimes at or after 3.3 too
    #[serde(default)]
    pub native_on_modern_runtimes: bool,

    /// Output directory for objects and the extension module
    pub build_dir: Option<PathBuf>,
}

/// Toolchain settings for C compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the C compiler (e.g., /usr/bin/clang)
    pub cc: Option<PathBuf>,

    /// Additional C compiler flags
    #[serde(default)]
    pub cflags: Vec<String>,

    /// Additional linker flags
    #[serde(default)]
    pub ldflags: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.package.name.is_some() {
            self.package.name = other.package.name;
        }

        if other.dependency.requirement.is_some() {
            self.dependency.requirement = other.dependency.requirement;
        }
        if other.dependency.module.is_some() {
            self.dependency.module = other.dependency.module;
        }

        if other.resolver.minor_floor.is_some() {
            self.resolver.minor_floor = other.resolver.minor_floor;
        }

        if other.build.native_on_modern_runtimes {
            self.build.native_on_modern_runtimes = true;
        }
        if other.build.build_dir.is_some() {
            self.build.build_dir = other.build.build_dir;
        }

        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if !other.toolchain.cflags.is_empty() {
            self.toolchain.cflags = other.toolchain.cflags;
        }
        if !other.toolchain.ldflags.is_empty() {
            self.toolchain.ldflags = other.toolchain.ldflags;
        }
    }

    pub fn package_name(&self) -> &str {
        self.package.name.as_deref().unwrap_or(DEFAULT_PACKAGE)
    }

    pub fn minor_floor(&self) -> u32 {
        self.resolver.minor_floor.unwrap_or(DEFAULT_MINOR_FLOOR)
    }

    pub fn dependency_requirement(&self) -> &str {
        self.dependency
            .requirement
            .as_deref()
            .unwrap_or(DEFAULT_DEPENDENCY)
    }

    /// Module to import for the dependency check.
    ///
    /// Without an explicit setting this is the distribution name of the
    /// requirement, i.e. everything before the first version operator.
    pub fn dependency_module(&self) -> String {
        if let Some(module) = &self.dependency.module {
            return module.clone();
        }

        let requirement = self.dependency_requirement();
        let end = requirement
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-' || c == '.'))
            .unwrap_or(requirement.len());
        requirement[..end].replace('-', "_")
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`<root>/.extresolve/config.toml`)
/// 2. Global config (`~/.extresolve/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path.filter(|p| p.exists()) {
        config.merge(Config::load_or_default(global));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (`~/.extresolve`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (`~/.extresolve/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (`<root>/.extresolve/config.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.package_name(), "multiprocess");
        assert_eq!(config.minor_floor(), 0);
        assert_eq!(config.dependency_requirement(), "dill>=0.3.5.1");
        assert_eq!(config.dependency_module(), "dill");
        assert!(!config.build.native_on_modern_runtimes);
    }

    #[test]
    fn test_dependency_module_from_requirement() {
        let mut config = Config::default();
        config.dependency.requirement = Some("typing-extensions ~= 4.0".to_string());
        assert_eq!(config.dependency_module(), "typing_extensions");

        config.dependency.module = Some("typing".to_string());
        assert_eq!(config.dependency_module(), "typing");
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(
            &global,
            "[package]\nname = \"processing\"\n\n[resolver]\nminor_floor = 2\n",
        )
        .unwrap();
        std::fs::write(&project, "[resolver]\nminor_floor = 5\n\n[toolchain]\ncc = \"/opt/cc\"\n")
            .unwrap();

        let config = load_config(Some(global.as_path()), &project);
        assert_eq!(config.package_name(), "processing");
        assert_eq!(config.minor_floor(), 5);
        assert_eq!(config.toolchain.cc, Some(PathBuf::from("/opt/cc")));
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("config.toml");
        std::fs::write(&project, "[resolver]\nminor_floor = \"high\"\n").unwrap();

        assert_eq!(load_config(None, &project), Config::default());
    }
}
