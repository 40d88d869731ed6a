//! The interpreter an install runs under.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::platform::SystemConfig;
use super::version::{Implementation, RuntimeVersion};

/// Everything the resolver needs to know about the running interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    pub implementation: Implementation,
    pub version: RuntimeVersion,
    /// Platform identifier as the interpreter reports it (`linux`, `win32`, ...)
    pub platform: String,
    /// Compiled configuration variables consulted by capability detection
    #[serde(default)]
    pub config: SystemConfig,
    /// Interpreter headers, added to the extension's include path
    #[serde(default)]
    pub include_dir: Option<PathBuf>,
    /// Filename suffix for extension modules (e.g. `.cpython-312-x86_64-linux-gnu.so`)
    #[serde(default)]
    pub ext_suffix: Option<String>,
    /// Interpreter executable, when one was probed
    #[serde(default)]
    pub executable: Option<PathBuf>,
}

impl RuntimeInfo {
    pub fn new(implementation: Implementation, version: RuntimeVersion, platform: impl Into<String>) -> Self {
        RuntimeInfo {
            implementation,
            version,
            platform: platform.into(),
            config: SystemConfig::default(),
            include_dir: None,
            ext_suffix: None,
            executable: None,
        }
    }

    pub fn with_config(mut self, config: SystemConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dir = Some(dir.into());
        self
    }

    /// Alternate implementations report a `java*` platform (Jython).
    pub fn is_jvm(&self) -> bool {
        self.platform.starts_with("java") || self.implementation == Implementation::Jython
    }
}
