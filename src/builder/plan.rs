//! Build plan generation.
//!
//! A BuildPlan is everything resolved before a build command runs: the
//! version tree, the platform profile, the source manifest, and whether the
//! native extension should be attempted at all.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::builder::descriptor::BuildDescriptor;
use crate::core::manifest::SourceManifest;
use crate::core::platform::PlatformProfile;
use crate::core::runtime::RuntimeInfo;
use crate::core::version::{Implementation, RuntimeVersion, VersionDirectory};

/// Whether the native extension is attempted for this runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "policy", content = "reason", rename_all = "snake_case")]
pub enum NativePolicy {
    Attempt,
    Skip(SkipReason),
}

impl NativePolicy {
    pub fn is_attempt(&self) -> bool {
        matches!(self, NativePolicy::Attempt)
    }
}

/// Why a native build is skipped up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The implementation cannot load C extensions.
    AlternateImplementation(Implementation),
    /// The stdlib already ships the accelerator for this version.
    StdlibAccelerator(RuntimeVersion),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlternateImplementation(imp) => {
                write!(f, "{} does not load C extensions", imp)
            }
            SkipReason::StdlibAccelerator(version) => {
                write!(f, "Python {} ships the accelerator in its stdlib", version)
            }
        }
    }
}

/// A resolved build configuration for one interpreter.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    /// Project root holding the version trees
    pub root: PathBuf,
    /// Distribution name (`multiprocess`)
    pub package: String,
    pub runtime: RuntimeInfo,
    /// Tree selected for the runtime (possibly a fallback)
    pub directory: VersionDirectory,
    pub profile: PlatformProfile,
    pub manifest: SourceManifest,
    /// Runtime predates the 3.3 boundary
    pub legacy: bool,
    pub native: NativePolicy,
    /// Header search path for the extension, source dir first
    pub include_dirs: Vec<PathBuf>,
    /// Warnings raised while resolving (e.g. version fallback)
    pub notices: Vec<String>,
}

impl BuildPlan {
    /// Import name of the extension module, `_<package>`.
    pub fn extension_name(&self) -> String {
        format!("_{}", self.package)
    }

    pub fn tree_dir(&self) -> PathBuf {
        self.directory.path(&self.root)
    }

    pub fn source_dir(&self) -> PathBuf {
        self.directory.source_dir(&self.root, &self.package)
    }

    pub fn package_dir(&self) -> PathBuf {
        self.directory.package_dir(&self.root, &self.package)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The build descriptor handed to the native builder.
    pub fn descriptor(&self) -> BuildDescriptor {
        BuildDescriptor::from_plan(self)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for BuildPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "runtime: {} {} on {}",
            self.runtime.implementation, self.runtime.version, self.runtime.platform
        )?;
        writeln!(f, "tree: {}", self.tree_dir().display())?;
        writeln!(f, "{}", self.profile)?;
        writeln!(f, "legacy: {}", self.legacy)?;
        match self.native {
            NativePolicy::Attempt => writeln!(f, "extension: {} (attempt)", self.extension_name())?,
            NativePolicy::Skip(reason) => {
                writeln!(f, "extension: {} (skipped: {})", self.extension_name(), reason)?
            }
        }
        writeln!(f, "sources:")?;
        for source in self.manifest.sources() {
            writeln!(f, "  {}", source.display())?;
        }
        write!(f, "depends: {} file(s)", self.manifest.depends().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::AlternateImplementation(Implementation::PyPy).to_string(),
            "pypy does not load C extensions"
        );
        assert_eq!(
            SkipReason::StdlibAccelerator(RuntimeVersion::new(3, 12)).to_string(),
            "Python 3.12 ships the accelerator in its stdlib"
        );
    }

    #[test]
    fn test_policy_serializes_reason() {
        let json = serde_json::to_value(NativePolicy::Skip(SkipReason::AlternateImplementation(
            Implementation::Jython,
        )))
        .unwrap();
        assert_eq!(json["policy"], "skip");
        assert_eq!(json["reason"]["alternate_implementation"], "jython");

        let json = serde_json::to_value(NativePolicy::Attempt).unwrap();
        assert_eq!(json["policy"], "attempt");
    }
}
