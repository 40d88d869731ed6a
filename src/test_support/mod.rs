//! Test utilities and mocks for extresolve unit tests.
//!
//! Provides source tree fixtures on disk, a scripted [`NativeBuild`] that
//! records what it was asked to build, and a fixed dependency probe.
//!
//! # Example
//!
//! ```rust,ignore
//! use extresolve::test_support::{source_tree, ScriptedBuilder};
//!
//! #[test]
//! fn test_example() {
//!     let tree = source_tree(&["py2.7", "py3.10"]);
//!     let builder = ScriptedBuilder::failing_once(BuildFailure::compiler_missing("no cc"));
//!     // Resolve a plan under tree.path() and run it with the builder...
//! }
//! ```

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::builder::descriptor::BuildDescriptor;
use crate::builder::failure::BuildFailure;
use crate::builder::native::{BuildOutput, NativeBuild};
use crate::core::runtime::RuntimeInfo;
use crate::core::version::{Implementation, RuntimeVersion};
use crate::ops::advisor::DependencyProbe;

const PACKAGE: &str = "multiprocess";

const SOURCES: &[&str] = &[
    "multiprocess.c",
    "semaphore.c",
    "socket_connection.c",
    "pipe_connection.c",
    "win32_functions.c",
];

const HEADERS: &[&str] = &["multiprocess.h", "connection.h"];

/// Create a project root with the named version trees (`py3.10`, ...).
///
/// Each tree gets the full set of extension sources and headers under
/// `Modules/_multiprocess`, and an empty pure package directory.
pub fn source_tree(trees: &[&str]) -> TempDir {
    let root = TempDir::new().unwrap();

    for tree in trees {
        let src_dir = root.path().join(tree).join("Modules").join(format!("_{}", PACKAGE));
        std::fs::create_dir_all(&src_dir).unwrap();
        for file in SOURCES.iter().chain(HEADERS) {
            std::fs::write(src_dir.join(file), "/* fixture */\n").unwrap();
        }

        let package_dir = root.path().join(tree).join(PACKAGE);
        std::fs::create_dir_all(&package_dir).unwrap();
        std::fs::write(package_dir.join("__init__.py"), "").unwrap();
    }

    root
}

/// A runtime with no probed configuration.
pub fn runtime(implementation: Implementation, version: RuntimeVersion, platform: &str) -> RuntimeInfo {
    RuntimeInfo::new(implementation, version, platform)
}

/// Write an executable shell script named `cc` with the given body.
#[cfg(unix)]
pub fn fake_compiler(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("cc");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A [`NativeBuild`] that replays queued results.
///
/// Once the queue is empty every build succeeds. Every descriptor it is
/// handed is recorded.
#[derive(Debug, Default)]
pub struct ScriptedBuilder {
    results: Mutex<VecDeque<Result<(), BuildFailure>>>,
    calls: Mutex<Vec<BuildDescriptor>>,
}

impl ScriptedBuilder {
    pub fn new(results: Vec<Result<(), BuildFailure>>) -> Self {
        ScriptedBuilder {
            results: Mutex::new(results.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Vec::new())
    }

    /// Fail the first build with `failure`, then succeed.
    pub fn failing_once(failure: BuildFailure) -> Self {
        Self::new(vec![Err(failure)])
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn descriptors(&self) -> Vec<BuildDescriptor> {
        self.calls.lock().unwrap().clone()
    }
}

impl NativeBuild for ScriptedBuilder {
    fn build(&self, descriptor: &BuildDescriptor) -> Result<BuildOutput, BuildFailure> {
        self.calls.lock().unwrap().push(descriptor.clone());

        let next = self.results.lock().unwrap().pop_front().unwrap_or(Ok(()));
        next.map(|()| BuildOutput {
            extension: descriptor
                .has_extension()
                .then(|| PathBuf::from(format!("build/lib/{}.so", descriptor.name))),
            package_dir: descriptor.package_dir.clone(),
        })
    }
}

/// A dependency probe with a fixed set of importable modules.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    modules: BTreeSet<String>,
}

impl StaticProbe {
    pub fn with(modules: &[&str]) -> Self {
        StaticProbe {
            modules: modules.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl DependencyProbe for StaticProbe {
    fn is_importable(&self, module: &str) -> bool {
        self.modules.contains(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_tree_layout() {
        let tree = source_tree(&["py3.10"]);
        let src = tree.path().join("py3.10/Modules/_multiprocess");

        assert!(src.join("multiprocess.c").is_file());
        assert!(src.join("multiprocess.h").is_file());
        assert!(tree.path().join("py3.10/multiprocess/__init__.py").is_file());
    }
}
