//! Version tree resolution.
//!
//! Sources are kept per interpreter version (`py2.7`, `py3.10`, `pypy3.9`).
//! An interpreter newer than any tree falls back to the closest older minor
//! release of the same major version.

mod errors;

use std::path::{Path, PathBuf};

pub use errors::ResolveError;

use crate::core::version::{RuntimeVersion, TreeFamily, VersionDirectory};

/// Lowest minor version searched by default.
pub const DEFAULT_MINOR_FLOOR: u32 = 0;

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub directory: VersionDirectory,
    /// Set when the tree is older than the requested version.
    pub notice: Option<String>,
}

/// Finds the version tree to build from.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    root: PathBuf,
    floor: u32,
}

impl VersionResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        VersionResolver {
            root: root.into(),
            floor: DEFAULT_MINOR_FLOOR,
        }
    }

    /// Stop searching below this minor version.
    pub fn with_floor(mut self, floor: u32) -> Self {
        self.floor = floor;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Select the tree with the same major version and the largest minor
    /// version not above `requested`.
    pub fn resolve(
        &self,
        family: TreeFamily,
        requested: RuntimeVersion,
    ) -> Result<Resolution, ResolveError> {
        let found = (self.floor..=requested.minor)
            .rev()
            .map(|minor| VersionDirectory::new(family, requested.major, minor))
            .find(|dir| {
                let path = dir.path(&self.root);
                tracing::debug!("looking for version tree {}", path.display());
                path.is_dir()
            });

        let Some(directory) = found else {
            return Err(ResolveError::UnsupportedRuntimeVersion {
                family,
                version: requested,
                reason: format!("Python {} is not supported", requested),
            });
        };

        let notice = (directory.version() != requested).then(|| {
            let msg = format!(
                "Python {} is not currently supported, reverting to {}",
                requested,
                directory.version()
            );
            tracing::info!("{}", msg);
            msg
        });

        Ok(Resolution { directory, notice })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::source_tree;

    #[test]
    fn test_exact_match() {
        let tree = source_tree(&["py3.10", "py3.12"]);
        let res = VersionResolver::new(tree.path())
            .resolve(TreeFamily::Py, RuntimeVersion::new(3, 12))
            .unwrap();

        assert_eq!(res.directory.name(), "py3.12");
        assert!(res.notice.is_none());
    }

    #[test]
    fn test_falls_back_to_older_minor() {
        let tree = source_tree(&["py3.8", "py3.10"]);
        let res = VersionResolver::new(tree.path())
            .resolve(TreeFamily::Py, RuntimeVersion::new(3, 12))
            .unwrap();

        assert_eq!(res.directory.version(), RuntimeVersion::new(3, 10));
        let notice = res.notice.unwrap();
        assert!(notice.contains("3.12"));
        assert!(notice.contains("3.10"));
    }

    #[test]
    fn test_no_tree_for_major() {
        let tree = source_tree(&["py3.10"]);
        let err = VersionResolver::new(tree.path())
            .resolve(TreeFamily::Py, RuntimeVersion::new(2, 5))
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::UnsupportedRuntimeVersion { version, .. } if version == RuntimeVersion::new(2, 5)
        ));
    }

    #[test]
    fn test_family_is_respected() {
        let tree = source_tree(&["py3.9"]);
        let result = VersionResolver::new(tree.path())
            .resolve(TreeFamily::PyPy, RuntimeVersion::new(3, 9));

        assert!(result.is_err());
    }

    #[test]
    fn test_floor_bounds_the_search() {
        let tree = source_tree(&["py3.2"]);
        let resolver = VersionResolver::new(tree.path());

        assert!(resolver
            .clone()
            .with_floor(3)
            .resolve(TreeFamily::Py, RuntimeVersion::new(3, 9))
            .is_err());
        assert!(resolver
            .with_floor(2)
            .resolve(TreeFamily::Py, RuntimeVersion::new(3, 9))
            .is_ok());
    }

    #[test]
    fn test_floor_above_requested_minor() {
        let tree = source_tree(&["py3.1"]);
        let result = VersionResolver::new(tree.path())
            .with_floor(5)
            .resolve(TreeFamily::Py, RuntimeVersion::new(3, 1));

        assert!(result.is_err());
    }

    #[test]
    fn test_resolution_is_monotonic() {
        let tree = source_tree(&["py2.7", "py3.7", "py3.9", "py3.11", "py4.0"]);
        let resolver = VersionResolver::new(tree.path());

        for major in 2..=4 {
            for minor in 0..=14 {
                let requested = RuntimeVersion::new(major, minor);
                if let Ok(res) = resolver.resolve(TreeFamily::Py, requested) {
                    let found = res.directory.version();
                    assert_eq!(found.major, major);
                    assert!(found.minor <= minor);
                }
            }
        }
    }

    #[test]
    fn test_plain_files_are_not_trees() {
        let tree = source_tree(&[]);
        std::fs::write(tree.path().join("py3.10"), "not a directory").unwrap();

        let result = VersionResolver::new(tree.path())
            .resolve(TreeFamily::Py, RuntimeVersion::new(3, 10));
        assert!(result.is_err());
    }
}
