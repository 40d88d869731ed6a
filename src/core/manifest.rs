//! Source manifests for the native extension.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Ordered C sources plus the files whose change forces a rebuild.
///
/// Order matters only for reproducibility; the same inputs always give the
/// same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceManifest {
    sources: Vec<PathBuf>,
    depends: BTreeSet<PathBuf>,
}

impl SourceManifest {
    /// A manifest with no native sources (pure install).
    pub fn empty() -> Self {
        SourceManifest::default()
    }

    pub(crate) fn push_source(&mut self, source: PathBuf) {
        self.sources.push(source);
    }

    pub(crate) fn add_depend(&mut self, path: PathBuf) {
        self.depends.insert(path);
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn depends(&self) -> &BTreeSet<PathBuf> {
        &self.depends
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// How many times `path` is listed as a source.
    pub fn occurrences(&self, path: &Path) -> usize {
        self.sources.iter().filter(|s| s.as_path() == path).count()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.occurrences(path) > 0
    }

    /// Whether any source has the given file name.
    pub fn contains_file(&self, file_name: &str) -> bool {
        self.sources
            .iter()
            .any(|s| s.file_name().is_some_and(|n| n == file_name))
    }
}
