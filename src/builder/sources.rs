//! Source set assembly for the native extension.

use std::path::{Path, PathBuf};

use crate::core::manifest::SourceManifest;
use crate::core::platform::{Capability, PlatformProfile};
use crate::core::version::VersionDirectory;
use crate::resolver::ResolveError;
use crate::util::fs::glob_files;

const SEMAPHORE: &str = "semaphore.c";
const SOCKET_CONNECTION: &str = "socket_connection.c";
const PIPE_CONNECTION: &str = "pipe_connection.c";
const WIN32_FUNCTIONS: &str = "win32_functions.c";

/// Builds the [`SourceManifest`] for a resolved tree and platform.
#[derive(Debug, Clone)]
pub struct SourceSetBuilder<'a> {
    root: &'a Path,
    package: &'a str,
    extra_depends: Vec<PathBuf>,
}

impl<'a> SourceSetBuilder<'a> {
    pub fn new(root: &'a Path, package: &'a str) -> Self {
        SourceSetBuilder {
            root,
            package,
            extra_depends: Vec::new(),
        }
    }

    /// Also rebuild when `path` changes (e.g. the project config).
    pub fn with_depend(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra_depends.push(path.into());
        self
    }

    /// Assemble the manifest.
    ///
    /// `legacy` is set for trees older than the 3.3 boundary, whose stdlib
    /// lacks the connection transports the extension then has to carry.
    pub fn build(
        &self,
        profile: &PlatformProfile,
        directory: &VersionDirectory,
        legacy: bool,
    ) -> Result<SourceManifest, ResolveError> {
        let tree = directory.path(self.root);
        if !tree.is_dir() {
            return Err(ResolveError::MissingSourceTree { path: tree });
        }

        let src_dir = directory.source_dir(self.root, self.package);
        let src = |name: &str| src_dir.join(name);
        let sem_open = profile.has(Capability::SemOpen);

        let mut manifest = SourceManifest::empty();
        manifest.push_source(src(&format!("{}.c", self.package)));

        if profile.is_windows() {
            if sem_open {
                manifest.push_source(src(SEMAPHORE));
            }
            if legacy {
                manifest.push_source(src(PIPE_CONNECTION));
                manifest.push_source(src(SOCKET_CONNECTION));
                manifest.push_source(src(WIN32_FUNCTIONS));
            }
        } else {
            if legacy {
                manifest.push_source(src(SOCKET_CONNECTION));
            }
            if sem_open {
                manifest.push_source(src(SEMAPHORE));
            }
        }

        // A missing source dir only matters once something tries to compile it.
        let headers = glob_files(&src_dir, "*.h").unwrap_or_else(|e| {
            tracing::warn!("could not list headers in {}: {:#}", src_dir.display(), e);
            Vec::new()
        });
        for header in headers {
            manifest.add_depend(header);
        }
        for extra in &self.extra_depends {
            manifest.add_depend(extra.clone());
        }

        tracing::debug!(
            "{} sources for {} on {}",
            manifest.len(),
            directory,
            profile.platform()
        );

        Ok(manifest)
    }
}
