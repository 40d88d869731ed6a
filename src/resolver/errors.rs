//! Resolution error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::version::{RuntimeVersion, TreeFamily};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while selecting a version tree or assembling its sources.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("{reason}")]
    #[diagnostic(
        code(extresolve::resolve::unsupported_runtime),
        help("Install with a supported interpreter version")
    )]
    UnsupportedRuntimeVersion {
        family: TreeFamily,
        version: RuntimeVersion,
        reason: String,
    },

    #[error("source tree `{}` is missing", .path.display())]
    #[diagnostic(code(extresolve::resolve::missing_source_tree))]
    MissingSourceTree { path: PathBuf },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::UnsupportedRuntimeVersion {
                family,
                version,
                reason,
            } => Diagnostic::error(reason.clone())
                .with_context(format!(
                    "no `{}{}.*` tree at or below `{}{}`",
                    family, version.major, family, version
                ))
                .with_suggestion(suggestions::SUPPORTED_RUNTIME),

            ResolveError::MissingSourceTree { path } => {
                Diagnostic::error("resolved source tree disappeared before the build")
                    .with_location(path)
                    .with_suggestion(suggestions::RESTORE_TREE)
            }
        }
    }
}
