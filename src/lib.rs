//! extresolve - build-time configuration for the `_multiprocess` extension
//!
//! This crate picks the version-specific source tree for an interpreter,
//! detects the platform's semaphore capabilities, assembles the extension's
//! sources, and drives the native build with a fallback to a pure install.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for extresolve unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides source tree fixtures, a scripted native
/// builder and a fixed dependency probe.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildAttempt, BuildOrchestrator, BuildPlan, Outcome};
pub use self::core::{PlatformProfile, RuntimeInfo, SourceManifest, VersionDirectory};
pub use ops::{install, resolve};
pub use resolver::{ResolveError, VersionResolver};
pub use util::context::GlobalContext;
