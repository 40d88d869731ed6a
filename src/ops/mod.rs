//! High-level operations.
//!
//! This module contains the implementation of extresolve commands.

pub mod advisor;
pub mod install;
pub mod resolve;

pub use advisor::{Advisory, DependencyAdvisor, DependencyProbe, InterpreterProbe, OptionalDependency};
pub use install::{install, InstallOptions, InstallReport};
pub use resolve::{resolve, ResolveOptions};
