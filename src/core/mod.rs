//! Core data structures for extresolve.
//!
//! - Runtime identity (implementation, version, platform)
//! - Platform capability profiles
//! - Version-specific source trees
//! - Source manifests and command classification

pub mod command;
pub mod manifest;
pub mod platform;
pub mod runtime;
pub mod version;

pub use command::{BuildVerb, CommandContext};
pub use manifest::SourceManifest;
pub use platform::{detect, Capability, PlatformFamily, PlatformProfile, SystemConfig};
pub use runtime::RuntimeInfo;
pub use version::{Implementation, RuntimeVersion, TreeFamily, VersionDirectory};
