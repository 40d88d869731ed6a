//! Build plan resolution.
//!
//! Composes the version resolver, the capability detector and the source
//! set builder into one [`BuildPlan`]. Nothing here runs a process; the only
//! side effects are filesystem existence checks.

use std::path::PathBuf;

use crate::builder::plan::{BuildPlan, NativePolicy, SkipReason};
use crate::builder::sources::SourceSetBuilder;
use crate::core::platform::detect;
use crate::core::runtime::RuntimeInfo;
use crate::core::version::Implementation;
use crate::resolver::{ResolveError, VersionResolver, DEFAULT_MINOR_FLOOR};
use crate::util::config::DEFAULT_PACKAGE;
use crate::util::context::GlobalContext;

/// Options for [`resolve`].
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Project root holding the version trees
    pub root: PathBuf,
    pub package: String,
    pub minor_floor: u32,
    /// Attempt the extension even where the stdlib ships one
    pub native_on_modern_runtimes: bool,
    /// Config file recorded as a build dependency
    pub config_file: Option<PathBuf>,
}

impl ResolveOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ResolveOptions {
            root: root.into(),
            package: DEFAULT_PACKAGE.to_string(),
            minor_floor: DEFAULT_MINOR_FLOOR,
            native_on_modern_runtimes: false,
            config_file: None,
        }
    }

    pub fn from_context(ctx: &GlobalContext) -> Self {
        let config = ctx.config();
        ResolveOptions {
            root: ctx.root().to_path_buf(),
            package: config.package_name().to_string(),
            minor_floor: config.minor_floor(),
            native_on_modern_runtimes: config.build.native_on_modern_runtimes,
            config_file: Some(ctx.project_config_path()),
        }
    }
}

/// Resolve the build configuration for `runtime`.
///
/// Deterministic: the same runtime and options over the same trees always
/// give the same plan.
pub fn resolve(runtime: &RuntimeInfo, opts: &ResolveOptions) -> Result<BuildPlan, ResolveError> {
    let family = runtime.implementation.family();

    if let Some(reason) = runtime.version.unsupported_reason() {
        return Err(ResolveError::UnsupportedRuntimeVersion {
            family,
            version: runtime.version,
            reason: reason.to_string(),
        });
    }

    let resolution = VersionResolver::new(&opts.root)
        .with_floor(opts.minor_floor)
        .resolve(family, runtime.version)?;
    let directory = resolution.directory;

    let profile = detect(&runtime.platform, &runtime.config);
    let legacy = directory.version().is_legacy();

    let mut sources = SourceSetBuilder::new(&opts.root, &opts.package);
    if let Some(config_file) = &opts.config_file {
        sources = sources.with_depend(config_file);
    }
    let manifest = sources.build(&profile, &directory, legacy)?;

    let native = native_policy(runtime, legacy, opts.native_on_modern_runtimes);
    if let NativePolicy::Skip(reason) = native {
        tracing::debug!("native extension will be skipped: {}", reason);
    }

    let mut include_dirs = vec![directory.source_dir(&opts.root, &opts.package)];
    include_dirs.extend(runtime.include_dir.iter().cloned());

    Ok(BuildPlan {
        root: opts.root.clone(),
        package: opts.package.clone(),
        runtime: runtime.clone(),
        directory,
        profile,
        manifest,
        legacy,
        native,
        include_dirs,
        notices: resolution.notice.into_iter().collect(),
    })
}

fn native_policy(runtime: &RuntimeInfo, legacy: bool, native_on_modern: bool) -> NativePolicy {
    if runtime.is_jvm() {
        return NativePolicy::Skip(SkipReason::AlternateImplementation(Implementation::Jython));
    }
    if !runtime.implementation.compiles_extensions() {
        return NativePolicy::Skip(SkipReason::AlternateImplementation(runtime.implementation));
    }
    if !legacy && !native_on_modern {
        return NativePolicy::Skip(SkipReason::StdlibAccelerator(runtime.version));
    }
    NativePolicy::Attempt
}
