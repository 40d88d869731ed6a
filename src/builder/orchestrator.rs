//! Native build with a single fallback to a pure install.
//!
//! ```text
//! AttemptNative --ok--> Done(Success)
//!       |
//!       +--recognized failure, build-like command--> Degraded --> Done(Degraded)
//!       |
//!       +--anything else--> Err(failure)
//! ```

use std::fmt;

use serde::Serialize;

use crate::builder::descriptor::BuildDescriptor;
use crate::builder::failure::{BuildFailure, ErrorClass};
use crate::builder::native::{BuildOutput, NativeBuild};
use crate::builder::plan::{BuildPlan, NativePolicy};
use crate::core::command::CommandContext;
use crate::core::manifest::SourceManifest;
use crate::core::platform::PlatformProfile;
use crate::util::diagnostic::banner;

pub const BUILD_WARNING_TITLE: &str = "WARNING: The C extensions could not be compiled";

const BUILD_WARNING_BODY: &[&str] = &[
    "",
    "Maybe you do not have a C compiler installed on this system?",
    "The reason was:",
];

const BUILD_WARNING_FOOTER: &[&str] = &[
    "This is just a warning as most of the functionality will work even",
    "without the updated C extension.  It will simply fallback to the",
    "built-in _multiprocessing module.  Most notably you will not be able to use",
    "FORCE_EXECV on POSIX systems.  If this is a problem for you then please",
    "install a C compiler or fix the error(s) above.",
];

/// How a completed build went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    /// The native build failed and the package was installed without it.
    Degraded,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Degraded => f.write_str("degraded"),
        }
    }
}

/// The record of one completed build.
#[derive(Debug, Clone)]
pub struct BuildAttempt {
    /// Manifest actually built; empty when degraded or skipped
    pub manifest: SourceManifest,
    pub profile: PlatformProfile,
    pub command: CommandContext,
    pub outcome: Outcome,
    /// Warning block printed for a degraded build
    pub diagnostic: Option<String>,
    pub output: BuildOutput,
}

impl BuildAttempt {
    pub fn built_extension(&self) -> bool {
        self.output.extension.is_some()
    }
}

enum State {
    AttemptNative,
    Degraded(BuildFailure),
    Done(BuildAttempt),
}

/// Drives a [`NativeBuild`] through the fallback state machine.
pub struct BuildOrchestrator<'a, B: NativeBuild + ?Sized> {
    builder: &'a B,
    echo: bool,
}

impl<'a, B: NativeBuild + ?Sized> BuildOrchestrator<'a, B> {
    pub fn new(builder: &'a B) -> Self {
        BuildOrchestrator {
            builder,
            echo: true,
        }
    }

    /// Whether the degradation warning is also written to stderr.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Run the build for `plan` under the host command `command`.
    ///
    /// A failure that does not degrade is returned exactly as the builder
    /// reported it.
    pub fn run(
        &self,
        plan: &BuildPlan,
        command: &CommandContext,
    ) -> Result<BuildAttempt, BuildFailure> {
        let descriptor = plan.descriptor();

        if let NativePolicy::Skip(reason) = plan.native {
            tracing::info!("Skipping {}: {}", descriptor.name, reason);
            let pure = descriptor.without_extension();
            let output = self.builder.build(&pure)?;
            return Ok(self.finish(plan, command, pure, Outcome::Success, None, output));
        }

        let mut state = State::AttemptNative;
        loop {
            state = match state {
                State::AttemptNative => match self.builder.build(&descriptor) {
                    Ok(output) => State::Done(self.finish(
                        plan,
                        command,
                        descriptor.clone(),
                        Outcome::Success,
                        None,
                        output,
                    )),
                    Err(failure) => {
                        let class = failure.class(plan.profile.family());
                        tracing::debug!(
                            "native build failed ({}, {:?}) under `{}`",
                            failure.signature,
                            class,
                            command
                        );
                        if class == ErrorClass::Recognized && command.is_build_like() {
                            State::Degraded(failure)
                        } else {
                            return Err(failure);
                        }
                    }
                },
                State::Degraded(failure) => {
                    let warning = build_warning(&failure);
                    tracing::warn!("{}; installing without the C extension", failure);
                    if self.echo {
                        eprint!("{}", warning);
                    }

                    let pure = descriptor.without_extension();
                    let output = self.builder.build(&pure)?;
                    State::Done(self.finish(
                        plan,
                        command,
                        pure,
                        Outcome::Degraded,
                        Some(warning),
                        output,
                    ))
                }
                State::Done(attempt) => return Ok(attempt),
            };
        }
    }

    fn finish(
        &self,
        plan: &BuildPlan,
        command: &CommandContext,
        built: BuildDescriptor,
        outcome: Outcome,
        diagnostic: Option<String>,
        output: BuildOutput,
    ) -> BuildAttempt {
        BuildAttempt {
            manifest: built.manifest,
            profile: plan.profile.clone(),
            command: command.clone(),
            outcome,
            diagnostic,
            output,
        }
    }
}

/// The block printed when an install continues without the extension.
pub fn build_warning(failure: &BuildFailure) -> String {
    let mut lines: Vec<String> = BUILD_WARNING_BODY.iter().map(|l| l.to_string()).collect();
    lines.push(failure.describe());
    lines.push(String::new());
    lines.extend(BUILD_WARNING_FOOTER.iter().map(|l| l.to_string()));
    banner('-', BUILD_WARNING_TITLE, &lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::failure::FailureSignature;
    use crate::core::version::{Implementation, RuntimeVersion};
    use crate::ops::resolve::{resolve, ResolveOptions};
    use crate::test_support::{runtime, source_tree, ScriptedBuilder};

    fn plan(root: &std::path::Path, platform: &str) -> BuildPlan {
        let rt = runtime(Implementation::CPython, RuntimeVersion::new(2, 7), platform);
        resolve(&rt, &ResolveOptions::new(root)).unwrap()
    }

    fn install() -> CommandContext {
        CommandContext::from_args(["install"])
    }

    #[test]
    fn test_success_keeps_manifest() {
        let tree = source_tree(&["py2.7"]);
        let plan = plan(tree.path(), "linux");
        let builder = ScriptedBuilder::succeeding();

        let attempt = BuildOrchestrator::new(&builder)
            .with_echo(false)
            .run(&plan, &install())
            .unwrap();

        assert_eq!(attempt.outcome, Outcome::Success);
        assert_eq!(attempt.manifest, plan.manifest);
        assert!(attempt.diagnostic.is_none());
        assert_eq!(builder.calls(), 1);
    }

    #[test]
    fn test_recognized_failure_degrades_on_install() {
        let tree = source_tree(&["py2.7"]);
        let plan = plan(tree.path(), "linux");
        let builder = ScriptedBuilder::failing_once(
            BuildFailure::compiler_missing("no C compiler found").with_context("gcc: not found"),
        );

        let attempt = BuildOrchestrator::new(&builder)
            .with_echo(false)
            .run(&plan, &install())
            .unwrap();

        assert_eq!(attempt.outcome, Outcome::Degraded);
        assert!(attempt.manifest.is_empty());
        let warning = attempt.diagnostic.unwrap();
        assert!(warning.contains(BUILD_WARNING_TITLE));
        assert!(warning.contains("gcc: not found"));

        let calls = builder.descriptors();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].has_extension());
        assert!(!calls[1].has_extension());
        assert_eq!(calls[1].package_dir, calls[0].package_dir);
    }

    #[test]
    fn test_recognized_failure_is_fatal_outside_builds() {
        let tree = source_tree(&["py2.7"]);
        let plan = plan(tree.path(), "linux");
        let failure = BuildFailure::new(FailureSignature::CompileError, "compilation failed");
        let builder = ScriptedBuilder::failing_once(failure.clone());

        let err = BuildOrchestrator::new(&builder)
            .with_echo(false)
            .run(&plan, &CommandContext::from_args(["sdist"]))
            .unwrap_err();

        assert_eq!(err, failure);
        assert_eq!(builder.calls(), 1);
    }

    #[test]
    fn test_unrecognized_failure_is_fatal() {
        let tree = source_tree(&["py2.7"]);
        let plan = plan(tree.path(), "linux");
        let failure = BuildFailure::new(FailureSignature::Io, "disk full");
        let builder = ScriptedBuilder::failing_once(failure.clone());

        let err = BuildOrchestrator::new(&builder)
            .with_echo(false)
            .run(&plan, &install())
            .unwrap_err();

        assert_eq!(err, failure);
    }

    #[test]
    fn test_io_failure_degrades_on_windows() {
        let tree = source_tree(&["py2.7"]);
        let plan = plan(tree.path(), "win32");
        let builder =
            ScriptedBuilder::failing_once(BuildFailure::new(FailureSignature::Io, "access denied"));

        let attempt = BuildOrchestrator::new(&builder)
            .with_echo(false)
            .run(&plan, &CommandContext::from_args(["bdist_wheel"]))
            .unwrap();

        assert_eq!(attempt.outcome, Outcome::Degraded);
    }

    #[test]
    fn test_pure_fallback_failure_propagates() {
        let tree = source_tree(&["py2.7"]);
        let plan = plan(tree.path(), "linux");
        let second = BuildFailure::new(FailureSignature::Io, "cannot copy package");
        let builder = ScriptedBuilder::new(vec![
            Err(BuildFailure::compiler_missing("no C compiler found")),
            Err(second.clone()),
        ]);

        let err = BuildOrchestrator::new(&builder)
            .with_echo(false)
            .run(&plan, &install())
            .unwrap_err();

        assert_eq!(err, second);
    }

    #[test]
    fn test_skip_policy_never_compiles() {
        let tree = source_tree(&["pypy3.9"]);
        let rt = runtime(Implementation::PyPy, RuntimeVersion::new(3, 9), "linux");
        let plan = resolve(&rt, &ResolveOptions::new(tree.path())).unwrap();
        let builder = ScriptedBuilder::succeeding();

        let attempt = BuildOrchestrator::new(&builder)
            .with_echo(false)
            .run(&plan, &install())
            .unwrap();

        assert_eq!(attempt.outcome, Outcome::Success);
        assert!(attempt.manifest.is_empty());
        assert!(!builder.descriptors()[0].has_extension());
    }

    #[test]
    fn test_warning_layout() {
        let warning = build_warning(&BuildFailure::compiler_missing("no C compiler found"));
        let lines: Vec<&str> = warning.lines().collect();

        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "-".repeat(71));
        assert_eq!(lines[2], BUILD_WARNING_TITLE);
        assert_eq!(lines[3], "-".repeat(71));
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], BUILD_WARNING_BODY[1]);
        assert!(lines.contains(&"compiler missing: no C compiler found"));

        let tail = &lines[lines.len() - 4..];
        assert_eq!(tail[0], "built-in _multiprocessing module.  Most notably you will not be able to use");
        assert_eq!(tail[1], "FORCE_EXECV on POSIX systems.  If this is a problem for you then please");
        assert_eq!(tail[2], "install a C compiler or fix the error(s) above.");
        assert_eq!(tail[3], "-".repeat(71));
    }
}
