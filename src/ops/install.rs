//! The install pipeline: build with fallback, then the dependency check.

use crate::builder::failure::BuildFailure;
use crate::builder::native::NativeBuild;
use crate::builder::orchestrator::{BuildAttempt, BuildOrchestrator};
use crate::builder::plan::BuildPlan;
use crate::core::command::CommandContext;
use crate::ops::advisor::{Advisory, DependencyAdvisor, DependencyProbe};

/// Options for [`install`].
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub advisor: DependencyAdvisor,
    /// Write warnings and advisories to stderr as well as returning them
    pub echo: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        InstallOptions {
            advisor: DependencyAdvisor::default(),
            echo: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstallReport {
    pub attempt: BuildAttempt,
    pub advisory: Option<Advisory>,
}

/// Build `plan` for the host `command`, then check the optional dependency.
///
/// The advisory runs after every completed build, degraded or not; a
/// failed build is returned before it.
pub fn install(
    plan: &BuildPlan,
    command: &CommandContext,
    builder: &dyn NativeBuild,
    probe: &dyn DependencyProbe,
    opts: &InstallOptions,
) -> Result<InstallReport, BuildFailure> {
    if opts.echo {
        for notice in &plan.notices {
            eprintln!("{}", notice);
        }
    }

    let attempt = BuildOrchestrator::new(builder)
        .with_echo(opts.echo)
        .run(plan, command)?;

    tracing::info!("build finished: {}", attempt.outcome);

    let advisory = opts.advisor.check(probe);
    if let (Some(advisory), true) = (&advisory, opts.echo) {
        eprint!("{}", advisory);
    }

    Ok(InstallReport { attempt, advisory })
}
