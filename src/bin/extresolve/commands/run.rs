//! `extresolve run` command

use anyhow::Result;

use crate::cli::RunArgs;
use extresolve::builder::CcBuilder;
use extresolve::core::CommandContext;
use extresolve::ops::{
    install, resolve, DependencyAdvisor, InstallOptions, InterpreterProbe, OptionalDependency,
    ResolveOptions,
};
use extresolve::GlobalContext;

pub fn execute(args: RunArgs, no_color: bool) -> Result<()> {
    let ctx = GlobalContext::new(args.runtime.root.clone())?.with_color(!no_color);
    let config = ctx.config();
    let runtime = super::runtime_info(&args.runtime)?;

    let mut opts = ResolveOptions::from_context(&ctx);
    opts.native_on_modern_runtimes |= args.native_on_modern;

    let plan = resolve(&runtime, &opts)?;
    let command = CommandContext::from_args(&args.args);
    tracing::debug!("host command: `{}`", command);

    // CLI > config > search
    let builder = CcBuilder::new(args.build_dir.unwrap_or_else(|| ctx.build_dir()))
        .with_cc(args.cc.or_else(|| config.toolchain.cc.clone()))
        .with_cflags(config.toolchain.cflags.clone())
        .with_ldflags(config.toolchain.ldflags.clone());

    let advisor = DependencyAdvisor::new(OptionalDependency::from_config(config));
    let importer = match &runtime.executable {
        _ if args.no_advisory => None,
        Some(python) => Some(InterpreterProbe::new(Some(python.clone()))),
        None => {
            tracing::warn!(
                "target interpreter is unknown; pass --python to check for {}",
                advisor.dependency().requirement
            );
            None
        }
    };

    let install_opts = InstallOptions {
        advisor,
        echo: true,
    };

    let report = match &importer {
        Some(importer) => install(&plan, &command, &builder, importer, &install_opts)?,
        None => install(&plan, &command, &builder, &SkipProbe, &install_opts)?,
    };

    let attempt = &report.attempt;
    match &attempt.output.extension {
        Some(module) => println!("{}: built {}", attempt.outcome, module.display()),
        None => println!(
            "{}: installed {} without {}",
            attempt.outcome,
            attempt.output.package_dir.display(),
            plan.extension_name()
        ),
    }

    Ok(())
}

/// Stands in for the import check when it is turned off or has no interpreter.
struct SkipProbe;

impl extresolve::ops::DependencyProbe for SkipProbe {
    fn is_importable(&self, _module: &str) -> bool {
        true
    }
}
