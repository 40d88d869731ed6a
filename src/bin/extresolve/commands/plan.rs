//! `extresolve plan` command

use anyhow::Result;

use crate::cli::PlanArgs;
use extresolve::ops::{resolve, ResolveOptions};
use extresolve::util::diagnostic::{emit, Diagnostic};
use extresolve::GlobalContext;

pub fn execute(args: PlanArgs, no_color: bool) -> Result<()> {
    let ctx = GlobalContext::new(args.runtime.root.clone())?.with_color(!no_color);
    let runtime = super::runtime_info(&args.runtime)?;

    let mut opts = ResolveOptions::from_context(&ctx);
    opts.native_on_modern_runtimes |= args.native_on_modern;

    let plan = resolve(&runtime, &opts)?;

    for notice in &plan.notices {
        emit(&Diagnostic::warning(notice.clone()), ctx.color());
    }

    if args.json {
        println!("{}", plan.to_json()?);
    } else {
        println!("{}", plan);
    }

    Ok(())
}
