//! `extresolve profile` command

use anyhow::Result;

use crate::cli::ProfileArgs;
use extresolve::core::platform::{detect, host_platform_id};

pub fn execute(args: ProfileArgs) -> Result<()> {
    let platform = args.platform.unwrap_or_else(host_platform_id);
    let config = super::sysconfig_only(&args.sysconfig)?;

    let profile = detect(&platform, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("{}", profile);
    }

    Ok(())
}
