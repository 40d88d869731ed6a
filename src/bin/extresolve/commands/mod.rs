//! Command implementations

pub mod plan;
pub mod profile;
pub mod run;

use anyhow::{anyhow, bail, Context, Result};

use crate::cli::RuntimeArgs;
use extresolve::core::platform::host_platform_id;
use extresolve::core::{Implementation, RuntimeInfo, SystemConfig};
use extresolve::util::diagnostic::suggestions;
use extresolve::util::interpreter;
use extresolve::util::process::find_python;

/// Describe the target interpreter.
///
/// With `--python-version` the probe is skipped and every missing fact
/// takes a default (CPython on the host platform). Otherwise the
/// interpreter is probed and the flags given override what it reports.
pub fn runtime_info(args: &RuntimeArgs) -> Result<RuntimeInfo> {
    let mut info = match args.python_version {
        Some(version) => RuntimeInfo::new(
            args.implementation.unwrap_or(Implementation::CPython),
            version,
            args.platform.clone().unwrap_or_else(host_platform_id),
        ),
        None => {
            let python = match args.python.clone().or_else(find_python) {
                Some(python) => python,
                None => bail!(
                    "no Python interpreter found\n{}",
                    suggestions::NO_INTERPRETER
                ),
            };
            interpreter::probe(&python)?
        }
    };

    if let Some(implementation) = args.implementation {
        info.implementation = implementation;
    }
    if let Some(platform) = &args.platform {
        info.platform = platform.clone();
    }
    if let Some(dir) = &args.include_dir {
        info.include_dir = Some(dir.clone());
    }
    if let Some(suffix) = &args.ext_suffix {
        info.ext_suffix = Some(suffix.clone());
    }
    if info.executable.is_none() {
        info.executable = args.python.clone();
    }

    for (name, value) in parse_sysconfig(&args.sysconfig)? {
        info.config.set(name, value);
    }

    Ok(info)
}

/// Parse `KEY=VALUE` overrides. Values that read as JSON (`1`, `true`)
/// keep that type; anything else is a string.
pub fn parse_sysconfig(pairs: &[String]) -> Result<Vec<(String, serde_json::Value)>> {
    pairs
        .iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("invalid --sysconfig `{}`; expected KEY=VALUE", pair))?;
            let name = name.trim();
            if name.is_empty() {
                bail!("invalid --sysconfig `{}`; the key is empty", pair);
            }
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
            Ok((name.to_string(), value))
        })
        .collect()
}

/// Config vars from `--sysconfig` alone, for commands that never probe.
pub fn sysconfig_only(pairs: &[String]) -> Result<SystemConfig> {
    let mut config = SystemConfig::new();
    for (name, value) in parse_sysconfig(pairs).context("failed to read --sysconfig")? {
        config.set(name, value);
    }
    Ok(config)
}
