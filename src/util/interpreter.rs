//! Interpreter probing.
//!
//! Runs a small script under the target interpreter and reads back the facts
//! the resolver needs as one JSON object. The script sticks to modules that
//! exist on every supported version, 2.7 included.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::platform::SystemConfig;
use crate::core::runtime::RuntimeInfo;
use crate::core::version::{Implementation, RuntimeVersion};
use crate::util::process::ProcessBuilder;

/// Config vars read for capability detection.
pub const PROBED_CONFIG_VARS: &[&str] = &["HAVE_SEM_OPEN", "POSIX_SEMAPHORES_NOT_ENABLED"];

const PROBE_SCRIPT: &str = r#"
import json, platform, sys, sysconfig
names = sys.argv[1:]
print(json.dumps({
    "implementation": platform.python_implementation(),
    "major": sys.version_info[0],
    "minor": sys.version_info[1],
    "platform": sys.platform,
    "include_dir": sysconfig.get_paths().get("include"),
    "ext_suffix": sysconfig.get_config_var("EXT_SUFFIX") or sysconfig.get_config_var("SO"),
    "config": dict((n, sysconfig.get_config_var(n)) for n in names),
}))
"#;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    implementation: String,
    major: u32,
    minor: u32,
    platform: String,
    include_dir: Option<PathBuf>,
    ext_suffix: Option<String>,
    #[serde(default)]
    config: SystemConfig,
}

/// Ask `python` about itself.
pub fn probe(python: &Path) -> Result<RuntimeInfo> {
    let output = ProcessBuilder::new(python)
        .arg("-c")
        .arg(PROBE_SCRIPT)
        .args(PROBED_CONFIG_VARS)
        .exec_and_check()
        .with_context(|| format!("failed to probe interpreter `{}`", python.display()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut info = parse_probe_output(&stdout)
        .with_context(|| format!("unexpected probe output from `{}`", python.display()))?;
    info.executable = Some(python.to_path_buf());

    tracing::debug!(
        "probed {} {} on {}",
        info.implementation,
        info.version,
        info.platform
    );

    Ok(info)
}

/// Parse the JSON line printed by the probe script.
pub fn parse_probe_output(stdout: &str) -> Result<RuntimeInfo> {
    let line = stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .context("probe printed nothing")?;

    let probe: ProbeOutput = serde_json::from_str(line).context("probe output is not valid JSON")?;
    let implementation = probe
        .implementation
        .parse::<Implementation>()
        .map_err(anyhow::Error::msg)?;

    Ok(RuntimeInfo {
        implementation,
        version: RuntimeVersion::new(probe.major, probe.minor),
        platform: probe.platform,
        config: probe.config,
        include_dir: probe.include_dir,
        ext_suffix: probe.ext_suffix.filter(|s| !s.is_empty()),
        executable: None,
    })
}
