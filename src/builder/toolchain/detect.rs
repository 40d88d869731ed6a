//! Toolchain detection functions.

use std::path::Path;

use crate::builder::failure::{BuildFailure, FailureSignature};
use crate::core::platform::PlatformFamily;
use crate::util::process::{find_c_compiler, find_executable, resolve_program};

use super::{GccToolchain, MsvcToolchain, Toolchain, ToolchainPlatform};

/// Detect the toolchain for a target platform family.
///
/// Absence of a compiler is reported as a [`BuildFailure`] so the
/// orchestrator can decide whether to degrade.
pub fn detect_toolchain(
    family: PlatformFamily,
    cc: Option<&Path>,
) -> Result<Box<dyn Toolchain>, BuildFailure> {
    if let Some(cc) = cc {
        return from_explicit(cc, family);
    }

    if family == PlatformFamily::Windows {
        return detect_msvc();
    }

    let cc = find_c_compiler().ok_or_else(|| {
        BuildFailure::compiler_missing("no C compiler found")
            .with_context("searched CC, cc, gcc and clang on PATH")
    })?;

    let platform = ToolchainPlatform::from_compiler_path(&cc);
    tracing::debug!("using {} compiler at {}", platform.as_str(), cc.display());

    Ok(Box::new(GccToolchain::new(
        cc,
        platform,
        family == PlatformFamily::Darwin,
    )))
}

fn from_explicit(cc: &Path, family: PlatformFamily) -> Result<Box<dyn Toolchain>, BuildFailure> {
    let resolved = resolve_program(cc).ok_or_else(|| {
        BuildFailure::compiler_missing(format!("configured C compiler not found: {}", cc.display()))
    })?;

    match ToolchainPlatform::from_compiler_path(&resolved) {
        ToolchainPlatform::Msvc => {
            let link = sibling_linker(&resolved)?;
            Ok(Box::new(MsvcToolchain::new(resolved, link)))
        }
        platform => Ok(Box::new(GccToolchain::new(
            resolved,
            platform,
            family == PlatformFamily::Darwin,
        ))),
    }
}

/// `cl.exe` must come with a usable environment (a developer prompt).
fn detect_msvc() -> Result<Box<dyn Toolchain>, BuildFailure> {
    let Some(cl) = find_executable("cl") else {
        return Err(BuildFailure::new(
            FailureSignature::PlatformError,
            "Microsoft Visual C++ is required to build the extension",
        )
        .with_context("cl.exe was not found on PATH; run from a developer command prompt"));
    };

    if std::env::var_os("INCLUDE").is_none() || std::env::var_os("LIB").is_none() {
        return Err(BuildFailure::new(
            FailureSignature::PlatformError,
            "MSVC environment is not configured",
        )
        .with_context(format!(
            "found {} but INCLUDE/LIB are unset; run vcvarsall.bat first",
            cl.display()
        )));
    }

    let link = sibling_linker(&cl)?;
    Ok(Box::new(MsvcToolchain::new(cl, link)))
}

fn sibling_linker(cl: &Path) -> Result<std::path::PathBuf, BuildFailure> {
    let sibling = cl.with_file_name(if cfg!(windows) { "link.exe" } else { "link" });
    if sibling.is_file() {
        return Ok(sibling);
    }

    find_executable("link").ok_or_else(|| {
        BuildFailure::new(
            FailureSignature::PlatformError,
            format!("MSVC {} found but link.exe is missing", cl.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_compiler() {
        let err = detect_toolchain(
            PlatformFamily::Unix,
            Some(Path::new("/nonexistent/bin/gcc-99")),
        )
        .err()
        .unwrap();

        assert_eq!(err.signature, FailureSignature::CompilerMissing);
        assert!(err.message.contains("/nonexistent/bin/gcc-99"));
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_compiler_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cc = tmp.path().join("clang");
        std::fs::write(&cc, "").unwrap();

        let tc = detect_toolchain(PlatformFamily::Darwin, Some(&cc)).unwrap();
        assert_eq!(tc.platform(), ToolchainPlatform::Clang);
        assert_eq!(tc.compiler_path(), cc.as_path());
    }
}
