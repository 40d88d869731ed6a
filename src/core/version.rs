//! Interpreter implementations, runtime versions and version-specific trees.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Releases before this one ship no stable multiprocessing C API in the
/// stdlib, so the extension has to carry its own transport helpers.
pub const LEGACY_BOUNDARY: RuntimeVersion = RuntimeVersion::new(3, 3);

/// Interpreter implementation performing the install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Implementation {
    CPython,
    PyPy,
    Jython,
}

impl Implementation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Implementation::CPython => "cpython",
            Implementation::PyPy => "pypy",
            Implementation::Jython => "jython",
        }
    }

    /// Family tag of the version trees this implementation installs from.
    pub fn family(&self) -> TreeFamily {
        match self {
            Implementation::PyPy => TreeFamily::PyPy,
            Implementation::CPython | Implementation::Jython => TreeFamily::Py,
        }
    }

    /// Whether this implementation can load a compiled extension at all.
    pub fn compiles_extensions(&self) -> bool {
        matches!(self, Implementation::CPython)
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Implementation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cpython" | "python" | "cp" => Ok(Implementation::CPython),
            "pypy" | "pp" => Ok(Implementation::PyPy),
            "jython" | "java" => Ok(Implementation::Jython),
            _ => Err(format!(
                "unknown implementation '{}'; expected 'cpython', 'pypy', or 'jython'",
                s
            )),
        }
    }
}

/// Prefix of a version tree name (`py3.10`, `pypy3.9`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeFamily {
    Py,
    PyPy,
}

impl TreeFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeFamily::Py => "py",
            TreeFamily::PyPy => "pypy",
        }
    }
}

impl fmt::Display for TreeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `major.minor` interpreter version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
}

impl RuntimeVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        RuntimeVersion { major, minor }
    }

    /// True when this version predates [`LEGACY_BOUNDARY`].
    pub fn is_legacy(&self) -> bool {
        *self < LEGACY_BOUNDARY
    }

    /// Reason this version is refused outright, if it is.
    pub fn unsupported_reason(&self) -> Option<&'static str> {
        if *self < RuntimeVersion::new(2, 7) {
            Some("Versions of Python before 2.7 are not supported")
        } else if RuntimeVersion::new(3, 0) <= *self && *self < RuntimeVersion::new(3, 7) {
            Some("Versions of Python before 3.7 are not supported")
        } else {
            None
        }
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for RuntimeVersion {
    type Err = String;

    /// Parses `3.12`; a trailing patch component (`3.12.1`) is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let parse = |part: Option<&str>| -> Result<u32, String> {
            part.filter(|p| !p.is_empty())
                .ok_or_else(|| format!("invalid version '{}'; expected MAJOR.MINOR", s))?
                .parse::<u32>()
                .map_err(|_| format!("invalid version '{}'; expected MAJOR.MINOR", s))
        };

        let major = parse(parts.next())?;
        let minor = parse(parts.next())?;
        Ok(RuntimeVersion { major, minor })
    }
}

/// A version-specific source tree selected under the project root.
///
/// Only [`crate::resolver::VersionResolver`] creates these, and only for
/// directories it has seen on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionDirectory {
    family: TreeFamily,
    major: u32,
    minor: u32,
}

impl VersionDirectory {
    pub(crate) fn new(family: TreeFamily, major: u32, minor: u32) -> Self {
        VersionDirectory {
            family,
            major,
            minor,
        }
    }

    pub fn family(&self) -> TreeFamily {
        self.family
    }

    pub fn version(&self) -> RuntimeVersion {
        RuntimeVersion::new(self.major, self.minor)
    }

    /// Directory name, e.g. `py3.10`.
    pub fn name(&self) -> String {
        format!("{}{}.{}", self.family, self.major, self.minor)
    }

    pub fn path(&self, root: &Path) -> PathBuf {
        root.join(self.name())
    }

    /// `<tree>/Modules/_<package>`, holding the extension's C sources.
    pub fn source_dir(&self, root: &Path, package: &str) -> PathBuf {
        self.path(root).join("Modules").join(format!("_{}", package))
    }

    /// `<tree>/<package>`, holding the pure package.
    pub fn package_dir(&self, root: &Path, package: &str) -> PathBuf {
        self.path(root).join(package)
    }
}

impl fmt::Display for VersionDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!("3.12".parse::<RuntimeVersion>().unwrap(), RuntimeVersion::new(3, 12));
        assert_eq!("2.7.18".parse::<RuntimeVersion>().unwrap(), RuntimeVersion::new(2, 7));
        assert!("3".parse::<RuntimeVersion>().is_err());
        assert!("three.two".parse::<RuntimeVersion>().is_err());
    }

    #[test]
    fn test_legacy_boundary() {
        assert!(RuntimeVersion::new(2, 7).is_legacy());
        assert!(RuntimeVersion::new(3, 2).is_legacy());
        assert!(!RuntimeVersion::new(3, 3).is_legacy());
        assert!(!RuntimeVersion::new(3, 12).is_legacy());
    }

    #[test]
    fn test_unsupported_versions() {
        assert!(RuntimeVersion::new(2, 6).unsupported_reason().is_some());
        assert!(RuntimeVersion::new(3, 6).unsupported_reason().is_some());
        assert!(RuntimeVersion::new(2, 7).unsupported_reason().is_none());
        assert!(RuntimeVersion::new(3, 7).unsupported_reason().is_none());
        assert!(RuntimeVersion::new(4, 0).unsupported_reason().is_none());
    }

    #[test]
    fn test_directory_layout() {
        let dir = VersionDirectory::new(TreeFamily::PyPy, 3, 9);
        let root = Path::new("/src");

        assert_eq!(dir.name(), "pypy3.9");
        assert_eq!(
            dir.source_dir(root, "multiprocess"),
            Path::new("/src/pypy3.9/Modules/_multiprocess")
        );
        assert_eq!(
            dir.package_dir(root, "multiprocess"),
            Path::new("/src/pypy3.9/multiprocess")
        );
    }

    #[test]
    fn test_implementation_family() {
        assert_eq!(Implementation::PyPy.family(), TreeFamily::PyPy);
        assert_eq!(Implementation::Jython.family(), TreeFamily::Py);
        assert!(Implementation::CPython.compiles_extensions());
        assert!(!Implementation::PyPy.compiles_extensions());
        assert_eq!("PyPy".parse::<Implementation>().unwrap(), Implementation::PyPy);
    }
}
