//! Optional runtime dependency check.
//!
//! The package works without its serialization dependency but loses most of
//! its reach, so a missing one is reported after the install. The check
//! never changes the outcome.

use std::fmt;
use std::path::PathBuf;

use crate::util::config::Config;
use crate::util::diagnostic::framed;
use crate::util::process::ProcessBuilder;

pub const ADVISORY_TITLE: &str = "WARNING: One of the following dependencies is unresolved:";

const ADVISORY_WIDTH: usize = 59;

/// Answers whether a module can be imported by the target interpreter.
pub trait DependencyProbe {
    fn is_importable(&self, module: &str) -> bool;
}

/// Probes by running `python -c "import <module>"`.
#[derive(Debug, Clone)]
pub struct InterpreterProbe {
    python: Option<PathBuf>,
}

impl InterpreterProbe {
    /// A probe with no interpreter reports every module as missing.
    pub fn new(python: Option<PathBuf>) -> Self {
        InterpreterProbe { python }
    }
}

impl DependencyProbe for InterpreterProbe {
    fn is_importable(&self, module: &str) -> bool {
        let Some(python) = &self.python else {
            tracing::debug!("no interpreter to import `{}` with", module);
            return false;
        };

        match ProcessBuilder::new(python)
            .arg("-c")
            .arg(format!("import {}", module))
            .exec()
        {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!("import probe for `{}` failed: {:#}", module, e);
                false
            }
        }
    }
}

/// The optional dependency: a requirement string and its import name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalDependency {
    pub requirement: String,
    pub module: String,
}

impl OptionalDependency {
    pub fn new(requirement: impl Into<String>, module: impl Into<String>) -> Self {
        OptionalDependency {
            requirement: requirement.into(),
            module: module.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        OptionalDependency::new(config.dependency_requirement(), config.dependency_module())
    }
}

impl Default for OptionalDependency {
    fn default() -> Self {
        OptionalDependency::from_config(&Config::default())
    }
}

/// Notice that the optional dependency could not be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub requirement: String,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = [ADVISORY_TITLE.to_string(), format!("    {}", self.requirement)];
        f.write_str(&framed('*', ADVISORY_WIDTH, &lines))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencyAdvisor {
    dependency: OptionalDependency,
}

impl DependencyAdvisor {
    pub fn new(dependency: OptionalDependency) -> Self {
        DependencyAdvisor { dependency }
    }

    pub fn dependency(&self) -> &OptionalDependency {
        &self.dependency
    }

    /// Returns an advisory when the dependency is not importable.
    pub fn check(&self, probe: &dyn DependencyProbe) -> Option<Advisory> {
        if probe.is_importable(&self.dependency.module) {
            tracing::debug!("optional dependency `{}` is present", self.dependency.module);
            return None;
        }

        tracing::warn!("optional dependency `{}` is unresolved", self.dependency.requirement);
        Some(Advisory {
            requirement: self.dependency.requirement.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StaticProbe;

    #[test]
    fn test_default_dependency() {
        let dep = OptionalDependency::default();
        assert_eq!(dep.requirement, "dill>=0.3.5.1");
        assert_eq!(dep.module, "dill");
    }

    #[test]
    fn test_present_dependency_is_silent() {
        let advisor = DependencyAdvisor::default();
        assert_eq!(advisor.check(&StaticProbe::with(&["dill"])), None);
    }

    #[test]
    fn test_missing_dependency_advisory() {
        let advisor = DependencyAdvisor::default();
        let advisory = advisor.check(&StaticProbe::with(&[])).unwrap();
        let text = advisory.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[1], "*".repeat(59));
        assert_eq!(lines[2], ADVISORY_TITLE);
        assert_eq!(lines[3], "    dill>=0.3.5.1");
        assert_eq!(lines[4], "*".repeat(59));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_probe_without_interpreter() {
        assert!(!InterpreterProbe::new(None).is_importable("dill"));
        assert!(!InterpreterProbe::new(Some(PathBuf::from("/nonexistent/python"))).is_importable("dill"));
    }
}
