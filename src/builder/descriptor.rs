//! The description of the extension handed to the native builder.

use std::path::PathBuf;

use serde::Serialize;

use crate::builder::plan::BuildPlan;
use crate::core::manifest::SourceManifest;
use crate::core::platform::PlatformFamily;

/// One extension module to build, plus the pure package installed with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildDescriptor {
    /// Module name (`_multiprocess`)
    pub name: String,
    pub manifest: SourceManifest,
    /// Capability macros, all defined to 0 or 1
    pub define_macros: Vec<(String, u8)>,
    pub libraries: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
    /// Pure package directory installed in every outcome
    pub package_dir: PathBuf,
    /// Module filename suffix reported by the interpreter
    pub ext_suffix: Option<String>,
    pub family: PlatformFamily,
}

impl BuildDescriptor {
    pub fn from_plan(plan: &BuildPlan) -> Self {
        let family = plan.profile.family();
        // Windows builds take no capability macros; they only select sources.
        let define_macros = match family {
            PlatformFamily::Windows => Vec::new(),
            _ => plan.profile.define_macros(),
        };

        BuildDescriptor {
            name: plan.extension_name(),
            manifest: plan.manifest.clone(),
            define_macros,
            libraries: plan.profile.libraries().to_vec(),
            include_dirs: plan.include_dirs.clone(),
            package_dir: plan.package_dir(),
            ext_suffix: plan.runtime.ext_suffix.clone(),
            family,
        }
    }

    /// The same install with the extension removed (pure build).
    pub fn without_extension(&self) -> Self {
        BuildDescriptor {
            manifest: SourceManifest::empty(),
            define_macros: Vec::new(),
            libraries: Vec::new(),
            ..self.clone()
        }
    }

    pub fn has_extension(&self) -> bool {
        !self.manifest.is_empty()
    }
}
