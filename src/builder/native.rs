//! Native C compiler driver.
//!
//! Compiles the manifest's sources and links them into one loadable
//! extension module. An empty manifest is a pure install: nothing is
//! compiled and only the package directory is reported.

use std::path::{Path, PathBuf};
use std::process::Output;

use crate::builder::descriptor::BuildDescriptor;
use crate::builder::failure::{BuildFailure, FailureSignature};
use crate::builder::toolchain::{detect_toolchain, CommandSpec, CompileInput, LinkInput, Toolchain};
use crate::util::fs::ensure_dir;
use crate::util::process::ProcessBuilder;

/// What a build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// The linked extension module, absent for a pure install
    pub extension: Option<PathBuf>,
    /// Pure package directory installed alongside
    pub package_dir: PathBuf,
}

/// The external build step the orchestrator drives.
pub trait NativeBuild {
    fn build(&self, descriptor: &BuildDescriptor) -> Result<BuildOutput, BuildFailure>;
}

/// Builds the extension with the host C toolchain.
#[derive(Debug, Clone)]
pub struct CcBuilder {
    build_dir: PathBuf,
    cc: Option<PathBuf>,
    cflags: Vec<String>,
    ldflags: Vec<String>,
}

impl CcBuilder {
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        CcBuilder {
            build_dir: build_dir.into(),
            cc: None,
            cflags: Vec::new(),
            ldflags: Vec::new(),
        }
    }

    /// Use this compiler instead of searching for one.
    pub fn with_cc(mut self, cc: Option<PathBuf>) -> Self {
        self.cc = cc;
        self
    }

    pub fn with_cflags(mut self, cflags: Vec<String>) -> Self {
        self.cflags = cflags;
        self
    }

    pub fn with_ldflags(mut self, ldflags: Vec<String>) -> Self {
        self.ldflags = ldflags;
        self
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    fn temp_dir(&self, descriptor: &BuildDescriptor) -> PathBuf {
        self.build_dir.join("temp").join(&descriptor.name)
    }

    fn lib_dir(&self) -> PathBuf {
        self.build_dir.join("lib")
    }

    fn compile(
        &self,
        toolchain: &dyn Toolchain,
        descriptor: &BuildDescriptor,
        source: &Path,
        temp_dir: &Path,
    ) -> Result<PathBuf, BuildFailure> {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| descriptor.name.clone());
        let object = temp_dir.join(format!("{}.{}", stem, toolchain.object_extension()));

        let input = CompileInput {
            source: source.to_path_buf(),
            output: object.clone(),
            include_dirs: descriptor.include_dirs.clone(),
            defines: descriptor
                .define_macros
                .iter()
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect(),
            cflags: self.cflags.clone(),
        };

        tracing::debug!("Compiling {} -> {}", source.display(), object.display());

        let spec = toolchain.compile_command(&input);
        run_step(spec, FailureSignature::CompileError, || {
            format!("compilation failed for {}", source.display())
        })?;

        Ok(object)
    }

    fn link(
        &self,
        toolchain: &dyn Toolchain,
        descriptor: &BuildDescriptor,
        objects: Vec<PathBuf>,
    ) -> Result<PathBuf, BuildFailure> {
        let lib_dir = self.lib_dir();
        ensure_dir(&lib_dir).map_err(io_failure)?;

        let suffix = descriptor
            .ext_suffix
            .as_deref()
            .unwrap_or_else(|| toolchain.default_module_suffix());
        let output = lib_dir.join(format!("{}{}", descriptor.name, suffix));

        let input = LinkInput {
            objects,
            output: output.clone(),
            libs: descriptor.libraries.clone(),
            ldflags: self.ldflags.clone(),
        };

        tracing::debug!("Linking {}", output.display());

        let spec = toolchain.link_shared_command(&input);
        run_step(spec, FailureSignature::LinkError, || {
            format!("linking failed for {}", descriptor.name)
        })?;

        Ok(output)
    }
}

impl NativeBuild for CcBuilder {
    fn build(&self, descriptor: &BuildDescriptor) -> Result<BuildOutput, BuildFailure> {
        if !descriptor.has_extension() {
            tracing::info!(
                "Installing pure package from {}",
                descriptor.package_dir.display()
            );
            return Ok(BuildOutput {
                extension: None,
                package_dir: descriptor.package_dir.clone(),
            });
        }

        let toolchain = detect_toolchain(descriptor.family, self.cc.as_deref())?;

        let temp_dir = self.temp_dir(descriptor);
        ensure_dir(&temp_dir).map_err(io_failure)?;

        tracing::info!(
            "Compiling {} ({} sources)",
            descriptor.name,
            descriptor.manifest.len()
        );

        let mut objects = Vec::with_capacity(descriptor.manifest.len());
        for source in descriptor.manifest.sources() {
            objects.push(self.compile(toolchain.as_ref(), descriptor, source, &temp_dir)?);
        }

        let extension = self.link(toolchain.as_ref(), descriptor, objects)?;
        tracing::info!("Built {}", extension.display());

        Ok(BuildOutput {
            extension: Some(extension),
            package_dir: descriptor.package_dir.clone(),
        })
    }
}

fn process_builder_from_spec(spec: CommandSpec) -> ProcessBuilder {
    let mut cmd = ProcessBuilder::new(&spec.program);

    for arg in spec.args {
        cmd = cmd.arg(arg);
    }

    for (key, value) in spec.env {
        cmd = cmd.env(key, value);
    }

    cmd
}

/// Run one toolchain command, mapping a spawn failure to `ExecError`, a
/// signal to `Interrupted`, and a non-zero exit to `on_failure`.
fn run_step(
    spec: CommandSpec,
    on_failure: FailureSignature,
    message: impl FnOnce() -> String,
) -> Result<Output, BuildFailure> {
    let cmd = process_builder_from_spec(spec);
    let command_line = cmd.display_command();

    let output = cmd.exec().map_err(|e| {
        BuildFailure::new(FailureSignature::ExecError, format!("{:#}", e))
            .with_context(command_line.clone())
    })?;

    if output.status.success() {
        return Ok(output);
    }

    let signature = if output.status.code().is_none() {
        FailureSignature::Interrupted
    } else {
        on_failure
    };

    Err(BuildFailure::new(signature, message())
        .with_context(command_line)
        .with_context(String::from_utf8_lossy(&output.stdout).trim_end())
        .with_context(String::from_utf8_lossy(&output.stderr).trim_end()))
}

fn io_failure(err: anyhow::Error) -> BuildFailure {
    BuildFailure::new(FailureSignature::Io, format!("{:#}", err))
}
