//! Toolchain abstraction for compiling the extension module.
//!
//! Generates compile and link commands for GCC-style drivers (gcc, clang,
//! cc) and for MSVC. Detection order:
//! 1. Explicit compiler (`--cc` or `[toolchain] cc`)
//! 2. `cl.exe` on Windows platforms
//! 3. `CC`, then `cc`/`gcc`/`clang` on PATH

use std::path::{Path, PathBuf};

mod detect;
mod gcc;
mod msvc;

pub use detect::detect_toolchain;
pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

/// A command to execute, with program, arguments, and environment.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The program to run (e.g., "gcc", "cl.exe")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }
}

/// Input for compiling one source file.
#[derive(Debug, Clone)]
pub struct CompileInput {
    pub source: PathBuf,
    pub output: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    /// Preprocessor defines as `(name, value)`
    pub defines: Vec<(String, String)>,
    pub cflags: Vec<String>,
}

/// Input for linking the extension module.
#[derive(Debug, Clone)]
pub struct LinkInput {
    pub objects: Vec<PathBuf>,
    pub output: PathBuf,
    /// Libraries to link (without -l prefix or .lib suffix)
    pub libs: Vec<String>,
    pub ldflags: Vec<String>,
}

/// The family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainPlatform {
    Gcc,
    Clang,
    Msvc,
}

impl ToolchainPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainPlatform::Gcc => "gcc",
            ToolchainPlatform::Clang => "clang",
            ToolchainPlatform::Msvc => "msvc",
        }
    }

    /// Guess the family from a compiler's file name.
    pub fn from_compiler_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if stem == "cl" || stem == "clang-cl" {
            ToolchainPlatform::Msvc
        } else if stem.contains("clang") {
            ToolchainPlatform::Clang
        } else {
            ToolchainPlatform::Gcc
        }
    }
}

/// Trait for toolchain implementations.
pub trait Toolchain: Send + Sync {
    fn platform(&self) -> ToolchainPlatform;

    fn compiler_path(&self) -> &Path;

    fn compile_command(&self, input: &CompileInput) -> CommandSpec;

    /// Link objects into a loadable module.
    fn link_shared_command(&self, input: &LinkInput) -> CommandSpec;

    fn object_extension(&self) -> &str;

    /// Module suffix used when the interpreter did not report one.
    fn default_module_suffix(&self) -> &str;
}
