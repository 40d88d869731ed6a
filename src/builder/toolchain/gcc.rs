//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use super::{CommandSpec, CompileInput, LinkInput, Toolchain, ToolchainPlatform};

/// GCC-style driver (gcc, clang, cc) on Unix-like systems and Cygwin.
#[derive(Debug, Clone)]
pub struct GccToolchain {
    pub cc: PathBuf,
    pub family: ToolchainPlatform,
    /// Target is macOS; modules there link with `-bundle -undefined dynamic_lookup`
    pub darwin: bool,
}

impl GccToolchain {
    pub fn new(cc: PathBuf, family: ToolchainPlatform, darwin: bool) -> Self {
        GccToolchain { cc, family, darwin }
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cc
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cc).args(["-c", "-fPIC"]);

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        for (name, value) in &input.defines {
            cmd = cmd.arg(format!("-D{}={}", name, value));
        }

        cmd = cmd.args(input.cflags.iter().cloned());

        cmd.arg(input.source.display().to_string())
            .arg("-o")
            .arg(input.output.display().to_string())
    }

    fn link_shared_command(&self, input: &LinkInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cc);

        // Interpreter symbols resolve at import time, not at link time.
        cmd = if self.darwin {
            cmd.args(["-bundle", "-undefined", "dynamic_lookup"])
        } else {
            cmd.arg("-shared")
        };

        cmd = cmd.arg("-o").arg(input.output.display().to_string());

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        for lib in &input.libs {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        cmd.args(input.ldflags.iter().cloned())
    }

    fn object_extension(&self) -> &str {
        "o"
    }

    fn default_module_suffix(&self) -> &str {
        ".so"
    }
}
