//! MSVC toolchain implementation.

use std::path::{Path, PathBuf};

use super::{CommandSpec, CompileInput, LinkInput, Toolchain, ToolchainPlatform};

/// Microsoft Visual C++ (`cl.exe` + `link.exe`).
#[derive(Debug, Clone)]
pub struct MsvcToolchain {
    pub cl: PathBuf,
    pub link: PathBuf,
}

impl MsvcToolchain {
    pub fn new(cl: PathBuf, link: PathBuf) -> Self {
        MsvcToolchain { cl, link }
    }
}

impl Toolchain for MsvcToolchain {
    fn platform(&self) -> ToolchainPlatform {
        ToolchainPlatform::Msvc
    }

    fn compiler_path(&self) -> &Path {
        &self.cl
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cl).args(["/nologo", "/c", "/MD"]);

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("/I{}", dir.display()));
        }

        for (name, value) in &input.defines {
            cmd = cmd.arg(format!("/D{}={}", name, value));
        }

        cmd = cmd.args(input.cflags.iter().cloned());

        cmd.arg(input.source.display().to_string())
            .arg(format!("/Fo{}", input.output.display()))
    }

    fn link_shared_command(&self, input: &LinkInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.link)
            .args(["/nologo", "/DLL"])
            .arg(format!("/OUT:{}", input.output.display()));

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        for lib in &input.libs {
            cmd = cmd.arg(format!("{}.lib", lib));
        }

        cmd.args(input.ldflags.iter().cloned())
    }

    fn object_extension(&self) -> &str {
        "obj"
    }

    fn default_module_suffix(&self) -> &str {
        ".pyd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msvc_commands() {
        let tc = MsvcToolchain::new(PathBuf::from("cl.exe"), PathBuf::from("link.exe"));

        let compile = tc.compile_command(&CompileInput {
            source: PathBuf::from("multiprocess.c"),
            output: PathBuf::from("multiprocess.obj"),
            include_dirs: vec![],
            defines: vec![("HAVE_SEM_OPEN".to_string(), "1".to_string())],
            cflags: vec![],
        });
        assert!(compile.args.contains(&"/DHAVE_SEM_OPEN=1".to_string()));
        assert_eq!(compile.args.last().unwrap(), "/Fomultiprocess.obj");

        let link = tc.link_shared_command(&LinkInput {
            objects: vec![PathBuf::from("multiprocess.obj")],
            output: PathBuf::from("_multiprocess.pyd"),
            libs: vec!["ws2_32".to_string()],
            ldflags: vec![],
        });
        assert_eq!(link.program, PathBuf::from("link.exe"));
        assert!(link.args.contains(&"/OUT:_multiprocess.pyd".to_string()));
        assert!(link.args.contains(&"ws2_32.lib".to_string()));
    }
}
