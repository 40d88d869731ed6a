//! Classification of the host packaging tool's command line.
//!
//! Only one question is asked of it: did the user intend to build or
//! install? Those commands may silently degrade to a pure install when the
//! native extension cannot be compiled; anything else (e.g. `sdist`) may not.

use std::fmt;

/// Command verbs for which degrading to a pure install is acceptable.
///
/// Matching is by prefix, so `build_ext` and `bdist_wheel` are build-like too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildVerb {
    Install,
    Build,
    Bdist,
}

impl BuildVerb {
    pub const ALL: [BuildVerb; 3] = [BuildVerb::Install, BuildVerb::Build, BuildVerb::Bdist];

    pub fn prefix(&self) -> &'static str {
        match self {
            BuildVerb::Install => "install",
            BuildVerb::Build => "build",
            BuildVerb::Bdist => "bdist",
        }
    }

    /// The build verb an argument starts with, if any.
    pub fn matching(arg: &str) -> Option<BuildVerb> {
        BuildVerb::ALL
            .into_iter()
            .find(|verb| arg.starts_with(verb.prefix()))
    }
}

impl fmt::Display for BuildVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// The invoking command line, classified once at entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    args: Vec<String>,
    build: Option<(usize, BuildVerb)>,
}

impl CommandContext {
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let build = args
            .iter()
            .enumerate()
            .find_map(|(i, arg)| BuildVerb::matching(arg).map(|verb| (i, verb)));

        CommandContext { args, build }
    }

    /// Whether a failed native build may degrade to a pure install.
    pub fn is_build_like(&self) -> bool {
        self.build.is_some()
    }

    pub fn build_verb(&self) -> Option<BuildVerb> {
        self.build.map(|(_, verb)| verb)
    }

    /// The argument that made this context build-like.
    pub fn matched_arg(&self) -> Option<&str> {
        self.build.map(|(i, _)| self.args[i].as_str())
    }

    /// First argument that is not an option, used for display.
    pub fn verb(&self) -> Option<&str> {
        self.args
            .iter()
            .map(String::as_str)
            .find(|arg| !arg.starts_with('-'))
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            f.write_str("(no command)")
        } else {
            f.write_str(&self.args.join(" "))
        }
    }
}
