//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use extresolve::core::{Implementation, RuntimeVersion};

/// extresolve - build-time configuration for the _multiprocess extension
#[derive(Parser)]
#[command(name = "extresolve")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve and print the build plan without building
    Plan(PlanArgs),

    /// Resolve, build with fallback, and check the optional dependency
    Run(RunArgs),

    /// Print the capability profile of a platform identifier
    Profile(ProfileArgs),
}

/// How the target interpreter is described: probed, overridden, or both.
#[derive(Args, Debug, Clone)]
pub struct RuntimeArgs {
    /// Project root holding the version trees (defaults to current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Interpreter to probe (defaults to $PYTHON, then python3/python on PATH)
    #[arg(long, env = "EXTRESOLVE_PYTHON")]
    pub python: Option<PathBuf>,

    /// Interpreter implementation (cpython, pypy, jython)
    #[arg(long)]
    pub implementation: Option<Implementation>,

    /// Interpreter version as MAJOR.MINOR; skips the probe
    #[arg(long)]
    pub python_version: Option<RuntimeVersion>,

    /// Platform identifier as the interpreter reports it (e.g. linux, win32)
    #[arg(long)]
    pub platform: Option<String>,

    /// Compiled config variable, as KEY=VALUE (repeatable)
    #[arg(long = "sysconfig", value_name = "KEY=VALUE")]
    pub sysconfig: Vec<String>,

    /// Interpreter include directory
    #[arg(long)]
    pub include_dir: Option<PathBuf>,

    /// Extension module filename suffix
    #[arg(long)]
    pub ext_suffix: Option<String>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    /// Emit the plan as JSON
    #[arg(long)]
    pub json: bool,

    /// Attempt the extension on runtimes at or after 3.3
    #[arg(long)]
    pub native_on_modern: bool,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    /// C compiler to use
    #[arg(long)]
    pub cc: Option<PathBuf>,

    /// Output directory for objects and the module
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Attempt the extension on runtimes at or after 3.3
    #[arg(long)]
    pub native_on_modern: bool,

    /// Skip the optional dependency check
    #[arg(long)]
    pub no_advisory: bool,

    /// Host packaging command line (e.g. `install --user`)
    #[arg(last = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct ProfileArgs {
    /// Platform identifier (defaults to the host)
    pub platform: Option<String>,

    /// Compiled config variable, as KEY=VALUE (repeatable)
    #[arg(long = "sysconfig", value_name = "KEY=VALUE")]
    pub sysconfig: Vec<String>,

    /// Emit the profile as JSON
    #[arg(long)]
    pub json: bool,
}
