//! Native extension build.
//!
//! Source set assembly, build planning, the C compiler driver and the
//! orchestrator that falls back to a pure install.

pub mod descriptor;
pub mod failure;
pub mod native;
pub mod orchestrator;
pub mod plan;
pub mod sources;
pub mod toolchain;

pub use descriptor::BuildDescriptor;
pub use failure::{classify, BuildFailure, ErrorClass, FailureSignature};
pub use native::{BuildOutput, CcBuilder, NativeBuild};
pub use orchestrator::{BuildAttempt, BuildOrchestrator, Outcome};
pub use plan::{BuildPlan, NativePolicy, SkipReason};
pub use sources::SourceSetBuilder;
pub use toolchain::{detect_toolchain, CommandSpec, GccToolchain, MsvcToolchain, Toolchain, ToolchainPlatform};
