//! Native build failures and their classification.
//!
//! Whether a failure may fall back to a pure install depends on what went
//! wrong. [`classify`] sorts every failure signature into
//! [`ErrorClass::Recognized`] (the toolchain is missing or rejected the
//! sources) or [`ErrorClass::Unrecognized`] (anything else).

use std::fmt;

use thiserror::Error;

use crate::core::platform::PlatformFamily;

/// What kind of failure the native build step hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureSignature {
    /// No C compiler could be found.
    CompilerMissing,
    /// The compiler ran and rejected a source file.
    CompileError,
    /// Linking the extension module failed.
    LinkError,
    /// A build tool could not be executed.
    ExecError,
    /// The platform's build tooling is unusable (e.g. no MSVC on Windows).
    PlatformError,
    /// Filesystem or other I/O error around the build.
    Io,
    /// The build was interrupted.
    Interrupted,
    /// A bug or unexpected state in the build collaborator.
    Internal,
}

impl FailureSignature {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureSignature::CompilerMissing => "compiler missing",
            FailureSignature::CompileError => "compile error",
            FailureSignature::LinkError => "link error",
            FailureSignature::ExecError => "exec error",
            FailureSignature::PlatformError => "platform error",
            FailureSignature::Io => "i/o error",
            FailureSignature::Interrupted => "interrupted",
            FailureSignature::Internal => "internal error",
        }
    }
}

impl fmt::Display for FailureSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Recognized,
    Unrecognized,
}

/// Classify a failure signature on a platform family.
///
/// I/O errors count as toolchain failures only on Windows, where a missing
/// Visual C++ installation surfaces as one.
pub fn classify(signature: FailureSignature, family: PlatformFamily) -> ErrorClass {
    match signature {
        FailureSignature::CompilerMissing
        | FailureSignature::CompileError
        | FailureSignature::LinkError
        | FailureSignature::ExecError
        | FailureSignature::PlatformError => ErrorClass::Recognized,
        FailureSignature::Io if family == PlatformFamily::Windows => ErrorClass::Recognized,
        FailureSignature::Io | FailureSignature::Interrupted | FailureSignature::Internal => {
            ErrorClass::Unrecognized
        }
    }
}

/// A failed native build step, with the context captured at the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{signature}: {message}")]
pub struct BuildFailure {
    pub signature: FailureSignature,
    pub message: String,
    /// Captured context: commands run, compiler output
    pub context: Vec<String>,
}

impl BuildFailure {
    pub fn new(signature: FailureSignature, message: impl Into<String>) -> Self {
        BuildFailure {
            signature,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn compiler_missing(message: impl Into<String>) -> Self {
        Self::new(FailureSignature::CompilerMissing, message)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        if !context.trim().is_empty() {
            self.context.push(context);
        }
        self
    }

    pub fn class(&self, family: PlatformFamily) -> ErrorClass {
        classify(self.signature, family)
    }

    /// The message followed by every captured context line.
    pub fn describe(&self) -> String {
        let mut out = self.to_string();
        for line in &self.context {
            out.push('\n');
            out.push_str(line.trim_end());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolchain_failures_are_recognized() {
        for sig in [
            FailureSignature::CompilerMissing,
            FailureSignature::CompileError,
            FailureSignature::LinkError,
            FailureSignature::ExecError,
            FailureSignature::PlatformError,
        ] {
            assert_eq!(classify(sig, PlatformFamily::Unix), ErrorClass::Recognized);
            assert_eq!(classify(sig, PlatformFamily::Windows), ErrorClass::Recognized);
        }
    }

    #[test]
    fn test_io_recognized_only_on_windows() {
        assert_eq!(
            classify(FailureSignature::Io, PlatformFamily::Windows),
            ErrorClass::Recognized
        );
        assert_eq!(
            classify(FailureSignature::Io, PlatformFamily::Darwin),
            ErrorClass::Unrecognized
        );
    }

    #[test]
    fn test_other_failures_unrecognized() {
        for family in [PlatformFamily::Unix, PlatformFamily::Windows] {
            assert_eq!(
                classify(FailureSignature::Interrupted, family),
                ErrorClass::Unrecognized
            );
            assert_eq!(
                classify(FailureSignature::Internal, family),
                ErrorClass::Unrecognized
            );
        }
    }

    #[test]
    fn test_describe_includes_context() {
        let failure = BuildFailure::new(FailureSignature::CompileError, "multiprocess.c failed")
            .with_context("cc -c multiprocess.c")
            .with_context("   ")
            .with_context("multiprocess.c:10: error: unknown type\n");

        assert_eq!(failure.context.len(), 2);
        assert_eq!(
            failure.describe(),
            "compile error: multiprocess.c failed\ncc -c multiprocess.c\nmultiprocess.c:10: error: unknown type"
        );
    }
}
