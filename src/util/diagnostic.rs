//! User-facing diagnostic messages.
//!
//! Every error carries its root cause, the context that led to it, and what
//! to try next.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when the interpreter version has no source tree.
    pub const SUPPORTED_RUNTIME: &str =
        "Run with an interpreter that has a matching `py<major>.<minor>` tree, or pass --python-version";

    /// Suggestion when a resolved tree vanished mid-run.
    pub const RESTORE_TREE: &str = "Restore the source checkout and rerun the command";

    /// Suggestion when the native build fails outside a build command.
    pub const BUILD_FAILED: &str = "Run `extresolve --verbose run ...` for the compiler output";

    /// Suggestion when no interpreter can be probed.
    pub const NO_INTERPRETER: &str =
        "Pass --python <path>, or --python-version to skip the interpreter probe";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    fn label(&self, color: bool) -> &'static str {
        match (self, color) {
            (Severity::Error, true) => "\x1b[1;31merror\x1b[0m",
            (Severity::Warning, true) => "\x1b[1;33mwarning\x1b[0m",
            (Severity::Note, true) => "\x1b[1;36mnote\x1b[0m",
            (Severity::Error, false) => "error",
            (Severity::Warning, false) => "warning",
            (Severity::Note, false) => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(false))
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Note, message)
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = format!("{}: {}\n", self.severity.label(color), self.message);

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("   = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            let help = if color { "\x1b[1;32mhelp\x1b[0m" } else { "help" };
            output.push_str(&format!("\n{}: consider:\n", help));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

/// Width of the rules drawn by [`banner`].
pub const BANNER_WIDTH: usize = 71;

/// Frame `lines` between two rules of `width` `rule` characters.
///
/// Used for the blocks printed while an install carries on after a problem,
/// so they stand out in long packaging logs.
pub fn framed(rule: char, width: usize, lines: &[String]) -> String {
    let rule = rule.to_string().repeat(width);
    let mut out = format!("\n{}\n", rule);
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

/// A [`framed`] block whose title sits between two rules of its own.
pub fn banner(rule: char, title: &str, lines: &[String]) -> String {
    let mut body = vec![title.to_string(), rule.to_string().repeat(BANNER_WIDTH)];
    body.extend(lines.iter().cloned());
    framed(rule, BANNER_WIDTH, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("Python 3.5 is not supported")
            .with_context("no `py3.*` tree at or below `py3.5`")
            .with_suggestion("Use Python 3.7 or newer")
            .with_location("/src/project");

        let output = diag.format(false);
        assert!(output.starts_with("error: Python 3.5 is not supported\n"));
        assert!(output.contains("  --> /src/project"));
        assert!(output.contains("   = no `py3.*` tree"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Use Python 3.7"));
    }

    #[test]
    fn test_colored_severity() {
        let output = Diagnostic::warning("careful").format(true);
        assert!(output.contains("\x1b[1;33mwarning\x1b[0m: careful"));
    }

    #[test]
    fn test_banner_frames_lines() {
        let out = banner('-', "WARNING: title", &["body".to_string()]);
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines[0], "");
        assert_eq!(lines[1].len(), 71);
        assert_eq!(lines[2], "WARNING: title");
        assert_eq!(lines[4], "body");
        assert_eq!(lines[5], lines[1]);
    }

    #[test]
    fn test_framed_has_no_title_rule() {
        let out = framed('*', 59, &["title".to_string(), "    item".to_string()]);
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines, ["", &"*".repeat(59), "title", "    item", &"*".repeat(59)]);
    }
}
