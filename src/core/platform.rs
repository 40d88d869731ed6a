//! Platform capability detection.
//!
//! Maps a platform identifier (`sys.platform` style: `linux`, `darwin`,
//! `win32`, `freebsd8`, ...) to the capability macros and link libraries the
//! native extension is compiled with. Matchers are tried in priority order:
//! exact names, then pattern families, then a catch-all for the remaining
//! Unix-like systems.
//!
//! Macro meanings:
//!
//! - `HAVE_SEM_OPEN`: `sem_open()` exists; enables named semaphores and the
//!   semaphore source. Without it, synchronization only works via a manager.
//! - `HAVE_SEM_TIMEDWAIT`: `sem_timedwait()` exists; otherwise timed waits poll.
//! - `HAVE_FD_TRANSFER`: file descriptors can be passed over `AF_UNIX` sockets
//!   with `SCM_RIGHTS`.
//! - `HAVE_BROKEN_SEM_GETVALUE`: `sem_getvalue()` is missing or broken.
//! - `HAVE_BROKEN_SEM_UNLINK`: `sem_unlink()` is unnecessary.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

/// A capability macro passed to the C compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "HAVE_SEM_OPEN")]
    SemOpen,
    #[serde(rename = "HAVE_SEM_TIMEDWAIT")]
    SemTimedwait,
    #[serde(rename = "HAVE_FD_TRANSFER")]
    FdTransfer,
    #[serde(rename = "HAVE_BROKEN_SEM_GETVALUE")]
    BrokenSemGetvalue,
    #[serde(rename = "HAVE_BROKEN_SEM_UNLINK")]
    BrokenSemUnlink,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::SemOpen,
        Capability::SemTimedwait,
        Capability::FdTransfer,
        Capability::BrokenSemGetvalue,
        Capability::BrokenSemUnlink,
    ];

    /// The macro name as seen by the preprocessor.
    pub fn macro_name(&self) -> &'static str {
        match self {
            Capability::SemOpen => "HAVE_SEM_OPEN",
            Capability::SemTimedwait => "HAVE_SEM_TIMEDWAIT",
            Capability::FdTransfer => "HAVE_FD_TRANSFER",
            Capability::BrokenSemGetvalue => "HAVE_BROKEN_SEM_GETVALUE",
            Capability::BrokenSemUnlink => "HAVE_BROKEN_SEM_UNLINK",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.macro_name())
    }
}

/// Which matcher produced a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    Windows,
    Darwin,
    Cygwin,
    /// FreeBSD 4-6, whose POSIX semaphores are unusable.
    #[serde(rename = "legacy-freebsd")]
    LegacyFreeBsd,
    /// FreeBSD 7-10 and GNU/kFreeBSD 8-11.
    FreeBsd,
    OpenBsd,
    /// Linux and every other Unix.
    Unix,
}

impl PlatformFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFamily::Windows => "windows",
            PlatformFamily::Darwin => "darwin",
            PlatformFamily::Cygwin => "cygwin",
            PlatformFamily::LegacyFreeBsd => "legacy-freebsd",
            PlatformFamily::FreeBsd => "freebsd",
            PlatformFamily::OpenBsd => "openbsd",
            PlatformFamily::Unix => "unix",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled configuration of the interpreter (`sysconfig` variables).
///
/// Values keep their JSON shape; only truthiness is consulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemConfig {
    vars: BTreeMap<String, serde_json::Value>,
}

impl SystemConfig {
    pub fn new() -> Self {
        SystemConfig::default()
    }

    /// Set a variable.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.vars.get(name)
    }

    /// Truthiness of a variable; a missing variable is false.
    pub fn is_truthy(&self, name: &str) -> bool {
        use serde_json::Value;

        match self.vars.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Capability macros and link libraries for one platform identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformProfile {
    platform: String,
    family: PlatformFamily,
    #[serde(serialize_with = "serialize_macros")]
    macros: BTreeMap<Capability, bool>,
    libraries: Vec<String>,
}

fn serialize_macros<S: Serializer>(
    macros: &BTreeMap<Capability, bool>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(macros.iter().map(|(cap, on)| (cap.macro_name(), u8::from(*on))))
}

impl PlatformProfile {
    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    pub fn is_windows(&self) -> bool {
        self.family == PlatformFamily::Windows
    }

    /// Whether the macro is set to 1. Absent macros count as 0.
    pub fn has(&self, capability: Capability) -> bool {
        self.macros.get(&capability).copied().unwrap_or(false)
    }

    /// Macro value, always 0 or 1.
    pub fn macro_value(&self, capability: Capability) -> u8 {
        u8::from(self.has(capability))
    }

    /// Whether the profile defines the macro at all (to either value).
    pub fn defines(&self, capability: Capability) -> bool {
        self.macros.contains_key(&capability)
    }

    /// Defined macros as `(name, value)` pairs in a stable order.
    pub fn define_macros(&self) -> Vec<(String, u8)> {
        self.macros
            .iter()
            .map(|(cap, on)| (cap.macro_name().to_string(), u8::from(*on)))
            .collect()
    }

    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }
}

impl fmt::Display for PlatformProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "platform: {} ({})", self.platform, self.family)?;
        for (name, value) in self.define_macros() {
            writeln!(f, "  {}={}", name, value)?;
        }
        if self.libraries.is_empty() {
            write!(f, "libraries: (none)")
        } else {
            write!(f, "libraries: {}", self.libraries.join(", "))
        }
    }
}

enum Pattern {
    Exact(&'static str),
    Prefix(&'static str),
    OneOf(&'static [&'static str]),
    Regex(&'static LazyLock<Regex>),
}

impl Pattern {
    fn matches(&self, platform: &str) -> bool {
        match self {
            Pattern::Exact(name) => platform == *name,
            Pattern::Prefix(prefix) => platform.starts_with(prefix),
            Pattern::OneOf(names) => names.contains(&platform),
            Pattern::Regex(re) => re.is_match(platform),
        }
    }
}

enum Capabilities {
    Fixed {
        macros: &'static [(Capability, bool)],
        libraries: &'static [&'static str],
    },
    /// FreeBSD builds differ in whether POSIX semaphores were enabled, so
    /// `HAVE_SEM_OPEN` comes from the interpreter's compiled configuration.
    ProbedSemaphores,
}

struct Matcher {
    family: PlatformFamily,
    patterns: &'static [Pattern],
    capabilities: Capabilities,
}

static KFREEBSD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(gnukfreebsd(8|9|10|11)|freebsd(7|8|9|10))").expect("platform regex is valid")
});

static MATCHERS: [Matcher; 6] = [
    Matcher {
        family: PlatformFamily::Windows,
        patterns: &[Pattern::Exact("win32")],
        capabilities: Capabilities::Fixed {
            macros: &[(Capability::SemOpen, true)],
            libraries: &["ws2_32"],
        },
    },
    Matcher {
        family: PlatformFamily::Darwin,
        patterns: &[Pattern::Prefix("darwin"), Pattern::Exact("macos")],
        capabilities: Capabilities::Fixed {
            macros: &[
                (Capability::SemOpen, true),
                (Capability::SemTimedwait, false),
                (Capability::FdTransfer, true),
                (Capability::BrokenSemGetvalue, true),
            ],
            libraries: &[],
        },
    },
    Matcher {
        family: PlatformFamily::Cygwin,
        patterns: &[Pattern::Prefix("cygwin")],
        capabilities: Capabilities::Fixed {
            macros: &[
                (Capability::SemOpen, true),
                (Capability::SemTimedwait, true),
                (Capability::FdTransfer, false),
                (Capability::BrokenSemUnlink, true),
            ],
            libraries: &[],
        },
    },
    Matcher {
        family: PlatformFamily::LegacyFreeBsd,
        patterns: &[Pattern::OneOf(&["freebsd4", "freebsd5", "freebsd6"])],
        capabilities: Capabilities::Fixed {
            macros: &[
                (Capability::SemOpen, false),
                (Capability::SemTimedwait, false),
                (Capability::FdTransfer, true),
            ],
            libraries: &[],
        },
    },
    Matcher {
        family: PlatformFamily::FreeBsd,
        patterns: &[Pattern::Regex(&KFREEBSD)],
        capabilities: Capabilities::ProbedSemaphores,
    },
    Matcher {
        family: PlatformFamily::OpenBsd,
        patterns: &[Pattern::Prefix("openbsd")],
        capabilities: Capabilities::Fixed {
            macros: &[
                (Capability::SemOpen, false),
                (Capability::SemTimedwait, false),
                (Capability::FdTransfer, true),
            ],
            libraries: &[],
        },
    },
];

static FALLBACK: Matcher = Matcher {
    family: PlatformFamily::Unix,
    patterns: &[],
    capabilities: Capabilities::Fixed {
        macros: &[
            (Capability::SemOpen, true),
            (Capability::SemTimedwait, true),
            (Capability::FdTransfer, true),
        ],
        libraries: &["rt"],
    },
};

/// Resolve the capability profile for a platform identifier.
///
/// Pure: the result depends only on `platform` and, for the FreeBSD family,
/// on `config`.
pub fn detect(platform: &str, config: &SystemConfig) -> PlatformProfile {
    let matcher = MATCHERS
        .iter()
        .find(|m| m.patterns.iter().any(|p| p.matches(platform)))
        .unwrap_or(&FALLBACK);

    let (macros, libraries) = match &matcher.capabilities {
        Capabilities::Fixed { macros, libraries } => (
            macros.iter().copied().collect::<BTreeMap<_, _>>(),
            libraries.iter().map(|l| l.to_string()).collect::<Vec<_>>(),
        ),
        Capabilities::ProbedSemaphores => {
            let sem_open = config.is_truthy("HAVE_SEM_OPEN")
                && !config.is_truthy("POSIX_SEMAPHORES_NOT_ENABLED");
            let macros = BTreeMap::from([
                (Capability::SemOpen, sem_open),
                (Capability::SemTimedwait, true),
                (Capability::FdTransfer, true),
            ]);
            (macros, Vec::new())
        }
    };

    tracing::debug!(
        "platform `{}` matched the {} capability profile",
        platform,
        matcher.family
    );

    PlatformProfile {
        platform: platform.to_string(),
        family: matcher.family,
        macros,
        libraries,
    }
}

/// Platform identifier of the machine running this binary, spelled the way
/// the interpreter reports it.
pub fn host_platform_id() -> String {
    match std::env::consts::OS {
        "windows" => "win32".to_string(),
        "macos" => "darwin".to_string(),
        other => other.to_string(),
    }
}
