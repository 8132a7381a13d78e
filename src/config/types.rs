/// Core types shared across the execution engine
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Languages the engine can execute. The set is closed: every driver lookup
/// matches on it exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    Java,
    Cpp,
    C,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::JavaScript,
        Language::Java,
        Language::Cpp,
        Language::C,
    ];

    /// Canonical identifier, also used as the HTTP endpoint segment
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
        }
    }

    /// Whether the language has a compile phase
    pub fn is_compiled(self) -> bool {
        matches!(self, Language::Java | Language::Cpp | Language::C)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "python" | "py" | "python3" => Ok(Language::Python),
            "javascript" | "js" | "node" | "nodejs" => Ok(Language::JavaScript),
            "java" => Ok(Language::Java),
            "cpp" | "c++" | "cxx" | "cc" => Ok(Language::Cpp),
            "c" => Ok(Language::C),
            other => Err(EngineError::Validation(format!(
                "unsupported language: {}",
                other
            ))),
        }
    }
}

/// A validated execution request. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionRequest {
    language: Language,
    source_code: String,
    stdin: Option<String>,
}

impl ExecutionRequest {
    /// Build a request, rejecting empty source before any resource is allocated
    pub fn new(
        language: Language,
        source_code: impl Into<String>,
        stdin: Option<String>,
    ) -> Result<Self> {
        let source_code = source_code.into();
        if source_code.trim().is_empty() {
            return Err(EngineError::Validation(
                "source code is required".to_string(),
            ));
        }

        Ok(Self {
            language,
            source_code,
            stdin: stdin.filter(|s| !s.is_empty()),
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    pub fn stdin(&self) -> Option<&str> {
        self.stdin.as_deref()
    }
}

/// Independent wall-clock deadline per phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseTimeouts {
    pub install: Duration,
    pub compile: Duration,
    pub run: Duration,
}

impl Default for PhaseTimeouts {
    fn default() -> Self {
        Self {
            install: Duration::from_secs(60),
            compile: Duration::from_secs(5),
            run: Duration::from_secs(3),
        }
    }
}

impl PhaseTimeouts {
    /// Apply language-level overrides; each override is capped at `cap`
    pub fn with_overrides(mut self, overrides: TimeoutOverrides, cap: Duration) -> Self {
        if let Some(compile) = overrides.compile {
            self.compile = compile.min(cap);
        }
        if let Some(run) = overrides.run {
            self.run = run.min(cap);
        }
        self
    }
}

/// Per-language deviations from the configured phase timeouts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeoutOverrides {
    pub compile: Option<Duration>,
    pub run: Option<Duration>,
}

/// One external command as an argv vector. Never passed through a shell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            workdir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Error taxonomy for the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Dependency error: {0}")]
    Dependency(String),

    #[error("Compilation error: {0}")]
    Compile(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
