/// Outcome classification
///
/// Classification is a pure function of which phase failed and what the
/// process runner reported. There is no output sniffing: a failure of the
/// compile command is a compile error, a failure of the run command is a
/// runtime error.
use crate::config::types::EngineError;
use crate::exec::runner::{ProcessFailure, ProcessOutput};
use serde::Serialize;
use std::fmt;

/// Failure categories surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Dependency,
    Compile,
    Runtime,
    Resource,
}

impl FailureKind {
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::Dependency => "Dependency Error",
            FailureKind::Compile => "Compilation Error",
            FailureKind::Runtime => "Runtime Error",
            FailureKind::Resource => "Resource Error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal result of one execution request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Success { output: String },
    Failure { kind: FailureKind, detail: String },
}

impl ExecutionOutcome {
    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        ExecutionOutcome::Failure {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ExecutionOutcome::Success { .. } => None,
            ExecutionOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Short verdict name for logs and audit events
    pub fn verdict(&self) -> &'static str {
        match self {
            ExecutionOutcome::Success { .. } => "success",
            ExecutionOutcome::Failure { kind, .. } => match kind {
                FailureKind::Dependency => "dependency_error",
                FailureKind::Compile => "compile_error",
                FailureKind::Runtime => "runtime_error",
                FailureKind::Resource => "resource_error",
            },
        }
    }

    /// Flatten into the uniform `{ output }` text
    pub fn into_output(self) -> String {
        match self {
            ExecutionOutcome::Success { output } => output,
            ExecutionOutcome::Failure { kind, detail } => {
                if detail.is_empty() {
                    kind.label().to_string()
                } else {
                    format!("{}:\n{}", kind.label(), detail)
                }
            }
        }
    }
}

impl From<EngineError> for ExecutionOutcome {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Dependency(detail) => {
                ExecutionOutcome::failure(FailureKind::Dependency, detail)
            }
            EngineError::Compile(detail) => ExecutionOutcome::failure(FailureKind::Compile, detail),
            EngineError::Runtime(detail) => ExecutionOutcome::failure(FailureKind::Runtime, detail),
            other => ExecutionOutcome::failure(FailureKind::Resource, other.to_string()),
        }
    }
}

/// Verdict classifier - pure functions over runner results
pub struct VerdictClassifier;

impl VerdictClassifier {
    /// A failed compile command. Everything the compiler printed is kept.
    pub fn classify_compile_failure(failure: &ProcessFailure) -> ExecutionOutcome {
        ExecutionOutcome::failure(FailureKind::Compile, Self::diagnostics(failure))
    }

    /// Result of the run command
    pub fn classify_run(result: Result<ProcessOutput, ProcessFailure>) -> ExecutionOutcome {
        match result {
            Ok(output) => {
                let text = if output.stdout.is_empty() {
                    output.stderr
                } else {
                    output.stdout
                };
                ExecutionOutcome::Success { output: text }
            }
            Err(failure) => {
                ExecutionOutcome::failure(FailureKind::Runtime, Self::diagnostics(&failure))
            }
        }
    }

    /// stdout, stderr and a termination note, whichever are non-empty
    pub fn diagnostics(failure: &ProcessFailure) -> String {
        let note = match (failure.termination_note(), failure.exit_code) {
            (note, _) if !note.is_empty() => note,
            (_, Some(code)) => format!("Process exited with status {}", code),
            (_, None) => String::new(),
        };

        [failure.stdout.trim_end(), failure.stderr.trim_end(), note.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
