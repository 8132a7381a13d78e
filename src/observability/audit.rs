/// Structured execution lifecycle events
///
/// Every event is rendered as one JSON line and emitted through the `log`
/// facade under the `codebox::audit` target, so operators can route it with
/// `RUST_LOG=codebox::audit=info` without a separate sink.
use log::Level;
use serde::Serialize;

/// Log target used for every audit line
pub const AUDIT_TARGET: &str = "codebox::audit";

/// Event severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    High,
    Medium,
    Low,
}

impl AuditSeverity {
    fn log_level(self) -> Level {
        match self {
            AuditSeverity::High => Level::Error,
            AuditSeverity::Medium => Level::Warn,
            AuditSeverity::Low => Level::Info,
        }
    }
}

/// Lifecycle events tracked per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    ExecutionStart,
    ExecutionEnd,
    DependencyRejected,
    PhaseFailure,
    TimeoutKill,
    CleanupSuccess,
    CleanupFailure,
}

impl AuditEventType {
    pub fn default_severity(&self) -> AuditSeverity {
        match self {
            AuditEventType::CleanupFailure => AuditSeverity::High,
            AuditEventType::TimeoutKill | AuditEventType::DependencyRejected => {
                AuditSeverity::Medium
            }
            _ => AuditSeverity::Low,
        }
    }
}

/// One audit record
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub event_type: AuditEventType,
    pub severity: AuditSeverity,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, details: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            severity: event_type.default_severity(),
            event_type,
            details: details.into(),
            run_id: None,
            language: None,
            command: None,
        }
    }

    pub fn with_run_id(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn with_command(mut self, command: String) -> Self {
        self.command = Some(command);
        self
    }

    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"event_type":"{:?}","details":"unserializable event: {}"}}"#,
                self.event_type, e
            )
        })
    }
}

/// Emit an event under the audit target
pub fn log_event(event: AuditEvent) {
    log::log!(
        target: AUDIT_TARGET,
        event.severity.log_level(),
        "{}",
        event.to_json_line()
    );
}

/// Convenience functions for common lifecycle events
pub mod events {
    use super::*;

    pub fn execution_start(run_id: &str, language: &str) {
        log_event(
            AuditEvent::new(
                AuditEventType::ExecutionStart,
                format!("Execution started: run_id={}", run_id),
            )
            .with_run_id(run_id)
            .with_language(language),
        );
    }

    pub fn execution_end(run_id: &str, language: &str, verdict: &str, elapsed_ms: u128) {
        log_event(
            AuditEvent::new(
                AuditEventType::ExecutionEnd,
                format!("Execution ended: verdict={}, elapsed_ms={}", verdict, elapsed_ms),
            )
            .with_run_id(run_id)
            .with_language(language),
        );
    }

    pub fn dependency_rejected(run_id: &str, language: &str, detail: &str) {
        log_event(
            AuditEvent::new(AuditEventType::DependencyRejected, detail)
                .with_run_id(run_id)
                .with_language(language),
        );
    }

    pub fn phase_failure(run_id: &str, phase: &str, command: String) {
        log_event(
            AuditEvent::new(
                AuditEventType::PhaseFailure,
                format!("{} phase failed", phase),
            )
            .with_run_id(run_id)
            .with_command(command),
        );
    }

    /// The process group was signalled after its deadline
    pub fn timeout_kill(command: String, timeout_ms: u128) {
        log_event(
            AuditEvent::new(
                AuditEventType::TimeoutKill,
                format!("Process group killed after {}ms", timeout_ms),
            )
            .with_command(command),
        );
    }

    pub fn cleanup_success(run_id: &str) {
        log_event(
            AuditEvent::new(AuditEventType::CleanupSuccess, "Workspace removed").with_run_id(run_id),
        );
    }

    pub fn cleanup_failure(run_id: &str, error: &str) {
        log_event(
            AuditEvent::new(
                AuditEventType::CleanupFailure,
                format!("Workspace removal failed: {}", error),
            )
            .with_run_id(run_id),
        );
    }
}
