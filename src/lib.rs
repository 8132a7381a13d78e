//! codebox: a multi-language code execution engine
//!
//! Takes source code and a target language, provisions a private workspace,
//! resolves dependencies, compiles when the language needs it, runs the
//! program under per-phase deadlines and output ceilings, and removes the
//! workspace on every exit path.
//!
//! # Architecture
//!
//! ## Configuration ([`config`])
//! - [`config::types`]: Languages, requests, commands, and the error enum
//! - [`config::settings`]: `codebox.json` loading and defaults
//! - [`config::validator`]: Configuration checks
//!
//! ## Safety & Cleanup ([`safety`])
//! - [`safety::workspace`]: Request-scoped directories with guaranteed removal
//!
//! ## Dependency Resolution ([`deps`])
//! - [`deps::detect`]: Import scanning
//! - [`deps::stdlib`]: Standard-library allowlists
//! - [`deps::install`]: Package manager invocation
//!
//! ## Execution Control ([`exec`])
//! - [`exec::runner`]: One process, one deadline, bounded output
//! - [`exec::orchestrator`]: Type-state request chain and the [`Engine`]
//!
//! ## Language Drivers ([`judge`])
//! - [`judge::adapter`]: The driver contract
//! - [`judge::registry`]: Exhaustive language to driver mapping
//!
//! ## Outcome ([`verdict`])
//! - [`verdict::verdict`]: Phase-based classification and the uniform response
//!
//! ## Observability ([`observability`])
//! - [`observability::audit`]: Structured lifecycle events
//!
//! ## Transport ([`server`], [`cli`])
//! - [`server`]: axum HTTP binding with per-client rate limiting
//! - [`cli`]: `codebox` command-line entry point
//!
//! # Design Principles
//!
//! 1. **Types prevent errors** - Phase order is enforced by the compiler
//! 2. **No shell** - Every command is an argv vector
//! 3. **Phase decides the verdict** - No substring sniffing of diagnostics
//! 4. **Cleanup always runs** - Explicit destroy, with `Drop` as the backstop

// Configuration
pub mod config;

// Safety & Cleanup
pub mod safety;

// Dependency resolution
pub mod deps;

// Execution Control
pub mod exec;

// Language drivers
pub mod judge;

// Outcome classification
pub mod verdict;

// Observability
pub mod observability;

// Utilities
pub mod utils;

// HTTP binding
pub mod server;

// CLI entrypoint wiring for the codebox binary.
pub mod cli;

// Re-export commonly used types for convenience
pub use config::settings::EngineConfig;
pub use config::types::*;
pub use exec::orchestrator::Engine;
pub use verdict::{ExecutionOutcome, FailureKind};
