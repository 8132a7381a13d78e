//! Outcome classification
//!
//! Derives the terminal outcome of a request from the phase that failed and
//! the runner's report, and flattens it into the uniform response text.

pub mod verdict;

pub use verdict::{ExecutionOutcome, FailureKind, VerdictClassifier};
