//! Execution control
//!
//! Process running with deadlines, and the type-state chain that drives one
//! request from dependency resolution to a classified outcome.

pub mod orchestrator;
pub mod runner;

pub use orchestrator::{Engine, Execution};
