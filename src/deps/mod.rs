//! Dependency resolution
//!
//! Import scanning against per-language standard-library allowlists, and
//! installation of what remains.

pub mod detect;
pub mod install;
pub mod stdlib;
