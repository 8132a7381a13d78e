//! Language drivers.
//!
//! The engine stays language-agnostic. Drivers define source naming,
//! dependency rules, and install/compile/run commands for each language.

pub mod adapter;
pub mod languages;
pub mod registry;
