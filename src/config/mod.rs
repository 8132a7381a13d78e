//! Configuration and shared types
//!
//! Engine settings, their validation, and the types every other module speaks.

pub mod settings;
pub mod types;
pub mod validator;
