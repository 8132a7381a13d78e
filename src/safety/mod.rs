//! Safety & cleanup
//!
//! Request-scoped workspaces with guaranteed removal.

pub mod workspace;
