use crate::config::settings::Toolchain;
use crate::config::types::{CommandSpec, Language, PhaseTimeouts, Result, TimeoutOverrides};
use crate::deps::detect::{detect, Dependency};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// What a driver needs to know to build a command for one request
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    /// Workspace directory, also the working directory of every command
    pub workspace: &'a Path,
    /// Final source file name inside the workspace
    pub source_file: &'a str,
    pub toolchain: &'a Toolchain,
    /// Host executable suffix for compiled binaries
    pub executable_suffix: &'a str,
}

/// Language driver contract for dependency, compile and run stages.
///
/// Drivers are stateless descriptors; every command is an argv vector rooted
/// in the request workspace.
pub trait LanguageDriver: Send + Sync {
    fn language(&self) -> Language;

    /// File name the source must be saved under
    fn source_file_name(&self, source: &str) -> String;

    /// File name the source is first written to, when it differs from the
    /// final name and is renamed before compiling
    fn staging_file_name(&self) -> Option<&'static str> {
        None
    }

    fn detect_dependencies(&self, source: &str) -> Result<BTreeSet<Dependency>> {
        detect(self.language(), source)
    }

    /// Install one dependency. None when the language installs nothing.
    fn install_command(&self, _dependency: &Dependency, _ctx: &CommandContext) -> Option<CommandSpec> {
        None
    }

    /// None for interpreted languages
    fn compile_command(&self, _ctx: &CommandContext) -> Option<CommandSpec> {
        None
    }

    fn run_command(&self, ctx: &CommandContext) -> CommandSpec;

    fn timeout_overrides(&self) -> TimeoutOverrides {
        TimeoutOverrides::default()
    }

    /// Effective per-phase deadlines, overrides capped at `cap`
    fn timeouts(&self, defaults: PhaseTimeouts, cap: Duration) -> PhaseTimeouts {
        defaults.with_overrides(self.timeout_overrides(), cap)
    }
}
