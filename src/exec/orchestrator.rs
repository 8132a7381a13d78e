/// Execution Orchestrator
///
/// One request moves through a type-state chain so illegal orderings cannot
/// compile:
///
/// Created -> Resolved -> Compiled -> ExecutionOutcome
///
/// Each step consumes the prior state and returns exactly one next state, or a
/// `Terminated` carrying the classified outcome. The workspace is owned by the
/// chain and destroyed when the chain ends, whichever state it ends in.
use crate::config::settings::EngineConfig;
use crate::config::types::{ExecutionRequest, PhaseTimeouts, Result};
use crate::deps::install::install_all;
use crate::exec::runner;
use crate::judge::adapter::{CommandContext, LanguageDriver};
use crate::judge::registry::driver_for;
use crate::observability::audit::events;
use crate::safety::workspace::{Workspace, WorkspaceManager, SOURCE_FILE_MODE};
use crate::verdict::{ExecutionOutcome, FailureKind, VerdictClassifier};
use std::marker::PhantomData;
use std::path::Path;
use std::time::Instant;

/// Type-state marker: workspace allocated, nothing resolved yet
pub struct Created;

/// Type-state marker: dependencies detected and installed
pub struct Resolved;

/// Type-state marker: source written and, where applicable, compiled
pub struct Compiled;

/// A request in flight. `S` tracks how far it has progressed.
pub struct Execution<'e, S> {
    config: &'e EngineConfig,
    request: &'e ExecutionRequest,
    driver: &'static dyn LanguageDriver,
    workspace: Workspace,
    source_file: String,
    timeouts: PhaseTimeouts,
    _state: PhantomData<S>,
}

/// A chain that stopped before the run phase
pub struct Terminated {
    outcome: ExecutionOutcome,
    workspace: Workspace,
}

impl Terminated {
    pub fn outcome(&self) -> &ExecutionOutcome {
        &self.outcome
    }

    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }

    /// Destroy the workspace and hand back the outcome
    pub fn finish(self) -> ExecutionOutcome {
        self.workspace.destroy();
        self.outcome
    }
}

impl<'e, S> Execution<'e, S> {
    pub fn run_id(&self) -> &str {
        self.workspace.run_id()
    }

    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }

    /// Final file name of the source inside the workspace
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn timeouts(&self) -> PhaseTimeouts {
        self.timeouts
    }

    fn context(&self) -> CommandContext<'_> {
        CommandContext {
            workspace: self.workspace.path(),
            source_file: &self.source_file,
            toolchain: &self.config.toolchain,
            executable_suffix: &self.config.executable_suffix,
        }
    }

    fn advance<N>(self) -> Execution<'e, N> {
        Execution {
            config: self.config,
            request: self.request,
            driver: self.driver,
            workspace: self.workspace,
            source_file: self.source_file,
            timeouts: self.timeouts,
            _state: PhantomData,
        }
    }

    fn terminate(self, outcome: ExecutionOutcome) -> Terminated {
        Terminated {
            outcome,
            workspace: self.workspace,
        }
    }
}

impl<'e> Execution<'e, Created> {
    /// Detect and install dependencies
    pub fn resolve_dependencies(self) -> std::result::Result<Execution<'e, Resolved>, Terminated> {
        let language = self.request.language();

        let dependencies = match self.driver.detect_dependencies(self.request.source_code()) {
            Ok(deps) => deps,
            Err(e) => {
                let outcome = ExecutionOutcome::from(e);
                if let ExecutionOutcome::Failure { detail, .. } = &outcome {
                    events::dependency_rejected(self.run_id(), language.as_str(), detail);
                }
                return Err(self.terminate(outcome));
            }
        };

        if !dependencies.is_empty() {
            log::info!(
                "[{}] {} dependencies to install: {:?}",
                self.run_id(),
                language,
                dependencies.iter().map(|d| d.name()).collect::<Vec<_>>()
            );
            let result = install_all(
                self.driver,
                &dependencies,
                &self.context(),
                self.timeouts.install,
                self.config.output_limit_bytes,
            );
            if let Err(e) = result {
                events::phase_failure(self.run_id(), "install", e.to_string());
                return Err(self.terminate(e.into()));
            }
        }

        Ok(self.advance())
    }
}

impl<'e> Execution<'e, Resolved> {
    /// Write the source and run the compile command, if the language has one
    pub fn compile(self) -> std::result::Result<Execution<'e, Compiled>, Terminated> {
        if let Err(e) = self.write_source() {
            return Err(self.terminate(e.into()));
        }

        let command = self.driver.compile_command(&self.context());
        let Some(command) = command else {
            return Ok(self.advance());
        };

        log::debug!("[{}] compiling: {}", self.run_id(), command);
        match runner::run(
            &command,
            self.timeouts.compile,
            None,
            self.config.output_limit_bytes,
        ) {
            Ok(_) => Ok(self.advance()),
            Err(failure) => {
                events::phase_failure(self.run_id(), "compile", command.to_string());
                let outcome = VerdictClassifier::classify_compile_failure(&failure);
                Err(self.terminate(outcome))
            }
        }
    }

    fn write_source(&self) -> Result<()> {
        let contents = self.request.source_code().as_bytes();
        match self.driver.staging_file_name() {
            Some(staging) if staging != self.source_file => {
                self.workspace.write_file(staging, contents, SOURCE_FILE_MODE)?;
                self.workspace.rename(staging, &self.source_file)?;
            }
            _ => {
                self.workspace
                    .write_file(&self.source_file, contents, SOURCE_FILE_MODE)?;
            }
        }
        Ok(())
    }
}

impl<'e> Execution<'e, Compiled> {
    /// Run the program and classify the result. Consumes the chain and
    /// destroys the workspace.
    pub fn run(self) -> ExecutionOutcome {
        let command = self.driver.run_command(&self.context());
        log::debug!("[{}] running: {}", self.run_id(), command);

        let result = runner::run(
            &command,
            self.timeouts.run,
            self.request.stdin(),
            self.config.output_limit_bytes,
        );
        if result.is_err() {
            events::phase_failure(self.run_id(), "run", command.to_string());
        }

        let outcome = VerdictClassifier::classify_run(result);
        self.workspace.destroy();
        outcome
    }
}

/// Request-independent engine. Holds only immutable configuration.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    workspaces: WorkspaceManager,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let workspaces = WorkspaceManager::new(config.temp_root.clone())?;
        Ok(Self { config, workspaces })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    /// Allocate a workspace and start the chain for `request`
    pub fn begin<'e>(
        &'e self,
        request: &'e ExecutionRequest,
    ) -> std::result::Result<Execution<'e, Created>, ExecutionOutcome> {
        let driver = driver_for(request.language());
        let workspace = self.workspaces.create().map_err(|e| {
            log::error!("Workspace allocation failed: {}", e);
            ExecutionOutcome::failure(FailureKind::Resource, e.to_string())
        })?;

        events::execution_start(workspace.run_id(), request.language().as_str());

        Ok(Execution {
            config: &self.config,
            request,
            driver,
            source_file: driver.source_file_name(request.source_code()),
            timeouts: driver.timeouts(self.config.phase_timeouts(), self.config.max_override()),
            workspace,
            _state: PhantomData,
        })
    }

    /// Run a request end to end. Never fails: every error becomes an outcome,
    /// and the workspace is gone by the time this returns.
    pub fn execute(&self, request: &ExecutionRequest) -> ExecutionOutcome {
        let started = Instant::now();
        let language = request.language();

        let execution = match self.begin(request) {
            Ok(execution) => execution,
            Err(outcome) => return outcome,
        };
        let run_id = execution.run_id().to_string();

        let outcome = match execution.resolve_dependencies().and_then(|resolved| resolved.compile()) {
            Ok(compiled) => compiled.run(),
            Err(terminated) => terminated.finish(),
        };

        log::info!(
            "[{}] {} execution finished: {} in {:?}",
            run_id,
            language,
            outcome.verdict(),
            started.elapsed()
        );
        events::execution_end(
            &run_id,
            language.as_str(),
            outcome.verdict(),
            started.elapsed().as_millis(),
        );
        outcome
    }
}
