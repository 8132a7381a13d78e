/// Process Runner
///
/// Spawns one external command in its own process group, feeds optional stdin,
/// collects both streams under a byte ceiling and enforces a wall-clock
/// deadline measured from spawn. On expiry the whole group receives SIGTERM,
/// then SIGKILL after a short grace.
use crate::config::types::CommandSpec;
use crate::observability::audit::events;
use crate::utils::output::StreamCollector;
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::fmt;
use std::io::Write;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval while waiting for the child
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Delay between SIGTERM and SIGKILL
pub const KILL_GRACE: Duration = Duration::from_millis(200);

/// How long both collectors together may take to hit EOF once the group is gone
const COLLECT_GRACE: Duration = Duration::from_millis(500);

/// Streams of a process that exited with status 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Anything other than a clean zero exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    pub stdout: String,
    pub stderr: String,
    /// None when the process was killed by a signal or never spawned
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl ProcessFailure {
    fn spawn_error(command: &CommandSpec, error: std::io::Error) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("failed to start `{}`: {}", command.program, error),
            exit_code: None,
            signal: None,
            timed_out: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Short note on why the process ended, empty for a plain non-zero exit
    pub fn termination_note(&self) -> String {
        if self.timed_out {
            format!("Time limit exceeded after {} ms", self.elapsed.as_millis())
        } else if let Some(signal) = self.signal {
            match Signal::try_from(signal) {
                Ok(sig) => format!("Terminated by signal {} ({})", signal, sig.as_str()),
                Err(_) => format!("Terminated by signal {}", signal),
            }
        } else {
            String::new()
        }
    }
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.timed_out, self.signal, self.exit_code) {
            (true, _, _) => write!(f, "timed out after {} ms", self.elapsed.as_millis()),
            (false, Some(sig), _) => write!(f, "killed by signal {}", sig),
            (false, None, Some(code)) => write!(f, "exited with status {}", code),
            (false, None, None) => f.write_str("did not start"),
        }
    }
}

/// Run `command` to completion or until `timeout` elapses
pub fn run(
    command: &CommandSpec,
    timeout: Duration,
    stdin: Option<&str>,
    output_limit: usize,
) -> Result<ProcessOutput, ProcessFailure> {
    let stdin = stdin.filter(|s| !s.is_empty());

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .process_group(0);
    if let Some(dir) = &command.workdir {
        cmd.current_dir(dir);
    }

    log::debug!("Spawning `{}` (timeout {:?})", command, timeout);
    let started = Instant::now();

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            log::debug!("Spawn of `{}` failed: {}", command.program, e);
            return Err(ProcessFailure::spawn_error(command, e));
        }
    };
    let pgid = Pid::from_raw(child.id() as i32);

    let stdout_collector = child
        .stdout
        .take()
        .map(|s| StreamCollector::spawn(s, output_limit));
    let stderr_collector = child
        .stderr
        .take()
        .map(|s| StreamCollector::spawn(s, output_limit));

    let writer = match (stdin, child.stdin.take()) {
        (Some(data), Some(mut pipe)) => {
            let data = data.to_owned();
            Some(thread::spawn(move || {
                if let Err(e) = pipe.write_all(data.as_bytes()) {
                    if e.kind() != std::io::ErrorKind::BrokenPipe {
                        log::debug!("stdin write failed: {}", e);
                    }
                }
                // Dropping the pipe delivers EOF.
            }))
        }
        _ => None,
    };

    let (status, timed_out) = wait_with_deadline(&mut child, pgid, started, timeout, command);
    let elapsed = started.elapsed();

    // Anything the payload forked is still holding our pipes.
    signal_group(pgid, Signal::SIGKILL);

    if let Some(handle) = writer {
        let _ = handle.join();
    }
    let collect_deadline = Instant::now() + COLLECT_GRACE;
    let stdout = finish(stdout_collector, collect_deadline);
    let stderr = finish(stderr_collector, collect_deadline);

    let status = match status {
        Some(status) => status,
        None => {
            return Err(ProcessFailure {
                stdout,
                stderr,
                exit_code: None,
                signal: None,
                timed_out,
                elapsed,
            })
        }
    };

    if !timed_out && status.success() {
        return Ok(ProcessOutput {
            stdout,
            stderr,
            elapsed,
        });
    }

    Err(ProcessFailure {
        stdout,
        stderr,
        exit_code: status.code(),
        signal: status.signal(),
        timed_out,
        elapsed,
    })
}

fn finish(collector: Option<StreamCollector>, deadline: Instant) -> String {
    collector
        .map(|c| c.finish(deadline))
        .unwrap_or_default()
        .into_text()
}

/// Poll the child until it exits or the deadline passes. Returns the exit
/// status (None if waiting itself failed) and whether the deadline fired.
fn wait_with_deadline(
    child: &mut Child,
    pgid: Pid,
    started: Instant,
    timeout: Duration,
    command: &CommandSpec,
) -> (Option<ExitStatus>, bool) {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return (Some(status), false),
            Ok(None) => {
                if started.elapsed() >= timeout {
                    terminate_group(child, pgid);
                    events::timeout_kill(command.to_string(), timeout.as_millis());
                    return (child.wait().ok(), true);
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                log::warn!("wait on `{}` failed: {}", command.program, e);
                terminate_group(child, pgid);
                let _ = child.wait();
                return (None, false);
            }
        }
    }
}

/// SIGTERM the group, give it the grace period, then SIGKILL
fn terminate_group(child: &mut Child, pgid: Pid) {
    signal_group(pgid, Signal::SIGTERM);

    let grace_end = Instant::now() + KILL_GRACE;
    while Instant::now() < grace_end {
        if let Ok(Some(_)) = child.try_wait() {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    signal_group(pgid, Signal::SIGKILL);
    // The leader may have left the group; make sure it is gone too.
    let _ = child.kill();
}

fn signal_group(pgid: Pid, signal: Signal) {
    match killpg(pgid, signal) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => log::debug!("killpg({}, {}) failed: {}", pgid, signal, e),
    }
}
