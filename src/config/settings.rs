/// Engine configuration loading from codebox.json
use crate::config::types::{EngineError, PhaseTimeouts, Result};
use crate::config::validator::{validate_config, OVERRIDE_CEILING_MS};
use crate::utils::output::DEFAULT_STREAM_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "codebox.json";

/// Binaries used to compile, run and install for each language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toolchain {
    pub python: String,
    pub node: String,
    pub javac: String,
    pub java: String,
    pub gxx: String,
    pub gcc: String,
    pub pip: String,
    pub npm: String,
    pub mvn: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            node: "node".to_string(),
            javac: "javac".to_string(),
            java: "java".to_string(),
            gxx: "g++".to_string(),
            gcc: "gcc".to_string(),
            pip: "pip".to_string(),
            npm: "npm".to_string(),
            mvn: "mvn".to_string(),
        }
    }
}

impl Toolchain {
    /// Every configured binary with a short label, for probing
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("python", self.python.as_str()),
            ("node", self.node.as_str()),
            ("javac", self.javac.as_str()),
            ("java", self.java.as_str()),
            ("g++", self.gxx.as_str()),
            ("gcc", self.gcc.as_str()),
            ("pip", self.pip.as_str()),
            ("npm", self.npm.as_str()),
            ("mvn", self.mvn.as_str()),
        ]
    }
}

/// Per-client request budget enforced by the HTTP adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window_secs: 60,
        }
    }
}

/// Full codebox.json structure. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory under which per-request workspaces are created
    pub temp_root: PathBuf,
    pub install_timeout_ms: u64,
    pub compile_timeout_ms: u64,
    pub run_timeout_ms: u64,
    /// Upper bound for language-level timeout overrides
    pub max_override_ms: u64,
    /// Per-stream byte ceiling for captured output
    pub output_limit_bytes: usize,
    /// Suffix appended to compiled executables (".exe" on Windows hosts)
    pub executable_suffix: String,
    /// Age after which orphaned workspaces are swept at server start
    pub stale_workspace_secs: u64,
    pub toolchain: Toolchain,
    pub rate_limit: RateLimitConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            temp_root: Self::runtime_root_dir(),
            install_timeout_ms: 60_000,
            compile_timeout_ms: 5_000,
            run_timeout_ms: 3_000,
            max_override_ms: 10_000,
            output_limit_bytes: DEFAULT_STREAM_LIMIT,
            executable_suffix: if cfg!(windows) { ".exe" } else { "" }.to_string(),
            stale_workspace_secs: 3_600,
            toolchain: Toolchain::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Runtime root directory scoped by effective UID, so different users
    /// never share a workspace root.
    pub fn runtime_root_dir() -> PathBuf {
        let euid = unsafe { libc::geteuid() };
        std::env::temp_dir().join(format!("codebox-uid-{}", euid))
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| EngineError::Config(format!("Failed to parse config JSON: {}", e)))
    }

    /// Load ./codebox.json if present, defaults otherwise
    pub fn load_default() -> Result<Self> {
        let config_path = std::env::current_dir()
            .map_err(|e| EngineError::Config(format!("Failed to get current directory: {}", e)))?
            .join(DEFAULT_CONFIG_FILE);

        if !config_path.exists() {
            log::debug!("{} not found, using built-in defaults", DEFAULT_CONFIG_FILE);
            return Ok(Self::default());
        }

        Self::load_from_file(config_path)
    }

    /// Load from an explicit path or the default location, then validate.
    /// Validation errors are fatal; warnings are logged.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default()?,
        };

        let validation = validate_config(&config)?;
        for warning in &validation.warnings {
            log::warn!("Configuration warning: {}", warning);
        }

        Ok(config)
    }

    /// Configured phase deadlines before any language override
    pub fn phase_timeouts(&self) -> PhaseTimeouts {
        PhaseTimeouts {
            install: Duration::from_millis(self.install_timeout_ms),
            compile: Duration::from_millis(self.compile_timeout_ms),
            run: Duration::from_millis(self.run_timeout_ms),
        }
    }

    /// Cap for language overrides, clamped to the hard ceiling
    pub fn max_override(&self) -> Duration {
        Duration::from_millis(self.max_override_ms.min(OVERRIDE_CEILING_MS))
    }

    pub fn stale_workspace_age(&self) -> Duration {
        Duration::from_secs(self.stale_workspace_secs)
    }
}
