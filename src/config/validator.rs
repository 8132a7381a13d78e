// Startup validation for EngineConfig.
// Errors are fatal at load time; warnings are reported and the value is used as-is
// (language overrides are clamped to max_override_ms at execution time).

use crate::config::settings::EngineConfig;
use crate::config::types::{EngineError, Result};

/// Hard ceiling for language-level timeout overrides
pub const OVERRIDE_CEILING_MS: u64 = 10_000;

/// Validation result with detailed errors
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Validate config at startup
pub fn validate_config(config: &EngineConfig) -> Result<ValidationResult> {
    let mut result = ValidationResult::new();

    validate_timeouts(config, &mut result);
    validate_output(config, &mut result);
    validate_paths(config, &mut result);
    validate_toolchain(config, &mut result);
    validate_rate_limit(config, &mut result);

    if !result.is_valid() {
        return Err(EngineError::Config(format!(
            "Config validation failed:\n{}",
            result.errors.join("\n")
        )));
    }

    Ok(result)
}

fn validate_timeouts(config: &EngineConfig, result: &mut ValidationResult) {
    for (name, value) in [
        ("install_timeout_ms", config.install_timeout_ms),
        ("compile_timeout_ms", config.compile_timeout_ms),
        ("run_timeout_ms", config.run_timeout_ms),
        ("max_override_ms", config.max_override_ms),
    ] {
        if value == 0 {
            result.add_error(format!("{} cannot be zero", name));
        }
    }

    if config.max_override_ms > OVERRIDE_CEILING_MS {
        result.add_warning(format!(
            "max_override_ms {} exceeds the {}ms ceiling for language overrides",
            config.max_override_ms, OVERRIDE_CEILING_MS
        ));
    }

    if config.run_timeout_ms > config.max_override_ms {
        result.add_warning(format!(
            "run_timeout_ms {} is larger than max_override_ms {}; overrides can only shorten runs",
            config.run_timeout_ms, config.max_override_ms
        ));
    }
}

fn validate_output(config: &EngineConfig, result: &mut ValidationResult) {
    if config.output_limit_bytes == 0 {
        result.add_error("output_limit_bytes cannot be zero".to_string());
    } else if config.output_limit_bytes > 1024 * 1024 {
        result.add_warning(format!(
            "output_limit_bytes {} is very high (> 1MB), responses may be large",
            config.output_limit_bytes
        ));
    }
}

fn validate_paths(config: &EngineConfig, result: &mut ValidationResult) {
    if config.temp_root.as_os_str().is_empty() {
        result.add_error("temp_root cannot be empty".to_string());
    } else if config.temp_root.is_relative() {
        result.add_warning(format!(
            "temp_root {} is relative; workspaces depend on the working directory",
            config.temp_root.display()
        ));
    }
}

fn validate_toolchain(config: &EngineConfig, result: &mut ValidationResult) {
    for (label, binary) in config.toolchain.entries() {
        if binary.trim().is_empty() {
            result.add_error(format!("toolchain.{} cannot be empty", label));
        }
    }
}

fn validate_rate_limit(config: &EngineConfig, result: &mut ValidationResult) {
    if config.rate_limit.window_secs == 0 {
        result.add_error("rate_limit.window_secs cannot be zero".to_string());
    }
    if config.rate_limit.max_requests == 0 {
        result.add_warning("rate_limit.max_requests is zero; every request will be rejected".to_string());
    }
}
