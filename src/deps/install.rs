/// Dependency installation
///
/// One process per dependency, each under the install deadline. Every
/// dependency is attempted; failures are collected and reported together.
use super::detect::Dependency;
use crate::config::types::{EngineError, Result};
use crate::exec::runner;
use crate::judge::adapter::{CommandContext, LanguageDriver};
use std::collections::BTreeSet;
use std::time::Duration;

pub fn install_all(
    driver: &dyn LanguageDriver,
    dependencies: &BTreeSet<Dependency>,
    ctx: &CommandContext,
    timeout: Duration,
    output_limit: usize,
) -> Result<()> {
    let mut failures = Vec::new();

    for dependency in dependencies {
        let Some(command) = driver.install_command(dependency, ctx) else {
            continue;
        };

        log::info!("Installing {} dependency {}", driver.language(), dependency);
        match runner::run(&command, timeout, None, output_limit) {
            Ok(_) => log::debug!("Installed {}", dependency),
            Err(failure) => {
                let reason = failure.stderr.trim();
                let reason = if failure.timed_out || reason.is_empty() {
                    failure.to_string()
                } else {
                    reason.to_string()
                };
                log::warn!("Failed to install {}: {}", dependency, failure);
                failures.push(format!("Failed to install {}: {}", dependency, reason));
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Dependency(failures.join("\n")))
    }
}
