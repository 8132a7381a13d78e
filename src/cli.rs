use crate::config::settings::EngineConfig;
use crate::config::types::{ExecutionRequest, Language};
use crate::exec::orchestrator::Engine;
use crate::exec::runner;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Deadline for each `--version` probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./codebox.json when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute source code once and print the result
    Execute {
        /// Programming language (python, javascript, java, cpp, c)
        #[arg(long)]
        language: String,
        /// Source code as string
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        code: Option<String>,
        /// Read source code from a file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
        /// Input data to pass to stdin
        #[arg(long)]
        stdin: Option<String>,
        /// Print the tagged outcome as JSON instead of plain output
        #[arg(long)]
        json: bool,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
    },
    /// Check if all language toolchains are installed
    CheckDeps {
        /// Verbose output showing detailed version information
        #[arg(long)]
        verbose: bool,
    },
}

pub fn run() -> Result<()> {
    env_logger::init();

    if !cfg!(unix) {
        anyhow::bail!("codebox requires a Unix-like system for process-group control");
    }

    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Execute {
            language,
            code,
            file,
            stdin,
            json,
        } => execute(config, &language, code, file, stdin, json),
        Commands::Serve { bind } => {
            let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
            runtime.block_on(crate::server::serve(config, bind))
        }
        Commands::CheckDeps { verbose } => check_language_dependencies(&config, verbose),
    }
}

fn execute(
    config: EngineConfig,
    language: &str,
    code: Option<String>,
    file: Option<PathBuf>,
    stdin: Option<String>,
    json: bool,
) -> Result<()> {
    let language: Language = language.parse()?;
    let source = match (code, file) {
        (Some(code), _) => code,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading source file {}", path.display()))?,
        (None, None) => anyhow::bail!("either --code or --file is required"),
    };

    let request = ExecutionRequest::new(language, source, stdin)?;
    let engine = Engine::new(config)?;
    let outcome = engine.execute(&request);
    let success = outcome.is_success();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        let output = outcome.into_output();
        print!("{}", output);
        if !output.is_empty() && !output.ends_with('\n') {
            println!();
        }
    }

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// Binaries a language cannot run without
fn required_binaries(config: &EngineConfig, language: Language) -> Vec<&str> {
    let tc = &config.toolchain;
    match language {
        Language::Python => vec![tc.python.as_str()],
        Language::JavaScript => vec![tc.node.as_str()],
        Language::Java => vec![tc.javac.as_str(), tc.java.as_str()],
        Language::Cpp => vec![tc.gxx.as_str()],
        Language::C => vec![tc.gcc.as_str()],
    }
}

/// Package manager used to install a language's dependencies, if any
fn package_manager(config: &EngineConfig, language: Language) -> Option<&str> {
    let tc = &config.toolchain;
    match language {
        Language::Python => Some(tc.pip.as_str()),
        Language::JavaScript => Some(tc.npm.as_str()),
        Language::Java => Some(tc.mvn.as_str()),
        Language::Cpp | Language::C => None,
    }
}

/// First line of `<binary> --version`, or None if it cannot run
fn probe(binary: &str) -> Option<String> {
    // The JDK tools only accept the single-dash form on older releases.
    let flag = if binary.ends_with("java") || binary.ends_with("javac") {
        "-version"
    } else {
        "--version"
    };
    let command = crate::config::types::CommandSpec::new(binary).arg(flag);

    let output = runner::run(&command, PROBE_TIMEOUT, None, 4096).ok()?;
    let text = if output.stdout.trim().is_empty() {
        output.stderr
    } else {
        output.stdout
    };
    Some(text.lines().next().unwrap_or("").trim().to_string())
}

fn check_language_dependencies(config: &EngineConfig, verbose: bool) -> Result<()> {
    println!("🔍 Checking language toolchains...");
    println!();

    let mut missing_languages = Vec::new();

    for language in Language::ALL {
        let mut lang_ok = true;
        let mut versions = Vec::new();

        for binary in required_binaries(config, language) {
            match probe(binary) {
                Some(version) => versions.push(format!("  {} -> {}", binary, version)),
                None => {
                    lang_ok = false;
                    versions.push(format!("  {} -> NOT FOUND", binary));
                }
            }
        }

        if let Some(manager) = package_manager(config, language) {
            let state = match probe(manager) {
                Some(version) => version,
                None => "NOT FOUND (imports outside the standard library will fail)".to_string(),
            };
            versions.push(format!("  {} -> {}", manager, state));
        }

        if lang_ok {
            println!("✅ {} - OK", language);
        } else {
            println!("❌ {} - MISSING", language);
            missing_languages.push(language);
        }
        if verbose {
            for version in versions {
                println!("{}", version);
            }
            println!();
        }
    }

    println!();
    if missing_languages.is_empty() {
        println!("All language toolchains are installed.");
        if verbose {
            println!();
            println!("Usage examples:");
            println!("  codebox execute --language=python --code='print(\"Hello World\")'");
            println!("  codebox serve --bind=0.0.0.0:8000");
        }
        Ok(())
    } else {
        let names: Vec<&str> = missing_languages.iter().map(|l| l.as_str()).collect();
        println!("Missing toolchains for: {}", names.join(", "));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_execute_requires_code_or_file() {
        assert!(Cli::try_parse_from(["codebox", "execute", "--language", "c"]).is_err());
        assert!(Cli::try_parse_from([
            "codebox", "execute", "--language", "c", "--code", "x", "--file", "y"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["codebox", "execute", "--language", "c", "--code", "x"]).is_ok());
    }

    #[test]
    fn test_config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["codebox", "check-deps", "--config", "/etc/codebox.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/codebox.json")));
    }

    #[test]
    fn test_required_binaries_follow_toolchain() {
        let mut config = EngineConfig::default();
        config.toolchain.gxx = "clang++".to_string();
        assert_eq!(required_binaries(&config, Language::Cpp), vec!["clang++"]);
        assert_eq!(required_binaries(&config, Language::Java), vec!["javac", "java"]);
        assert!(package_manager(&config, Language::C).is_none());
    }

    #[test]
    fn test_probe_missing_binary() {
        assert!(probe("/nonexistent/codebox-probe").is_none());
    }
}
