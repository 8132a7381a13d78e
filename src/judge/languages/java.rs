use crate::config::types::{CommandSpec, Language, TimeoutOverrides};
use crate::deps::detect::Dependency;
use crate::judge::adapter::{CommandContext, LanguageDriver};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct JavaDriver;

/// Class name used when the source declares none
pub const DEFAULT_CLASS: &str = "Main";

static PUBLIC_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bpublic\s+(?:(?:final|abstract|static)\s+)*class\s+([A-Za-z_$][A-Za-z0-9_$]*)")
        .expect("valid regex")
});
static ANY_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bclass\s+([A-Za-z_$][A-Za-z0-9_$]*)").expect("valid regex"));

/// First public class, else any class, else `Main`
pub fn detect_class_name(source: &str) -> String {
    let code = blank_comments_and_literals(source);
    PUBLIC_CLASS
        .captures(&code)
        .or_else(|| ANY_CLASS.captures(&code))
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| DEFAULT_CLASS.to_string())
}

/// Replace comments, string, text-block and char literals with spaces so
/// only declarations remain visible to the class patterns.
fn blank_comments_and_literals(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;

    let starts_with = |at: usize, pat: &str| {
        pat.chars()
            .enumerate()
            .all(|(k, c)| chars.get(at + k) == Some(&c))
    };

    while i < chars.len() {
        if starts_with(i, "//") {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else if starts_with(i, "/*") {
            i += 2;
            while i < chars.len() && !starts_with(i, "*/") {
                i += 1;
            }
            i = (i + 2).min(chars.len());
            out.push(' ');
        } else if starts_with(i, "\"\"\"") {
            i += 3;
            while i < chars.len() && !starts_with(i, "\"\"\"") {
                i += if chars[i] == '\\' { 2 } else { 1 };
            }
            i = (i + 3).min(chars.len());
            out.push(' ');
        } else if chars[i] == '"' || chars[i] == '\'' {
            let quote = chars[i];
            i += 1;
            while i < chars.len() && chars[i] != quote && chars[i] != '\n' {
                i += if chars[i] == '\\' { 2 } else { 1 };
            }
            i = (i + 1).min(chars.len());
            out.push(' ');
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

impl LanguageDriver for JavaDriver {
    fn language(&self) -> Language {
        Language::Java
    }

    fn source_file_name(&self, source: &str) -> String {
        format!("{}.java", detect_class_name(source))
    }

    fn staging_file_name(&self) -> Option<&'static str> {
        Some("main.java")
    }

    fn install_command(&self, dependency: &Dependency, ctx: &CommandContext) -> Option<CommandSpec> {
        let artifact = format!("-Dartifact={0}:{0}:LATEST", dependency.name());
        Some(
            CommandSpec::new(&ctx.toolchain.mvn)
                .args(["dependency:get".to_string(), artifact])
                .current_dir(ctx.workspace),
        )
    }

    fn compile_command(&self, ctx: &CommandContext) -> Option<CommandSpec> {
        Some(
            CommandSpec::new(&ctx.toolchain.javac)
                .args(["-encoding", "UTF-8", "-d"])
                .arg(ctx.workspace.to_string_lossy())
                .arg(ctx.source_file)
                .current_dir(ctx.workspace),
        )
    }

    fn run_command(&self, ctx: &CommandContext) -> CommandSpec {
        let class_name = ctx.source_file.trim_end_matches(".java");
        CommandSpec::new(&ctx.toolchain.java)
            .arg("-cp")
            .arg(ctx.workspace.to_string_lossy())
            .arg(class_name)
            .current_dir(ctx.workspace)
    }

    fn timeout_overrides(&self) -> TimeoutOverrides {
        TimeoutOverrides {
            compile: Some(Duration::from_secs(10)),
            run: Some(Duration::from_secs(10)),
        }
    }
}
