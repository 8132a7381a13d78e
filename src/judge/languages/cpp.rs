use crate::config::types::{CommandSpec, Language};
use crate::judge::adapter::{CommandContext, LanguageDriver};

#[derive(Debug, Clone, Default)]
pub struct CppDriver;

/// Compiled executable name, without the host suffix
pub(crate) const BINARY_STEM: &str = "main";

pub(crate) fn binary_name(ctx: &CommandContext) -> String {
    format!("{}{}", BINARY_STEM, ctx.executable_suffix)
}

pub(crate) fn run_binary(ctx: &CommandContext) -> CommandSpec {
    CommandSpec::new(ctx.workspace.join(binary_name(ctx)).to_string_lossy())
        .current_dir(ctx.workspace)
}

impl LanguageDriver for CppDriver {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn source_file_name(&self, _source: &str) -> String {
        "main.cpp".to_string()
    }

    fn compile_command(&self, ctx: &CommandContext) -> Option<CommandSpec> {
        Some(
            CommandSpec::new(&ctx.toolchain.gxx)
                .args(["-std=c++17", "-O2", "-pipe", "-o"])
                .arg(binary_name(ctx))
                .arg(ctx.source_file)
                .current_dir(ctx.workspace),
        )
    }

    fn run_command(&self, ctx: &CommandContext) -> CommandSpec {
        run_binary(ctx)
    }
}
