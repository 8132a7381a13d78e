use super::cpp::{binary_name, run_binary};
use crate::config::types::{CommandSpec, Language};
use crate::judge::adapter::{CommandContext, LanguageDriver};

#[derive(Debug, Clone, Default)]
pub struct CDriver;

impl LanguageDriver for CDriver {
    fn language(&self) -> Language {
        Language::C
    }

    fn source_file_name(&self, _source: &str) -> String {
        "main.c".to_string()
    }

    fn compile_command(&self, ctx: &CommandContext) -> Option<CommandSpec> {
        Some(
            CommandSpec::new(&ctx.toolchain.gcc)
                .args(["-std=c11", "-O2", "-pipe", "-o"])
                .arg(binary_name(ctx))
                .arg(ctx.source_file)
                .arg("-lm")
                .current_dir(ctx.workspace),
        )
    }

    fn run_command(&self, ctx: &CommandContext) -> CommandSpec {
        run_binary(ctx)
    }
}
