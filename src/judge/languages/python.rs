use crate::config::types::{CommandSpec, Language};
use crate::deps::detect::Dependency;
use crate::judge::adapter::{CommandContext, LanguageDriver};

#[derive(Debug, Clone, Default)]
pub struct PythonDriver;

impl LanguageDriver for PythonDriver {
    fn language(&self) -> Language {
        Language::Python
    }

    fn source_file_name(&self, _source: &str) -> String {
        "main.py".to_string()
    }

    fn install_command(&self, dependency: &Dependency, ctx: &CommandContext) -> Option<CommandSpec> {
        Some(
            CommandSpec::new(&ctx.toolchain.pip)
                .args(["install", "--user", "--", dependency.name()])
                .current_dir(ctx.workspace),
        )
    }

    fn run_command(&self, ctx: &CommandContext) -> CommandSpec {
        CommandSpec::new(&ctx.toolchain.python)
            .arg(ctx.source_file)
            .current_dir(ctx.workspace)
    }
}
