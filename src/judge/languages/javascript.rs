use crate::config::types::{CommandSpec, Language};
use crate::deps::detect::Dependency;
use crate::judge::adapter::{CommandContext, LanguageDriver};

#[derive(Debug, Clone, Default)]
pub struct JavaScriptDriver;

impl LanguageDriver for JavaScriptDriver {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn source_file_name(&self, _source: &str) -> String {
        "main.js".to_string()
    }

    fn install_command(&self, dependency: &Dependency, ctx: &CommandContext) -> Option<CommandSpec> {
        Some(
            CommandSpec::new(&ctx.toolchain.npm)
                .args(["install", "--save-exact", "--", dependency.name()])
                .current_dir(ctx.workspace),
        )
    }

    fn run_command(&self, ctx: &CommandContext) -> CommandSpec {
        CommandSpec::new(&ctx.toolchain.node)
            .arg(ctx.source_file)
            .current_dir(ctx.workspace)
    }
}
