use crate::config::types::Language;
use crate::judge::adapter::LanguageDriver;
use crate::judge::languages::{
    c::CDriver, cpp::CppDriver, java::JavaDriver, javascript::JavaScriptDriver,
    python::PythonDriver,
};

static PYTHON: PythonDriver = PythonDriver;
static JAVASCRIPT: JavaScriptDriver = JavaScriptDriver;
static JAVA: JavaDriver = JavaDriver;
static CPP: CppDriver = CppDriver;
static C: CDriver = CDriver;

/// Driver for a language. The match is exhaustive, so adding a language
/// without a driver does not compile.
pub fn driver_for(language: Language) -> &'static dyn LanguageDriver {
    match language {
        Language::Python => &PYTHON,
        Language::JavaScript => &JAVASCRIPT,
        Language::Java => &JAVA,
        Language::Cpp => &CPP,
        Language::C => &C,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_matching_driver() {
        for language in Language::ALL {
            assert_eq!(driver_for(language).language(), language);
        }
    }

    #[test]
    fn test_compiled_languages_have_compile_step() {
        use crate::config::settings::Toolchain;
        use crate::judge::adapter::CommandContext;
        use std::path::Path;

        let toolchain = Toolchain::default();
        for language in Language::ALL {
            let driver = driver_for(language);
            let source_file = driver.source_file_name("int main() {}");
            let ctx = CommandContext {
                workspace: Path::new("/tmp/ws"),
                source_file: &source_file,
                toolchain: &toolchain,
                executable_suffix: "",
            };
            assert_eq!(
                driver.compile_command(&ctx).is_some(),
                language.is_compiled(),
                "{}",
                language
            );
        }
    }
}
