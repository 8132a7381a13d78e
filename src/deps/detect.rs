/// Dependency detection
///
/// Scans source text for imports and returns the third-party packages it
/// needs, deduplicated and in sorted order. C and C++ never install anything:
/// a header outside the standard set rejects the program.
use super::stdlib;
use crate::config::types::{EngineError, Language, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

/// A package to install, named as the package manager knows it
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dependency(String);

impl Dependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static PY_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*import[ \t]+([^#;\r\n]+)").expect("valid regex"));
static PY_FROM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*from[ \t]+(\S+)[ \t]+import\b").expect("valid regex"));
static PY_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

static JS_REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid regex")
});
static JS_IMPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s+[^'";]*?\bfrom\s*['"]([^'"]+)['"]"#).expect("valid regex")
});
static JS_IMPORT_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bimport\s*['"]([^'"]+)['"]"#).expect("valid regex"));

/// npm package name rules: lowercase, URL-safe, no leading `.`, `_` or `-`
static NPM_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:@[a-z0-9~][a-z0-9._~-]*/)?[a-z0-9~][a-z0-9._~-]*$").expect("valid regex")
});
const NPM_NAME_MAX: usize = 214;

static JAVA_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*import\s+(?:static\s+)?([A-Za-z_$][A-Za-z0-9_$]*)\s*\.")
        .expect("valid regex")
});

static INCLUDE_ANGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#[ \t]*include[ \t]*<([^>\r\n]+)>").expect("valid regex"));
static INCLUDE_QUOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*#[ \t]*include[ \t]*"([^"\r\n]+)""#).expect("valid regex")
});

/// Import names whose package is published under another name
const PYTHON_PACKAGE_ALIASES: &[(&str, &str)] = &[
    ("PIL", "pillow"),
    ("bs4", "beautifulsoup4"),
    ("cv2", "opencv-python"),
    ("sklearn", "scikit-learn"),
    ("yaml", "pyyaml"),
];

/// Detect the packages `source` needs
pub fn detect(language: Language, source: &str) -> Result<BTreeSet<Dependency>> {
    match language {
        Language::Python => Ok(python(source)),
        Language::JavaScript => Ok(javascript(source)),
        Language::Java => Ok(java(source)),
        Language::C => check_headers(language, source, stdlib::is_c_header, true),
        Language::Cpp => check_headers(language, source, stdlib::is_cpp_header, false),
    }
}

fn python(source: &str) -> BTreeSet<Dependency> {
    let mut modules = Vec::new();

    for caps in PY_IMPORT.captures_iter(source) {
        for item in caps[1].split(',') {
            // `import a.b as c`
            if let Some(name) = item.split_whitespace().next() {
                modules.push(name.to_string());
            }
        }
    }
    for caps in PY_FROM.captures_iter(source) {
        let module = &caps[1];
        if !module.starts_with('.') {
            modules.push(module.to_string());
        }
    }

    modules
        .iter()
        .filter_map(|m| m.split('.').next())
        .filter(|top| PY_IDENT.is_match(top) && !stdlib::is_python_stdlib(top))
        .map(|top| {
            let package = PYTHON_PACKAGE_ALIASES
                .iter()
                .find(|(import, _)| *import == top)
                .map_or(top, |(_, package)| *package);
            Dependency::new(package)
        })
        .collect()
}

fn javascript(source: &str) -> BTreeSet<Dependency> {
    [&*JS_REQUIRE, &*JS_IMPORT_FROM, &*JS_IMPORT_BARE]
        .iter()
        .flat_map(|re| re.captures_iter(source))
        .filter_map(|caps| node_package(caps[1].trim()))
        .map(Dependency::new)
        .collect()
}

/// Package name of a module specifier, or None for paths and built-ins
fn node_package(specifier: &str) -> Option<String> {
    if specifier.is_empty() || specifier.starts_with('.') || specifier.starts_with('/') {
        return None;
    }
    if specifier.starts_with("node:") {
        return None;
    }

    let mut segments = specifier.split('/');
    let first = segments.next()?;
    let package = if first.starts_with('@') {
        let name = segments.next().filter(|s| !s.is_empty())?;
        format!("{}/{}", first, name)
    } else {
        if stdlib::is_node_builtin(first) {
            return None;
        }
        first.to_string()
    };

    if package.len() > NPM_NAME_MAX || !NPM_NAME.is_match(&package) {
        log::debug!("Ignoring invalid npm package name {:?}", package);
        return None;
    }
    Some(package)
}

fn java(source: &str) -> BTreeSet<Dependency> {
    JAVA_IMPORT
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .filter(|segment| !stdlib::is_java_platform(segment))
        .map(Dependency::new)
        .collect()
}

fn check_headers(
    language: Language,
    source: &str,
    allowed: fn(&str) -> bool,
    quoted_too: bool,
) -> Result<BTreeSet<Dependency>> {
    let mut headers: Vec<&str> = INCLUDE_ANGLE
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
        .collect();
    if quoted_too {
        headers.extend(
            INCLUDE_QUOTE
                .captures_iter(source)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim())),
        );
    }

    let forbidden: BTreeSet<&str> = headers.into_iter().filter(|h| !allowed(h)).collect();
    if forbidden.is_empty() {
        return Ok(BTreeSet::new());
    }

    let list = forbidden
        .iter()
        .map(|h| format!("<{}>", h))
        .collect::<Vec<_>>()
        .join(", ");
    Err(EngineError::Dependency(format!(
        "Unsupported {} header(s): {}. Only standard library headers are available.",
        language, list
    )))
}
