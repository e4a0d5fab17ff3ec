//! Identifier casing conversion.

use regex::Regex;
use std::sync::LazyLock;

static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid regex"));
static DOUBLE_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([A-Z])").expect("valid regex"));
static LOWER_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));

/// Python keywords and soft keywords that cannot be used as names.
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise",
    "return", "try", "while", "with", "yield",
];

/// `fooBar` / `FooBar` / `fooHTTPServer` → `foo_bar` / `foo_bar` / `foo_http_server`.
///
/// Names without lowercase letters (`MAX_SIZE`) are constants and stay as-is.
pub fn to_snake_case(name: &str) -> String {
    let has_upper = name.chars().any(char::is_uppercase);
    let has_lower = name.chars().any(char::is_lowercase);
    if !has_upper || !has_lower {
        return name.to_string();
    }
    let name = WORD_BOUNDARY.replace_all(name, "${1}_${2}");
    let name = DOUBLE_UNDERSCORE.replace_all(&name, "_${1}");
    let name = LOWER_UPPER.replace_all(&name, "${1}_${2}");
    name.to_lowercase()
}

/// `fooBar` / `foo_bar` → `FooBar`. Leading underscores are kept.
pub fn to_pascal_case(name: &str) -> String {
    let trimmed = name.trim_start_matches('_');
    let prefix = &name[..name.len() - trimmed.len()];
    let mut out = String::from(prefix);
    for part in trimmed.split('_').filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Append `_` to names that collide with host keywords.
pub fn escape_keyword(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// A converted name plus the original spelling when it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recased {
    pub name: String,
    pub original: Option<String>,
}

impl Recased {
    fn new(original: &str, converted: String) -> Self {
        let name = escape_keyword(&converted);
        let original = (name != original).then(|| original.to_string());
        Self { name, original }
    }

    /// Convert for a function, method, property, parameter or variable.
    pub fn snake(original: &str) -> Self {
        Self::new(original, to_snake_case(original))
    }

    /// Convert for a class, interface, enum or type alias.
    pub fn pascal(original: &str) -> Self {
        Self::new(original, to_pascal_case(original))
    }
}
