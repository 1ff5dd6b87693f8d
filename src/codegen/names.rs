//! Name minting for the Python emission target
//!
//! Every identifier that lands in the generated module passes through one
//! of these functions: field names through `field_name`, class names
//! through `class_name`, enum members through `enum_member`. The rules are
//! deterministic given the ordered list of names already taken, so the
//! same schema always mints the same identifiers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Reserved words of the emission target (CPython `keyword.kwlist`).
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await",
    "break", "class", "continue", "def", "del", "elif", "else", "except",
    "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").expect("is a valid regex"));

/// Check whether a candidate name is a Python keyword.
pub fn is_python_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// Mint a field name from a schema property key.
///
/// Leading underscores are stripped (the serialization layer restores the
/// original key through a rename entry); the result grows a trailing
/// underscore until it collides with neither a sibling nor a keyword.
pub fn field_name(key: &str, siblings: &[String]) -> String {
    let mut name = key.trim_start_matches('_').to_string();
    while siblings.iter().any(|s| s == &name) || is_python_keyword(&name) {
        name.push('_');
    }
    name
}

/// Mint a class name from an identifier hint.
///
/// The first character is uppercased; the candidate grows a trailing
/// underscore until `is_taken` no longer claims it.
pub fn class_name<F>(hint: &str, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut name = upper_first(hint);
    while is_taken(&name) {
        name.push('_');
    }
    name
}

/// Mint an enum member name from its description.
///
/// The description is pascalized, stripped of non-word characters, and
/// then run through the field-name rule against the members minted so far.
pub fn enum_member(description: &str, existing: &[String]) -> String {
    let pascal = pascalize(description);
    let cleaned = NON_WORD.replace_all(&pascal, "");
    field_name(&cleaned, existing)
}

/// Uppercase the first character, leaving the rest untouched.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Convert to PascalCase: drop `_`/`-` separators and uppercase the
/// character that follows, preserving interior capitalization.
pub fn pascalize(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' || c == '-' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Extract a declaration identifier from a schema `$id`.
pub fn extract_id(id: &str) -> String {
    id.replace('#', "")
}

/// Extract the target identifier from a `$ref`.
pub fn extract_ref(reference: &str) -> String {
    reference.replace('#', "").replace("/definitions/", "")
}
