//! Naming transforms and identifier sanitation.
//!
//! Every emitted name passes through two steps: the category transform chosen
//! by configuration ([`NameTransform`]) and [`sanitize_identifier`], which
//! guarantees a legal target identifier.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Transform applied to one category of names.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum NameTransform {
    /// Keep the source name.
    #[default]
    None,
    /// Lower-case the leading word (`GetValue` → `getValue`, `IOStream` → `ioStream`).
    CamelCase,
}

impl NameTransform {
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::None => name.to_string(),
            Self::CamelCase => to_camel_case(name),
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let normalized: String = text
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "" | "none" | "identity" => Some(Self::None),
            "camelcase" | "camel" => Some(Self::CamelCase),
            _ => None,
        }
    }
}

impl fmt::Display for NameTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::CamelCase => "camelCase",
        })
    }
}

/// Accepts `"none"`, `"None"`, `"camelCase"`, `"CamelCase"`, `"camel-case"`.
impl<'de> Deserialize<'de> for NameTransform {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let text = String::deserialize(deserializer)?;
        Self::parse(&text).ok_or_else(|| {
            Error::custom(format!(
                "invalid naming transform: '{text}'. Expected 'none' or 'camelCase'"
            ))
        })
    }
}

fn to_camel_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let leading_upper = chars.iter().take_while(|c| c.is_uppercase()).count();
    if leading_upper == 0 {
        return name.to_string();
    }

    // `IOStream`: lower `IO` but keep the `S` that starts the next word.
    let lower_count = if leading_upper == chars.len() || leading_upper == 1 {
        leading_upper
    } else if chars[leading_upper].is_lowercase() {
        leading_upper - 1
    } else {
        leading_upper
    };

    let mut out = String::with_capacity(name.len());
    for (i, c) in chars.iter().enumerate() {
        if i < lower_count {
            out.extend(c.to_lowercase());
        } else {
            out.push(*c);
        }
    }
    out
}

/// Words that cannot stand as a declaration, parameter or type-parameter name.
const RESERVED_WORDS: &[&str] = &[
    "any", "await", "bigint", "boolean", "break", "case", "catch", "class", "const", "continue",
    "debugger", "declare", "default", "delete", "do", "else", "enum", "export", "extends",
    "false", "finally", "for", "function", "if", "implements", "import", "in", "instanceof",
    "interface", "let", "never", "new", "null", "number", "object", "package", "private",
    "protected", "public", "return", "static", "string", "super", "switch", "symbol", "this",
    "throw", "true", "try", "typeof", "undefined", "unknown", "var", "void", "while", "with",
    "yield",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.binary_search(&name).is_ok()
}

/// Result of [`sanitize_identifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sanitized {
    pub text: String,
    pub changed: bool,
}

/// Make `name` a legal identifier.
///
/// Invalid characters become `_`, a leading digit gets a `_` prefix, and when
/// `escape_reserved` is set a reserved word gets a trailing `_`. Member names
/// may legally be reserved words, so callers pass `false` for them.
pub fn sanitize_identifier(name: &str, escape_reserved: bool) -> Sanitized {
    let mut text: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if text.is_empty() {
        text.push('_');
    }
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        text.insert(0, '_');
    }
    if escape_reserved && is_reserved_word(&text) {
        text.push('_');
    }

    let changed = text != name;
    Sanitized { text, changed }
}

#[cfg(test)]
#[path = "tests/naming_tests.rs"]
mod tests;
