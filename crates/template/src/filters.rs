//! Escaping filter for ConTeXt markup

use minijinja::value::{Value, ValueKind};

/// Name under which [`tex_safe`] is registered in every environment
pub const TEX_SAFE_FILTER: &str = "tex_safe";

/// Characters with a special meaning in ConTeXt and their literal form
pub const TEX_ESCAPES: &[(char, &str)] = &[
    ('|', r"\letterbar{}"),
    ('&', r"\&"),
    ('%', r"\%"),
    ('$', r"\$"),
    ('#', r"\#"),
    ('_', r"\_"),
    ('{', r"\{"),
    ('}', r"\}"),
    ('~', r"\lettertilde{}"),
    ('^', r"\letterhat{}"),
    ('\\', r"\letterbackslash{}"),
];

/// Escape every ConTeXt control character in `text`
///
/// Each character is replaced independently; the output of one
/// replacement is never escaped again.
pub fn escape_tex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match TEX_ESCAPES.iter().find(|(special, _)| *special == ch) {
            Some((_, literal)) => escaped.push_str(literal),
            None => escaped.push(ch),
        }
    }
    escaped
}

/// Template filter: `{{ value|tex_safe }}`
///
/// Numbers are stringified and strings escaped. Every other kind of value
/// (none, undefined, booleans, sequences, maps) renders as an empty string.
pub fn tex_safe(value: Value) -> String {
    match value.kind() {
        ValueKind::Number => escape_tex(&value.to_string()),
        ValueKind::String => value.as_str().map(escape_tex).unwrap_or_default(),
        _ => String::new(),
    }
}
