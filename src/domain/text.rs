//! Small helpers for splicing values into markdown.

use std::borrow::Cow;

use crate::domain::record::AnswerText;

/// Number of spaces per nesting level.
pub const INDENT_WIDTH: usize = 4;

/// Indent every line after the first by `level` nesting levels.
///
/// The first line is left untouched since it continues wherever the value is
/// placed in the surrounding text.
///
/// ```
/// assert_eq!(sammgen::domain::text::reindent("a\nb", 2), "a\n        b");
/// ```
#[must_use]
pub fn reindent(text: &str, level: usize) -> String {
    let indentation = " ".repeat(INDENT_WIDTH * level);
    text.replace('\n', &format!("\n{indentation}"))
}

/// Render an answer for display.
///
/// Booleans become `Yes` / `No`; anything else is shown as written. Strings
/// spelling a YAML 1.1 boolean (`yes`, `off`, ...) count as booleans, since
/// the model was authored against YAML 1.1 parsers.
#[must_use]
pub fn bool_label(value: &AnswerText) -> Cow<'_, str> {
    match value {
        AnswerText::Bool(flag) => Cow::Borrowed(label(*flag)),
        AnswerText::Text(s) => {
            yaml11_bool(s).map_or(Cow::Borrowed(s.as_str()), |flag| Cow::Borrowed(label(flag)))
        }
        AnswerText::Number(n) => Cow::Owned(n.to_string()),
    }
}

const fn label(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn yaml11_bool(text: &str) -> Option<bool> {
    match text {
        "yes" | "Yes" | "YES" | "on" | "On" | "ON" | "true" | "True" | "TRUE" => Some(true),
        "no" | "No" | "NO" | "off" | "Off" | "OFF" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}
