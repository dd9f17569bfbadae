//! Coloured terminal output for the build summary

use owo_colors::{OwoColorize, colors::css};

/// Styles summary output, when stdout supports colour.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    /// Enable colour if stdout supports it.
    pub fn detect() -> Self {
        Self {
            enabled: supports_color::on(supports_color::Stream::Stdout).is_some(),
        }
    }

    /// Something that went as expected (green).
    pub fn ok(self, text: &str) -> String {
        self.paint(text, |t| t.fg::<css::Green>().to_string())
    }

    /// Something needing attention (amber).
    pub fn issue(self, text: &str) -> String {
        self.paint(text, |t| t.fg::<css::Orange>().to_string())
    }

    /// A file path (dimmed).
    pub fn path(self, text: &str) -> String {
        self.paint(text, |t| t.dimmed().to_string())
    }

    fn paint(self, text: &str, style: impl FnOnce(&str) -> String) -> String {
        if self.enabled {
            style(text)
        } else {
            text.to_string()
        }
    }
}
