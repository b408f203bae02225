//! Field delimiter selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Field separator of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// Pick from the header line.
    #[default]
    Auto,
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    /// Byte passed to the tokenizer. `Auto` resolves against `text`.
    pub fn resolve(self, text: &str) -> u8 {
        match self {
            Self::Auto => detect_delimiter(text).resolve(text),
            Self::Comma => b',',
            Self::Semicolon => b';',
            Self::Tab => b'\t',
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Comma => "comma",
            Self::Semicolon => "semicolon",
            Self::Tab => "tab",
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Guesses the delimiter from the first non-empty line.
///
/// Counts unquoted occurrences of each candidate; ties and lines without any
/// candidate fall back to comma.
pub fn detect_delimiter(text: &str) -> Delimiter {
    let Some(line) = text.lines().find(|line| !line.trim().is_empty()) else {
        return Delimiter::Comma;
    };

    let mut counts = [(Delimiter::Comma, 0usize), (Delimiter::Semicolon, 0), (Delimiter::Tab, 0)];
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => counts[0].1 += 1,
            ';' if !in_quotes => counts[1].1 += 1,
            '\t' if !in_quotes => counts[2].1 += 1,
            _ => {}
        }
    }

    let mut best = counts[0];
    for candidate in &counts[1..] {
        if candidate.1 > best.1 {
            best = *candidate;
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_semicolon_export() {
        assert_eq!(
            detect_delimiter("Login;Testergebnis in Punkten;1;2\njdoe;18,5;8,5;10\n"),
            Delimiter::Semicolon
        );
    }

    #[test]
    fn detects_tab_export() {
        assert_eq!(detect_delimiter("Login\t1\t2\n"), Delimiter::Tab);
    }

    #[test]
    fn ignores_quoted_separators() {
        assert_eq!(
            detect_delimiter("\"a,b,c\";\"d\";e\n"),
            Delimiter::Semicolon
        );
    }

    #[test]
    fn falls_back_to_comma() {
        assert_eq!(detect_delimiter(""), Delimiter::Comma);
        assert_eq!(detect_delimiter("Login\n"), Delimiter::Comma);
        assert_eq!(Delimiter::Auto.resolve("a;b"), b';');
    }
}
