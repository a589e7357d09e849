//! Character classes for word deletion.

/// Class of a grapheme as seen by word-wise deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Space,
    Punctuation,
    Text,
}

const PUNCTUATION: &[char] = &[
    '.', ',', '?', '!', ':', ';', '"', '\'', '(', ')', '[', ']', '{', '}', '\\', '/', '<', '>',
    '-', '_', '@', '#', '$', '%', '^', '&', '*', '+', '=', '|', '~', '`',
];

/// Classify a grapheme by its first char.
#[must_use]
pub fn classify(grapheme: &str) -> CharClass {
    match grapheme.chars().next() {
        Some(c) if c.is_whitespace() => CharClass::Space,
        Some(c) if PUNCTUATION.contains(&c) || c.is_ascii_punctuation() => CharClass::Punctuation,
        _ => CharClass::Text,
    }
}
