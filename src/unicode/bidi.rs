//! Text direction detection.
//!
//! Used as a fallback when no `dir` attribute decides the direction of the
//! content around the caret.

use unicode_bidi::BidiClass;

/// Base direction of a run of text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
    /// No strong direction could be determined.
    Neutral,
}

/// Direction of the first strong character (UAX #9 rules P2/P3).
#[must_use]
pub fn detect_direction(text: &str) -> TextDirection {
    for ch in text.chars() {
        match unicode_bidi::bidi_class(ch) {
            BidiClass::L => return TextDirection::Ltr,
            BidiClass::R | BidiClass::AL => return TextDirection::Rtl,
            _ => {}
        }
    }
    TextDirection::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_direction_empty_is_neutral() {
        assert_eq!(detect_direction(""), TextDirection::Neutral);
    }

    #[test]
    fn detect_direction_pure_ltr() {
        assert_eq!(detect_direction("Hello, world!"), TextDirection::Ltr);
    }

    #[test]
    fn detect_direction_pure_rtl_hebrew() {
        assert_eq!(detect_direction("שלום"), TextDirection::Rtl);
    }

    #[test]
    fn detect_direction_numbers_are_neutral() {
        assert_eq!(detect_direction("12345"), TextDirection::Neutral);
    }

    #[test]
    fn detect_direction_first_strong_wins() {
        assert_eq!(detect_direction("123 שלום abc"), TextDirection::Rtl);
        assert_eq!(detect_direction("Hello שלום"), TextDirection::Ltr);
    }
}
