//! Grapheme cluster helpers.
//!
//! Single-character deletion removes a whole grapheme cluster so that emoji
//! sequences and combining marks are never split.

use unicode_segmentation::UnicodeSegmentation;

/// Iterator over grapheme clusters in a string.
pub struct GraphemeIterator<'a> {
    inner: unicode_segmentation::Graphemes<'a>,
}

impl<'a> Iterator for GraphemeIterator<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl DoubleEndedIterator for GraphemeIterator<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

/// Iterate over grapheme clusters in a string.
#[must_use]
pub fn graphemes(s: &str) -> GraphemeIterator<'_> {
    GraphemeIterator {
        inner: s.graphemes(true),
    }
}

/// First grapheme cluster of `s`.
#[must_use]
pub fn first_grapheme(s: &str) -> Option<&str> {
    graphemes(s).next()
}

/// Last grapheme cluster of `s`.
#[must_use]
pub fn last_grapheme(s: &str) -> Option<&str> {
    graphemes(s).next_back()
}

/// Remove one grapheme from the start (`forward`) or end of `s`.
///
/// Returns false when `s` was already empty.
pub fn remove_grapheme(s: &mut String, forward: bool) -> bool {
    if forward {
        let Some(len) = first_grapheme(s).map(str::len) else {
            return false;
        };
        s.drain(..len);
    } else {
        let Some(len) = last_grapheme(s).map(str::len) else {
            return false;
        };
        s.truncate(s.len() - len);
    }
    true
}

/// Byte index of the `offset`-th char, clamped to the end of `s`.
#[must_use]
pub fn char_to_byte(s: &str, offset: usize) -> usize {
    s.char_indices().nth(offset).map_or(s.len(), |(i, _)| i)
}
