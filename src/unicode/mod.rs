//! Unicode utilities for grapheme handling, word classes and text direction.

mod bidi;
mod grapheme;
mod word;

pub use bidi::{TextDirection, detect_direction};
pub use grapheme::{
    GraphemeIterator, char_to_byte, first_grapheme, graphemes, last_grapheme, remove_grapheme,
};
pub use word::{CharClass, classify};
