//! Input events forwarded from the host.
//!
//! The host translates its DOM `keydown`, `input` and `compositionend`
//! events into these types before handing them to the editor.

mod event;
mod keyboard;

pub use event::{InputEvent, RawEvent};
pub use keyboard::{KeyCode, KeyModifiers, KeyboardEvent};
