//! Editing operations on top of the format transaction.
//!
//! - [`delete_selection`] and the steps in [`delete_steps`]: the delete
//!   pipeline shared by Backspace/Delete, typing over a selection, cut and
//!   paste
//! - [`keyboard_delete`], [`keyboard_input`]: keystrokes the model handles
//!   instead of the browser
//! - [`delimiter`]: entity delimiter upkeep around native editing
//! - [`paste`], [`insert_entity`], [`clone_selected_content`]: content
//!   coming in and going out
//! - [`apply_pending_format`]: format chosen at a caret, applied once text
//!   is typed there

mod cut;
mod delete_selection;
pub mod delete_steps;
pub mod delimiter;
mod insert_entity;
mod keyboard_delete;
mod keyboard_input;
mod paragraph;
mod paste;
mod pending_format;

pub use cut::{clone_selected_content, delete_selected_content};
pub use delete_selection::{
    DeleteResult, DeleteSelectionContext, DeleteSelectionResult, DeleteSelectionStep,
    InsertPoint, delete_selection,
};
pub use delimiter::{
    find_delimiter, handle_delimiter_key_down, reconcile_delimiters, remove_delimiters,
};
pub use insert_entity::insert_entity;
pub use keyboard_delete::{get_delete_steps, keyboard_delete, should_delete_with_content_model};
pub use keyboard_input::{keyboard_input, should_input_with_content_model};
pub use paragraph::{append_caret_paragraph, split_paragraph};
pub use paste::{merge_model, paste};
pub use pending_format::apply_pending_format;
