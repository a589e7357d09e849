//! Conversion between the host DOM and the Content Model.
//!
//! - [`create_content_model`]: DOM → model, with selection markers
//! - [`set_content_model`]: model → DOM, returning the new DOM selection
//! - [`DomIndexer`]: node-to-segment layout used to move the selection of a
//!   cached model without converting again
//! - [`entity`]: class names and delimiter helpers for entities
//!
//! For a model produced by these converters, writing it and reading it back
//! yields an equal model.

mod dom_to_model;
pub mod entity;
mod indexer;
mod model_to_dom;

pub use dom_to_model::create_content_model;
pub use indexer::{DomIndexer, LayoutEntry};
pub use model_to_dom::{ModelToDomOptions, set_content_model};
