//! Content Model rich-text editing engine.
//!
//! An [`Editor`] owns a content-editable root inside a [`Dom`] and keeps a
//! plain, serializable [`ContentModelDocument`] in sync with it:
//!
//! - [`convert`]: DOM ⇄ model conversion and the node index used to move a
//!   cached model's selection without converting again
//! - [`EditorCore::format_content_model`]: the transaction every model
//!   mutation goes through (write-back, cache, undo, events)
//! - [`undo`]: snapshot stack with auto-complete undo
//! - [`edit`]: delete pipeline, typing over a selection, paste, entity
//!   insertion and entity delimiters
//! - [`plugin`]: the event-driven plugins that tie these to host events
//!
//! # Example
//!
//! ```
//! use contentmodel_rust::{Editor, EditorOptions};
//!
//! let mut editor = Editor::new(EditorOptions::default().with_html("<div>hello</div>")).unwrap();
//! let model = editor.create_content_model().unwrap();
//! assert_eq!(model.plain_text(), "hello");
//! ```

// Crate-level lint configuration
#![allow(clippy::module_name_repetitions)] // EditorCore, EditorPlugin etc read better in docs
#![allow(clippy::missing_errors_doc)] // Every fallible API fails with crate::Error
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Snapshots and options are handed over on purpose
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::struct_excessive_bools)] // Options and state records carry several flags
#![allow(clippy::too_many_lines)] // Converters walk the whole tree in one function
#![allow(clippy::option_if_let_else)] // match on Option is clearer in tree walks
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical

pub mod convert;
pub mod dom;
pub mod edit;
pub mod editor;
pub mod error;
pub mod input;
pub mod model;
pub mod plugin;
pub mod undo;
pub mod unicode;

// Re-export core types at crate root
pub use dom::{Dom, DomPosition, DomRange, DomSelection, NodeId};
pub use editor::{Editor, EditorCore, EditorOptions, Environment, FormatContext, FormatOptions};
pub use error::{Error, Result};
pub use model::{Block, BlockPath, ContentModelDocument, Paragraph, Segment, SegmentFormat};

// Re-export input and plugin types
pub use input::{InputEvent, KeyCode, KeyModifiers, KeyboardEvent, RawEvent};
pub use plugin::{ChangeSource, EditPlugin, EditorPlugin, EntityOperation, PluginEvent};
pub use undo::{Snapshot, Snapshots, UndoSnapshotsService};
