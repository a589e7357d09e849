//! Editor configuration.

use crate::error::Error;
use crate::model::SegmentFormat;
use crate::plugin::EditorPlugin;
use crate::undo::{DEFAULT_MAX_SIZE, UndoSnapshotsService};

/// Facts about the host platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    /// macOS keyboard conventions (Option/Command instead of Ctrl).
    pub is_mac: bool,
}

/// Called with the plugin name and error when a plugin fails to dispose.
pub type DisposeErrorHandler = Box<dyn FnMut(&str, &Error)>;

/// Options for [`Editor::new`](crate::Editor::new).
pub struct EditorOptions {
    /// HTML loaded into the root before `EditorReady`.
    pub initial_html: Option<String>,
    /// Never keep a model between events; every transaction converts the
    /// DOM again.
    pub disable_cache: bool,
    /// Byte budget of the default undo stack.
    pub undo_max_size: usize,
    /// Surround non-editable entities with delimiters when writing.
    pub add_delimiter_for_entity: bool,
    pub environment: Environment,
    /// Format applied to text typed into an empty editor.
    pub default_segment_format: SegmentFormat,
    /// Plugins run after the built-in ones, in order.
    pub plugins: Vec<Box<dyn EditorPlugin>>,
    /// Replaces the in-memory undo stack.
    pub undo_snapshot_service: Option<Box<dyn UndoSnapshotsService>>,
    pub dispose_error_handler: Option<DisposeErrorHandler>,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            initial_html: None,
            disable_cache: false,
            undo_max_size: DEFAULT_MAX_SIZE,
            add_delimiter_for_entity: true,
            environment: Environment::default(),
            default_segment_format: SegmentFormat::default(),
            plugins: Vec::new(),
            undo_snapshot_service: None,
            dispose_error_handler: None,
        }
    }
}

impl EditorOptions {
    /// Start from `html`.
    #[must_use]
    pub fn with_html(mut self, html: &str) -> Self {
        self.initial_html = Some(html.to_string());
        self
    }

    /// Append a plugin.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl EditorPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }
}

impl std::fmt::Debug for EditorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorOptions")
            .field("initial_html", &self.initial_html)
            .field("disable_cache", &self.disable_cache)
            .field("undo_max_size", &self.undo_max_size)
            .field("add_delimiter_for_entity", &self.add_delimiter_for_entity)
            .field("environment", &self.environment)
            .field("default_segment_format", &self.default_segment_format)
            .field("plugins", &self.plugins.len())
            .finish_non_exhaustive()
    }
}
