//! Inline segments of a paragraph.

use crate::dom::NodeId;
use crate::model::format::SegmentFormat;
use serde::{Deserialize, Serialize};

/// Identity of an entity: type, id and read-only flag, encoded on the DOM
/// wrapper as `_Entity _EType_<type> _EId_<id> _EReadonly_<0|1>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub is_readonly: bool,
}

/// An opaque entity. Its wrapper element is owned by the host DOM and is
/// moved, never re-created, when the model is written back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub wrapper: NodeId,
    pub entity_format: EntityFormat,
    #[serde(default)]
    pub format: SegmentFormat,
    #[serde(default)]
    pub is_selected: bool,
}

impl Entity {
    #[must_use]
    pub fn new(wrapper: NodeId, entity_format: EntityFormat) -> Self {
        Self {
            wrapper,
            entity_format,
            format: SegmentFormat::default(),
            is_selected: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub text: String,
    #[serde(default)]
    pub format: SegmentFormat,
    #[serde(default)]
    pub is_selected: bool,
}

/// Zero-width caret or range boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionMarker {
    #[serde(default)]
    pub format: SegmentFormat,
    #[serde(default)]
    pub is_selected: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Br {
    #[serde(default)]
    pub format: SegmentFormat,
    #[serde(default)]
    pub is_selected: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default)]
    pub format: SegmentFormat,
    #[serde(default)]
    pub is_selected: bool,
    /// Selected as a whole image (image selection) rather than inside a range.
    #[serde(default)]
    pub is_selected_as_image_selection: bool,
}

/// An inline piece of a paragraph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "segmentType")]
pub enum Segment {
    Text(Text),
    SelectionMarker(SelectionMarker),
    Br(Br),
    Image(Image),
    Entity(Entity),
}

impl Segment {
    /// Unselected text segment.
    #[must_use]
    pub fn text(text: &str, format: SegmentFormat) -> Self {
        Self::Text(Text {
            text: text.to_string(),
            format,
            is_selected: false,
        })
    }

    /// Selected caret marker.
    #[must_use]
    pub fn marker(format: SegmentFormat) -> Self {
        Self::SelectionMarker(SelectionMarker {
            format,
            is_selected: true,
        })
    }

    #[must_use]
    pub fn br(format: SegmentFormat) -> Self {
        Self::Br(Br {
            format,
            is_selected: false,
        })
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        match self {
            Self::Text(s) => s.is_selected,
            Self::SelectionMarker(s) => s.is_selected,
            Self::Br(s) => s.is_selected,
            Self::Image(s) => s.is_selected,
            Self::Entity(s) => s.is_selected,
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        match self {
            Self::Text(s) => s.is_selected = selected,
            Self::SelectionMarker(s) => s.is_selected = selected,
            Self::Br(s) => s.is_selected = selected,
            Self::Image(s) => {
                s.is_selected = selected;
                if !selected {
                    s.is_selected_as_image_selection = false;
                }
            }
            Self::Entity(s) => s.is_selected = selected,
        }
    }

    #[must_use]
    pub const fn format(&self) -> &SegmentFormat {
        match self {
            Self::Text(s) => &s.format,
            Self::SelectionMarker(s) => &s.format,
            Self::Br(s) => &s.format,
            Self::Image(s) => &s.format,
            Self::Entity(s) => &s.format,
        }
    }

    pub fn format_mut(&mut self) -> &mut SegmentFormat {
        match self {
            Self::Text(s) => &mut s.format,
            Self::SelectionMarker(s) => &mut s.format,
            Self::Br(s) => &mut s.format,
            Self::Image(s) => &mut s.format,
            Self::Entity(s) => &mut s.format,
        }
    }

    #[must_use]
    pub const fn is_marker(&self) -> bool {
        matches!(self, Self::SelectionMarker(_))
    }

    #[must_use]
    pub const fn is_br(&self) -> bool {
        matches!(self, Self::Br(_))
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }
}
