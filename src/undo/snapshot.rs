//! Undo snapshot values.

use serde::{Deserialize, Serialize};

use crate::dom::SnapshotSelection;

/// Host-owned state of one entity, stored so undo can give it back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityState {
    pub entity_type: String,
    pub id: String,
    pub state: String,
}

/// One immutable entry of the undo stack.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Inner HTML of the editor root.
    pub html: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_states: Vec<EntityState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SnapshotSelection>,
}

impl Snapshot {
    /// A snapshot with HTML only.
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    /// Bytes counted against the stack's size limit.
    #[must_use]
    pub fn size(&self) -> usize {
        self.html.len()
    }

    #[must_use]
    pub fn has_entity_states(&self) -> bool {
        !self.entity_states.is_empty()
    }

    /// Same HTML and neither side carries entity state: the newer one can
    /// replace the older in place.
    #[must_use]
    pub fn can_replace(&self, newer: &Self) -> bool {
        self.html == newer.html && !self.has_entity_states() && !newer.has_entity_states()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_replace() {
        let a = Snapshot::new("<div>a</div>");
        let mut b = Snapshot::new("<div>a</div>");
        assert!(a.can_replace(&b));
        b.entity_states.push(EntityState {
            entity_type: "mention".to_string(),
            id: "m1".to_string(),
            state: "{}".to_string(),
        });
        assert!(!a.can_replace(&b));
        assert!(!a.can_replace(&Snapshot::new("<div>b</div>")));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Snapshot::new("x")).unwrap();
        assert_eq!(json, r#"{"html":"x"}"#);
    }
}
