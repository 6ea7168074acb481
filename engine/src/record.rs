//! Record types exchanged with the remote store.

use crate::RecordId;
use serde::{Deserialize, Serialize};

/// A todo record as the remote store knows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Identifier assigned by the store; never changes
    pub id: RecordId,
    /// Label set at creation
    pub name: String,
    /// Completion flag
    pub done: bool,
}

impl Record {
    /// Create a record.
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>, done: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            done,
        }
    }

    /// Return a copy with `done` negated and every other field unchanged.
    pub fn toggled(&self) -> Self {
        Self {
            done: !self.done,
            ..self.clone()
        }
    }

    /// Apply a partial update in place.
    pub fn apply_patch(&mut self, patch: &RecordPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
    }
}

/// Input for creating a record. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecord {
    pub name: String,
    pub done: bool,
}

impl CreateRecord {
    /// A new, not yet completed todo.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
        }
    }
}

impl From<&str> for CreateRecord {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CreateRecord {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Partial update. Absent fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl RecordPatch {
    /// Patch that only sets the completion flag.
    pub fn done(done: bool) -> Self {
        Self {
            name: None,
            done: Some(done),
        }
    }

    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.done.is_none()
    }
}

/// Payload pushed on the creation subscription.
///
/// The store may deliver an event without a record (`null` payload); such
/// events carry nothing to merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationEvent {
    #[serde(rename = "onCreateTodo")]
    pub created: Option<Record>,
}

impl CreationEvent {
    /// Event carrying a newly created record.
    pub fn created(record: Record) -> Self {
        Self {
            created: Some(record),
        }
    }

    /// Event without a payload.
    pub fn empty() -> Self {
        Self { created: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn toggled_only_changes_done() {
        let record = Record::new("0", "create-react-app", false);
        let flipped = record.toggled();

        assert_eq!(flipped.id, "0");
        assert_eq!(flipped.name, "create-react-app");
        assert!(flipped.done);
        assert_eq!(flipped.toggled(), record);
    }

    #[test]
    fn apply_patch_partial() {
        let mut record = Record::new("1", "milk", false);
        record.apply_patch(&RecordPatch::done(true));
        assert_eq!(record, Record::new("1", "milk", true));

        record.apply_patch(&RecordPatch::default());
        assert_eq!(record, Record::new("1", "milk", true));
    }

    #[test]
    fn patch_skips_absent_fields() {
        let json = serde_json::to_value(RecordPatch::done(true)).unwrap();
        assert_eq!(json, json!({"done": true}));
        assert!(RecordPatch::default().is_empty());
    }

    #[test]
    fn create_input_defaults_to_not_done() {
        let input = CreateRecord::new("buy milk");
        assert!(!input.done);
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"name": "buy milk", "done": false})
        );
    }

    #[test]
    fn creation_event_payload() {
        let event: CreationEvent = serde_json::from_value(json!({
            "onCreateTodo": {"id": "7", "name": "yarn add aws-amplify", "done": true}
        }))
        .unwrap();
        assert_eq!(
            event.created,
            Some(Record::new("7", "yarn add aws-amplify", true))
        );

        let empty: CreationEvent = serde_json::from_value(json!({"onCreateTodo": null})).unwrap();
        assert_eq!(empty, CreationEvent::empty());
    }
}
