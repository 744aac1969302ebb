//! Change-stream record types.
//!
//! A [`ChangeRecord`] is the wire form of one row-level mutation delivered by the
//! change-data-capture stream. The router turns it into a [`ChangeEvent`] once the
//! source table, keys and action have been extracted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record snapshot: attribute name to (possibly wrapped) attribute value.
pub type Image = Map<String, Value>;

/// One mutation notification as delivered by the change stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChangeRecord {
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// INSERT, MODIFY or REMOVE.
    #[serde(rename = "eventName", default)]
    pub event_name: String,
    /// Origin identifier; encodes the logical table name.
    #[serde(rename = "eventSourceARN", default)]
    pub event_source_arn: String,
    #[serde(default)]
    pub dynamodb: StreamRecord,
}

/// Keys and before/after images of a change record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StreamRecord {
    #[serde(default)]
    pub keys: Image,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_image: Option<Image>,
}

/// What the indexer does with a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// Insert or replace the document.
    Upsert,
    /// Delete the document.
    Remove,
}

impl ChangeAction {
    /// INSERT and MODIFY collapse to [`ChangeAction::Upsert`]; every other name removes.
    pub fn from_event_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "INSERT" | "MODIFY" => Self::Upsert,
            _ => Self::Remove,
        }
    }
}

/// A change record with its routing keys extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub source_table: String,
    pub action: ChangeAction,
    pub site: String,
    pub content_id: String,
    pub new_image: Option<Image>,
    pub old_image: Option<Image>,
}

impl ChangeEvent {
    /// The image the indexer reads: the post-mutation image when present,
    /// otherwise the pre-mutation one.
    pub fn active_image(&self) -> Option<&Image> {
        self.new_image.as_ref().or(self.old_image.as_ref())
    }
}
