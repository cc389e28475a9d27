use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::bar::EntityId;

/// Transfer type carrying an internal reorder payload.
pub const MIME_INTERNAL: &str = "text/extra-bookmark";
pub const MIME_PLAIN: &str = "text/plain";
pub const MIME_URI_LIST: &str = "text/uri-list";
pub const MIME_HTML: &str = "text/html";

/// Placeholder written under `text/plain` so hosts that refuse empty drags still start one.
pub const PLAIN_FALLBACK: &str = "drag";

/// The item a drag started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragSource {
    pub bar_id: EntityId,
    pub bookmark_id: EntityId,
    pub index: usize,
}

/// Ephemeral state of an in-progress drag. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub source: Option<DragSource>,
    pub target_bar_id: Option<EntityId>,
    pub target_index: Option<usize>,
    pub insert_before: bool,
}

impl Default for DragSession {
    fn default() -> Self {
        Self {
            source: None,
            target_bar_id: None,
            target_index: None,
            insert_before: true,
        }
    }
}

impl DragSession {
    pub fn is_idle(&self) -> bool {
        self.source.is_none() && self.target_bar_id.is_none() && self.target_index.is_none()
    }
}

/// Horizontal extent of a hovered element, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemRect {
    pub left: f64,
    pub width: f64,
}

/// Typed payloads attached to a drag gesture, keyed by MIME type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataTransfer {
    entries: BTreeMap<String, String>,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mime: &str, data: &str) -> Self {
        self.set_data(mime, data);
        self
    }

    pub fn set_data(&mut self, mime: &str, data: &str) {
        self.entries.insert(mime.to_string(), data.to_string());
    }

    /// Returns the payload for `mime`, or an empty string when absent.
    pub fn get_data(&self, mime: &str) -> &str {
        self.entries.get(mime).map(String::as_str).unwrap_or("")
    }

    pub fn has_type(&self, mime: &str) -> bool {
        self.entries.contains_key(mime)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A model mutation resolved from a finished drop.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Reorder an existing bookmark.
    Move {
        source: DragSource,
        target_bar_id: EntityId,
        index: usize,
    },
    /// Add a link dragged in from outside; `index: None` appends.
    InsertExternal {
        bar_id: EntityId,
        index: Option<usize>,
        url: String,
        title: String,
    },
    /// The drop carried something unusable; nothing changes.
    Rejected(String),
}
