use serde::{Deserialize, Serialize};

/// Messages sent to the bars by the companion control surface.
///
/// Serialized as `{"action": "addLinkToBar", "url": ..., "title": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    /// Bookmark the page the bars are shown on.
    #[serde(rename_all = "camelCase")]
    AddCurrentPage {
        #[serde(default)]
        bar_index: Option<usize>,
    },
    /// Bookmark an arbitrary link.
    #[serde(rename_all = "camelCase")]
    AddLinkToBar {
        url: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        bar_index: Option<usize>,
    },
    AddNewBar,
    ToggleExtension,
    GetStatus,
}

/// Structured reply to a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            is_enabled: None,
            error: None,
        }
    }

    pub fn status(is_enabled: bool) -> Self {
        Self {
            success: true,
            is_enabled: Some(is_enabled),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            is_enabled: None,
            error: Some(error.into()),
        }
    }
}

/// The page the bars are currently shown on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub url: String,
    #[serde(default)]
    pub title: String,
}
