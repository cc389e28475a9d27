use serde::{Deserialize, Serialize};

/// Entries of the bar and bookmark context menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuAction {
    AddBookmark,
    PasteUrl,
    AddNewBar,
    DeleteBar,
    OpenBookmarkNewTab,
    OpenBookmarkNewWindow,
    EditBookmark,
    CopyUrl,
    DeleteBookmark,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::AddBookmark => "Add bookmark",
            MenuAction::PasteUrl => "Paste URL",
            MenuAction::AddNewBar => "Add new bar",
            MenuAction::DeleteBar => "Delete bar",
            MenuAction::OpenBookmarkNewTab => "Open in new tab",
            MenuAction::OpenBookmarkNewWindow => "Open in new window",
            MenuAction::EditBookmark => "Edit name",
            MenuAction::CopyUrl => "Copy URL",
            MenuAction::DeleteBookmark => "Delete",
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, MenuAction::DeleteBar | MenuAction::DeleteBookmark)
    }
}

/// A menu row; `action: None` is a separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    pub action: Option<MenuAction>,
    pub destructive: bool,
}

impl MenuItem {
    fn entry(action: MenuAction) -> Self {
        Self {
            label: action.label().to_string(),
            action: Some(action),
            destructive: action.is_destructive(),
        }
    }

    fn separator() -> Self {
        Self {
            label: String::new(),
            action: None,
            destructive: false,
        }
    }

    pub fn is_separator(&self) -> bool {
        self.action.is_none()
    }
}

pub fn bar_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::entry(MenuAction::AddBookmark),
        MenuItem::entry(MenuAction::PasteUrl),
        MenuItem::separator(),
        MenuItem::entry(MenuAction::AddNewBar),
        MenuItem::separator(),
        MenuItem::entry(MenuAction::DeleteBar),
    ]
}

pub fn bookmark_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::entry(MenuAction::OpenBookmarkNewTab),
        MenuItem::entry(MenuAction::OpenBookmarkNewWindow),
        MenuItem::separator(),
        MenuItem::entry(MenuAction::EditBookmark),
        MenuItem::entry(MenuAction::CopyUrl),
        MenuItem::separator(),
        MenuItem::entry(MenuAction::DeleteBookmark),
    ]
}

/// A question the host must put to the user before an action can run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Prompt {
    Text { message: String, default: String },
    Confirm { message: String },
}

/// The user's answer to a [`Prompt`], or the clipboard contents for a paste.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuInput {
    /// Entered text; `None` when the prompt was cancelled.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
}

impl MenuInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            confirmed: false,
        }
    }

    pub fn confirmed() -> Self {
        Self {
            text: None,
            confirmed: true,
        }
    }
}
