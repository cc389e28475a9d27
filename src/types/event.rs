use serde::{Deserialize, Serialize};

use super::bar::EntityId;
use super::drag::{DataTransfer, DragSource, ItemRect};
use super::menu::{MenuAction, MenuItem, Prompt};

/// DOM events the view listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEvent {
    Click,
    AuxClick,
    ContextMenu,
    DragStart,
    DragOver,
    DragLeave,
    Drop,
    DragEnd,
    Error,
}

impl DomEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomEvent::Click => "click",
            DomEvent::AuxClick => "auxclick",
            DomEvent::ContextMenu => "contextmenu",
            DomEvent::DragStart => "dragstart",
            DomEvent::DragOver => "dragover",
            DomEvent::DragLeave => "dragleave",
            DomEvent::Drop => "drop",
            DomEvent::DragEnd => "dragend",
            DomEvent::Error => "error",
        }
    }
}

/// What a right-click was aimed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContextTarget {
    #[serde(rename_all = "camelCase")]
    Bar { bar_id: EntityId },
    #[serde(rename_all = "camelCase")]
    Bookmark {
        bar_id: EntityId,
        bookmark_id: EntityId,
    },
}

impl ContextTarget {
    pub fn bar_id(&self) -> &EntityId {
        match self {
            ContextTarget::Bar { bar_id } | ContextTarget::Bookmark { bar_id, .. } => bar_id,
        }
    }
}

/// Application-level meaning attached to a listener in the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiAction {
    Navigate {
        url: String,
    },
    ItemDragStart {
        source: DragSource,
    },
    #[serde(rename_all = "camelCase")]
    ItemDragOver {
        bar_id: EntityId,
        index: usize,
    },
    #[serde(rename_all = "camelCase")]
    ItemDrop {
        bar_id: EntityId,
        index: usize,
    },
    #[serde(rename_all = "camelCase")]
    ContainerDragOver {
        bar_id: EntityId,
    },
    #[serde(rename_all = "camelCase")]
    ContainerDrop {
        bar_id: EntityId,
    },
    #[serde(rename_all = "camelCase")]
    DragLeave {
        bar_id: EntityId,
    },
    DragEnd,
    OpenContextMenu {
        target: ContextTarget,
    },
    ToggleCollapsed,
    /// A stored favicon failed to load.
    #[serde(rename_all = "camelCase")]
    IconFailed {
        bookmark_url: String,
    },
}

/// Keyboard and button state of a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    /// `0` primary, `1` middle, `2` secondary.
    #[serde(default)]
    pub button: u8,
}

impl Modifiers {
    /// Ctrl/Cmd click or middle click.
    pub fn wants_new_tab(&self) -> bool {
        self.ctrl || self.meta || self.button == 1
    }
}

/// A listener firing, together with the event details the handlers need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiEvent {
    pub action: UiAction,
    #[serde(default)]
    pub pointer_x: f64,
    #[serde(default)]
    pub rect: Option<ItemRect>,
    #[serde(default)]
    pub transfer: DataTransfer,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl UiEvent {
    pub fn new(action: UiAction) -> Self {
        Self {
            action,
            pointer_x: 0.0,
            rect: None,
            transfer: DataTransfer::new(),
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_transfer(mut self, transfer: DataTransfer) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn at(mut self, pointer_x: f64, rect: ItemRect) -> Self {
        self.pointer_x = pointer_x;
        self.rect = Some(rect);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// How a link should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Disposition {
    SameTab,
    NewTab,
    NewWindow,
}

/// Something the host has to do on the bars' behalf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub enum HostEffect {
    Open {
        url: String,
        disposition: Disposition,
    },
    /// Payloads to place on the native drag data.
    WriteTransfer { transfer: DataTransfer },
    /// The hovered element accepts the drag; the host should allow a drop.
    AcceptDrop,
    ShowContextMenu {
        target: ContextTarget,
        items: Vec<MenuItem>,
    },
    /// Ask the user, then call back with a menu action and the answer.
    Prompt {
        target: ContextTarget,
        action: MenuAction,
        prompt: Prompt,
    },
    CopyToClipboard { text: String },
}
