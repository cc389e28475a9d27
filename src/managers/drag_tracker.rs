//! Drag Tracker: turns pointer gestures into a single model mutation.
//!
//! The tracker owns the [`DragSession`] for the lifetime of one gesture
//! (Idle → Dragging → Idle). It never touches the bar model itself; a drop
//! yields a [`DropOutcome`] that the caller applies.

use tracing::debug;

use crate::services::render_engine::Surface;
use crate::types::bar::{is_valid_url, EntityId};
use crate::types::drag::{
    DataTransfer, DragSession, DragSource, DropOutcome, ItemRect, MIME_HTML, MIME_INTERNAL,
    MIME_PLAIN, MIME_URI_LIST, PLAIN_FALLBACK,
};

/// Where a drop landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// On the item at this index.
    Item { bar_id: EntityId, index: usize },
    /// On the bar's empty space; appends.
    Container { bar_id: EntityId, bar_len: usize },
}

impl DropTarget {
    fn bar_id(&self) -> &EntityId {
        match self {
            DropTarget::Item { bar_id, .. } | DropTarget::Container { bar_id, .. } => bar_id,
        }
    }
}

#[derive(Debug, Default)]
pub struct DragTracker {
    session: DragSession,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn is_dragging(&self) -> bool {
        self.session.source.is_some()
    }

    /// Starts a fresh session from an item and writes its payload into `transfer`.
    pub fn drag_start(&mut self, source: DragSource, transfer: &mut DataTransfer, surface: &mut Surface) {
        let payload = match serde_json::to_string(&source) {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, "could not encode drag payload");
                return;
            }
        };
        transfer.set_data(MIME_INTERNAL, &payload);
        if transfer.get_data(MIME_PLAIN).is_empty() {
            transfer.set_data(MIME_PLAIN, PLAIN_FALLBACK);
        }
        debug!(bar = %source.bar_id, bookmark = %source.bookmark_id, index = source.index, "drag started");
        surface.mark_dragging(Some(&source));
        self.session = DragSession {
            source: Some(source),
            ..DragSession::default()
        };
    }

    fn accepts(transfer: &DataTransfer) -> bool {
        transfer.has_type(MIME_INTERNAL)
            || transfer.has_type(MIME_PLAIN)
            || transfer.has_type(MIME_URI_LIST)
    }

    /// Hovering an item. Returns whether the drop is allowed here.
    pub fn drag_over_item(
        &mut self,
        bar_id: &EntityId,
        index: usize,
        pointer_x: f64,
        rect: ItemRect,
        transfer: &DataTransfer,
        surface: &mut Surface,
    ) -> bool {
        if !Self::accepts(transfer) {
            return false;
        }
        let before = pointer_x - rect.left < rect.width / 2.0;
        self.session.target_bar_id = Some(bar_id.clone());
        self.session.target_index = Some(index);
        self.session.insert_before = before;
        surface.set_indicator(bar_id, index, before);
        true
    }

    /// Hovering a bar's empty space: the target becomes "append".
    pub fn drag_over_container(
        &mut self,
        bar_id: &EntityId,
        bar_len: usize,
        transfer: &DataTransfer,
    ) -> bool {
        if !Self::accepts(transfer) {
            return false;
        }
        self.session.target_bar_id = Some(bar_id.clone());
        self.session.target_index = Some(bar_len);
        self.session.insert_before = true;
        true
    }

    pub fn drag_leave(&mut self, bar_id: &EntityId, surface: &mut Surface) {
        surface.clear_indicators();
        if self.session.target_bar_id.as_ref() == Some(bar_id) {
            self.session.target_index = None;
        }
    }

    /// Resolves the drop and resets the session, whatever the payload held.
    pub fn drop(&mut self, target: DropTarget, transfer: &DataTransfer, surface: &mut Surface) -> DropOutcome {
        let outcome = self.resolve(&target, transfer);
        debug!(bar = %target.bar_id(), ?outcome, "drop resolved");
        self.reset(surface);
        outcome
    }

    /// Gesture ended without a drop.
    pub fn drag_end(&mut self, surface: &mut Surface) {
        if !self.session.is_idle() {
            debug!("drag cancelled");
        }
        self.reset(surface);
    }

    fn reset(&mut self, surface: &mut Surface) {
        self.session = DragSession::default();
        surface.clear_indicators();
        surface.mark_dragging(None);
    }

    fn resolve(&self, target: &DropTarget, transfer: &DataTransfer) -> DropOutcome {
        let internal = transfer.get_data(MIME_INTERNAL);
        if !internal.is_empty() {
            return match serde_json::from_str::<DragSource>(internal) {
                Ok(source) => {
                    let index = match target {
                        DropTarget::Item { index, .. } => {
                            let before = if self.session.target_index == Some(*index)
                                && self.session.target_bar_id.as_ref() == Some(target.bar_id())
                            {
                                self.session.insert_before
                            } else {
                                true
                            };
                            if before {
                                *index
                            } else {
                                index + 1
                            }
                        }
                        DropTarget::Container { bar_len, .. } => *bar_len,
                    };
                    DropOutcome::Move {
                        source,
                        target_bar_id: target.bar_id().clone(),
                        index,
                    }
                }
                Err(e) => DropOutcome::Rejected(format!("unreadable drag payload: {}", e)),
            };
        }

        let Some(url) = external_url(transfer) else {
            return DropOutcome::Rejected("no link in drop".to_string());
        };
        if !is_valid_url(&url) {
            return DropOutcome::Rejected(format!("not an http(s) link: {}", url));
        }
        let title = external_title(transfer);
        let index = match target {
            DropTarget::Item { index, .. } => Some(*index),
            DropTarget::Container { .. } => None,
        };
        DropOutcome::InsertExternal {
            bar_id: target.bar_id().clone(),
            index,
            url,
            title,
        }
    }
}

/// First URL of a `text/uri-list`, else the plain text, skipping the drag placeholder.
fn external_url(transfer: &DataTransfer) -> Option<String> {
    let from_list = transfer
        .get_data(MIME_URI_LIST)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'));
    let candidate = match from_list {
        Some(url) => url,
        None => transfer.get_data(MIME_PLAIN).trim(),
    };
    if candidate.is_empty() || candidate == PLAIN_FALLBACK {
        None
    } else {
        Some(candidate.to_string())
    }
}

/// Anchor text from `text/html`, falling back to the plain text.
fn external_title(transfer: &DataTransfer) -> String {
    anchor_text(transfer.get_data(MIME_HTML))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| transfer.get_data(MIME_PLAIN).trim().to_string())
}

fn anchor_text(html: &str) -> Option<String> {
    let open = html.find("<a")?;
    let body_start = open + html[open..].find('>')? + 1;
    let body_end = body_start + html[body_start..].find("</a")?;
    let mut text = String::new();
    let mut in_tag = false;
    for c in html[body_start..body_end].chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}
