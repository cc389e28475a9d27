//! Render Engine: builds the bar view tree from the model.
//!
//! Rendering is a pure function of [`RenderState`]. The [`Surface`] holds the
//! currently mounted tree; every mount discards the previous tree wholesale,
//! so rendering the same state twice yields the same tree and repeated
//! invocations never duplicate nodes.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::services::favicon::{self, IconDisplay, IconState};
use crate::types::bar::{Bar, Bookmark, EntityId};
use crate::types::drag::DragSource;
use crate::types::event::{ContextTarget, DomEvent, UiAction};
use crate::types::options::GlobalOptions;

pub const CONTAINER_ID: &str = "extra-bookmark-bars-container";
pub const TOGGLE_ID: &str = "extra-bars-toggle";
pub const CLASS_CONTAINER: &str = "extra-bookmark-bars-container";
pub const CLASS_BAR: &str = "extra-bookmark-bar";
pub const CLASS_BOOKMARKS: &str = "extra-bar-bookmarks";
pub const CLASS_ITEM: &str = "extra-bookmark-item";
pub const CLASS_DROP_BEFORE: &str = "drop-before";
pub const CLASS_DROP_AFTER: &str = "drop-after";
pub const CLASS_DRAGGING: &str = "dragging";
pub const CLASS_COLLAPSED: &str = "collapsed";
pub const CLASS_TOGGLE_OFFSET: &str = "with-toggle-offset";
pub const EMPTY_BAR_MESSAGE: &str = "Right-click to add bookmarks or drag links here";
pub const TOGGLE_LABEL: &str = "Show/Hide extra bookmark bars";
pub const TOGGLE_TITLE_SHOW: &str = "Show extra bookmark bars";
pub const TOGGLE_TITLE_HIDE: &str = "Hide extra bookmark bars";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listener {
    pub event: DomEvent,
    pub action: UiAction,
}

/// One element of the rendered tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewNode {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<ViewNode>,
    pub listeners: Vec<Listener>,
}

impl ViewNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn with_style(mut self, property: &str, value: impl Into<String>) -> Self {
        self.style.insert(property.to_string(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: ViewNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn on(mut self, event: DomEvent, action: UiAction) -> Self {
        self.listeners.push(Listener { event, action });
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn listener(&self, event: DomEvent) -> Option<&UiAction> {
        self.listeners
            .iter()
            .find(|l| l.event == event)
            .map(|l| &l.action)
    }

    /// Depth-first, pre-order.
    pub fn descendants(&self) -> Vec<&ViewNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn find_all(&self, class: &str) -> Vec<&ViewNode> {
        self.descendants()
            .into_iter()
            .filter(|n| n.has_class(class))
            .collect()
    }

    fn visit_mut(&mut self, f: &mut dyn FnMut(&mut ViewNode)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    /// Serializes the tree as HTML. Listeners are emitted as a JSON
    /// `data-eb-on` attribute for the host glue script to bind.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if let Some(id) = &self.id {
            push_attr(out, "id", id);
        }
        if !self.classes.is_empty() {
            push_attr(out, "class", &self.classes.join(" "));
        }
        for (name, value) in &self.attrs {
            push_attr(out, name, value);
        }
        if !self.style.is_empty() {
            let css: Vec<String> = self
                .style
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            push_attr(out, "style", &css.join("; "));
        }
        if !self.listeners.is_empty() {
            let wiring: BTreeMap<&str, &UiAction> = self
                .listeners
                .iter()
                .map(|l| (l.event.as_str(), &l.action))
                .collect();
            if let Ok(json) = serde_json::to_string(&wiring) {
                push_attr(out, "data-eb-on", &json);
            }
        }
        out.push('>');
        if is_void(&self.tag) {
            return;
        }
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "img" | "br" | "hr" | "input")
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Everything a render depends on.
pub struct RenderState<'a> {
    pub bars: &'a [Bar],
    pub options: GlobalOptions,
    pub collapsed: bool,
    /// Icon knowledge keyed by bookmark URL.
    pub icons: &'a HashMap<String, IconState>,
}

/// The two root nodes injected into the page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub container: ViewNode,
    pub toggle: ViewNode,
}

impl RenderedView {
    pub fn to_html(&self) -> String {
        format!("{}{}", self.toggle.to_html(), self.container.to_html())
    }
}

/// Stateless view builder.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderEngine;

impl RenderEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, state: &RenderState<'_>) -> RenderedView {
        let mut container = ViewNode::new("div")
            .with_id(CONTAINER_ID)
            .with_class(CLASS_CONTAINER)
            .with_class(if state.collapsed {
                CLASS_COLLAPSED
            } else {
                CLASS_TOGGLE_OFFSET
            });
        for bar in state.bars {
            container.children.push(self.render_bar(bar, state));
        }
        trace!(bars = state.bars.len(), collapsed = state.collapsed, "rendered view");
        RenderedView {
            container,
            toggle: self.render_toggle(state.collapsed),
        }
    }

    fn render_toggle(&self, collapsed: bool) -> ViewNode {
        let mut toggle = ViewNode::new("button")
            .with_id(TOGGLE_ID)
            .with_attr(
                "title",
                if collapsed {
                    TOGGLE_TITLE_SHOW
                } else {
                    TOGGLE_TITLE_HIDE
                },
            )
            .with_attr("aria-label", TOGGLE_LABEL)
            .with_attr("aria-pressed", collapsed.to_string())
            .on(DomEvent::Click, UiAction::ToggleCollapsed);
        if collapsed {
            toggle.add_class(CLASS_COLLAPSED);
        }
        toggle
    }

    fn render_bar(&self, bar: &Bar, state: &RenderState<'_>) -> ViewNode {
        let options = state.options;
        let mut bookmarks = ViewNode::new("div")
            .with_class(CLASS_BOOKMARKS)
            .with_attr("data-bar-id", bar.id.as_str())
            .on(
                DomEvent::DragOver,
                UiAction::ContainerDragOver {
                    bar_id: bar.id.clone(),
                },
            )
            .on(
                DomEvent::DragLeave,
                UiAction::DragLeave {
                    bar_id: bar.id.clone(),
                },
            )
            .on(
                DomEvent::Drop,
                UiAction::ContainerDrop {
                    bar_id: bar.id.clone(),
                },
            );

        if bar.bookmarks.is_empty() {
            bookmarks.children.push(
                ViewNode::new("div")
                    .with_class("empty-bar-message")
                    .with_text(EMPTY_BAR_MESSAGE),
            );
        }
        for (index, bookmark) in bar.bookmarks.iter().enumerate() {
            bookmarks
                .children
                .push(self.render_item(&bar.id, index, bookmark, state));
        }

        ViewNode::new("div")
            .with_class(CLASS_BAR)
            .with_attr("data-bar-id", bar.id.as_str())
            .with_attr("aria-label", bar.name.as_str())
            .with_style("--bar-scale", format_number(options.scale))
            .with_style("--item-spacing", format!("{}px", format_number(options.spacing)))
            .with_style("--bar-opacity", format_number(options.opacity))
            .on(
                DomEvent::ContextMenu,
                UiAction::OpenContextMenu {
                    target: ContextTarget::Bar {
                        bar_id: bar.id.clone(),
                    },
                },
            )
            .with_child(bookmarks)
    }

    fn render_item(
        &self,
        bar_id: &EntityId,
        index: usize,
        bookmark: &Bookmark,
        state: &RenderState<'_>,
    ) -> ViewNode {
        let resolved = favicon::resolve_icon(bookmark, state.icons.get(&bookmark.url));
        let source = DragSource {
            bar_id: bar_id.clone(),
            bookmark_id: bookmark.id.clone(),
            index,
        };
        let payload = serde_json::to_string(&source).unwrap_or_default();

        let icon = match resolved.display {
            IconDisplay::Glyph(glyph) => ViewNode::new("span")
                .with_class("emoji-favicon")
                .with_text(glyph),
            IconDisplay::Image(src) => ViewNode::new("img")
                .with_class("bookmark-favicon")
                .with_attr("src", src)
                .with_attr("alt", "")
                .with_attr("draggable", "false")
                .on(
                    DomEvent::Error,
                    UiAction::IconFailed {
                        bookmark_url: bookmark.url.clone(),
                    },
                ),
            IconDisplay::Badge { letter, color } => ViewNode::new("span")
                .with_class("text-favicon")
                .with_style("background-color", color)
                .with_text(letter),
        };

        let mut link = ViewNode::new("a")
            .with_attr("href", bookmark.url.as_str())
            .with_attr("title", bookmark.url.as_str())
            .with_attr("draggable", "false")
            .on(
                DomEvent::Click,
                UiAction::Navigate {
                    url: bookmark.url.clone(),
                },
            )
            .on(
                DomEvent::AuxClick,
                UiAction::Navigate {
                    url: bookmark.url.clone(),
                },
            )
            .with_child(ViewNode::new("span").with_class("favicon-container").with_child(icon));
        if !resolved.title.is_empty() {
            link.children.push(
                ViewNode::new("span")
                    .with_class("bookmark-title")
                    .with_text(resolved.title),
            );
        }

        ViewNode::new("div")
            .with_class(CLASS_ITEM)
            .with_attr("draggable", "true")
            .with_attr("data-bar-id", bar_id.as_str())
            .with_attr("data-bookmark-id", bookmark.id.as_str())
            .with_attr("data-index", index.to_string())
            .with_attr("data-drag-payload", payload)
            .on(DomEvent::DragStart, UiAction::ItemDragStart { source })
            .on(
                DomEvent::DragOver,
                UiAction::ItemDragOver {
                    bar_id: bar_id.clone(),
                    index,
                },
            )
            .on(
                DomEvent::DragLeave,
                UiAction::DragLeave {
                    bar_id: bar_id.clone(),
                },
            )
            .on(
                DomEvent::Drop,
                UiAction::ItemDrop {
                    bar_id: bar_id.clone(),
                    index,
                },
            )
            .on(DomEvent::DragEnd, UiAction::DragEnd)
            .on(
                DomEvent::ContextMenu,
                UiAction::OpenContextMenu {
                    target: ContextTarget::Bookmark {
                        bar_id: bar_id.clone(),
                        bookmark_id: bookmark.id.clone(),
                    },
                },
            )
            .with_child(link)
    }
}

/// `1.0` renders as `1`, `1.25` stays `1.25`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// === Surface ===

/// The mounted view plus transient decorations (drop indicators, alerts).
#[derive(Debug, Default)]
pub struct Surface {
    view: Option<RenderedView>,
    generation: u64,
    alerts: Vec<String>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever is mounted with `view`.
    pub fn mount(&mut self, view: RenderedView) {
        self.generation += 1;
        debug!(generation = self.generation, "mounting bars");
        self.view = Some(view);
    }

    pub fn unmount(&mut self) {
        if self.view.take().is_some() {
            debug!("unmounted bars");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.view.is_some()
    }

    pub fn view(&self) -> Option<&RenderedView> {
        self.view.as_ref()
    }

    pub fn container(&self) -> Option<&ViewNode> {
        self.view.as_ref().map(|v| &v.container)
    }

    pub fn toggle(&self) -> Option<&ViewNode> {
        self.view.as_ref().map(|v| &v.toggle)
    }

    /// Number of mounts so far; each rebuild bumps it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks the item at `(bar_id, index)` as the drop target, clearing every other indicator.
    ///
    /// Returns `false` when no such item is mounted.
    pub fn set_indicator(&mut self, bar_id: &EntityId, index: usize, before: bool) -> bool {
        self.clear_indicators();
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        let index = index.to_string();
        let class = if before {
            CLASS_DROP_BEFORE
        } else {
            CLASS_DROP_AFTER
        };
        let mut found = false;
        view.container.visit_mut(&mut |node| {
            if node.has_class(CLASS_ITEM)
                && node.attr("data-bar-id") == Some(bar_id.as_str())
                && node.attr("data-index") == Some(index.as_str())
            {
                node.add_class(class);
                found = true;
            }
        });
        found
    }

    pub fn clear_indicators(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.container.visit_mut(&mut |node| {
                node.remove_class(CLASS_DROP_BEFORE);
                node.remove_class(CLASS_DROP_AFTER);
            });
        }
    }

    /// Adds or removes the dragging class on the source item.
    pub fn mark_dragging(&mut self, source: Option<&DragSource>) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        view.container.visit_mut(&mut |node| {
            node.remove_class(CLASS_DRAGGING);
            if let Some(source) = source {
                if node.has_class(CLASS_ITEM)
                    && node.attr("data-bookmark-id") == Some(source.bookmark_id.as_str())
                {
                    node.add_class(CLASS_DRAGGING);
                }
            }
        });
    }

    /// Items currently carrying a drop indicator, as `(bar_id, index, before)`.
    pub fn indicators(&self) -> Vec<(String, usize, bool)> {
        let Some(container) = self.container() else {
            return Vec::new();
        };
        container
            .find_all(CLASS_ITEM)
            .into_iter()
            .filter_map(|node| {
                let before = if node.has_class(CLASS_DROP_BEFORE) {
                    true
                } else if node.has_class(CLASS_DROP_AFTER) {
                    false
                } else {
                    return None;
                };
                let bar = node.attr("data-bar-id")?.to_string();
                let index = node.attr("data-index")?.parse().ok()?;
                Some((bar, index, before))
            })
            .collect()
    }

    /// Queues a user-visible message for the host to display.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }
}
