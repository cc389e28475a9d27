//! Unit tests for the view tree built by RenderEngine.

use std::collections::HashMap;

use extra_bars::services::favicon::IconState;
use extra_bars::services::render_engine::{
    RenderEngine, RenderState, RenderedView, Surface, ViewNode, CLASS_BAR, CLASS_COLLAPSED,
    CLASS_ITEM, CLASS_TOGGLE_OFFSET, CONTAINER_ID, EMPTY_BAR_MESSAGE, TOGGLE_TITLE_HIDE,
    TOGGLE_TITLE_SHOW,
};
use extra_bars::types::bar::{Bar, Bookmark, EntityId};
use extra_bars::types::drag::DragSource;
use extra_bars::types::event::{ContextTarget, DomEvent, UiAction};
use extra_bars::types::options::GlobalOptions;

fn bookmark(id: &str, title: &str, url: &str, favicon: Option<&str>) -> Bookmark {
    Bookmark {
        id: EntityId::from(id),
        title: title.to_string(),
        url: url.to_string(),
        favicon: favicon.map(str::to_string),
        is_custom_title: false,
    }
}

fn sample_bars() -> Vec<Bar> {
    vec![
        Bar {
            id: EntityId::from("1"),
            name: "Work".to_string(),
            bookmarks: vec![
                bookmark("a", "Rust", "https://rust-lang.org", Some("https://rust-lang.org/favicon.ico")),
                bookmark("b", "\u{1F680} Launch", "https://launch.test", None),
                bookmark("c", "", "https://zulip.test", None),
            ],
        },
        Bar {
            id: EntityId::from("2"),
            name: "Empty".to_string(),
            bookmarks: Vec::new(),
        },
    ]
}

fn render_with(bars: &[Bar], options: GlobalOptions, collapsed: bool, icons: &HashMap<String, IconState>) -> RenderedView {
    RenderEngine::new().render(&RenderState {
        bars,
        options,
        collapsed,
        icons,
    })
}

fn render(collapsed: bool) -> RenderedView {
    render_with(&sample_bars(), GlobalOptions::default(), collapsed, &HashMap::new())
}

fn items(view: &RenderedView) -> Vec<&ViewNode> {
    view.container.find_all(CLASS_ITEM)
}

fn child_with_class<'a>(node: &'a ViewNode, class: &str) -> Option<&'a ViewNode> {
    node.find_all(class).into_iter().next()
}

#[test]
fn test_one_bar_node_per_bar_in_order() {
    let view = render(false);
    let bars = view.container.find_all(CLASS_BAR);
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].attr("data-bar-id"), Some("1"));
    assert_eq!(bars[1].attr("data-bar-id"), Some("2"));
    assert_eq!(view.container.id.as_deref(), Some(CONTAINER_ID));
}

#[test]
fn test_items_carry_position_and_payload() {
    let view = render(false);
    let items = items(&view);
    assert_eq!(items.len(), 3);
    for (i, item) in items.iter().enumerate() {
        assert_eq!(item.attr("data-index"), Some(i.to_string().as_str()));
        assert_eq!(item.attr("draggable"), Some("true"));
    }
    let payload: DragSource = serde_json::from_str(items[1].attr("data-drag-payload").unwrap()).unwrap();
    assert_eq!(payload.bookmark_id.as_str(), "b");
    assert_eq!(payload.index, 1);
    assert_eq!(
        items[1].listener(DomEvent::Drop),
        Some(&UiAction::ItemDrop {
            bar_id: EntityId::from("1"),
            index: 1
        })
    );
}

#[test]
fn test_empty_bar_shows_hint() {
    let view = render(false);
    let bars = view.container.find_all(CLASS_BAR);
    let hint = child_with_class(bars[1], "empty-bar-message").unwrap();
    assert_eq!(hint.text.as_deref(), Some(EMPTY_BAR_MESSAGE));
    assert!(child_with_class(bars[0], "empty-bar-message").is_none());
}

#[test]
fn test_icon_precedence() {
    let view = render(false);
    let items = items(&view);

    let img = child_with_class(items[0], "bookmark-favicon").unwrap();
    assert_eq!(img.attr("src"), Some("https://rust-lang.org/favicon.ico"));
    assert!(img.listener(DomEvent::Error).is_some());

    let glyph = child_with_class(items[1], "emoji-favicon").unwrap();
    assert_eq!(glyph.text.as_deref(), Some("\u{1F680}"));
    let title = child_with_class(items[1], "bookmark-title").unwrap();
    assert_eq!(title.text.as_deref(), Some("Launch"));

    let badge = child_with_class(items[2], "text-favicon").unwrap();
    assert_eq!(badge.text.as_deref(), Some("Z"));
}

#[test]
fn test_blank_title_renders_icon_only() {
    let view = render(false);
    let items = items(&view);
    assert!(child_with_class(items[2], "bookmark-title").is_none());
}

#[test]
fn test_failed_icon_falls_back_to_badge_and_probe_result_wins() {
    let bars = sample_bars();
    let mut icons = HashMap::new();
    icons.insert("https://rust-lang.org".to_string(), IconState::Failed);
    let view = render_with(&bars, GlobalOptions::default(), false, &icons);
    assert!(child_with_class(items(&view)[0], "text-favicon").is_some());

    icons.insert(
        "https://rust-lang.org".to_string(),
        IconState::Resolved("https://rust-lang.org/apple-touch-icon.png".to_string()),
    );
    let view = render_with(&bars, GlobalOptions::default(), false, &icons);
    let img = child_with_class(items(&view)[0], "bookmark-favicon").unwrap();
    assert_eq!(img.attr("src"), Some("https://rust-lang.org/apple-touch-icon.png"));
}

#[test]
fn test_options_become_css_variables() {
    let options = GlobalOptions {
        scale: 1.5,
        spacing: 4.0,
        opacity: 0.8,
    };
    let view = render_with(&sample_bars(), options, false, &HashMap::new());
    let bar = view.container.find_all(CLASS_BAR)[0];
    assert_eq!(bar.style.get("--bar-scale").map(String::as_str), Some("1.5"));
    assert_eq!(bar.style.get("--item-spacing").map(String::as_str), Some("4px"));
    assert_eq!(bar.style.get("--bar-opacity").map(String::as_str), Some("0.8"));
}

#[test]
fn test_collapsed_state_reflected_on_container_and_toggle() {
    let expanded = render(false);
    assert!(expanded.container.has_class(CLASS_TOGGLE_OFFSET));
    assert!(!expanded.container.has_class(CLASS_COLLAPSED));
    assert_eq!(expanded.toggle.attr("title"), Some(TOGGLE_TITLE_HIDE));

    let collapsed = render(true);
    assert!(collapsed.container.has_class(CLASS_COLLAPSED));
    assert!(collapsed.toggle.has_class(CLASS_COLLAPSED));
    assert_eq!(collapsed.toggle.attr("title"), Some(TOGGLE_TITLE_SHOW));
    assert_eq!(collapsed.toggle.listener(DomEvent::Click), Some(&UiAction::ToggleCollapsed));
}

#[test]
fn test_context_menu_targets() {
    let view = render(false);
    let bar = view.container.find_all(CLASS_BAR)[0];
    assert_eq!(
        bar.listener(DomEvent::ContextMenu),
        Some(&UiAction::OpenContextMenu {
            target: ContextTarget::Bar {
                bar_id: EntityId::from("1")
            }
        })
    );
    let item = items(&view)[0];
    assert!(matches!(
        item.listener(DomEvent::ContextMenu),
        Some(UiAction::OpenContextMenu {
            target: ContextTarget::Bookmark { .. }
        })
    ));
}

#[test]
fn test_rendering_is_deterministic() {
    assert_eq!(render(false), render(false));
    assert_eq!(render(true).to_html(), render(true).to_html());
}

#[test]
fn test_remount_replaces_instead_of_duplicating() {
    let mut surface = Surface::new();
    surface.mount(render(false));
    surface.mount(render(false));
    assert_eq!(surface.generation(), 2);
    assert_eq!(surface.container().map(|c| items_len(c)), Some(3));
    let html = surface.view().unwrap().to_html();
    assert_eq!(html.matches(CONTAINER_ID).count(), 1);
}

fn items_len(container: &ViewNode) -> usize {
    container.find_all(CLASS_ITEM).len()
}

#[test]
fn test_html_escapes_titles_and_wires_listeners() {
    let bars = vec![Bar {
        id: EntityId::from("1"),
        name: "x".to_string(),
        bookmarks: vec![bookmark("a", "<script>", "https://x.test", None)],
    }];
    let html = render_with(&bars, GlobalOptions::default(), false, &HashMap::new()).to_html();
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
    assert!(html.contains("data-eb-on="));
}

#[test]
fn test_surface_alerts_drain() {
    let mut surface = Surface::new();
    surface.alert("one");
    surface.alert("two");
    assert_eq!(surface.alerts().len(), 2);
    assert_eq!(surface.take_alerts(), vec!["one".to_string(), "two".to_string()]);
    assert!(surface.alerts().is_empty());
}
