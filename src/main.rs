//! Extra bookmark bars.
//!
//! With the `gui` feature, opens a browser window that injects the bars into
//! every page. Without it, runs a console walkthrough over an in-memory store.

#[cfg(feature = "gui")]
fn main() {
    extra_bars::ui::webview_host::run();
}

#[cfg(not(feature = "gui"))]
fn main() {
    extra_bars::logging::init_logging("warn");

    println!();
    println!("Extra Bookmark Bars v{} (console mode)", env!("CARGO_PKG_VERSION"));
    println!();

    let mut app = extra_bars::app::App::in_memory();
    app.load();

    demo_bookmarks(&mut app);
    demo_drag(&mut app);
    demo_render(&mut app);
    demo_messages(&mut app);
    demo_external_change(&mut app);

    app.shutdown();
    println!("Done.");
}

#[cfg(not(feature = "gui"))]
fn section(name: &str) {
    println!("---------------------------------------------------------------");
    println!("  {}", name);
    println!("---------------------------------------------------------------");
}

#[cfg(not(feature = "gui"))]
fn print_bars(app: &extra_bars::app::App) {
    for bar in app.bars() {
        let titles: Vec<&str> = bar.bookmarks.iter().map(|b| b.title.as_str()).collect();
        println!("  {} [{}]: {}", bar.name, bar.id, titles.join(" | "));
    }
}

#[cfg(not(feature = "gui"))]
fn demo_bookmarks(app: &mut extra_bars::app::App) {
    section("Bars and bookmarks");

    for (url, title) in [
        ("https://www.rust-lang.org", None),
        ("https://docs.rs", Some("Docs.rs")),
        ("crates.io", None),
    ] {
        if let Err(e) = app.add_link_to_bar(url, title, None) {
            println!("  could not add {}: {}", url, e);
        }
    }
    match app.add_new_bar() {
        Ok(id) => println!("  Added second bar {}", id),
        Err(e) => println!("  could not add bar: {}", e),
    }
    if let Err(e) = app.add_link_to_bar("https://github.com", Some("\u{1F419} GitHub"), Some(1)) {
        println!("  could not add link: {}", e);
    }
    match app.add_link_to_bar("https://example.com", None, None) {
        Ok(()) => println!("  unexpected: link added without a bar choice"),
        Err(e) => println!("  Without a bar choice: {}", e),
    }
    print_bars(app);
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_drag(app: &mut extra_bars::app::App) {
    use extra_bars::types::drag::{DragSource, ItemRect};
    use extra_bars::types::event::{UiAction, UiEvent};

    section("Drag and drop");

    let first = &app.bars()[0];
    let bar_id = first.id.clone();
    let Some(bookmark) = first.bookmarks.first() else {
        return;
    };
    let source = DragSource {
        bar_id: bar_id.clone(),
        bookmark_id: bookmark.id.clone(),
        index: 0,
    };
    println!("  Dragging \"{}\" after the last item", bookmark.title);

    let mut transfer = extra_bars::types::drag::DataTransfer::new();
    for effect in app.handle_ui(UiEvent::new(UiAction::ItemDragStart { source })) {
        if let extra_bars::types::event::HostEffect::WriteTransfer { transfer: t } = effect {
            transfer = t;
        }
    }
    let last = app.bars()[0].bookmarks.len() - 1;
    let rect = ItemRect { left: 0.0, width: 100.0 };
    app.handle_ui(
        UiEvent::new(UiAction::ItemDragOver { bar_id: bar_id.clone(), index: last })
            .at(80.0, rect)
            .with_transfer(transfer.clone()),
    );
    println!("  Indicators while hovering: {:?}", app.surface().indicators());
    app.handle_ui(
        UiEvent::new(UiAction::ItemDrop { bar_id, index: last })
            .at(80.0, rect)
            .with_transfer(transfer),
    );
    print_bars(app);
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_render(app: &mut extra_bars::app::App) {
    section("Rendered view");

    app.render();
    if let Some(view) = app.surface().view() {
        let html = view.to_html();
        let preview: String = html.chars().take(240).collect();
        println!("  {} bytes of markup: {}...", html.len(), preview);
    }
    app.toggle_collapsed();
    println!("  Collapsed: {}", app.is_collapsed());
    app.toggle_collapsed();
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_messages(app: &mut extra_bars::app::App) {
    use extra_bars::message_handler::handle_message;
    use extra_bars::types::message::PageInfo;
    use serde_json::json;

    section("Control messages");

    app.set_page(PageInfo {
        url: "https://blog.rust-lang.org/".to_string(),
        title: "Rust Blog".to_string(),
    });
    for message in [
        json!({"action": "getStatus"}),
        json!({"action": "addCurrentPage", "barIndex": 1}),
        json!({"action": "launchRockets"}),
    ] {
        let result = handle_message(app, &message);
        println!(
            "  {} -> {}",
            message,
            serde_json::to_string(&result).unwrap_or_default()
        );
    }
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_external_change(app: &mut extra_bars::app::App) {
    use extra_bars::types::options::KEY_OPTIONS;
    use serde_json::{json, Map};

    section("Change from another instance");

    let mut items = Map::new();
    items.insert(KEY_OPTIONS.to_string(), json!({"scale": 1.4, "spacing": 6, "opacity": 0.9}));
    if let Err(e) = app.sync_area().set(items, Some("another-window")) {
        println!("  write failed: {}", e);
        return;
    }
    let applied = app.poll_external_changes();
    println!("  Applied {} change(s); options now {:?}", applied, app.options());
    println!();
}
