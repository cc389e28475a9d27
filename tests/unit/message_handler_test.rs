//! Tests for the control-surface message handler.

use extra_bars::app::App;
use extra_bars::message_handler::{handle_command, handle_message, parse_command};
use extra_bars::types::errors::MessageError;
use extra_bars::types::message::{Command, CommandResult, PageInfo};
use rstest::rstest;
use serde_json::{json, Value};

fn app() -> App {
    let mut app = App::in_memory();
    app.load();
    app
}

fn two_bar_app() -> App {
    let mut app = app();
    app.add_new_bar().unwrap();
    app
}

#[rstest]
#[case::status(json!({"action": "getStatus"}), Command::GetStatus)]
#[case::new_bar(json!({"action": "addNewBar"}), Command::AddNewBar)]
#[case::toggle(json!({"action": "toggleExtension"}), Command::ToggleExtension)]
#[case::current_page(json!({"action": "addCurrentPage", "barIndex": 1}), Command::AddCurrentPage { bar_index: Some(1) })]
#[case::link(
    json!({"action": "addLinkToBar", "url": "https://a.test"}),
    Command::AddLinkToBar { url: "https://a.test".to_string(), title: None, bar_index: None }
)]
fn test_parse_known_commands(#[case] message: Value, #[case] expected: Command) {
    assert_eq!(parse_command(&message), Ok(expected));
}

#[rstest]
#[case::unknown(json!({"action": "selfDestruct"}), MessageError::UnknownAction("selfDestruct".to_string()))]
fn test_parse_unknown_action(#[case] message: Value, #[case] expected: MessageError) {
    assert_eq!(parse_command(&message), Err(expected));
}

#[rstest]
#[case::no_action(json!({"url": "https://a.test"}))]
#[case::action_not_string(json!({"action": 3}))]
#[case::missing_url(json!({"action": "addLinkToBar"}))]
#[case::not_an_object(json!("getStatus"))]
fn test_parse_malformed(#[case] message: Value) {
    assert!(matches!(parse_command(&message), Err(MessageError::Malformed(_))));
}

#[test]
fn test_get_status_reports_enabled_flag() {
    let mut app = app();
    assert_eq!(handle_command(&mut app, Command::GetStatus), CommandResult::status(true));
    handle_command(&mut app, Command::ToggleExtension);
    assert_eq!(
        handle_message(&mut app, &json!({"action": "getStatus"})),
        CommandResult::status(false)
    );
}

#[test]
fn test_add_link_with_single_bar_needs_no_choice() {
    let mut app = app();
    let result = handle_message(
        &mut app,
        &json!({"action": "addLinkToBar", "url": "https://a.test", "title": "A"}),
    );
    assert_eq!(result, CommandResult::ok());
    assert_eq!(app.bars()[0].bookmarks[0].title, "A");
}

#[test]
fn test_add_link_with_several_bars_requires_index() {
    let mut app = two_bar_app();
    let result = handle_message(&mut app, &json!({"action": "addLinkToBar", "url": "https://a.test"}));
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Choose a bar for this link"));

    let result = handle_message(
        &mut app,
        &json!({"action": "addLinkToBar", "url": "https://a.test", "barIndex": 1}),
    );
    assert!(result.success);
    assert!(app.bars()[0].bookmarks.is_empty());
    assert_eq!(app.bars()[1].bookmarks.len(), 1);
}

#[test]
fn test_add_link_out_of_range_index() {
    let mut app = two_bar_app();
    let result = handle_message(
        &mut app,
        &json!({"action": "addLinkToBar", "url": "https://a.test", "barIndex": 5}),
    );
    assert_eq!(result, CommandResult::failed("There is no bar number 6"));
}

#[test]
fn test_add_link_rejects_non_http() {
    let mut app = app();
    let result = handle_message(
        &mut app,
        &json!({"action": "addLinkToBar", "url": "javascript:alert(1)"}),
    );
    assert!(!result.success);
    assert!(app.bars()[0].bookmarks.is_empty());
}

#[rstest]
#[case::ftp("ftp://x")]
#[case::mailto("mailto:someone@example.com")]
#[case::file("file:///etc/passwd")]
fn test_add_link_keeps_model_for_foreign_scheme(#[case] url: &str) {
    let mut app = app();
    let before = app.bars().to_vec();
    let result = handle_message(&mut app, &json!({"action": "addLinkToBar", "url": url}));
    assert!(!result.success);
    assert!(result.error.is_some());
    assert_eq!(app.bars(), before.as_slice());
}

#[test]
fn test_add_current_page_rejects_foreign_scheme() {
    let mut app = app();
    app.set_page(PageInfo {
        url: "ftp://files.test/readme".to_string(),
        title: "Readme".to_string(),
    });
    let result = handle_command(&mut app, Command::AddCurrentPage { bar_index: None });
    assert!(!result.success);
    assert!(app.bars()[0].bookmarks.is_empty());
}

#[test]
fn test_add_link_without_scheme_gets_https() {
    let mut app = app();
    let result = handle_message(&mut app, &json!({"action": "addLinkToBar", "url": "www.rust-lang.org"}));
    assert_eq!(result, CommandResult::ok());
    assert_eq!(app.bars()[0].bookmarks[0].url, "https://www.rust-lang.org");
}

#[test]
fn test_add_current_page() {
    let mut app = app();
    assert_eq!(
        handle_command(&mut app, Command::AddCurrentPage { bar_index: None }),
        CommandResult::failed("No page is open")
    );

    app.set_page(PageInfo {
        url: "https://blog.test/post".to_string(),
        title: "A post".to_string(),
    });
    assert_eq!(
        handle_command(&mut app, Command::AddCurrentPage { bar_index: None }),
        CommandResult::ok()
    );
    let bookmark = &app.bars()[0].bookmarks[0];
    assert_eq!(bookmark.url, "https://blog.test/post");
    assert_eq!(bookmark.title, "A post");
}

#[test]
fn test_add_new_bar() {
    let mut app = app();
    assert_eq!(handle_message(&mut app, &json!({"action": "addNewBar"})), CommandResult::ok());
    assert_eq!(app.bars().len(), 2);
    assert_eq!(app.bars()[1].name, "Bar 2");
}

#[test]
fn test_unknown_action_reply() {
    let mut app = app();
    let result = handle_message(&mut app, &json!({"action": "selfDestruct"}));
    assert_eq!(result, CommandResult::failed("Unknown action: selfDestruct"));
}

#[test]
fn test_results_serialize_compactly() {
    assert_eq!(serde_json::to_value(CommandResult::ok()).unwrap(), json!({"success": true}));
    assert_eq!(
        serde_json::to_value(CommandResult::status(false)).unwrap(),
        json!({"success": true, "isEnabled": false})
    );
}
