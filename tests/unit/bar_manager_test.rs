//! Unit tests for the BarManager public API.
//!
//! These exercise structural mutations through `BarManagerTrait` on plain
//! in-memory models; no storage is involved.

use extra_bars::managers::bar_manager::{BarManager, BarManagerTrait};
use extra_bars::types::bar::{Bar, Bookmark, EntityId};
use extra_bars::types::errors::BarError;
use rstest::rstest;

fn bookmark(id: &str) -> Bookmark {
    let mut bm = Bookmark::from_url(&format!("https://{}.test", id), Some(id));
    bm.id = EntityId::from(id);
    bm
}

fn bar(id: &str, items: &[&str]) -> Bar {
    Bar {
        id: EntityId::from(id),
        name: format!("Bar {}", id),
        bookmarks: items.iter().map(|i| bookmark(i)).collect(),
    }
}

fn titles(mgr: &BarManager, bar_id: &str) -> Vec<String> {
    mgr.bar(&EntityId::from(bar_id))
        .map(|b| b.bookmarks.iter().map(|bm| bm.id.to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn test_new_manager_has_default_bar() {
    let mgr = BarManager::new();
    assert_eq!(mgr.bar_count(), 1);
    assert_eq!(mgr.bars()[0].id.as_str(), "1");
    assert_eq!(mgr.bars()[0].name, "Bar 1");
    assert!(mgr.bars()[0].bookmarks.is_empty());
}

#[test]
fn test_replace_all_with_empty_list_restores_default_bar() {
    let mut mgr = BarManager::from_bars(vec![bar("a", &["x"]), bar("b", &[])]);
    assert_eq!(mgr.bar_count(), 2);
    mgr.replace_all(Vec::new());
    assert_eq!(mgr.bars(), &[Bar::default_bar()]);
}

/// Same-bar moves: the target index is an insertion point in the bar as it was before the move.
#[rstest]
#[case::first_to_end(0, 3, &["b", "c", "a"])]
#[case::first_after_second(0, 2, &["b", "a", "c"])]
#[case::last_to_front(2, 0, &["c", "a", "b"])]
#[case::middle_to_front(1, 0, &["b", "a", "c"])]
#[case::onto_itself(1, 1, &["a", "b", "c"])]
#[case::just_after_itself(1, 2, &["a", "b", "c"])]
#[case::past_the_end_clamps(0, 99, &["b", "c", "a"])]
fn test_move_within_bar(#[case] from: usize, #[case] to: usize, #[case] expected: &[&str]) {
    let mut mgr = BarManager::from_bars(vec![bar("1", &["a", "b", "c"])]);
    let id = EntityId::from(["a", "b", "c"][from]);
    let bar_id = EntityId::from("1");
    mgr.move_bookmark(&bar_id, &id, &bar_id, to).unwrap();
    assert_eq!(titles(&mgr, "1"), expected);
}

#[test]
fn test_move_across_bars() {
    let mut mgr = BarManager::from_bars(vec![bar("1", &["a", "b"]), bar("2", &["x", "y"])]);
    mgr.move_bookmark(&EntityId::from("1"), &EntityId::from("a"), &EntityId::from("2"), 1)
        .unwrap();
    assert_eq!(titles(&mgr, "1"), vec!["b"]);
    assert_eq!(titles(&mgr, "2"), vec!["x", "a", "y"]);
}

#[test]
fn test_move_with_stale_reference_leaves_model_untouched() {
    let mut mgr = BarManager::from_bars(vec![bar("1", &["a", "b"]), bar("2", &["x"])]);
    let before = mgr.clone();

    let err = mgr
        .move_bookmark(&EntityId::from("1"), &EntityId::from("a"), &EntityId::from("gone"), 0)
        .unwrap_err();
    assert!(matches!(err, BarError::BarNotFound(_)));
    assert_eq!(mgr, before);

    let err = mgr
        .move_bookmark(&EntityId::from("1"), &EntityId::from("zzz"), &EntityId::from("2"), 0)
        .unwrap_err();
    assert!(matches!(err, BarError::BookmarkNotFound(_)));
    assert_eq!(mgr, before);
}

#[rstest]
#[case::front(Some(0), &["new", "a", "b"])]
#[case::middle(Some(1), &["a", "new", "b"])]
#[case::end(Some(2), &["a", "b", "new"])]
#[case::past_end_appends(Some(5), &["a", "b", "new"])]
#[case::none_appends(None, &["a", "b", "new"])]
fn test_insert_at(#[case] index: Option<usize>, #[case] expected: &[&str]) {
    let mut mgr = BarManager::from_bars(vec![bar("1", &["a", "b"])]);
    mgr.insert_at(&EntityId::from("1"), index, bookmark("new")).unwrap();
    assert_eq!(titles(&mgr, "1"), expected);
}

#[test]
fn test_insert_into_unknown_bar_fails() {
    let mut mgr = BarManager::new();
    let err = mgr
        .insert_at(&EntityId::from("nope"), None, bookmark("x"))
        .unwrap_err();
    assert!(err.is_stale());
}

#[test]
fn test_remove_bookmark_is_idempotent() {
    let mut mgr = BarManager::from_bars(vec![bar("1", &["a", "b"])]);
    mgr.remove_bookmark(&EntityId::from("1"), &EntityId::from("a")).unwrap();
    mgr.remove_bookmark(&EntityId::from("1"), &EntityId::from("a")).unwrap();
    assert_eq!(titles(&mgr, "1"), vec!["b"]);
}

#[test]
fn test_edit_title_marks_custom_and_allows_blank() {
    let mut mgr = BarManager::from_bars(vec![bar("1", &["a"])]);
    mgr.edit_title(&EntityId::from("1"), &EntityId::from("a"), "  ").unwrap();
    let bm = &mgr.bars()[0].bookmarks[0];
    assert_eq!(bm.title, "");
    assert!(bm.is_custom_title);
}

#[test]
fn test_add_bar_names_by_position() {
    let mut mgr = BarManager::new();
    let id = mgr.add_bar();
    assert_eq!(mgr.bar_count(), 2);
    assert_eq!(mgr.bar(&id).map(|b| b.name.as_str()), Some("Bar 2"));
    assert_ne!(id, mgr.bars()[0].id);
}

#[test]
fn test_remove_last_bar_refused() {
    let mut mgr = BarManager::new();
    let only = mgr.bars()[0].id.clone();
    assert_eq!(mgr.remove_bar(&only), Err(BarError::LastBar));
    assert_eq!(mgr.bar_count(), 1);
}

#[test]
fn test_remove_bar() {
    let mut mgr = BarManager::from_bars(vec![bar("1", &["a"]), bar("2", &[])]);
    mgr.remove_bar(&EntityId::from("1")).unwrap();
    assert_eq!(mgr.bar_count(), 1);
    assert_eq!(mgr.bars()[0].id.as_str(), "2");
}

#[test]
fn test_rename_bar_trims() {
    let mut mgr = BarManager::new();
    let id = mgr.bars()[0].id.clone();
    mgr.rename_bar(&id, "  Work  ").unwrap();
    assert_eq!(mgr.bars()[0].name, "Work");
}
