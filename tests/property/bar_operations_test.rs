//! Property-based tests for bar model mutations.
//!
//! Moves must preserve the multiset of bookmarks, land the moved bookmark at
//! the compensated index, and leave the model untouched on stale references.

use extra_bars::managers::bar_manager::{BarManager, BarManagerTrait};
use extra_bars::types::bar::{Bar, Bookmark, EntityId};
use proptest::prelude::*;

fn bookmark(id: String) -> Bookmark {
    Bookmark {
        url: format!("https://{}.test", id),
        title: id.clone(),
        id: EntityId::from(id),
        favicon: None,
        is_custom_title: false,
    }
}

/// Strategy: bar sizes for 1..4 bars, each 0..8 bookmarks with globally unique ids.
fn arb_manager() -> impl Strategy<Value = BarManager> {
    proptest::collection::vec(0usize..8, 1..4).prop_map(|sizes| {
        let mut next = 0;
        let bars = sizes
            .into_iter()
            .enumerate()
            .map(|(i, size)| {
                let mut bar = Bar::new(format!("Bar {}", i + 1));
                bar.id = EntityId::from(format!("bar-{}", i));
                for _ in 0..size {
                    bar.bookmarks.push(bookmark(format!("bm{}", next)));
                    next += 1;
                }
                bar
            })
            .collect();
        BarManager::from_bars(bars)
    })
}

fn all_ids(mgr: &BarManager) -> Vec<String> {
    let mut ids: Vec<String> = mgr
        .bars()
        .iter()
        .flat_map(|b| b.bookmarks.iter().map(|bm| bm.id.to_string()))
        .collect();
    ids.sort();
    ids
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any move keeps every bookmark exactly once and puts the moved one where asked.
    #[test]
    fn move_preserves_bookmarks_and_lands_at_compensated_index(
        mgr in arb_manager(),
        pick in any::<prop::sample::Index>(),
        target in any::<prop::sample::Index>(),
        raw_index in 0usize..12,
    ) {
        let locations: Vec<(usize, usize)> = mgr
            .bars()
            .iter()
            .enumerate()
            .flat_map(|(b, bar)| (0..bar.bookmarks.len()).map(move |i| (b, i)))
            .collect();
        prop_assume!(!locations.is_empty());
        let (from_bar, from_index) = locations[pick.index(locations.len())];
        let to_bar = target.index(mgr.bar_count());

        let source_id = mgr.bars()[from_bar].id.clone();
        let target_id = mgr.bars()[to_bar].id.clone();
        let moved = mgr.bars()[from_bar].bookmarks[from_index].id.clone();
        let before = all_ids(&mgr);

        let mut after = mgr.clone();
        after.move_bookmark(&source_id, &moved, &target_id, raw_index).unwrap();

        prop_assert_eq!(all_ids(&after), before);

        let mut expected = raw_index;
        if from_bar == to_bar && from_index < raw_index {
            expected -= 1;
        }
        let target_len = after.bars()[to_bar].bookmarks.len();
        let expected = expected.min(target_len - 1);
        prop_assert_eq!(after.bars()[to_bar].position_of(&moved), Some(expected));
    }

    /// Moving onto its own slot, or just after it, is a no-op.
    #[test]
    fn self_move_is_identity(mgr in arb_manager(), pick in any::<prop::sample::Index>(), after_self in any::<bool>()) {
        let bar = &mgr.bars()[0];
        prop_assume!(!bar.bookmarks.is_empty());
        let index = pick.index(bar.bookmarks.len());
        let id = bar.bookmarks[index].id.clone();
        let bar_id = bar.id.clone();

        let mut moved = mgr.clone();
        let target = if after_self { index + 1 } else { index };
        moved.move_bookmark(&bar_id, &id, &bar_id, target).unwrap();
        prop_assert_eq!(moved, mgr);
    }

    /// Inserting at a valid index reads back at that index; anything past the end appends.
    #[test]
    fn insert_at_reads_back(mgr in arb_manager(), index in proptest::option::of(0usize..12)) {
        let bar_id = mgr.bars()[0].id.clone();
        let len = mgr.bars()[0].bookmarks.len();
        let mut after = mgr.clone();
        let new_id = EntityId::from("fresh");
        after.insert_at(&bar_id, index, bookmark("fresh".to_string())).unwrap();

        let expected = match index {
            Some(i) if i <= len => i,
            _ => len,
        };
        prop_assert_eq!(after.bars()[0].position_of(&new_id), Some(expected));
        prop_assert_eq!(after.bars()[0].bookmarks.len(), len + 1);
    }

    /// A move naming a missing bar or bookmark changes nothing.
    #[test]
    fn stale_move_is_rejected_without_change(mgr in arb_manager(), raw_index in 0usize..12, missing_bar in any::<bool>()) {
        let bar = &mgr.bars()[0];
        let bar_id = bar.id.clone();
        let (source, bookmark_id, target) = if missing_bar {
            prop_assume!(!bar.bookmarks.is_empty());
            (bar_id.clone(), bar.bookmarks[0].id.clone(), EntityId::from("no-such-bar"))
        } else {
            (bar_id.clone(), EntityId::from("no-such-bookmark"), bar_id.clone())
        };
        let mut after = mgr.clone();
        let result = after.move_bookmark(&source, &bookmark_id, &target, raw_index);
        prop_assert!(result.is_err());
        prop_assert!(result.unwrap_err().is_stale());
        prop_assert_eq!(after, mgr);
    }

    /// First to last and back restores the original order.
    #[test]
    fn first_to_last_and_back(mgr in arb_manager()) {
        let bar = &mgr.bars()[0];
        prop_assume!(bar.bookmarks.len() >= 2);
        let bar_id = bar.id.clone();
        let len = bar.bookmarks.len();
        let first = bar.bookmarks[0].id.clone();

        let mut after = mgr.clone();
        after.move_bookmark(&bar_id, &first, &bar_id, len).unwrap();
        prop_assert_eq!(after.bars()[0].position_of(&first), Some(len - 1));
        after.move_bookmark(&bar_id, &first, &bar_id, 0).unwrap();
        prop_assert_eq!(after, mgr);
    }
}
