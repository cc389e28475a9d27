//! Bar Manager: the in-memory bar/bookmark model.
//!
//! Implements `BarManagerTrait`: structural mutations over an ordered list
//! of bars, each holding an ordered list of bookmarks. Every mutation either
//! applies fully or leaves the model untouched.

use tracing::debug;

use crate::types::bar::{Bar, Bookmark, EntityId};
use crate::types::errors::BarError;

/// Trait defining bar and bookmark model operations.
pub trait BarManagerTrait {
    fn bars(&self) -> &[Bar];
    fn bar(&self, bar_id: &EntityId) -> Option<&Bar>;
    fn bar_count(&self) -> usize;
    /// Moves a bookmark to `target_index` in `target_bar_id`.
    ///
    /// `target_index` is an insertion point in the target bar as it looks
    /// *before* the move; moving forward within one bar is compensated for.
    fn move_bookmark(
        &mut self,
        source_bar_id: &EntityId,
        bookmark_id: &EntityId,
        target_bar_id: &EntityId,
        target_index: usize,
    ) -> Result<(), BarError>;
    fn insert_at(&mut self, bar_id: &EntityId, index: Option<usize>, bookmark: Bookmark) -> Result<(), BarError>;
    fn remove_bookmark(&mut self, bar_id: &EntityId, bookmark_id: &EntityId) -> Result<(), BarError>;
    fn edit_title(&mut self, bar_id: &EntityId, bookmark_id: &EntityId, title: &str) -> Result<(), BarError>;
    fn add_bar(&mut self) -> EntityId;
    fn remove_bar(&mut self, bar_id: &EntityId) -> Result<(), BarError>;
    fn rename_bar(&mut self, bar_id: &EntityId, name: &str) -> Result<(), BarError>;
    fn replace_all(&mut self, bars: Vec<Bar>);
}

/// Owns the ordered bar list. Always holds at least one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarManager {
    bars: Vec<Bar>,
}

impl BarManager {
    pub fn new() -> Self {
        Self {
            bars: vec![Bar::default_bar()],
        }
    }

    pub fn from_bars(bars: Vec<Bar>) -> Self {
        let mut manager = Self::new();
        manager.replace_all(bars);
        manager
    }

    fn bar_index(&self, bar_id: &EntityId) -> Result<usize, BarError> {
        self.bars
            .iter()
            .position(|b| &b.id == bar_id)
            .ok_or_else(|| BarError::BarNotFound(bar_id.to_string()))
    }

    fn bar_mut(&mut self, bar_id: &EntityId) -> Result<&mut Bar, BarError> {
        let idx = self.bar_index(bar_id)?;
        Ok(&mut self.bars[idx])
    }
}

impl Default for BarManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BarManagerTrait for BarManager {
    fn bars(&self) -> &[Bar] {
        &self.bars
    }

    fn bar(&self, bar_id: &EntityId) -> Option<&Bar> {
        self.bars.iter().find(|b| &b.id == bar_id)
    }

    fn bar_count(&self) -> usize {
        self.bars.len()
    }

    fn move_bookmark(
        &mut self,
        source_bar_id: &EntityId,
        bookmark_id: &EntityId,
        target_bar_id: &EntityId,
        target_index: usize,
    ) -> Result<(), BarError> {
        // Resolve everything before touching the model
        let from_bar = self.bar_index(source_bar_id)?;
        let to_bar = self.bar_index(target_bar_id)?;
        let from_index = self.bars[from_bar]
            .position_of(bookmark_id)
            .ok_or_else(|| BarError::BookmarkNotFound(bookmark_id.to_string()))?;

        let moved = self.bars[from_bar].bookmarks.remove(from_index);

        let mut to_index = target_index;
        if from_bar == to_bar && from_index < to_index {
            to_index -= 1;
        }
        let to_index = to_index.min(self.bars[to_bar].bookmarks.len());

        debug!(
            bookmark = %bookmark_id,
            from = %source_bar_id,
            from_index,
            to = %target_bar_id,
            to_index,
            "moving bookmark"
        );
        self.bars[to_bar].bookmarks.insert(to_index, moved);
        Ok(())
    }

    /// Inserts at `index` when it lies within `[0, len]`, otherwise appends.
    fn insert_at(&mut self, bar_id: &EntityId, index: Option<usize>, bookmark: Bookmark) -> Result<(), BarError> {
        let bar = self.bar_mut(bar_id)?;
        match index {
            Some(i) if i <= bar.bookmarks.len() => bar.bookmarks.insert(i, bookmark),
            _ => bar.bookmarks.push(bookmark),
        }
        Ok(())
    }

    /// Removing a bookmark that is already gone is not an error.
    fn remove_bookmark(&mut self, bar_id: &EntityId, bookmark_id: &EntityId) -> Result<(), BarError> {
        let bar = self.bar_mut(bar_id)?;
        bar.bookmarks.retain(|b| &b.id != bookmark_id);
        Ok(())
    }

    /// Sets a user-chosen title; an empty title renders the bookmark icon-only.
    fn edit_title(&mut self, bar_id: &EntityId, bookmark_id: &EntityId, title: &str) -> Result<(), BarError> {
        let bar = self.bar_mut(bar_id)?;
        let bookmark = bar
            .bookmarks
            .iter_mut()
            .find(|b| &b.id == bookmark_id)
            .ok_or_else(|| BarError::BookmarkNotFound(bookmark_id.to_string()))?;
        bookmark.title = title.trim().to_string();
        bookmark.is_custom_title = true;
        Ok(())
    }

    fn add_bar(&mut self) -> EntityId {
        let bar = Bar::new(format!("Bar {}", self.bars.len() + 1));
        let id = bar.id.clone();
        self.bars.push(bar);
        id
    }

    fn remove_bar(&mut self, bar_id: &EntityId) -> Result<(), BarError> {
        if self.bars.len() <= 1 {
            return Err(BarError::LastBar);
        }
        let idx = self.bar_index(bar_id)?;
        self.bars.remove(idx);
        Ok(())
    }

    fn rename_bar(&mut self, bar_id: &EntityId, name: &str) -> Result<(), BarError> {
        let bar = self.bar_mut(bar_id)?;
        bar.name = name.trim().to_string();
        Ok(())
    }

    /// Replaces the whole configuration; an empty list becomes the default bar.
    fn replace_all(&mut self, bars: Vec<Bar>) {
        self.bars = if bars.is_empty() {
            vec![Bar::default_bar()]
        } else {
            bars
        };
    }
}
