//! App Core for the extra bookmark bars.
//!
//! [`App`] exclusively owns the bar model, the drag session, the mounted view
//! and the storage handles. Every mutation follows the same cycle: mutate the
//! model, persist it, rebuild the view.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::managers::bar_manager::{BarManager, BarManagerTrait};
use crate::managers::drag_tracker::{DragTracker, DropTarget};
use crate::platform;
use crate::services::change_propagation::{ChangePropagator, ExternalChange};
use crate::services::favicon::{self, FaviconCandidates, IconState};
use crate::services::readiness::{ReadinessProbe, SetupOutcome, SetupRetry};
use crate::services::render_engine::{RenderEngine, RenderState, Surface};
use crate::services::storage::{change_bus, AreaKind, ChangeBus, MemoryStorage, SqliteStorage, StorageArea};
use crate::types::bar::{is_valid_url, Bar, Bookmark, EntityId};
use crate::types::config::HostConfig;
use crate::types::drag::{DragSession, DropOutcome};
use crate::types::errors::{BarError, MessageError, StorageError};
use crate::types::event::{ContextTarget, Disposition, HostEffect, UiAction, UiEvent};
use crate::types::menu::{self, MenuAction, MenuInput, Prompt};
use crate::types::message::PageInfo;
use crate::types::options::{
    GlobalOptions, KEY_BARS, KEY_COLLAPSED, KEY_ENABLED, KEY_OPTIONS, LOCAL_KEY_COLLAPSED,
};

const CLIPBOARD_NOT_URL: &str = "Clipboard does not contain a valid URL";

/// Central application state.
pub struct App {
    instance_id: String,
    config: HostConfig,
    sync: Box<dyn StorageArea>,
    local: Box<dyn StorageArea>,
    bar_manager: BarManager,
    drag_tracker: DragTracker,
    renderer: RenderEngine,
    surface: Surface,
    propagator: ChangePropagator,
    is_enabled: bool,
    is_collapsed: bool,
    options: GlobalOptions,
    /// Icon knowledge keyed by bookmark URL.
    icons: HashMap<String, IconState>,
    page: PageInfo,
}

impl App {
    /// Builds an app over the given storage areas. Nothing is read until [`App::load`].
    pub fn new(sync: Box<dyn StorageArea>, local: Box<dyn StorageArea>, config: HostConfig) -> Self {
        let instance_id = Uuid::new_v4().to_string();
        let propagator = ChangePropagator::new(instance_id.clone(), sync.subscribe());
        Self {
            instance_id,
            config,
            sync,
            local,
            bar_manager: BarManager::new(),
            drag_tracker: DragTracker::new(),
            renderer: RenderEngine::new(),
            surface: Surface::new(),
            propagator,
            is_enabled: true,
            is_collapsed: false,
            options: GlobalOptions::default(),
            icons: HashMap::new(),
            page: PageInfo::default(),
        }
    }

    /// Opens the SQLite-backed store named by `config` (or the platform default).
    pub fn open(config: HostConfig) -> Result<Self, StorageError> {
        let path = config
            .storage
            .database_file
            .clone()
            .map(std::path::PathBuf::from)
            .unwrap_or_else(platform::default_database_path);
        info!(path = %path.display(), "opening bar store");
        let db = Arc::new(Database::open(&path)?);
        Ok(Self::with_database(db, change_bus(), config))
    }

    /// Another instance over an already open database, sharing its change bus.
    pub fn with_database(db: Arc<Database>, bus: ChangeBus, config: HostConfig) -> Self {
        let sync = SqliteStorage::new(db.clone(), AreaKind::Sync, bus.clone());
        let local = SqliteStorage::new(db, AreaKind::Local, bus);
        Self::new(Box::new(sync), Box::new(local), config)
    }

    /// Volatile app; used by the console walkthrough and tests.
    pub fn in_memory() -> Self {
        let bus = change_bus();
        Self::new(
            Box::new(MemoryStorage::new(AreaKind::Sync, bus.clone())),
            Box::new(MemoryStorage::new(AreaKind::Local, bus)),
            HostConfig::default(),
        )
    }

    // === Accessors ===

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn bars(&self) -> &[Bar] {
        self.bar_manager.bars()
    }

    pub fn bar_manager(&self) -> &BarManager {
        &self.bar_manager
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn is_collapsed(&self) -> bool {
        self.is_collapsed
    }

    pub fn options(&self) -> GlobalOptions {
        self.options
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn drag_session(&self) -> &DragSession {
        self.drag_tracker.session()
    }

    pub fn page(&self) -> &PageInfo {
        &self.page
    }

    pub fn set_page(&mut self, page: PageInfo) {
        self.page = page;
    }

    pub fn sync_area(&self) -> &dyn StorageArea {
        self.sync.as_ref()
    }

    pub fn local_area(&self) -> &dyn StorageArea {
        self.local.as_ref()
    }

    // === Load / persist / render ===

    /// Reads the configuration. Never fails: unreadable parts fall back to defaults.
    ///
    /// The collapsed flag is read from the local area first; the synced value
    /// is only used when the local one is missing.
    pub fn load(&mut self) {
        let local_collapsed = match self.local.get(&[LOCAL_KEY_COLLAPSED]) {
            Ok(items) => items.get(LOCAL_KEY_COLLAPSED).and_then(Value::as_bool),
            Err(e) => {
                debug!(error = %e, "local collapsed flag unavailable");
                None
            }
        };

        match self.sync.get(&[KEY_BARS, KEY_ENABLED, KEY_OPTIONS, KEY_COLLAPSED]) {
            Ok(items) => {
                let bars = match items.get(KEY_BARS) {
                    Some(raw) => serde_json::from_value::<Vec<Bar>>(raw.clone()).unwrap_or_else(|e| {
                        warn!(error = %e, "stored bar list unreadable, using default bar");
                        Vec::new()
                    }),
                    None => Vec::new(),
                };
                self.bar_manager.replace_all(bars);
                self.is_enabled = items.get(KEY_ENABLED) != Some(&Value::Bool(false));
                self.options = items
                    .get(KEY_OPTIONS)
                    .map(GlobalOptions::from_value)
                    .unwrap_or_default();
                self.is_collapsed = local_collapsed.unwrap_or_else(|| {
                    items
                        .get(KEY_COLLAPSED)
                        .and_then(Value::as_bool)
                        .unwrap_or(false)
                });
            }
            Err(e) => {
                warn!(error = %e, "could not load configuration, using defaults");
                self.bar_manager.replace_all(Vec::new());
                self.is_enabled = true;
                self.options = GlobalOptions::default();
                self.is_collapsed = local_collapsed.unwrap_or(false);
            }
        }
        info!(
            bars = self.bar_manager.bar_count(),
            enabled = self.is_enabled,
            collapsed = self.is_collapsed,
            "configuration loaded"
        );
    }

    /// Writes the bar list and the enabled flag to the synced area.
    pub fn save_configuration(&self) -> Result<(), StorageError> {
        let mut items = Map::new();
        items.insert(KEY_BARS.to_string(), serde_json::to_value(self.bar_manager.bars())?);
        items.insert(KEY_ENABLED.to_string(), Value::Bool(self.is_enabled));
        self.sync.set(items, Some(&self.instance_id))?;
        debug!("configuration saved");
        Ok(())
    }

    /// Rebuilds the view from the model, or removes it while disabled.
    pub fn render(&mut self) {
        if !self.is_enabled {
            self.surface.unmount();
            return;
        }
        let view = self.renderer.render(&RenderState {
            bars: self.bar_manager.bars(),
            options: self.options,
            collapsed: self.is_collapsed,
            icons: &self.icons,
        });
        self.surface.mount(view);
    }

    /// Persist-then-render. The view is rebuilt even when persisting fails.
    pub fn commit(&mut self) -> Result<(), StorageError> {
        let saved = self.save_configuration();
        if let Err(e) = &saved {
            error!(error = %e, "failed to save configuration");
        }
        self.render();
        saved
    }

    /// Mounts the bars once `probe` reports the page ready, within the configured attempt budget.
    pub fn setup<P, S>(&mut self, probe: &P, sleep: S) -> SetupOutcome
    where
        P: ReadinessProbe + ?Sized,
        S: FnMut(Duration),
    {
        let mut retry = SetupRetry::new(&self.config.setup);
        let url = self.page.url.clone();
        let enabled = self.is_enabled;
        retry.run(
            &url,
            enabled,
            probe,
            || {
                self.render();
                self.surface.is_mounted()
            },
            sleep,
        )
    }

    // === UI events ===

    /// Dispatches one event fired by the mounted view.
    pub fn handle_ui(&mut self, event: UiEvent) -> Vec<HostEffect> {
        let UiEvent {
            action,
            pointer_x,
            rect,
            mut transfer,
            modifiers,
        } = event;

        match action {
            UiAction::Navigate { url } => {
                let disposition = if modifiers.wants_new_tab() {
                    Disposition::NewTab
                } else {
                    Disposition::SameTab
                };
                vec![HostEffect::Open { url, disposition }]
            }
            UiAction::ItemDragStart { source } => {
                self.drag_tracker
                    .drag_start(source, &mut transfer, &mut self.surface);
                vec![HostEffect::WriteTransfer { transfer }]
            }
            UiAction::ItemDragOver { bar_id, index } => {
                let Some(rect) = rect else {
                    return Vec::new();
                };
                let accepted = self.drag_tracker.drag_over_item(
                    &bar_id,
                    index,
                    pointer_x,
                    rect,
                    &transfer,
                    &mut self.surface,
                );
                if accepted {
                    vec![HostEffect::AcceptDrop]
                } else {
                    Vec::new()
                }
            }
            UiAction::ContainerDragOver { bar_id } => {
                let len = self.bar_len(&bar_id);
                if self.drag_tracker.drag_over_container(&bar_id, len, &transfer) {
                    vec![HostEffect::AcceptDrop]
                } else {
                    Vec::new()
                }
            }
            UiAction::DragLeave { bar_id } => {
                self.drag_tracker.drag_leave(&bar_id, &mut self.surface);
                Vec::new()
            }
            UiAction::ItemDrop { bar_id, index } => {
                let outcome = self.drag_tracker.drop(
                    DropTarget::Item { bar_id, index },
                    &transfer,
                    &mut self.surface,
                );
                self.apply_drop(outcome);
                Vec::new()
            }
            UiAction::ContainerDrop { bar_id } => {
                let bar_len = self.bar_len(&bar_id);
                let outcome = self.drag_tracker.drop(
                    DropTarget::Container { bar_id, bar_len },
                    &transfer,
                    &mut self.surface,
                );
                self.apply_drop(outcome);
                Vec::new()
            }
            UiAction::DragEnd => {
                self.drag_tracker.drag_end(&mut self.surface);
                Vec::new()
            }
            UiAction::OpenContextMenu { target } => {
                let items = match target {
                    ContextTarget::Bar { .. } => menu::bar_menu(),
                    ContextTarget::Bookmark { .. } => menu::bookmark_menu(),
                };
                vec![HostEffect::ShowContextMenu { target, items }]
            }
            UiAction::ToggleCollapsed => {
                self.toggle_collapsed();
                Vec::new()
            }
            UiAction::IconFailed { bookmark_url } => {
                self.icon_failed(&bookmark_url);
                Vec::new()
            }
        }
    }

    fn bar_len(&self, bar_id: &EntityId) -> usize {
        self.bar_manager
            .bar(bar_id)
            .map_or(0, |bar| bar.bookmarks.len())
    }

    /// Applies a resolved drop to the model.
    pub fn apply_drop(&mut self, outcome: DropOutcome) {
        let result = match outcome {
            DropOutcome::Move {
                source,
                target_bar_id,
                index,
            } => self.bar_manager.move_bookmark(
                &source.bar_id,
                &source.bookmark_id,
                &target_bar_id,
                index,
            ),
            DropOutcome::InsertExternal {
                bar_id,
                index,
                url,
                title,
            } => {
                let bookmark = Bookmark::from_url(&url, Some(&title));
                self.bar_manager.insert_at(&bar_id, index, bookmark)
            }
            DropOutcome::Rejected(reason) => {
                debug!(%reason, "drop rejected");
                return;
            }
        };
        match result {
            Ok(()) => {
                let _ = self.commit();
            }
            Err(e) => self.report(e),
        }
    }

    /// Stale references are logged; anything else is shown to the user.
    fn report(&mut self, e: BarError) {
        if e.is_stale() {
            debug!(error = %e, "ignoring stale reference");
        } else {
            warn!(error = %e, "refused");
            self.surface.alert(e.to_string());
        }
    }

    // === Collapse / enable ===

    /// Flips the collapsed flag: local area first, synced area best-effort.
    pub fn toggle_collapsed(&mut self) {
        self.is_collapsed = !self.is_collapsed;
        let mut local = Map::new();
        local.insert(LOCAL_KEY_COLLAPSED.to_string(), Value::Bool(self.is_collapsed));
        if let Err(e) = self.local.set(local, Some(&self.instance_id)) {
            error!(error = %e, "failed to save collapsed state");
        }
        let mut synced = Map::new();
        synced.insert(KEY_COLLAPSED.to_string(), Value::Bool(self.is_collapsed));
        if let Err(e) = self.sync.set(synced, Some(&self.instance_id)) {
            debug!(error = %e, "background sync of collapsed state failed");
        }
        self.render();
    }

    /// Flips the global switch. Disabling removes the bars from the page.
    pub fn toggle_extension(&mut self) -> Result<(), StorageError> {
        self.is_enabled = !self.is_enabled;
        info!(enabled = self.is_enabled, "toggled bars");
        self.commit()
    }

    // === Structural actions ===

    pub fn add_new_bar(&mut self) -> Result<EntityId, StorageError> {
        let id = self.bar_manager.add_bar();
        info!(bar = %id, "added bar");
        self.commit()?;
        Ok(id)
    }

    /// Resolves which bar a message-driven addition goes to.
    ///
    /// With a single bar no choice is needed; otherwise `bar_index` (zero-based) must name one.
    pub fn choose_bar(&self, bar_index: Option<usize>) -> Result<EntityId, MessageError> {
        let bars = self.bar_manager.bars();
        if bars.len() == 1 {
            return Ok(bars[0].id.clone());
        }
        match bar_index {
            Some(i) => bars
                .get(i)
                .map(|bar| bar.id.clone())
                .ok_or_else(|| MessageError::Rejected(format!("There is no bar number {}", i + 1))),
            None => Err(MessageError::NoBarSelected),
        }
    }

    /// Appends a bookmark for `url` to the chosen bar.
    pub fn add_link_to_bar(
        &mut self,
        url: &str,
        title: Option<&str>,
        bar_index: Option<usize>,
    ) -> Result<(), MessageError> {
        let bar_id = self.choose_bar(bar_index)?;
        let bookmark = Bookmark::from_url(url, title);
        if !is_valid_url(&bookmark.url) {
            return Err(BarError::InvalidUrl(url.to_string()).into());
        }
        self.bar_manager.insert_at(&bar_id, None, bookmark)?;
        self.commit()?;
        Ok(())
    }

    pub fn add_current_page(&mut self, bar_index: Option<usize>) -> Result<(), MessageError> {
        if self.page.url.is_empty() {
            return Err(MessageError::Rejected("No page is open".to_string()));
        }
        let PageInfo { url, title } = self.page.clone();
        self.add_link_to_bar(&url, Some(&title), bar_index)
    }

    // === Context menu ===

    /// The question to ask before running `action`, if any.
    pub fn prompt_for(&self, target: &ContextTarget, action: MenuAction) -> Option<Prompt> {
        match action {
            MenuAction::AddBookmark => Some(Prompt::Text {
                message: "Enter bookmark URL:".to_string(),
                default: self.page.url.clone(),
            }),
            MenuAction::EditBookmark => {
                let ContextTarget::Bookmark { bar_id, bookmark_id } = target else {
                    return None;
                };
                let bookmark = self.find_bookmark(bar_id, bookmark_id)?;
                Some(Prompt::Text {
                    message: "Enter bookmark name (leave blank for icon only):".to_string(),
                    default: bookmark.title.clone(),
                })
            }
            MenuAction::DeleteBookmark => Some(Prompt::Confirm {
                message: "Delete this bookmark?".to_string(),
            }),
            // The last-bar refusal comes before any confirmation
            MenuAction::DeleteBar if self.bar_manager.bar_count() > 1 => Some(Prompt::Confirm {
                message: "Delete this bookmark bar and all its bookmarks?".to_string(),
            }),
            _ => None,
        }
    }

    /// Runs a context-menu action. `input` carries the prompt answer or clipboard text.
    pub fn run_menu_action(
        &mut self,
        target: &ContextTarget,
        action: MenuAction,
        input: MenuInput,
    ) -> Vec<HostEffect> {
        let bar_id = target.bar_id().clone();
        let bookmark_id = match target {
            ContextTarget::Bookmark { bookmark_id, .. } => Some(bookmark_id.clone()),
            ContextTarget::Bar { .. } => None,
        };

        match action {
            MenuAction::AddBookmark => {
                if let Some(url) = input.text {
                    self.add_bookmark(&bar_id, &url);
                }
                Vec::new()
            }
            MenuAction::PasteUrl => match input.text {
                Some(text) => {
                    self.paste_url(&bar_id, &text);
                    Vec::new()
                }
                // Clipboard unreadable: fall back to asking for the URL
                None => self
                    .prompt_for(target, MenuAction::AddBookmark)
                    .map(|prompt| HostEffect::Prompt {
                        target: target.clone(),
                        action: MenuAction::AddBookmark,
                        prompt,
                    })
                    .into_iter()
                    .collect(),
            },
            MenuAction::AddNewBar => {
                let _ = self.add_new_bar();
                Vec::new()
            }
            MenuAction::DeleteBar => {
                self.delete_bar(&bar_id, input.confirmed);
                Vec::new()
            }
            MenuAction::OpenBookmarkNewTab | MenuAction::OpenBookmarkNewWindow => {
                let disposition = if action == MenuAction::OpenBookmarkNewTab {
                    Disposition::NewTab
                } else {
                    Disposition::NewWindow
                };
                bookmark_id
                    .and_then(|id| self.find_bookmark(&bar_id, &id))
                    .map(|b| HostEffect::Open {
                        url: b.url.clone(),
                        disposition,
                    })
                    .into_iter()
                    .collect()
            }
            MenuAction::EditBookmark => {
                if let (Some(id), Some(title)) = (bookmark_id, input.text) {
                    match self.bar_manager.edit_title(&bar_id, &id, &title) {
                        Ok(()) => {
                            let _ = self.commit();
                        }
                        Err(e) => self.report(e),
                    }
                }
                Vec::new()
            }
            MenuAction::CopyUrl => bookmark_id
                .and_then(|id| self.find_bookmark(&bar_id, &id))
                .map(|b| HostEffect::CopyToClipboard { text: b.url.clone() })
                .into_iter()
                .collect(),
            MenuAction::DeleteBookmark => {
                if let (Some(id), true) = (bookmark_id, input.confirmed) {
                    match self.bar_manager.remove_bookmark(&bar_id, &id) {
                        Ok(()) => {
                            let _ = self.commit();
                        }
                        Err(e) => self.report(e),
                    }
                }
                Vec::new()
            }
        }
    }

    fn find_bookmark(&self, bar_id: &EntityId, bookmark_id: &EntityId) -> Option<&Bookmark> {
        self.bar_manager
            .bar(bar_id)?
            .bookmarks
            .iter()
            .find(|b| &b.id == bookmark_id)
    }

    /// Appends a bookmark typed by the user. Empty input is a cancel.
    pub fn add_bookmark(&mut self, bar_id: &EntityId, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        if !is_valid_url(url) {
            self.surface
                .alert("Please enter a valid URL (starting with http:// or https://)");
            return;
        }
        match self
            .bar_manager
            .insert_at(bar_id, None, Bookmark::from_url(url, None))
        {
            Ok(()) => {
                let _ = self.commit();
            }
            Err(e) => self.report(e),
        }
    }

    /// Appends the clipboard URL, or tells the user it is not one.
    pub fn paste_url(&mut self, bar_id: &EntityId, clipboard: &str) {
        let text = clipboard.trim();
        if !is_valid_url(text) {
            self.surface.alert(CLIPBOARD_NOT_URL);
            return;
        }
        match self
            .bar_manager
            .insert_at(bar_id, None, Bookmark::from_url(text, None))
        {
            Ok(()) => {
                let _ = self.commit();
            }
            Err(e) => self.report(e),
        }
    }

    /// Deletes a bar once confirmed; the last bar is always refused.
    pub fn delete_bar(&mut self, bar_id: &EntityId, confirmed: bool) {
        if self.bar_manager.bar_count() <= 1 {
            self.report(BarError::LastBar);
            return;
        }
        if !confirmed {
            return;
        }
        match self.bar_manager.remove_bar(bar_id) {
            Ok(()) => {
                let _ = self.commit();
            }
            Err(e) => self.report(e),
        }
    }

    // === External changes ===

    /// Applies pending changes written by other instances. Returns how many took effect.
    ///
    /// The synced area is asked first to pick up writes other processes
    /// committed to the same store.
    pub fn poll_external_changes(&mut self) -> usize {
        if let Err(e) = self.sync.refresh() {
            warn!(error = %e, "could not check storage for outside writes");
        }
        let mut applied = 0;
        for change in self.propagator.poll() {
            if self.apply_external(change) {
                applied += 1;
            }
        }
        if applied > 0 {
            self.render();
        }
        applied
    }

    /// Replaces local state wholesale; values equal to what we hold are skipped.
    pub fn apply_external(&mut self, change: ExternalChange) -> bool {
        match change {
            ExternalChange::Bars(bars) => {
                if bars.as_slice() == self.bar_manager.bars() {
                    return false;
                }
                info!(bars = bars.len(), "bar list changed elsewhere");
                self.bar_manager.replace_all(bars);
            }
            ExternalChange::Collapsed(collapsed) => {
                if collapsed == self.is_collapsed {
                    return false;
                }
                self.is_collapsed = collapsed;
            }
            ExternalChange::Options(options) => {
                if options == self.options {
                    return false;
                }
                self.options = options;
            }
            ExternalChange::Resync => self.load(),
        }
        true
    }

    // === Icons ===

    fn icon_failed(&mut self, bookmark_url: &str) {
        if matches!(self.icons.get(bookmark_url), Some(IconState::Resolved(_))) {
            // A probed icon failed too; stop trying
            self.icons
                .insert(bookmark_url.to_string(), IconState::Exhausted);
        } else {
            self.icons.insert(bookmark_url.to_string(), IconState::Failed);
        }
        self.render();
    }

    /// Bookmarks whose badge a probe could still replace, one entry per URL.
    pub fn pending_icon_probes(&self) -> Vec<(String, FaviconCandidates)> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for bookmark in self.bar_manager.bars().iter().flat_map(|b| &b.bookmarks) {
            if !seen.insert(bookmark.url.as_str()) {
                continue;
            }
            if !favicon::needs_probe(bookmark, self.icons.get(&bookmark.url)) {
                continue;
            }
            if let Some(candidates) = FaviconCandidates::for_url(&bookmark.url) {
                out.push((bookmark.url.clone(), candidates));
            }
        }
        out
    }

    /// Records a probe result and re-renders so the badge gets upgraded.
    pub fn icon_resolved(&mut self, bookmark_url: &str, icon: Option<String>) {
        let state = match icon {
            Some(src) => IconState::Resolved(src),
            None => IconState::Exhausted,
        };
        self.icons.insert(bookmark_url.to_string(), state);
        self.render();
    }

    /// Probes every pending bookmark over HTTP. Returns how many icons were found.
    #[cfg(feature = "network")]
    pub fn probe_icons(&mut self) -> usize {
        if !self.config.favicon.probe_enabled {
            return 0;
        }
        let probe = match favicon::HttpIconProbe::new(self.config.favicon.probe_timeout_ms) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "icon probing unavailable");
                return 0;
            }
        };
        let mut found = 0;
        for (url, candidates) in self.pending_icon_probes() {
            let icon = favicon::first_resolved(&candidates, &probe);
            if icon.is_some() {
                found += 1;
            }
            self.icons.insert(
                url,
                icon.map_or(IconState::Exhausted, IconState::Resolved),
            );
        }
        if found > 0 {
            self.render();
        }
        found
    }

    /// Drops the drag session and the mounted view.
    pub fn shutdown(&mut self) {
        self.drag_tracker.drag_end(&mut self.surface);
        self.surface.unmount();
        info!(instance = %self.instance_id, "shut down");
    }
}
