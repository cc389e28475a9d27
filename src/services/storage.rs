//! Key-value storage areas for the bar configuration.
//!
//! Two areas exist: `Sync`, shared by every instance reading the same store,
//! and `Local`, a per-instance fallback used for the collapsed flag. Writes
//! that change a value are published on a [`ChangeBus`] so other instances
//! in the process can react to them; the SQLite area also republishes writes
//! it finds were committed by other processes.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use crate::database::Database;
use crate::types::errors::StorageError;

/// Which storage area a value lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaKind {
    Sync,
    Local,
}

impl AreaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaKind::Sync => "sync",
            AreaKind::Local => "local",
        }
    }
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single key whose stored value changed.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub area: AreaKind,
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<Value>,
    /// Instance id of the writer, when it identified itself.
    pub origin: Option<String>,
}

/// Fan-out channel carrying [`StorageChange`]s between storage areas and listeners.
pub type ChangeBus = broadcast::Sender<StorageChange>;

/// Creates a bus; clone it into every area that should share notifications.
pub fn change_bus() -> ChangeBus {
    broadcast::channel(256).0
}

/// Interface of a named-blob store with change notification.
pub trait StorageArea {
    fn kind(&self) -> AreaKind;
    /// Returns the stored values for whichever of `keys` exist.
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StorageError>;
    /// Writes every item, publishing a change for each value that differs.
    fn set(&self, items: Map<String, Value>, origin: Option<&str>) -> Result<(), StorageError>;
    fn remove(&self, keys: &[&str], origin: Option<&str>) -> Result<(), StorageError>;
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;

    /// Publishes changes committed to this area by writers outside this
    /// process. Returns how many keys were found changed.
    fn refresh(&self) -> Result<usize, StorageError> {
        Ok(0)
    }
}

fn publish(bus: &ChangeBus, area: AreaKind, key: &str, new_value: Option<Value>, origin: Option<&str>) {
    trace!(%area, key, "publishing storage change");
    // No receivers is fine: nobody is listening yet
    let _ = bus.send(StorageChange {
        area,
        key: key.to_string(),
        new_value,
        origin: origin.map(str::to_string),
    });
}

// === SQLite-backed area ===

/// The area's rows as this connection last saw them.
struct Snapshot {
    data_version: i64,
    values: HashMap<String, String>,
}

/// Storage area persisted in the `kv_items` table.
///
/// Writes made through this connection are published as they happen.
/// Writes committed by other connections (another process over the same file)
/// are found by [`StorageArea::refresh`], which compares `PRAGMA data_version`
/// and then diffs the area against the last snapshot.
pub struct SqliteStorage {
    db: Arc<Database>,
    area: AreaKind,
    bus: ChangeBus,
    snapshot: Mutex<Option<Snapshot>>,
}

impl SqliteStorage {
    pub fn new(db: Arc<Database>, area: AreaKind, bus: ChangeBus) -> Self {
        let storage = Self {
            db,
            area,
            bus,
            snapshot: Mutex::new(None),
        };
        match storage.take_snapshot() {
            Ok(snapshot) => storage.store_snapshot(snapshot),
            Err(e) => warn!(area = %area, error = %e, "could not snapshot storage area"),
        }
        storage
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let raw = self
            .db
            .connection()
            .query_row(
                "SELECT value FROM kv_items WHERE area = ?1 AND key = ?2",
                params![self.area.as_str(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(raw)
    }

    /// Bumped whenever another connection commits to the database file.
    fn data_version(&self) -> Result<i64, StorageError> {
        let version = self
            .db
            .connection()
            .query_row("PRAGMA data_version", [], |row| row.get(0))?;
        Ok(version)
    }

    fn take_snapshot(&self) -> Result<Snapshot, StorageError> {
        let data_version = self.data_version()?;
        let conn = self.db.connection();
        let mut stmt = conn.prepare("SELECT key, value FROM kv_items WHERE area = ?1")?;
        let values = stmt
            .query_map(params![self.area.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Snapshot {
            data_version,
            values,
        })
    }

    fn lock_snapshot(&self) -> Result<std::sync::MutexGuard<'_, Option<Snapshot>>, StorageError> {
        self.snapshot
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    fn store_snapshot(&self, snapshot: Snapshot) {
        if let Ok(mut guard) = self.snapshot.lock() {
            *guard = Some(snapshot);
        }
    }

    /// Records our own committed writes so `refresh` does not report them back.
    fn note_written(&self, written: &[(String, Option<String>)]) -> Result<(), StorageError> {
        let mut guard = self.lock_snapshot()?;
        if let Some(snapshot) = guard.as_mut() {
            for (key, encoded) in written {
                match encoded {
                    Some(raw) => snapshot.values.insert(key.clone(), raw.clone()),
                    None => snapshot.values.remove(key),
                };
            }
        }
        Ok(())
    }
}

impl StorageArea for SqliteStorage {
    fn kind(&self) -> AreaKind {
        self.area
    }

    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StorageError> {
        let mut out = Map::new();
        for key in keys {
            if let Some(raw) = self.read_raw(key)? {
                let value: Value = serde_json::from_str(&raw)?;
                out.insert(key.to_string(), value);
            }
        }
        Ok(out)
    }

    fn set(&self, items: Map<String, Value>, origin: Option<&str>) -> Result<(), StorageError> {
        let now = Self::now();
        let mut changed = Vec::new();
        let mut written = Vec::with_capacity(items.len());
        let tx = self.db.connection().unchecked_transaction()?;
        for (key, value) in items {
            let encoded = serde_json::to_string(&value)?;
            let previous = self.read_raw(&key)?;
            tx.execute(
                "INSERT INTO kv_items (area, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(area, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![self.area.as_str(), key, encoded, now],
            )?;
            if previous.as_deref() != Some(encoded.as_str()) {
                changed.push((key.clone(), value));
            }
            written.push((key, Some(encoded)));
        }
        tx.commit()?;
        self.note_written(&written)?;
        debug!(area = %self.area, changed = changed.len(), "stored items");
        for (key, value) in changed {
            publish(&self.bus, self.area, &key, Some(value), origin);
        }
        Ok(())
    }

    fn remove(&self, keys: &[&str], origin: Option<&str>) -> Result<(), StorageError> {
        let mut removed = Vec::new();
        let tx = self.db.connection().unchecked_transaction()?;
        for key in keys {
            let affected = tx.execute(
                "DELETE FROM kv_items WHERE area = ?1 AND key = ?2",
                params![self.area.as_str(), key],
            )?;
            if affected > 0 {
                removed.push((key.to_string(), None));
            }
        }
        tx.commit()?;
        self.note_written(&removed)?;
        for (key, _) in removed {
            publish(&self.bus, self.area, &key, None, origin);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.bus.subscribe()
    }

    fn refresh(&self) -> Result<usize, StorageError> {
        let mut guard = self.lock_snapshot()?;
        if let Some(seen) = guard.as_ref() {
            if seen.data_version == self.data_version()? {
                return Ok(0);
            }
        }
        let current = self.take_snapshot()?;
        let mut found = 0;
        if let Some(seen) = guard.as_ref() {
            for (key, raw) in &current.values {
                if seen.values.get(key) == Some(raw) {
                    continue;
                }
                match serde_json::from_str::<Value>(raw) {
                    Ok(value) => {
                        publish(&self.bus, self.area, key, Some(value), None);
                        found += 1;
                    }
                    Err(e) => warn!(area = %self.area, key = %key, error = %e, "skipping unreadable value"),
                }
            }
            for key in seen.values.keys().filter(|k| !current.values.contains_key(*k)) {
                publish(&self.bus, self.area, key, None, None);
                found += 1;
            }
        }
        if found > 0 {
            debug!(area = %self.area, found, "picked up writes from another connection");
        }
        *guard = Some(current);
        Ok(found)
    }
}

// === In-memory area ===

/// Volatile storage area. Can be switched offline to exercise failure paths.
pub struct MemoryStorage {
    area: AreaKind,
    items: Mutex<HashMap<String, Value>>,
    available: AtomicBool,
    bus: ChangeBus,
}

impl MemoryStorage {
    pub fn new(area: AreaKind, bus: ChangeBus) -> Self {
        Self {
            area,
            items: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            bus,
        }
    }

    /// While unavailable every operation fails with [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable(format!("{} area is offline", self.area)))
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>, StorageError> {
        self.items
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

impl StorageArea for MemoryStorage {
    fn kind(&self) -> AreaKind {
        self.area
    }

    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StorageError> {
        self.check()?;
        let items = self.lock()?;
        Ok(keys
            .iter()
            .filter_map(|k| items.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    fn set(&self, items: Map<String, Value>, origin: Option<&str>) -> Result<(), StorageError> {
        self.check()?;
        let mut changed = Vec::new();
        {
            let mut stored = self.lock()?;
            for (key, value) in items {
                if stored.get(&key) != Some(&value) {
                    changed.push((key.clone(), value.clone()));
                }
                stored.insert(key, value);
            }
        }
        for (key, value) in changed {
            publish(&self.bus, self.area, &key, Some(value), origin);
        }
        Ok(())
    }

    fn remove(&self, keys: &[&str], origin: Option<&str>) -> Result<(), StorageError> {
        self.check()?;
        let removed: Vec<&str> = {
            let mut stored = self.lock()?;
            keys.iter()
                .copied()
                .filter(|k| stored.remove(*k).is_some())
                .collect()
        };
        for key in removed {
            publish(&self.bus, self.area, key, None, origin);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.bus.subscribe()
    }
}
