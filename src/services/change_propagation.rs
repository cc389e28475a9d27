//! Change Propagation: turns store notifications into model replacements.
//!
//! Only synced-area changes to the bar list, the collapsed flag and the
//! global options are of interest. Changes this instance wrote itself are
//! dropped by origin; the caller additionally skips values equal to what it
//! already holds.

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use crate::services::storage::{AreaKind, StorageChange};
use crate::types::bar::Bar;
use crate::types::options::{GlobalOptions, KEY_BARS, KEY_COLLAPSED, KEY_OPTIONS};

/// A decoded change written by someone else.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalChange {
    Bars(Vec<Bar>),
    Collapsed(bool),
    Options(GlobalOptions),
    /// Notifications were dropped; state must be re-read from storage.
    Resync,
}

pub struct ChangePropagator {
    instance_id: String,
    rx: broadcast::Receiver<StorageChange>,
}

impl ChangePropagator {
    pub fn new(instance_id: impl Into<String>, rx: broadcast::Receiver<StorageChange>) -> Self {
        Self {
            instance_id: instance_id.into(),
            rx,
        }
    }

    /// Drains every pending notification without blocking.
    pub fn poll(&mut self) -> Vec<ExternalChange> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(change) => {
                    if let Some(decoded) = self.decode(change) {
                        out.push(decoded);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "storage notifications lagged, resyncing");
                    out.push(ExternalChange::Resync);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        out
    }

    /// Waits for the next relevant change. Returns `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<ExternalChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) => {
                    if let Some(decoded) = self.decode(change) {
                        return Some(decoded);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "storage notifications lagged, resyncing");
                    return Some(ExternalChange::Resync);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn decode(&self, change: StorageChange) -> Option<ExternalChange> {
        if change.area != AreaKind::Sync {
            return None;
        }
        if change.origin.as_deref() == Some(self.instance_id.as_str()) {
            return None;
        }
        let value = change.new_value;
        let decoded = match change.key.as_str() {
            KEY_BARS => match value {
                Some(v) => match serde_json::from_value::<Vec<Bar>>(v) {
                    Ok(bars) => ExternalChange::Bars(bars),
                    Err(e) => {
                        warn!(error = %e, "ignoring malformed bar list from storage");
                        return None;
                    }
                },
                None => ExternalChange::Bars(Vec::new()),
            },
            KEY_COLLAPSED => {
                ExternalChange::Collapsed(value.and_then(|v| v.as_bool()).unwrap_or(false))
            }
            KEY_OPTIONS => ExternalChange::Options(
                value
                    .map(|v| GlobalOptions::from_value(&v))
                    .unwrap_or_default(),
            ),
            _ => return None,
        };
        debug!(key = %change.key, origin = ?change.origin, "external change");
        Some(decoded)
    }
}
