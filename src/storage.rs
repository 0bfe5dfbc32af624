//! Local-storage persistence for the session.
//!
//! The whole session lives under one key as a single JSON blob, in the
//! shape the app has always written:
//!
//! - `times`: recorded solves, newest first
//! - `settings`: user settings (missing fields take defaults)
//! - `currentPuzzle`: the selected puzzle code
//!
//! Loading is forgiving: unreadable storage or corrupt JSON falls back
//! to a fresh session at the call site, and malformed solve records are
//! dropped with a warning.

use crate::config::STORAGE_KEY;
use cube_timer::StoredData;
use gloo_utils::window;
use log::{debug, warn};
use std::fmt;
use web_sys::Storage;

#[derive(Debug)]
pub enum StoreError {
    /// `localStorage` is not reachable (disabled, or a sandboxed frame).
    Unavailable,
    /// The browser rejected the read or write (e.g. quota exceeded).
    Backend(String),
    Serde(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "local storage is unavailable"),
            StoreError::Backend(detail) => write!(f, "storage backend error: {}", detail),
            StoreError::Serde(err) => write!(f, "stored session is not valid JSON: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

fn local_storage() -> Result<Storage, StoreError> {
    window()
        .local_storage()
        .map_err(|_| StoreError::Unavailable)?
        .ok_or(StoreError::Unavailable)
}

/// Read the stored session, if any.
pub fn load() -> Result<Option<StoredData>, StoreError> {
    let raw = local_storage()?
        .get_item(STORAGE_KEY)
        .map_err(|err| StoreError::Backend(format!("{err:?}")))?;

    match raw {
        None => Ok(None),
        Some(json) => {
            let data: StoredData = serde_json::from_str(&json).map_err(StoreError::Serde)?;
            Ok(Some(data.sanitize()))
        }
    }
}

/// Read the stored session, degrading to a fresh one on any failure.
pub fn load_or_default() -> StoredData {
    match load() {
        Ok(Some(data)) => {
            debug!("loaded {} solve(s) from storage", data.times.len());
            data
        }
        Ok(None) => StoredData::default(),
        Err(err) => {
            warn!("failed to load saved session: {err}");
            StoredData::default()
        }
    }
}

/// Write the session back to storage.
pub fn save(data: &StoredData) -> Result<(), StoreError> {
    let json = serde_json::to_string(data).map_err(StoreError::Serde)?;
    local_storage()?
        .set_item(STORAGE_KEY, &json)
        .map_err(|err| StoreError::Backend(format!("{err:?}")))
}
