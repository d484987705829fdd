//! Single-slot settings cache
//!
//! Overrides (environment variables) can change between calls in the hosting
//! environment, so the snapshot memo must be explicitly invalidatable. The
//! cache holds at most one snapshot and is owned by whichever component
//! composes the process; everything else receives the `Settings` by
//! parameter.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::Result;

use super::settings::Settings;

/// Explicit memo around [`Settings`] construction.
#[derive(Default)]
pub struct SettingsCache {
    slot: RwLock<Option<Arc<Settings>>>,
}

impl SettingsCache {
    /// Create an empty cache; the first lookup populates it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached snapshot, loading from the process environment on a
    /// miss. Repeated calls without [`SettingsCache::invalidate`] return the
    /// same snapshot.
    pub async fn get(&self) -> Result<Arc<Settings>> {
        self.get_or_init(Settings::from_env).await
    }

    /// Return the cached snapshot, constructing it with `load` on a miss.
    ///
    /// A failed load leaves the slot empty, so the next call retries.
    pub async fn get_or_init<F>(&self, load: F) -> Result<Arc<Settings>>
    where
        F: FnOnce() -> Result<Settings>,
    {
        if let Some(settings) = self.slot.read().await.as_ref() {
            return Ok(Arc::clone(settings));
        }

        let mut slot = self.slot.write().await;
        // Another task may have filled the slot while we waited on the lock.
        if let Some(settings) = slot.as_ref() {
            return Ok(Arc::clone(settings));
        }

        let settings = Arc::new(load()?);
        *slot = Some(Arc::clone(&settings));
        Ok(settings)
    }

    /// Drop the cached snapshot so the next lookup reconstructs it from
    /// current overrides.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }

    /// Whether a snapshot is currently cached.
    pub async fn is_loaded(&self) -> bool {
        self.slot.read().await.is_some()
    }
}
