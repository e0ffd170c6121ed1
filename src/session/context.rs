use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::store::SessionStore;
use crate::food::types::NutritionRecord;

/// The two screens of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Capture,
    Analysis,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Capture => "/dashboard",
            Route::Analysis => "/analysis",
        }
    }
}

/// Explicit single-slot handoff between the capture and analysis screens.
///
/// Publishing overwrites the slot and, when a store is attached, writes the
/// record through so it survives restarts. Writers are serialized, so the slot
/// and the store always end up holding the same record.
#[derive(Clone, Default)]
pub struct SessionContext {
    slot: Arc<RwLock<Option<NutritionRecord>>>,
    writer: Arc<Mutex<()>>,
    store: Option<SessionStore>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context backed by a store; the slot starts from whatever it holds.
    pub fn with_store(store: SessionStore) -> Self {
        let initial = store.load();
        Self {
            slot: Arc::new(RwLock::new(initial)),
            writer: Arc::default(),
            store: Some(store),
        }
    }

    /// Stores the record and returns the route that should display it.
    pub async fn publish(&self, record: NutritionRecord) -> Route {
        let _writer = self.writer.lock().await;
        if let Some(store) = &self.store {
            store.save(&record).await;
        }
        debug!(food = %record.name, "session record published");
        *self.slot.write() = Some(record);
        Route::Analysis
    }

    pub fn current(&self) -> Option<NutritionRecord> {
        self.slot.read().clone()
    }

    pub async fn clear(&self) {
        let _writer = self.writer.lock().await;
        if let Some(store) = &self.store {
            store.clear().await;
        }
        *self.slot.write() = None;
    }
}
