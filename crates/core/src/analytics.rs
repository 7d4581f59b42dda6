use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, info};

/// Grant or deny flag of a storage category in a consent-mode update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageGrant {
    Granted,
    Denied,
}

/// Payload of `gtag('consent', 'update', ...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentUpdate {
    pub analytics_storage: StorageGrant,
}

impl ConsentUpdate {
    pub fn granted() -> Self {
        Self { analytics_storage: StorageGrant::Granted }
    }

    pub fn denied() -> Self {
        Self { analytics_storage: StorageGrant::Denied }
    }
}

/// Grants or denies the vendor analytics script its storage.
///
/// Both calls are idempotent and never fail; a missing vendor hook is
/// logged and otherwise ignored.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn enable(&self);
    async fn disable(&self);
}

/// Sink for pages that carry no analytics vendor script at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAnalytics;

#[async_trait]
impl AnalyticsSink for NoopAnalytics {
    async fn enable(&self) {
        debug!("no analytics hook configured, enable ignored");
    }

    async fn disable(&self) {
        debug!("no analytics hook configured, disable ignored");
    }
}

/// Snapshot of the vendor globals as [`MemoryAnalytics`] models them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GtagState {
    /// `typeof gtag === 'function'`
    pub hook_installed: bool,
    /// Last grant the hook received
    pub analytics_storage: Option<StorageGrant>,
    /// `window['ga-disable-<id>']`
    pub opted_out: bool,
    /// Every consent update dispatched to the hook, in order
    pub commands: Vec<ConsentUpdate>,
}

/// In-process stand-in for the vendor script's globals.
#[derive(Debug)]
pub struct MemoryAnalytics {
    state: Mutex<GtagState>,
}

impl MemoryAnalytics {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GtagState { hook_installed: true, ..GtagState::default() }),
        }
    }

    /// A page where the vendor script never loaded.
    pub fn without_hook() -> Self {
        Self { state: Mutex::new(GtagState::default()) }
    }

    pub fn snapshot(&self) -> GtagState {
        self.lock().clone()
    }

    pub fn is_granted(&self) -> bool {
        let state = self.lock();
        state.analytics_storage == Some(StorageGrant::Granted) && !state.opted_out
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GtagState> {
        // A poisoned lock only means a test panicked mid-update; the state is plain data.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryAnalytics {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalyticsSink for MemoryAnalytics {
    async fn enable(&self) {
        let mut state = self.lock();
        if !state.hook_installed {
            debug!("analytics hook absent, enable is a no-op");
            return;
        }
        let update = ConsentUpdate::granted();
        state.analytics_storage = Some(update.analytics_storage);
        state.opted_out = false;
        state.commands.push(update);
        info!("analytics enabled");
    }

    async fn disable(&self) {
        let mut state = self.lock();
        if state.hook_installed {
            let update = ConsentUpdate::denied();
            state.analytics_storage = Some(update.analytics_storage);
            state.commands.push(update);
        } else {
            debug!("analytics hook absent, setting opt-out flag only");
        }
        state.opted_out = true;
        info!("analytics disabled");
    }
}
