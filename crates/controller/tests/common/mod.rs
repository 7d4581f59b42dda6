#![allow(dead_code)]

use async_trait::async_trait;
use consent_controller::ConsentController;
use consent_core::{
    ConsentConfig, ConsentError, ConsentStore, MemoryAnalytics, RenderRequest, Surface, UiEvent, View,
};
use consent_storage::{CookieConsentStore, MemoryDocument};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

#[derive(Debug, Default)]
pub struct ViewState {
    pub present: HashSet<Surface>,
    pub exiting: HashSet<Surface>,
    pub renders: Vec<RenderRequest>,
    pub analytics_toggle: bool,
    pub binds: u32,
    pub events: Option<mpsc::UnboundedSender<UiEvent>>,
    pub broken: bool,
}

/// View double that records what the controller asked for.
#[derive(Debug, Default)]
pub struct RecordingView {
    state: Mutex<ViewState>,
}

impl RecordingView {
    pub fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap()
    }

    pub fn is_present(&self, surface: Surface) -> bool {
        self.lock().present.contains(&surface)
    }

    pub fn is_exiting(&self, surface: Surface) -> bool {
        self.lock().exiting.contains(&surface)
    }

    /// Visitor flips the analytics checkbox.
    pub fn set_analytics_toggle(&self, checked: bool) {
        self.lock().analytics_toggle = checked;
    }

    pub fn last_render(&self) -> Option<RenderRequest> {
        self.lock().renders.last().copied()
    }

    /// Visitor clicks something, going through the bound channel.
    pub fn click(&self, event: UiEvent) {
        let sender = self.lock().events.clone().expect("view not bound");
        sender.send(event).expect("controller gone");
    }

    /// Page goes away and takes its event sender with it.
    pub fn unbind(&self) {
        self.lock().events = None;
    }

    pub fn set_broken(&self, broken: bool) {
        self.lock().broken = broken;
    }

    fn check(&self) -> Result<(), ConsentError> {
        if self.lock().broken {
            return Err(ConsentError::View("view detached".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl View for RecordingView {
    async fn render(&self, request: RenderRequest) -> Result<(), ConsentError> {
        self.check()?;
        let mut state = self.lock();
        if let RenderRequest::Preferences { analytics } = request {
            state.analytics_toggle = analytics;
        }
        state.present.insert(request.surface());
        state.exiting.remove(&request.surface());
        state.renders.push(request);
        Ok(())
    }

    async fn bind(&self, events: mpsc::UnboundedSender<UiEvent>) -> Result<(), ConsentError> {
        let mut state = self.lock();
        state.binds += 1;
        state.events = Some(events);
        Ok(())
    }

    async fn begin_exit(&self, surface: Surface) -> Result<(), ConsentError> {
        self.check()?;
        self.lock().exiting.insert(surface);
        Ok(())
    }

    async fn destroy(&self, surface: Surface) -> Result<(), ConsentError> {
        self.check()?;
        let mut state = self.lock();
        state.present.remove(&surface);
        state.exiting.remove(&surface);
        Ok(())
    }

    async fn analytics_checked(&self) -> Result<bool, ConsentError> {
        self.check()?;
        Ok(self.lock().analytics_toggle)
    }
}

pub struct Harness {
    pub document: Arc<MemoryDocument>,
    pub store: Arc<CookieConsentStore<Arc<MemoryDocument>>>,
    pub analytics: Arc<MemoryAnalytics>,
    pub view: Arc<RecordingView>,
    pub controller: ConsentController,
    pub receiver: mpsc::UnboundedReceiver<UiEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_parts(MemoryDocument::new(), MemoryAnalytics::new())
    }

    pub fn with_parts(document: MemoryDocument, analytics: MemoryAnalytics) -> Self {
        let config = ConsentConfig::default().with_measurement_id("G-TEST123");
        let document = Arc::new(document);
        let store = Arc::new(CookieConsentStore::new(Arc::clone(&document), config.clone()));
        let analytics = Arc::new(analytics);
        let view = Arc::new(RecordingView::default());
        let (controller, receiver) = ConsentController::from_shared(
            store.clone(),
            analytics.clone(),
            view.clone(),
            document.clone(),
            &config,
        );
        Self { document, store, analytics, view, controller, receiver }
    }

    pub async fn stored(&self) -> Option<consent_core::ConsentValue> {
        self.store.read().await
    }
}
