use consent_core::{
    AnalyticsSink, ConsentConfig, ConsentStore, ConsentValue, Document, RenderRequest, Surface,
    UiEvent, View,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub mod machine;

pub use machine::{BannerState, Step, transition};

/// Record of one handled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub from: BannerState,
    pub to: BannerState,
    pub step: Step,
}

/// Drives the banner: bootstrap on page ready, then one event at a time.
pub struct ConsentController {
    store: Arc<dyn ConsentStore>,
    analytics: Arc<dyn AnalyticsSink>,
    view: Arc<dyn View>,
    document: Arc<dyn Document>,
    events: Option<mpsc::UnboundedSender<UiEvent>>,
    fade_out: Duration,
    fade: Option<JoinHandle<()>>,
    state: BannerState,
    bootstrapped: bool,
    bound: bool,
}

impl ConsentController {
    pub fn new<S, A, V, D>(
        store: S,
        analytics: A,
        view: V,
        document: D,
        config: &ConsentConfig,
    ) -> (Self, mpsc::UnboundedReceiver<UiEvent>)
    where
        S: ConsentStore + 'static,
        A: AnalyticsSink + 'static,
        V: View + 'static,
        D: Document + 'static,
    {
        Self::from_shared(
            Arc::new(store),
            Arc::new(analytics),
            Arc::new(view),
            Arc::new(document),
            config,
        )
    }

    /// Same as [`ConsentController::new`] for collaborators the caller keeps handles to.
    pub fn from_shared(
        store: Arc<dyn ConsentStore>,
        analytics: Arc<dyn AnalyticsSink>,
        view: Arc<dyn View>,
        document: Arc<dyn Document>,
        config: &ConsentConfig,
    ) -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            store,
            analytics,
            view,
            document,
            events: Some(tx),
            fade_out: config.fade_out(),
            fade: None,
            state: BannerState::Hidden,
            bootstrapped: false,
            bound: false,
        };
        (controller, rx)
    }

    pub fn state(&self) -> BannerState {
        self.state
    }

    /// Sender feeding the controller's event loop, for hooks outside the view.
    /// `None` once the loop has started, since the loop keeps no sender of its own.
    pub fn sender(&self) -> Option<mpsc::UnboundedSender<UiEvent>> {
        self.events.clone()
    }

    /// Runs once per page load: waits for readiness, then applies the stored decision.
    pub async fn bootstrap(&mut self) -> BannerState {
        if self.bootstrapped {
            debug!(state = ?self.state, "bootstrap already ran for this page load");
            return self.state;
        }

        self.await_ready().await;
        self.bootstrapped = true;
        self.bind_view().await;

        self.state = match self.store.read().await {
            None => {
                self.render(RenderRequest::Banner).await;
                self.analytics.disable().await;
                BannerState::Shown
            }
            Some(ConsentValue::Accepted) => {
                self.analytics.enable().await;
                BannerState::Hidden
            }
            Some(ConsentValue::Rejected) => {
                self.analytics.disable().await;
                BannerState::Hidden
            }
        };

        info!(state = ?self.state, "consent bootstrap complete");
        self.state
    }

    pub async fn handle(&mut self, event: UiEvent) -> Outcome {
        let from = self.state;
        let (to, step) = transition(from, event);
        self.state = to;

        match step {
            Step::Ignore => {
                debug!(state = ?from, event = ?event, "event ignored");
            }
            Step::Decide(value) => {
                self.decide(value).await;
                self.dismiss_banner().await;
            }
            Step::OpenPreferences => {
                // read now, the record may have changed since bootstrap
                let analytics = self.store.read().await == Some(ConsentValue::Accepted);
                self.render(RenderRequest::Preferences { analytics }).await;
            }
            Step::SavePreferences => {
                let checked = match self.view.analytics_checked().await {
                    Ok(checked) => checked,
                    Err(e) => {
                        warn!(error = %e, "could not read analytics toggle, saving as rejected");
                        false
                    }
                };
                self.decide(ConsentValue::from_analytics(checked)).await;
                self.remove(Surface::Preferences).await;
                self.dismiss_banner().await;
            }
            Step::ClosePreferences => {
                self.remove(Surface::Preferences).await;
            }
            Step::Revoke => {
                self.revoke().await;
            }
        }

        let outcome = Outcome { from, to: self.state, step };
        if step != Step::Ignore {
            info!(from = ?outcome.from, to = ?outcome.to, step = ?outcome.step, "consent transition");
        }
        outcome
    }

    /// Clears consent; the page reloads, so bootstrap runs again.
    pub async fn revoke(&mut self) {
        self.store.revoke().await;
        self.page_loaded().await;
    }

    /// A new document replaced the page: start over as on first load.
    pub async fn page_loaded(&mut self) -> BannerState {
        self.cancel_fade();
        self.state = BannerState::Hidden;
        self.bootstrapped = false;
        self.bootstrap().await
    }

    /// Processes events until every sender is gone or `shutdown` flips to true.
    pub async fn run(
        &mut self,
        receiver: mpsc::UnboundedReceiver<UiEvent>,
        shutdown: watch::Receiver<bool>,
    ) {
        // kept alive so the page-load branch just stays pending
        let (_page_loads_tx, page_loads) = mpsc::unbounded_channel();
        self.run_with_page_loads(receiver, page_loads, shutdown).await;
    }

    /// Same as [`ConsentController::run`], re-bootstrapping on every `page_loads` signal.
    pub async fn run_with_page_loads(
        &mut self,
        mut receiver: mpsc::UnboundedReceiver<UiEvent>,
        mut page_loads: mpsc::UnboundedReceiver<()>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        if *shutdown.borrow() {
            return;
        }
        // from here on only outside senders keep the channel open
        self.events = None;

        loop {
            tokio::select! {
                event = receiver.recv() => match event {
                    Some(event) => {
                        self.handle(event).await;
                    }
                    None => break,
                },
                Some(()) = page_loads.recv() => {
                    debug!("new page load, bootstrapping again");
                    self.page_loaded().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!(state = ?self.state, "consent event loop stopped");
    }

    async fn await_ready(&self) {
        match self.document.ready_state().await {
            Ok(state) if state.is_ready() => {}
            Ok(_) => {
                debug!("document still loading, deferring bootstrap");
                if let Err(e) = self.document.wait_until_ready().await {
                    warn!(error = %e, "waiting for document readiness failed, bootstrapping anyway");
                }
            }
            Err(e) => {
                warn!(error = %e, "could not query document readiness, bootstrapping anyway");
            }
        }
    }

    async fn bind_view(&mut self) {
        if self.bound {
            return;
        }
        let Some(events) = self.events.clone() else {
            warn!("event loop already owns the channel, view left unbound");
            return;
        };
        match self.view.bind(events).await {
            Ok(()) => self.bound = true,
            Err(e) => warn!(error = %e, "failed to bind view events"),
        }
    }

    async fn decide(&self, value: ConsentValue) {
        self.store.write(value).await;
        if value.allows_analytics() {
            self.analytics.enable().await;
        } else {
            self.analytics.disable().await;
        }
    }

    async fn render(&mut self, request: RenderRequest) {
        if request.surface() == Surface::Banner {
            // a pending fade belongs to the previous banner
            self.cancel_fade();
        }
        if let Err(e) = self.view.render(request).await {
            warn!(surface = ?request.surface(), error = %e, "failed to render consent UI");
        }
    }

    async fn remove(&self, surface: Surface) {
        if let Err(e) = self.view.destroy(surface).await {
            warn!(surface = ?surface, error = %e, "failed to remove consent UI");
        }
    }

    /// Starts the exit animation and removes the banner once it has played.
    /// The removal is detached; consent state is already final at this point.
    async fn dismiss_banner(&mut self) {
        if let Err(e) = self.view.begin_exit(Surface::Banner).await {
            warn!(error = %e, "failed to start banner exit animation");
        }

        let view = Arc::clone(&self.view);
        let fade_out = self.fade_out;
        self.cancel_fade();
        self.fade = Some(tokio::spawn(async move {
            tokio::time::sleep(fade_out).await;
            if let Err(e) = view.destroy(Surface::Banner).await {
                warn!(error = %e, "failed to remove consent banner");
            }
        }));
    }

    fn cancel_fade(&mut self) {
        if let Some(fade) = self.fade.take() {
            fade.abort();
        }
    }
}
