use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::page::EventFrameNavigated;
use chromiumoxide::page::Page;
use consent_controller::{BannerState, ConsentController};
use consent_core::{ConsentConfig, ConsentError, Document, UiEvent};
use consent_storage::CookieConsentStore;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{PageAnalytics, PageDocument, PageView};
use crate::shared::{TimeoutConfig, to_consent_error};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub url: String,
    pub headless: bool,
    pub viewport: Option<(u32, u32)>,
    pub consent: ConsentConfig,
    pub timeouts: TimeoutConfig,
}

impl SessionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headless: true,
            viewport: None,
            consent: ConsentConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Some((width, height));
        self
    }

    pub fn with_consent(mut self, consent: ConsentConfig) -> Self {
        self.consent = consent;
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }
}

/// A Chromium page with the consent banner wired to a controller.
pub struct ConsentSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    controller: ConsentController,
    receiver: mpsc::UnboundedReceiver<UiEvent>,
    page_loads: mpsc::UnboundedReceiver<()>,
    navigation: Option<JoinHandle<()>>,
}

impl ConsentSession {
    pub async fn launch(config: SessionConfig) -> Result<Self, ConsentError> {
        config.consent.validate()?;

        let (browser, handler) = Self::launch_browser(&config).await?;
        info!(url = %config.url, "opening page");
        let page = browser.new_page(config.url.as_str()).await
            .map_err(|e| to_consent_error(e, "NewPage"))?;

        let document = PageDocument::new(page.clone(), config.timeouts.clone());
        // the vendor script must have run before probing for its hook
        document.wait_until_ready().await?;

        let analytics = Arc::new(PageAnalytics::new(page.clone(), &config.consent));
        if opt_out_unavailable(analytics.hook_present().await, &config.consent) {
            warn!("gtag found but no measurement id configured, rejecting cannot set the ga-disable flag");
        }

        let store = CookieConsentStore::new(document.clone(), config.consent.clone());
        let view = PageView::new(page.clone(), config.consent.clone());
        let (controller, receiver) = ConsentController::from_shared(
            Arc::new(store),
            analytics.clone(),
            Arc::new(view),
            Arc::new(document),
            &config.consent,
        );

        let (loads_tx, page_loads) = mpsc::unbounded_channel();
        let navigation = Self::watch_navigation(&page, analytics, loads_tx).await;

        Ok(Self { browser, handler, page, controller, receiver, page_loads, navigation })
    }

    /// Signals every main-frame navigation, so each new document gets bootstrapped.
    async fn watch_navigation(
        page: &Page,
        analytics: Arc<PageAnalytics>,
        loads: mpsc::UnboundedSender<()>,
    ) -> Option<JoinHandle<()>> {
        let mut navigations = match page.event_listener::<EventFrameNavigated>().await {
            Ok(navigations) => navigations,
            Err(e) => {
                warn!(error = %to_consent_error(e, "ListenNavigation"), "page loads will not re-run bootstrap");
                return None;
            }
        };

        Some(tokio::spawn(async move {
            while let Some(navigated) = navigations.next().await {
                if navigated.frame.parent_id.is_some() {
                    continue;
                }
                debug!(url = %navigated.frame.url, "main frame navigated");
                analytics.invalidate();
                if loads.send(()).is_err() {
                    break;
                }
            }
        }))
    }

    async fn launch_browser(config: &SessionConfig) -> Result<(Browser, JoinHandle<()>), ConsentError> {
        let temp_dir = std::env::temp_dir().join(format!("chromium-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&temp_dir)
            .map_err(|e| ConsentError::Browser(format!("Failed to create temp dir: {}", e)))?;

        let mut builder = ChromeConfig::builder()
            .headless_mode(if config.headless { HeadlessMode::True } else { HeadlessMode::False })
            .user_data_dir(temp_dir);
        if let Some((w, h)) = config.viewport {
            builder = builder.window_size(w, h);
        }

        let chrome_cfg = builder.build()
            .map_err(|e| ConsentError::Browser(format!("Config failed: {}", e)))?;

        let (browser, mut handler) = Browser::launch(chrome_cfg).await
            .map_err(|e| ConsentError::Browser(format!("Launch failed: {}", e)))?;

        let handle = tokio::spawn(async move { while handler.next().await.is_some() {} });
        Ok((browser, handle))
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn state(&self) -> BannerState {
        self.controller.state()
    }

    pub async fn bootstrap(&mut self) -> BannerState {
        self.controller.bootstrap().await
    }

    /// Handles page events until `shutdown` flips, then closes the browser.
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        let Self { mut browser, handler, mut controller, receiver, page_loads, navigation, .. } = self;

        controller.run_with_page_loads(receiver, page_loads, shutdown).await;

        if let Some(navigation) = navigation {
            navigation.abort();
        }
        if let Err(e) = browser.close().await {
            warn!(error = %e, "browser did not close cleanly");
        }
        handler.abort();
        info!("consent session closed");
    }
}

/// `gtag` is on the page but there is no `ga-disable-<id>` flag to set.
fn opt_out_unavailable(hook_present: bool, consent: &ConsentConfig) -> bool {
    hook_present && consent.opt_out_flag().is_none()
}
