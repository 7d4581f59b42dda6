use async_trait::async_trait;
use chromiumoxide::page::Page;
use consent_core::{AnalyticsSink, ConsentConfig, ConsentUpdate};
use serde_json::json;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::shared::{js, to_consent_error};

/// Consent-mode calls into the page's `gtag`, plus the vendor opt-out flag.
pub struct PageAnalytics {
    page: Page,
    opt_out_flag: Option<String>,
    /// Probe result for the current document
    hook: Mutex<Option<bool>>,
}

impl PageAnalytics {
    pub fn new(page: Page, config: &ConsentConfig) -> Self {
        Self { page, opt_out_flag: config.opt_out_flag(), hook: Mutex::new(None) }
    }

    /// Whether the current document defines `gtag`. Probed once per document.
    pub async fn hook_present(&self) -> bool {
        let cached = *self.lock_hook();
        if let Some(present) = cached {
            return present;
        }

        let js = js::build_js_call(js::analytics::PROBE_GTAG, &[]);
        let present = match self.page.evaluate(js).await {
            Ok(result) => result.value().and_then(|v| v.as_bool()).unwrap_or(false),
            Err(e) => {
                warn!(error = %to_consent_error(e, "ProbeGtag"), "gtag probe failed, assuming absent");
                false
            }
        };
        debug!(hook_present = present, "probed analytics hook");
        *self.lock_hook() = Some(present);
        present
    }

    /// Forgets the probe result; the next call looks at the new document.
    pub fn invalidate(&self) {
        *self.lock_hook() = None;
    }

    pub fn opt_out_flag(&self) -> Option<&str> {
        self.opt_out_flag.as_deref()
    }

    fn lock_hook(&self) -> MutexGuard<'_, Option<bool>> {
        self.hook.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn consent_update(&self, update: ConsentUpdate) {
        let js = js::build_js_call(js::analytics::GTAG_CONSENT_UPDATE, &[json!(update)]);
        if let Err(e) = self.page.evaluate(js).await {
            warn!(error = %to_consent_error(e, "GtagConsent"), "consent update was not delivered");
        }
    }

    async fn set_opt_out(&self, opted_out: bool) {
        let Some(flag) = &self.opt_out_flag else {
            return;
        };
        let js = js::build_js_call(js::analytics::SET_OPT_OUT, &[json!(flag), json!(opted_out)]);
        if let Err(e) = self.page.evaluate(js).await {
            warn!(flag = %flag, error = %to_consent_error(e, "OptOut"), "failed to set opt-out flag");
        }
    }
}

#[async_trait]
impl AnalyticsSink for PageAnalytics {
    async fn enable(&self) {
        if !self.hook_present().await {
            debug!("analytics hook absent, enable is a no-op");
            return;
        }
        self.consent_update(ConsentUpdate::granted()).await;
        self.set_opt_out(false).await;
        info!("analytics enabled");
    }

    async fn disable(&self) {
        if self.hook_present().await {
            self.consent_update(ConsentUpdate::denied()).await;
        } else {
            debug!("analytics hook absent, setting opt-out flag only");
        }
        self.set_opt_out(true).await;
        info!("analytics disabled");
    }
}
