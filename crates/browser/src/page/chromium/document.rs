use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::ReloadParams;
use chromiumoxide::page::Page;
use consent_core::{ConsentError, Document, ReadyState};
use serde_json::json;
use std::time::Instant;
use tokio::time::sleep;
use tracing::debug;

use crate::shared::{TimeoutConfig, is_context_lost, js, to_consent_error};

/// `document` of a live Chromium page.
#[derive(Clone)]
pub struct PageDocument {
    page: Page,
    timeouts: TimeoutConfig,
}

impl PageDocument {
    pub fn new(page: Page, timeouts: TimeoutConfig) -> Self {
        Self { page, timeouts }
    }

    async fn ready_state_raw(&self) -> Result<ReadyState, ConsentError> {
        let js = js::build_js_call(js::wait::CHECK_READY, &[]);
        let result = self.page.evaluate(js).await
            .map_err(|e| to_consent_error(e, "ReadyState"))?;
        result
            .value()
            .and_then(|v| v.as_str())
            .ok_or_else(|| ConsentError::Script("readyState was not a string".to_string()))?
            .parse()
    }
}

#[async_trait]
impl Document for PageDocument {
    async fn cookie(&self) -> Result<String, ConsentError> {
        let js = js::build_js_call(js::cookie::READ_COOKIE, &[]);
        let result = self.page.evaluate(js).await
            .map_err(|e| to_consent_error(e, "ReadCookie"))?;
        Ok(result.value().and_then(|v| v.as_str()).unwrap_or_default().to_string())
    }

    async fn set_cookie(&self, directive: &str) -> Result<(), ConsentError> {
        let js = js::build_js_call(js::cookie::WRITE_COOKIE, &[json!(directive)]);
        self.page.evaluate(js).await
            .map_err(|e| to_consent_error(e, "WriteCookie"))?;
        Ok(())
    }

    async fn ready_state(&self) -> Result<ReadyState, ConsentError> {
        self.ready_state_raw().await
    }

    async fn wait_until_ready(&self) -> Result<(), ConsentError> {
        let start = Instant::now();

        loop {
            match self.ready_state_raw().await {
                Ok(state) if state.is_ready() => {
                    debug!(?state, elapsed_ms = start.elapsed().as_millis() as u64, "document ready");
                    return Ok(());
                }
                Ok(_) => {}
                // page is navigating, poll again
                Err(e) if is_context_lost(&e) => {}
                Err(e) => return Err(e),
            }

            if start.elapsed() > self.timeouts.ready_wait {
                return Err(ConsentError::Timeout(format!(
                    "document not ready after {}ms",
                    self.timeouts.ready_wait.as_millis()
                )));
            }
            sleep(self.timeouts.check_interval).await;
        }
    }

    async fn reload(&self) -> Result<(), ConsentError> {
        self.page.execute(ReloadParams::default()).await
            .map_err(|e| to_consent_error(e, "Reload"))?;
        tokio::time::timeout(self.timeouts.navigation, self.page.wait_for_navigation())
            .await
            .map_err(|_| ConsentError::Timeout("reload did not finish navigating".to_string()))?
            .map_err(|e| to_consent_error(e, "Reload"))?;
        Ok(())
    }
}
