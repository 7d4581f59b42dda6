use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::js_protocol::runtime::{AddBindingParams, EventBindingCalled};
use chromiumoxide::page::Page;
use consent_core::{ConsentConfig, ConsentError, RenderRequest, Surface, UiEvent, View};
use futures::StreamExt;
use serde_json::{Value, json};
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::bridge::decode_event;
use crate::markup;
use crate::shared::{js, to_consent_error};

/// Banner and modal injected into a live Chromium page.
pub struct PageView {
    page: Page,
    config: ConsentConfig,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl PageView {
    pub fn new(page: Page, config: ConsentConfig) -> Self {
        Self { page, config, listener: Mutex::new(None) }
    }

    async fn call(&self, func: &str, args: &[Value], action: &str) -> Result<Value, ConsentError> {
        let js = js::build_js_call(func, args);
        let result = self.page.evaluate(js).await
            .map_err(|e| to_consent_error(e, action))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    fn replace_listener(&self, handle: JoinHandle<()>) {
        let mut slot = self.listener.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }
}

impl Drop for PageView {
    fn drop(&mut self) {
        let slot = self.listener.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl View for PageView {
    async fn render(&self, request: RenderRequest) -> Result<(), ConsentError> {
        let html = match request {
            RenderRequest::Banner => markup::banner(&self.config),
            RenderRequest::Preferences { analytics } => markup::preferences(&self.config, analytics),
        };
        let id = request.surface().element_id();
        self.call(
            js::banner::MOUNT_SURFACE,
            &[json!(id), json!(html), json!(js::banner::BINDING_NAME)],
            "Mount",
        )
        .await?;
        debug!(surface = id, "mounted");
        Ok(())
    }

    async fn bind(&self, events: UnboundedSender<UiEvent>) -> Result<(), ConsentError> {
        // bindings and new-document scripts survive reloads, so this runs once per page
        self.page.execute(AddBindingParams::new(js::banner::BINDING_NAME)).await
            .map_err(|e| to_consent_error(e, "AddBinding"))?;

        let hook = js::build_js_call(js::banner::INSTALL_REVOKE_HOOK, &[json!(js::banner::BINDING_NAME)]);
        self.page
            .evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(hook.clone()))
            .await
            .map_err(|e| to_consent_error(e, "InstallRevokeHook"))?;
        self.page.evaluate(hook).await
            .map_err(|e| to_consent_error(e, "InstallRevokeHook"))?;

        let mut calls = self.page.event_listener::<EventBindingCalled>().await
            .map_err(|e| to_consent_error(e, "ListenBinding"))?;

        let handle = tokio::spawn(async move {
            while let Some(called) = calls.next().await {
                if called.name != js::banner::BINDING_NAME {
                    continue;
                }
                match decode_event(&called.payload) {
                    Ok(event) => {
                        debug!(?event, "ui event from page");
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "dropping malformed ui event"),
                }
            }
        });
        self.replace_listener(handle);
        Ok(())
    }

    async fn begin_exit(&self, surface: Surface) -> Result<(), ConsentError> {
        self.call(
            js::banner::BEGIN_EXIT,
            &[json!(surface.element_id()), json!(self.config.fade_out_ms)],
            "BeginExit",
        )
        .await?;
        Ok(())
    }

    async fn destroy(&self, surface: Surface) -> Result<(), ConsentError> {
        self.call(js::banner::REMOVE_SURFACE, &[json!(surface.element_id())], "Remove")
            .await?;
        Ok(())
    }

    async fn analytics_checked(&self) -> Result<bool, ConsentError> {
        let value = self
            .call(js::banner::READ_CHECKBOX, &[json!(markup::ANALYTICS_CHECKBOX_ID)], "ReadToggle")
            .await?;
        value
            .as_bool()
            .ok_or_else(|| ConsentError::View(format!("toggle read returned {}", value)))
    }
}
