use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub mod analytics;
pub mod config;
pub mod error;

pub use analytics::{AnalyticsSink, ConsentUpdate, GtagState, MemoryAnalytics, NoopAnalytics, StorageGrant};
pub use config::{BannerCopy, ConsentConfig, SameSite};
pub use error::ConsentError;

/// The decision stored in the consent cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentValue {
    Accepted,
    Rejected,
}

impl ConsentValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentValue::Accepted => "accepted",
            ConsentValue::Rejected => "rejected",
        }
    }

    /// Maps the analytics toggle of the preferences modal onto a decision.
    pub fn from_analytics(enabled: bool) -> Self {
        if enabled {
            ConsentValue::Accepted
        } else {
            ConsentValue::Rejected
        }
    }

    pub fn allows_analytics(&self) -> bool {
        matches!(self, ConsentValue::Accepted)
    }
}

impl fmt::Display for ConsentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsentValue {
    type Err = ConsentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(ConsentValue::Accepted),
            "rejected" => Ok(ConsentValue::Rejected),
            other => Err(ConsentError::InvalidValue(other.to_string())),
        }
    }
}

/// Mirror of `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Anything past `loading` means DOMContentLoaded has fired.
    pub fn is_ready(&self) -> bool {
        !matches!(self, ReadyState::Loading)
    }
}

impl FromStr for ReadyState {
    type Err = ConsentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loading" => Ok(ReadyState::Loading),
            "interactive" => Ok(ReadyState::Interactive),
            "complete" => Ok(ReadyState::Complete),
            other => Err(ConsentError::Script(format!("unknown readyState: {}", other))),
        }
    }
}

/// The two UI surfaces a visitor can decide through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Banner,
    Preferences,
}

impl Surface {
    /// DOM id of the surface's root element.
    pub fn element_id(&self) -> &'static str {
        match self {
            Surface::Banner => "cookie-consent-banner",
            Surface::Preferences => "cookie-customize-modal",
        }
    }
}

/// What a view is asked to put on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRequest {
    Banner,
    /// `analytics` pre-checks the analytics toggle.
    Preferences { analytics: bool },
}

impl RenderRequest {
    pub fn surface(&self) -> Surface {
        match self {
            RenderRequest::Banner => Surface::Banner,
            RenderRequest::Preferences { .. } => Surface::Preferences,
        }
    }
}

/// Events emitted by a view when the visitor interacts with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    /// Banner "Accept All"
    Accept,
    /// Banner "Reject All"
    Reject,
    /// Banner "Customize", opens the preferences modal
    Customize,
    /// Modal "Save Preferences"
    Save,
    /// Modal "Cancel"
    Cancel,
    /// Click on the modal overlay
    OverlayDismiss,
    /// The global revocation hook was invoked
    Revoke,
}

/// The page hosting the banner: its cookie medium, readiness and reload.
#[async_trait]
pub trait Document: Send + Sync {
    /// Current value of `document.cookie`.
    async fn cookie(&self) -> Result<String, ConsentError>;

    /// Equivalent of assigning `document.cookie = directive`.
    async fn set_cookie(&self, directive: &str) -> Result<(), ConsentError>;

    async fn ready_state(&self) -> Result<ReadyState, ConsentError>;

    /// Resolves once the document has left the `loading` state.
    async fn wait_until_ready(&self) -> Result<(), ConsentError>;

    async fn reload(&self) -> Result<(), ConsentError>;
}

#[async_trait]
impl<D: Document + ?Sized> Document for Arc<D> {
    async fn cookie(&self) -> Result<String, ConsentError> {
        (**self).cookie().await
    }

    async fn set_cookie(&self, directive: &str) -> Result<(), ConsentError> {
        (**self).set_cookie(directive).await
    }

    async fn ready_state(&self) -> Result<ReadyState, ConsentError> {
        (**self).ready_state().await
    }

    async fn wait_until_ready(&self) -> Result<(), ConsentError> {
        (**self).wait_until_ready().await
    }

    async fn reload(&self) -> Result<(), ConsentError> {
        (**self).reload().await
    }
}

/// Persisted consent decision.
///
/// Implementations never surface medium failures: a failed read is "no
/// decision yet" and a failed write is logged and dropped.
#[async_trait]
pub trait ConsentStore: Send + Sync {
    /// Absent and malformed records both read as `None`.
    async fn read(&self) -> Option<ConsentValue>;

    /// Fully overwrites the record.
    async fn write(&self, value: ConsentValue);

    /// Expires the record and reloads the consuming page.
    async fn revoke(&self);
}

/// Presentation layer for the banner and the preferences modal.
#[async_trait]
pub trait View: Send + Sync {
    /// Shows a surface, replacing any previous instance of it.
    async fn render(&self, request: RenderRequest) -> Result<(), ConsentError>;

    /// Routes visitor interaction into `events`.
    async fn bind(&self, events: UnboundedSender<UiEvent>) -> Result<(), ConsentError>;

    /// Starts the exit animation. Removal happens through `destroy`.
    async fn begin_exit(&self, _surface: Surface) -> Result<(), ConsentError> {
        Ok(())
    }

    /// Removes a surface. Removing an absent surface is not an error.
    async fn destroy(&self, surface: Surface) -> Result<(), ConsentError>;

    /// State of the analytics checkbox in the preferences modal.
    async fn analytics_checked(&self) -> Result<bool, ConsentError>;
}
