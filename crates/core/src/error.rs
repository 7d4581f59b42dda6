use thiserror::Error;

/// Failures at the seams that touch a real medium (cookie jar, page, config file).
///
/// Consent-level operations swallow these after logging them; only session
/// launch and configuration loading hand them back to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsentError {
    /// Cookie storage could not be read or written
    #[error("cookie medium failed: {0}")]
    Medium(String),
    /// JavaScript evaluation in the page failed
    #[error("script evaluation failed: {0}")]
    Script(String),
    /// Browser launch or CDP transport errors
    #[error("browser error: {0}")]
    Browser(String),
    #[error("view error: {0}")]
    View(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("timed out: {0}")]
    Timeout(String),
    /// A stored value that is neither "accepted" nor "rejected"
    #[error("invalid consent value: {0:?}")]
    InvalidValue(String),
}

impl ConsentError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ConsentError::Timeout(_))
    }
}
