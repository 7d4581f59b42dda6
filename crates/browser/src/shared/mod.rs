pub mod js;
pub mod errors;
pub mod config;

pub use config::TimeoutConfig;
pub use errors::{is_context_lost, to_consent_error};
