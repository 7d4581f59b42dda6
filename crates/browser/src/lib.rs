pub mod markup;
pub mod page;
pub mod shared;

pub use page::chromium::{ConsentSession, PageAnalytics, PageDocument, PageView, SessionConfig};
pub use shared::TimeoutConfig;
