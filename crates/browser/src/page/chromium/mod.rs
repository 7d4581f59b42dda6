mod analytics;
mod bridge;
mod document;
mod session;
mod view;

pub use analytics::PageAnalytics;
pub use bridge::decode_event;
pub use document::PageDocument;
pub use session::{ConsentSession, SessionConfig};
pub use view::PageView;
