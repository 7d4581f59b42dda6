use async_trait::async_trait;
use chrono::Utc;
use consent_core::{ConsentConfig, ConsentStore, ConsentValue, Document};
use tracing::{debug, info, warn};

pub mod cookie;
pub mod memory;

pub use cookie::{CookieDirective, find_cookie};
pub use memory::MemoryDocument;

/// Consent record kept in a first-party cookie of `document`.
pub struct CookieConsentStore<D> {
    document: D,
    config: ConsentConfig,
}

impl<D: Document> CookieConsentStore<D> {
    pub fn new(document: D, config: ConsentConfig) -> Self {
        Self { document, config }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    async fn assign(&self, directive: CookieDirective) -> bool {
        match self.document.set_cookie(&directive.to_string()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(cookie = %self.config.cookie_name, error = %e, "failed to write consent cookie");
                false
            }
        }
    }
}

#[async_trait]
impl<D: Document> ConsentStore for CookieConsentStore<D> {
    async fn read(&self) -> Option<ConsentValue> {
        let header = match self.document.cookie().await {
            Ok(header) => header,
            Err(e) => {
                warn!(error = %e, "failed to read cookies, treating consent as absent");
                return None;
            }
        };

        let raw = find_cookie(&header, &self.config.cookie_name)?;
        match raw.parse::<ConsentValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                debug!(cookie = %self.config.cookie_name, raw, "malformed consent cookie ignored");
                None
            }
        }
    }

    async fn write(&self, value: ConsentValue) {
        let directive = CookieDirective::consent(&self.config, value, Utc::now());
        if self.assign(directive).await {
            info!(value = %value, "consent recorded");
        }
    }

    async fn revoke(&self) {
        if self.assign(CookieDirective::expired(&self.config)).await {
            info!(cookie = %self.config.cookie_name, "consent revoked");
        }
        if let Err(e) = self.document.reload().await {
            warn!(error = %e, "page reload after revoke failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store() -> (Arc<MemoryDocument>, CookieConsentStore<Arc<MemoryDocument>>) {
        let document = Arc::new(MemoryDocument::new());
        let store = CookieConsentStore::new(Arc::clone(&document), ConsentConfig::default());
        (document, store)
    }

    #[tokio::test]
    async fn fresh_document_has_no_consent() {
        let (_, store) = store();
        assert_eq!(store.read().await, None);
    }

    #[tokio::test]
    async fn write_then_read_returns_the_value() {
        let (_, store) = store();
        for value in [ConsentValue::Accepted, ConsentValue::Rejected] {
            store.write(value).await;
            assert_eq!(store.read().await, Some(value));
        }
    }

    #[tokio::test]
    async fn write_overwrites_instead_of_appending() {
        let (document, store) = store();
        store.write(ConsentValue::Accepted).await;
        store.write(ConsentValue::Rejected).await;

        assert_eq!(document.cookie_header(), "cookie_consent=rejected");
        assert_eq!(store.read().await, Some(ConsentValue::Rejected));
    }

    #[tokio::test]
    async fn written_cookie_carries_expected_attributes() {
        let (document, store) = store();
        store.write(ConsentValue::Accepted).await;

        let directive = document.stored("cookie_consent").unwrap();
        assert_eq!(directive.path.as_deref(), Some("/"));
        assert_eq!(directive.same_site, Some(consent_core::SameSite::Lax));
        let days = (directive.expires.unwrap() - Utc::now()).num_days();
        assert!((364..=365).contains(&days), "expiry {} days out", days);
    }

    #[tokio::test]
    async fn malformed_value_reads_as_absent() {
        let (document, store) = store();
        document.insert_raw("cookie_consent", "maybe");
        assert_eq!(store.read().await, None);

        document.insert_raw("cookie_consent", "");
        assert_eq!(store.read().await, None);
    }

    #[tokio::test]
    async fn other_cookies_do_not_interfere() {
        let (document, store) = store();
        document.insert_raw("theme", "dark");
        document.insert_raw("cookie_consent_v2", "accepted");
        assert_eq!(store.read().await, None);

        store.write(ConsentValue::Accepted).await;
        assert_eq!(store.read().await, Some(ConsentValue::Accepted));
    }

    #[tokio::test]
    async fn revoke_expires_record_and_reloads() {
        let (document, store) = store();
        store.write(ConsentValue::Accepted).await;

        store.revoke().await;
        assert_eq!(store.read().await, None);
        assert_eq!(document.reload_count(), 1);

        store.revoke().await;
        assert_eq!(store.read().await, None);
        assert_eq!(document.reload_count(), 2);
    }

    #[tokio::test]
    async fn unavailable_medium_is_swallowed() {
        let (document, store) = store();
        store.write(ConsentValue::Accepted).await;
        document.set_unavailable(true);

        assert_eq!(store.read().await, None);
        store.write(ConsentValue::Rejected).await;
        store.revoke().await;

        document.set_unavailable(false);
        assert_eq!(store.read().await, Some(ConsentValue::Accepted));
    }

    #[tokio::test]
    async fn custom_cookie_name_is_respected() {
        let document = Arc::new(MemoryDocument::new());
        let config = ConsentConfig::default().with_cookie_name("site_consent");
        let store = CookieConsentStore::new(Arc::clone(&document), config);

        store.write(ConsentValue::Rejected).await;
        assert!(document.stored("site_consent").is_some());
        assert!(document.stored("cookie_consent").is_none());
    }
}
