use crate::cookie::CookieDirective;
use async_trait::async_trait;
use chrono::Utc;
use consent_core::{ConsentError, Document, ReadyState};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

#[derive(Debug, Default)]
struct Jar {
    cookies: Vec<CookieDirective>,
    reloads: u32,
    unavailable: bool,
}

/// A single-origin document kept in memory.
///
/// Cookie assignment follows browser rules closely enough for consent
/// handling: a directive replaces the cookie with the same name and path,
/// and expired cookies vanish.
#[derive(Debug)]
pub struct MemoryDocument {
    jar: Mutex<Jar>,
    ready: watch::Sender<ReadyState>,
}

impl MemoryDocument {
    /// A document that has finished loading.
    pub fn new() -> Self {
        Self::with_ready_state(ReadyState::Complete)
    }

    /// A document still parsing; call [`MemoryDocument::set_ready_state`] to fire readiness.
    pub fn loading() -> Self {
        Self::with_ready_state(ReadyState::Loading)
    }

    fn with_ready_state(state: ReadyState) -> Self {
        let (ready, _) = watch::channel(state);
        Self { jar: Mutex::new(Jar::default()), ready }
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        self.ready.send_replace(state);
    }

    /// Makes every medium operation fail, like a detached page would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Seeds a cookie verbatim, bypassing directive parsing.
    pub fn insert_raw(&self, name: &str, value: &str) {
        let mut jar = self.lock();
        jar.cookies.retain(|c| c.name != name);
        jar.cookies.push(CookieDirective {
            name: name.to_string(),
            value: value.to_string(),
            expires: None,
            path: Some("/".to_string()),
            same_site: None,
        });
    }

    /// The stored cookie named `name`, unless it has expired.
    pub fn stored(&self, name: &str) -> Option<CookieDirective> {
        let now = Utc::now();
        self.lock()
            .cookies
            .iter()
            .find(|c| c.name == name && !c.is_expired_at(now))
            .cloned()
    }

    /// What `document.cookie` would return right now.
    pub fn cookie_header(&self) -> String {
        let now = Utc::now();
        let mut jar = self.lock();
        jar.cookies.retain(|c| !c.is_expired_at(now));
        jar.cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn reload_count(&self) -> u32 {
        self.lock().reloads
    }

    fn lock(&self) -> MutexGuard<'_, Jar> {
        self.jar.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_available(&self) -> Result<(), ConsentError> {
        if self.lock().unavailable {
            return Err(ConsentError::Medium("document is unavailable".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Document for MemoryDocument {
    async fn cookie(&self) -> Result<String, ConsentError> {
        self.check_available()?;
        Ok(self.cookie_header())
    }

    async fn set_cookie(&self, directive: &str) -> Result<(), ConsentError> {
        self.check_available()?;
        let directive = CookieDirective::parse(directive)?;
        let now = Utc::now();

        let mut jar = self.lock();
        jar.cookies
            .retain(|c| !(c.name == directive.name && c.path == directive.path));
        if !directive.is_expired_at(now) {
            jar.cookies.push(directive);
        }
        Ok(())
    }

    async fn ready_state(&self) -> Result<ReadyState, ConsentError> {
        self.check_available()?;
        Ok(*self.ready.borrow())
    }

    async fn wait_until_ready(&self) -> Result<(), ConsentError> {
        let mut rx = self.ready.subscribe();
        rx.wait_for(|state| state.is_ready())
            .await
            .map(|_| ())
            .map_err(|e| ConsentError::Medium(format!("readiness channel closed: {}", e)))
    }

    async fn reload(&self) -> Result<(), ConsentError> {
        self.check_available()?;
        self.lock().reloads += 1;
        Ok(())
    }
}
