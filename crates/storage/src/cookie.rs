use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use consent_core::{ConsentConfig, ConsentError, ConsentValue, SameSite};
use std::fmt;

const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// One `document.cookie = ...` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDirective {
    pub name: String,
    pub value: String,
    /// `None` is a session cookie
    pub expires: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub same_site: Option<SameSite>,
}

impl CookieDirective {
    /// The consent record as written after a decision.
    pub fn consent(config: &ConsentConfig, value: ConsentValue, now: DateTime<Utc>) -> Self {
        Self {
            name: config.cookie_name.clone(),
            value: value.as_str().to_string(),
            expires: Some(now + Duration::days(i64::from(config.expiry_days))),
            path: Some(config.path.clone()),
            same_site: Some(config.same_site),
        }
    }

    /// Empty record dated at the epoch; browsers drop it on assignment.
    pub fn expired(config: &ConsentConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            value: String::new(),
            expires: Some(DateTime::<Utc>::UNIX_EPOCH),
            path: Some(config.path.clone()),
            same_site: None,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    pub fn parse(raw: &str) -> Result<Self, ConsentError> {
        let mut parts = raw.split(';');
        let pair = parts.next().unwrap_or_default().trim();
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| ConsentError::Medium(format!("cookie directive without '=': {:?}", raw)))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ConsentError::Medium(format!("cookie directive without a name: {:?}", raw)));
        }

        let mut directive = Self {
            name: name.to_string(),
            value: value.trim().to_string(),
            expires: None,
            path: None,
            same_site: None,
        };

        for attr in parts {
            let (key, val) = match attr.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (attr.trim(), ""),
            };
            match key.to_ascii_lowercase().as_str() {
                "expires" => directive.expires = Some(parse_expires(val)?),
                "path" => directive.path = Some(val.to_string()),
                "samesite" => directive.same_site = SameSite::parse(val),
                // secure, domain, max-age and friends do not matter for a single-origin jar
                _ => {}
            }
        }

        Ok(directive)
    }
}

impl fmt::Display for CookieDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(expires) = self.expires {
            write!(f, "; expires={} GMT", expires.format(EXPIRES_FORMAT))?;
        }
        if let Some(path) = &self.path {
            write!(f, "; path={}", path)?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={}", same_site.as_str())?;
        }
        Ok(())
    }
}

fn parse_expires(raw: &str) -> Result<DateTime<Utc>, ConsentError> {
    let trimmed = raw
        .strip_suffix(" GMT")
        .or_else(|| raw.strip_suffix(" UTC"))
        .unwrap_or(raw);
    NaiveDateTime::parse_from_str(trimmed, EXPIRES_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| ConsentError::Medium(format!("bad expires attribute {:?}: {}", raw, e)))
}

/// Looks `name` up in a `document.cookie` string (`a=1; b=2`).
///
/// The value is everything after the first `=`. When a name repeats the
/// first occurrence wins, matching the browser's most-specific-path-first order.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}
