use crate::ConsentError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Cross-site send policy of the consent cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    /// Attribute values are case-insensitive in cookie directives.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

/// User-visible text of the banner and the preferences modal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BannerCopy {
    pub title: String,
    pub message: String,
    pub privacy_link_text: String,
    pub accept_label: String,
    pub reject_label: String,
    pub customize_label: String,
    pub preferences_title: String,
    pub preferences_intro: String,
    pub essential_label: String,
    pub essential_note: String,
    pub essential_description: String,
    pub analytics_label: String,
    pub analytics_description: String,
    pub save_label: String,
    pub cancel_label: String,
}

impl Default for BannerCopy {
    fn default() -> Self {
        Self {
            title: "🍪 Cookie Consent".to_string(),
            message: "We use cookies to improve your experience and analyze website traffic. \
                      By clicking \"Accept\", you consent to our use of cookies."
                .to_string(),
            privacy_link_text: "Privacy Policy".to_string(),
            accept_label: "Accept All".to_string(),
            reject_label: "Reject All".to_string(),
            customize_label: "Customize".to_string(),
            preferences_title: "Cookie Preferences".to_string(),
            preferences_intro: "Choose which cookies you want to accept:".to_string(),
            essential_label: "Essential Cookies".to_string(),
            essential_note: "(Required)".to_string(),
            essential_description: "These cookies are necessary for the website to function \
                                    and cannot be disabled."
                .to_string(),
            analytics_label: "Analytics Cookies".to_string(),
            analytics_description: "These cookies help us understand how visitors interact \
                                    with our website by collecting and reporting information \
                                    anonymously."
                .to_string(),
            save_label: "Save Preferences".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsentConfig {
    /// Name of the consent cookie
    pub cookie_name: String,
    pub expiry_days: u32,
    pub path: String,
    pub same_site: SameSite,
    /// Vendor measurement id, e.g. `G-XXXXXXX`. Keys the opt-out flag.
    pub measurement_id: Option<String>,
    /// Banner slide-out before it is removed from the page
    pub fade_out_ms: u64,
    pub privacy_policy_url: String,
    pub copy: BannerCopy,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            cookie_name: "cookie_consent".to_string(),
            expiry_days: 365,
            path: "/".to_string(),
            same_site: SameSite::Lax,
            measurement_id: None,
            fade_out_ms: 300,
            privacy_policy_url: "privacy.html".to_string(),
            copy: BannerCopy::default(),
        }
    }
}

impl ConsentConfig {
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_measurement_id(mut self, id: impl Into<String>) -> Self {
        self.measurement_id = Some(id.into());
        self
    }

    pub fn with_fade_out(mut self, ms: u64) -> Self {
        self.fade_out_ms = ms;
        self
    }

    pub fn with_privacy_policy(mut self, url: impl Into<String>) -> Self {
        self.privacy_policy_url = url.into();
        self
    }

    pub fn with_copy(mut self, copy: BannerCopy) -> Self {
        self.copy = copy;
        self
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    /// Window property the vendor script checks before sending hits.
    pub fn opt_out_flag(&self) -> Option<String> {
        self.measurement_id
            .as_ref()
            .map(|id| format!("ga-disable-{}", id))
    }

    pub fn from_json(raw: &str) -> Result<Self, ConsentError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| ConsentError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConsentError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConsentError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<(), ConsentError> {
        if self.cookie_name.is_empty() {
            return Err(ConsentError::Config("cookie_name must not be empty".to_string()));
        }
        if self
            .cookie_name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '=' | ';' | ','))
        {
            return Err(ConsentError::Config(format!(
                "cookie_name {:?} contains characters not allowed in a cookie name",
                self.cookie_name
            )));
        }
        if self.expiry_days == 0 {
            return Err(ConsentError::Config("expiry_days must be at least 1".to_string()));
        }
        if !self.path.starts_with('/') {
            return Err(ConsentError::Config(format!("path {:?} must start with '/'", self.path)));
        }
        if let Some(id) = &self.measurement_id {
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(ConsentError::Config(format!("invalid measurement_id {:?}", id)));
            }
        }
        Ok(())
    }
}
