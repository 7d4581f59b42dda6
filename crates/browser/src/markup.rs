//! HTML for the banner and the preferences modal.
//!
//! Ids and classes form the contract with the site stylesheet. Every
//! actionable element carries `data-consent-event`, which the mount script
//! wires to the event binding.

use consent_core::ConsentConfig;
use html_escape::{encode_double_quoted_attribute, encode_text};

pub const ANALYTICS_CHECKBOX_ID: &str = "cookie-analytics";

pub fn banner(config: &ConsentConfig) -> String {
    let copy = &config.copy;
    format!(
        r#"<div class="cookie-consent-content">
    <div class="cookie-consent-text">
        <strong>{title}</strong>
        <p>{message} <a href="{privacy}" target="_blank" rel="noopener">{privacy_text}</a></p>
    </div>
    <div class="cookie-consent-buttons">
        <button id="cookie-accept" class="cookie-btn cookie-btn-accept" data-consent-event="accept">{accept}</button>
        <button id="cookie-reject" class="cookie-btn cookie-btn-reject" data-consent-event="reject">{reject}</button>
        <button id="cookie-customize" class="cookie-btn cookie-btn-customize" data-consent-event="customize">{customize}</button>
    </div>
</div>"#,
        title = encode_text(&copy.title),
        message = encode_text(&copy.message),
        privacy = encode_double_quoted_attribute(&config.privacy_policy_url),
        privacy_text = encode_text(&copy.privacy_link_text),
        accept = encode_text(&copy.accept_label),
        reject = encode_text(&copy.reject_label),
        customize = encode_text(&copy.customize_label),
    )
}

/// `analytics` pre-checks the analytics toggle.
pub fn preferences(config: &ConsentConfig, analytics: bool) -> String {
    let copy = &config.copy;
    format!(
        r#"<div class="cookie-modal-overlay" data-consent-event="overlay_dismiss"></div>
<div class="cookie-modal-content">
    <h3>{title}</h3>
    <p>{intro}</p>
    <div class="cookie-option">
        <div class="cookie-option-header">
            <label>
                <input type="checkbox" id="cookie-essential" checked disabled>
                <strong>{essential}</strong> {essential_note}
            </label>
        </div>
        <p class="cookie-option-description">{essential_description}</p>
    </div>
    <div class="cookie-option">
        <div class="cookie-option-header">
            <label>
                <input type="checkbox" id="{analytics_id}"{checked}>
                <strong>{analytics_label}</strong>
            </label>
        </div>
        <p class="cookie-option-description">{analytics_description}</p>
    </div>
    <div class="cookie-modal-buttons">
        <button id="cookie-save-preferences" class="cookie-btn cookie-btn-accept" data-consent-event="save">{save}</button>
        <button id="cookie-cancel" class="cookie-btn cookie-btn-reject" data-consent-event="cancel">{cancel}</button>
    </div>
</div>"#,
        title = encode_text(&copy.preferences_title),
        intro = encode_text(&copy.preferences_intro),
        essential = encode_text(&copy.essential_label),
        essential_note = encode_text(&copy.essential_note),
        essential_description = encode_text(&copy.essential_description),
        analytics_id = ANALYTICS_CHECKBOX_ID,
        checked = if analytics { " checked" } else { "" },
        analytics_label = encode_text(&copy.analytics_label),
        analytics_description = encode_text(&copy.analytics_description),
        save = encode_text(&copy.save_label),
        cancel = encode_text(&copy.cancel_label),
    )
}
