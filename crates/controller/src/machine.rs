//! Banner presenter state machine.

use consent_core::{ConsentValue, UiEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BannerState {
    /// No banner on screen
    #[default]
    Hidden,
    /// Banner waiting for a decision
    Shown,
    /// Preferences modal open on top of the banner
    Customizing,
}

/// Side effect the controller must carry out for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Persist the value, drive analytics, fade the banner out
    Decide(ConsentValue),
    /// Render preferences, pre-checked from the store
    OpenPreferences,
    /// Read the analytics toggle, then decide and close both surfaces
    SavePreferences,
    /// Close the modal without touching consent
    ClosePreferences,
    /// Expire the record and reload
    Revoke,
    Ignore,
}

/// Next state and effect for `event` arriving in `state`.
pub fn transition(state: BannerState, event: UiEvent) -> (BannerState, Step) {
    use BannerState::{Customizing, Hidden, Shown};

    match (state, event) {
        (_, UiEvent::Revoke) => (Hidden, Step::Revoke),
        (Shown, UiEvent::Accept) => (Hidden, Step::Decide(ConsentValue::Accepted)),
        (Shown, UiEvent::Reject) => (Hidden, Step::Decide(ConsentValue::Rejected)),
        (Shown, UiEvent::Customize) => (Customizing, Step::OpenPreferences),
        (Customizing, UiEvent::Save) => (Hidden, Step::SavePreferences),
        (Customizing, UiEvent::Cancel | UiEvent::OverlayDismiss) => (Shown, Step::ClosePreferences),
        // the overlay covers the banner while customizing, so banner clicks cannot apply
        (state, _) => (state, Step::Ignore),
    }
}
