use consent_core::ConsentError;

pub fn to_consent_error(e: impl std::fmt::Display, action: &str) -> ConsentError {
    let s = e.to_string();
    if s.contains("timeout") || s.contains("Timeout") {
        ConsentError::Timeout(format!("{} timed out: {}", action, s))
    } else if s.contains("Cannot find context") || s.contains("Execution context was destroyed") {
        ConsentError::Script(format!("{} lost its page context: {}", action, s))
    } else if s.contains("Uncaught") || s.contains("ReferenceError") || s.contains("TypeError") {
        ConsentError::Script(format!("{} threw: {}", action, s))
    } else {
        ConsentError::Browser(format!("{} failed: {}", action, s))
    }
}

/// Navigation races make these transient; callers poll again instead of failing.
pub fn is_context_lost(e: &impl std::fmt::Display) -> bool {
    let s = e.to_string();
    s.contains("Cannot find context") || s.contains("Execution context was destroyed")
}
