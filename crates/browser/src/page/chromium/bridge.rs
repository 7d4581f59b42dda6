use consent_core::{ConsentError, UiEvent};

/// Decodes a payload sent through the event binding, e.g. `{"event":"accept"}`.
pub fn decode_event(payload: &str) -> Result<UiEvent, ConsentError> {
    serde_json::from_str(payload)
        .map_err(|e| ConsentError::View(format!("bad binding payload {:?}: {}", payload, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_markup_event() {
        for (raw, expected) in [
            ("accept", UiEvent::Accept),
            ("reject", UiEvent::Reject),
            ("customize", UiEvent::Customize),
            ("save", UiEvent::Save),
            ("cancel", UiEvent::Cancel),
            ("overlay_dismiss", UiEvent::OverlayDismiss),
            ("revoke", UiEvent::Revoke),
        ] {
            let payload = format!(r#"{{"event":"{}"}}"#, raw);
            assert_eq!(decode_event(&payload).unwrap(), expected);
        }
    }

    #[test]
    fn rejects_unknown_payloads() {
        assert!(decode_event(r#"{"event":"subscribe"}"#).is_err());
        assert!(decode_event("accept").is_err());
    }
}
