/// Name of the CDP runtime binding UI events travel through.
pub const BINDING_NAME: &str = "__consentEvent";

/// Replaces the surface `id` with `html` and forwards clicks on
/// `[data-consent-event]` elements to the binding as JSON.
pub const MOUNT_SURFACE: &str = r#"
(id, html, binding) => {
    const previous = document.getElementById(id);
    if (previous) previous.remove();

    const root = document.createElement('div');
    root.id = id;
    root.innerHTML = html;
    document.body.appendChild(root);

    root.querySelectorAll('[data-consent-event]').forEach(el => {
        el.addEventListener('click', () => {
            const send = window[binding];
            if (typeof send === 'function') {
                send(JSON.stringify({ event: el.dataset.consentEvent }));
            }
        });
    });
    return { success: true };
}
"#;

pub const BEGIN_EXIT: &str = r#"
(id, ms) => {
    const el = document.getElementById(id);
    if (!el) return { success: false, error: 'Element not found' };
    el.style.animation = 'slideDown ' + ms + 'ms ease-out';
    return { success: true };
}
"#;

pub const REMOVE_SURFACE: &str = r#"
(id) => {
    const el = document.getElementById(id);
    if (el) el.remove();
    return { success: true, removed: !!el };
}
"#;

pub const READ_CHECKBOX: &str = r#"
(id) => {
    const el = document.getElementById(id);
    return !!(el && el.checked);
}
"#;

/// Global zero-argument hook other pages call to withdraw consent.
pub const INSTALL_REVOKE_HOOK: &str = r#"
(binding) => {
    window.revokeCookieConsent = function() {
        const send = window[binding];
        if (typeof send === 'function') {
            send(JSON.stringify({ event: 'revoke' }));
        }
    };
}
"#;
