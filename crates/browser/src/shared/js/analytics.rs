pub const PROBE_GTAG: &str = r#"
() => typeof window.gtag === 'function'
"#;

pub const GTAG_CONSENT_UPDATE: &str = r#"
(update) => {
    if (typeof window.gtag !== 'function') return false;
    window.gtag('consent', 'update', update);
    return true;
}
"#;

pub const SET_OPT_OUT: &str = r#"
(flag, value) => {
    window[flag] = value;
    return window[flag] === value;
}
"#;
