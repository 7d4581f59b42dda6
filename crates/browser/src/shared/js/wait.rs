pub const CHECK_READY: &str = r#"
() => document.readyState
"#;
