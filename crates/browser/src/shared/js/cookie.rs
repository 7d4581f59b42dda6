pub const READ_COOKIE: &str = r#"
() => document.cookie
"#;

pub const WRITE_COOKIE: &str = r#"
(directive) => {
    document.cookie = directive;
    return true;
}
"#;
