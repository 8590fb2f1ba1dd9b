/// Convert an escalation level to its user-facing name.
pub fn level_display_name(level: u8) -> &'static str {
    match level {
        0 => "Clean",
        1 => "Suspicious",
        2 => "Untrusted",
        3 => "Blacklisted",
        _ => "Unknown",
    }
}

/// Neutralize user/role mentions in free text before echoing it back into a
/// channel. Inserts a zero-width space after every `@`.
pub fn sanitize_mentions(text: &str) -> String {
    text.replace('@', "@\u{200B}")
}

/// Render a user handle for plain-text messages: the display name when one
/// is known, the raw id otherwise.
pub fn user_handle(display_name: Option<&str>, user_id: u64) -> String {
    match display_name {
        Some(name) if !name.trim().is_empty() => name.to_owned(),
        _ => user_id.to_string(),
    }
}
