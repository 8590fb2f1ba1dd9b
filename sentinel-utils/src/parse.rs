/// Parse a channel reference: either a raw id or a `<#id>` mention.
pub fn parse_channel_id(raw: &str) -> Option<u64> {
    let input = raw.trim();

    if let Ok(id) = input.parse::<u64>() {
        return Some(id);
    }

    if input.starts_with("<#") && input.ends_with('>') {
        return input
            .trim_start_matches("<#")
            .trim_end_matches('>')
            .parse::<u64>()
            .ok();
    }

    None
}

/// Parse an on/off toggle argument. Returns `None` for anything else.
pub fn parse_toggle(raw: &str) -> Option<bool> {
    let input = raw.trim();

    if input.eq_ignore_ascii_case("on") {
        Some(true)
    } else if input.eq_ignore_ascii_case("off") {
        Some(false)
    } else {
        None
    }
}
