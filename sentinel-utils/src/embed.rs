/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x2E_6F_8E;

/// Embed color for a trustlist record, keyed by escalation level.
///
/// Level 0 renders green (clean), climbing through yellow and orange to
/// red at the blacklist level. Out-of-domain levels fall back to the
/// default color so a malformed remote record still renders.
pub fn level_embed_color(level: u8) -> u32 {
    match level {
        0 => 0x3B_A5_5D,
        1 => 0xD4_A7_2B,
        2 => 0xDB_76_2B,
        3 => 0xC4_2B_2B,
        _ => DEFAULT_EMBED_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_EMBED_COLOR, level_embed_color};

    #[test]
    fn level_colors_cover_the_domain() {
        let colors: Vec<u32> = (0u8..=3).map(level_embed_color).collect();
        for (idx, color) in colors.iter().enumerate() {
            assert_ne!(*color, 0, "level {idx} has no color");
        }
        // All four levels must be visually distinct.
        let mut unique = colors.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), colors.len());
    }

    #[test]
    fn out_of_domain_levels_use_default() {
        assert_eq!(level_embed_color(4), DEFAULT_EMBED_COLOR);
        assert_eq!(level_embed_color(255), DEFAULT_EMBED_COLOR);
    }
}
