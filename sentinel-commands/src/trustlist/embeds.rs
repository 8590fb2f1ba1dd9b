use poise::serenity_prelude as serenity;

use sentinel_trustlist::model::TrustlistEntry;
use sentinel_utils::embed::level_embed_color;
use sentinel_utils::formatting::{level_display_name, sanitize_mentions, user_handle};

pub fn guild_only_message() -> &'static str {
    "This command can only be used in a server."
}

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

/// Build the record embed shown for lookups and join-traffic reports.
pub fn trustlist_record_embed(
    entry: &TrustlistEntry,
    display_name: Option<&str>,
    user_id: u64,
) -> serenity::CreateEmbed {
    let mut fields = Vec::new();
    fields.push(format!("**User :** <@{user_id}>"));
    fields.push(format!(
        "**Level :** {} ({})",
        level_display_name(entry.escalation_level),
        entry.escalation_level
    ));

    if !entry.escalation_note.is_empty() {
        fields.push(format!(
            "**Note :** {}",
            sanitize_mentions(&entry.escalation_note)
        ));
    }

    if let Some(entered_at) = entry.entered_at {
        fields.push(format!("**First entered :** <t:{entered_at}:f>"));
    }

    if let Some(last_updated) = entry.last_updated {
        fields.push(format!("**Last updated :** <t:{last_updated}:R>"));
    }

    serenity::CreateEmbed::new()
        .color(level_embed_color(entry.escalation_level))
        .title(format!(
            "Trustlist record: {}",
            user_handle(display_name, user_id)
        ))
        .description(fields.join("\n"))
}
