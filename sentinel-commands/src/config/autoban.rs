use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::trustlist::embeds::{guild_only_message, usage_message};
use sentinel_core::{Context, Error};
use sentinel_database::impls::guild_config::{find_or_create_guild_config, set_auto_ban};
use sentinel_utils::parse::parse_toggle;
use sentinel_utils::permissions::has_guild_permission;

pub const META: CommandMeta = CommandMeta {
    name: "autoban",
    desc: "Enable or disable auto-banning blacklisted users.",
    category: "config",
    usage: "!autoban <on|off|status>",
};

#[poise::command(prefix_command, slash_command, category = "Config")]
pub async fn autoban(
    ctx: Context<'_>,
    #[description = "Desired state: on, off, or status"] state: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_guild_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_GUILD,
    )
    .await?
    {
        return Ok(());
    }

    let Some(raw_state) = state.as_deref().map(str::trim) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if raw_state.eq_ignore_ascii_case("status") {
        let config = find_or_create_guild_config(&ctx.data().db, guild_id.get()).await?;
        ctx.say(format!(
            "Auto-ban for blacklisted users is currently **{}**.",
            if config.auto_ban_blacklisted {
                "enabled"
            } else {
                "disabled"
            }
        ))
        .await?;
        return Ok(());
    }

    let Some(enabled) = parse_toggle(raw_state) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    set_auto_ban(&ctx.data().db, guild_id.get(), enabled).await?;
    ctx.say(format!(
        "Auto-ban for blacklisted users is now **{}**.",
        if enabled { "enabled" } else { "disabled" }
    ))
    .await?;

    Ok(())
}
