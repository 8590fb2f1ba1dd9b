use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::trustlist::embeds::{guild_only_message, usage_message};
use sentinel_core::{Context, Error};
use sentinel_database::impls::guild_config::{
    find_or_create_guild_config, set_suppress_clean_joins,
};
use sentinel_utils::parse::parse_toggle;
use sentinel_utils::permissions::has_guild_permission;

pub const META: CommandMeta = CommandMeta {
    name: "quietjoins",
    desc: "Suppress join-log output for users with a clean record.",
    category: "config",
    usage: "!quietjoins <on|off|status>",
};

#[poise::command(prefix_command, slash_command, category = "Config")]
pub async fn quietjoins(
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
            "Clean-record join logging is currently **{}**.",
            if config.suppress_clean_joins {
                "suppressed"
            } else {
                "shown"
            }
        ))
        .await?;
        return Ok(());
    }

    let Some(enabled) = parse_toggle(raw_state) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    set_suppress_clean_joins(&ctx.data().db, guild_id.get(), enabled).await?;
    ctx.say(format!(
        "Clean-record join logs are now **{}**.",
        if enabled { "suppressed" } else { "shown" }
    ))
    .await?;

    Ok(())
}
