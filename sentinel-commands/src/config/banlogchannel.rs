use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::trustlist::embeds::guild_only_message;
use sentinel_core::{Context, Error};
use sentinel_database::impls::guild_config::{find_or_create_guild_config, set_ban_log_channel};
use sentinel_utils::parse::parse_channel_id;
use sentinel_utils::permissions::has_guild_permission;

pub const META: CommandMeta = CommandMeta {
    name: "banlogchannel",
    desc: "Set or view the channel where bans are logged.",
    category: "config",
    usage: "!banlogchannel [#channel|channel_id|clear]",
};

#[poise::command(prefix_command, slash_command, category = "Config")]
pub async fn banlogchannel(
    ctx: Context<'_>,
    #[description = "Channel mention/id, or 'clear'"]
    #[rest]
    input: Option<String>,
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

    if let Some(input) = input
        .as_deref()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
    {
        if input.eq_ignore_ascii_case("clear") {
            set_ban_log_channel(&ctx.data().db, guild_id.get(), None).await?;
            ctx.say("Ban log channel cleared.").await?;
            return Ok(());
        }

        if let Some(channel_id) = parse_channel_id(input) {
            set_ban_log_channel(&ctx.data().db, guild_id.get(), Some(channel_id)).await?;
            ctx.say(format!("Ban log channel set to <#{channel_id}>."))
                .await?;
            return Ok(());
        }

        ctx.say("Provide a valid channel mention/id, or `clear`.")
            .await?;
        return Ok(());
    }

    let config = find_or_create_guild_config(&ctx.data().db, guild_id.get()).await?;
    if let Some(channel_id) = config.ban_log_channel {
        ctx.say(format!("Current ban log channel: <#{channel_id}>"))
            .await?;
    } else {
        ctx.say("No ban log channel configured.").await?;
    }

    Ok(())
}
