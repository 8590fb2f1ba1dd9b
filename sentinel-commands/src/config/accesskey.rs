use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::trustlist::embeds::{guild_only_message, usage_message};
use sentinel_core::{Context, Error};
use sentinel_database::impls::guild_config::{find_or_create_guild_config, set_api_credentials};
use sentinel_utils::permissions::has_guild_permission;

pub const META: CommandMeta = CommandMeta {
    name: "accesskey",
    desc: "Link this server to the trustlist API with an access key.",
    category: "config",
    usage: "!accesskey <login> <password>",
};

#[poise::command(prefix_command, slash_command, category = "Config")]
pub async fn accesskey(
    ctx: Context<'_>,
    #[description = "API login"] login: Option<String>,
    #[description = "API password"] password: Option<String>,
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

    match (login.as_deref().map(str::trim), password.as_deref().map(str::trim)) {
        (Some(login), Some(password)) if !login.is_empty() && !password.is_empty() => {
            set_api_credentials(&ctx.data().db, guild_id.get(), login, password).await?;

            // Never echo the credentials back into the channel.
            ctx.send(
                poise::CreateReply::default()
                    .ephemeral(true)
                    .content("API credentials saved for this server."),
            )
            .await?;
        }
        (None, None) => {
            let config = find_or_create_guild_config(&ctx.data().db, guild_id.get()).await?;
            let status = if config.has_api_credentials() {
                "set"
            } else {
                "not set"
            };
            ctx.say(format!(
                "API credentials are currently **{status}** for this server."
            ))
            .await?;
        }
        _ => {
            ctx.say(usage_message(META.usage)).await?;
        }
    }

    Ok(())
}
