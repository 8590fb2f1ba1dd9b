use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::trustlist::adapters::{
    CommandNotifier, DiscordModerationSink, GuildTokenProvider, resolve_actor,
};
use crate::trustlist::embeds::{guild_only_message, usage_message};
use crate::trustlist::workflow;
use sentinel_core::{Context, Error};
use sentinel_utils::permissions::has_guild_permission;

pub const META: CommandMeta = CommandMeta {
    name: "insert",
    desc: "Insert a user into the trustlist, or escalate their record.",
    category: "trustlist",
    usage: "!insert <user> <level 0-3> <reason>",
};

#[poise::command(prefix_command, slash_command, category = "Trustlist")]
pub async fn insert(
    ctx: Context<'_>,
    #[description = "The user to insert"] user: Option<serenity::User>,
    #[description = "Escalation level (0-3)"]
    #[min = 0]
    #[max = 3]
    level: Option<u8>,
    #[description = "Reason for the record"]
    #[rest]
    note: Option<String>,
) -> Result<(), Error> {
    submit_insertion(ctx, user, level, note, false, META.usage).await
}

/// Shared entry point for `insert` and `ban`: gates, argument checks, then
/// the escalation workflow with the Discord-bound collaborators.
pub(crate) async fn submit_insertion(
    ctx: Context<'_>,
    user: Option<serenity::User>,
    level: Option<u8>,
    note: Option<String>,
    force_ban: bool,
    usage: &str,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_guild_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::BAN_MEMBERS,
    )
    .await?
    {
        return Ok(());
    }

    let (Some(user), Some(level), Some(note)) = (user, level, note) else {
        ctx.say(usage_message(usage)).await?;
        return Ok(());
    };

    // The workflow trusts its level input; the domain is enforced here,
    // where prefix invocations bypass the slash-argument bounds.
    if level > workflow::BLACKLIST_LEVEL {
        ctx.say("Escalation level must be between 0 and 3.").await?;
        return Ok(());
    }

    // A target who already left the guild stays unresolved and is handled
    // by the workflow's departed-user path.
    let actor = match guild_id.member(ctx.http(), user.id).await {
        Ok(member) => Some(resolve_actor(ctx.http(), guild_id, &member).await?),
        Err(_) => None,
    };

    let token_provider = GuildTokenProvider {
        db: &ctx.data().db,
        auth: &ctx.data().auth,
    };
    let moderation = DiscordModerationSink {
        http: ctx.http(),
        guild_id,
    };
    let notifier = CommandNotifier { ctx };

    let collab = workflow::Collaborators {
        trustlist: &ctx.data().trustlist,
        auth: &token_provider,
        config: &ctx.data().db,
        moderation: &moderation,
        notifier: &notifier,
    };

    let request = workflow::InsertRequest {
        guild_id: guild_id.get(),
        invoker_id: ctx.author().id.get(),
        target_id: user.id.get(),
        level,
        note: &note,
        force_ban,
    };

    workflow::insert_or_escalate(&collab, actor.as_ref(), &request).await?;

    Ok(())
}
