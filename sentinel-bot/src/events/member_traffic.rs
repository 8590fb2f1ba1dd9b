use poise::serenity_prelude as serenity;
use tracing::error;

use sentinel_commands::trustlist::adapters::ChannelNotifier;
use sentinel_commands::trustlist::workflow;
use sentinel_core::Data;
use sentinel_database::impls::guild_config::find_or_create_guild_config;

/// Check every joining member against the trustlist and post the record to
/// the guild's join-log channel.
///
/// With `quietjoins` enabled only flagged records are posted. Failures are
/// logged and absorbed; a broken lookup must never disturb event dispatch.
pub async fn handle_member_join(
    ctx: &serenity::Context,
    data: &Data,
    member: &serenity::Member,
) {
    let config = match find_or_create_guild_config(&data.db, member.guild_id.get()).await {
        Ok(config) => config,
        Err(source) => {
            error!(?source, "failed to load guild config for member join");
            return;
        }
    };

    let Some(channel_id) = config.join_log_channel else {
        return;
    };
    let Ok(channel_id) = u64::try_from(channel_id) else {
        return;
    };

    let actor = workflow::ResolvedActor {
        user_id: member.user.id.get(),
        is_bot: member.user.bot,
        manages_guild: false,
        display_name: member.display_name().to_owned(),
    };
    let notifier = ChannelNotifier {
        http: &ctx.http,
        channel_id: serenity::ChannelId::new(channel_id),
    };

    if let Err(source) = workflow::lookup(
        &data.trustlist,
        &notifier,
        Some(&actor),
        member.user.id.get(),
        config.suppress_clean_joins,
    )
    .await
    {
        error!(?source, "trustlist lookup for joining member failed");
    }
}
