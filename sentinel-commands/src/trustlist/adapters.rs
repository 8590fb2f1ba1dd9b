//! Production bindings of the workflow's collaborator traits.

use anyhow::Context as _;
use poise::serenity_prelude as serenity;

use sentinel_core::Context;
use sentinel_database::Database;
use sentinel_database::impls::guild_config::find_or_create_guild_config;
use sentinel_database::model::guild_config::GuildConfig;
use sentinel_trustlist::model::TrustlistEntry;
use sentinel_trustlist::{AuthService, TrustlistService};
use sentinel_utils::permissions::has_guild_permission;

use crate::trustlist::embeds::trustlist_record_embed;
use crate::trustlist::workflow::{
    ConfigSource, ModerationSink, Notifier, ResolvedActor, TokenProvider, TrustlistStore,
};

impl TrustlistStore for TrustlistService {
    async fn lookup(&self, user_id: u64) -> anyhow::Result<TrustlistEntry> {
        self.lookup_user(user_id).await
    }

    async fn insert_or_escalate(
        &self,
        record: &TrustlistEntry,
        token: &str,
    ) -> anyhow::Result<()> {
        self.insert_or_escalate_user(record, token).await
    }
}

impl ConfigSource for Database {
    async fn find_or_create(&self, guild_id: u64) -> anyhow::Result<GuildConfig> {
        find_or_create_guild_config(self, guild_id).await
    }
}

/// Token provider bound to the guild's stored credentials.
pub struct GuildTokenProvider<'a> {
    pub db: &'a Database,
    pub auth: &'a AuthService,
}

impl TokenProvider for GuildTokenProvider<'_> {
    async fn get_or_refresh_token(&self, guild_id: u64) -> anyhow::Result<String> {
        let config = find_or_create_guild_config(self.db, guild_id).await?;
        let (login, password) = config
            .api_credentials()
            .context("guild has no API credentials configured")?;

        self.auth
            .get_or_refresh_token(guild_id, login, password)
            .await
    }
}

/// Ban issuance and channel messaging over the Discord HTTP API.
pub struct DiscordModerationSink<'a> {
    pub http: &'a serenity::Http,
    pub guild_id: serenity::GuildId,
}

impl ModerationSink for DiscordModerationSink<'_> {
    async fn ban(&self, user_id: u64, reason: &str) -> anyhow::Result<()> {
        let audit_reason = format!("[Sentinel] {reason}");
        self.guild_id
            .ban_with_reason(self.http, serenity::UserId::new(user_id), 0, &audit_reason)
            .await
            .context("ban request failed")?;

        Ok(())
    }

    async fn send_to_channel(&self, channel_id: u64, text: &str) -> anyhow::Result<()> {
        serenity::ChannelId::new(channel_id)
            .say(self.http, text)
            .await
            .context("channel message failed")?;

        Ok(())
    }
}

/// Notifier replying into the invoking command context.
pub struct CommandNotifier<'ctx> {
    pub ctx: Context<'ctx>,
}

impl Notifier for CommandNotifier<'_> {
    async fn notify(&self, text: &str) -> anyhow::Result<()> {
        self.ctx.say(text).await?;
        Ok(())
    }

    async fn render_entry(
        &self,
        entry: &TrustlistEntry,
        actor: Option<&ResolvedActor>,
        user_id: u64,
    ) -> anyhow::Result<()> {
        let display = actor.map(|a| a.display_name.as_str());
        let embed = trustlist_record_embed(entry, display, user_id);
        self.ctx
            .send(poise::CreateReply::default().embed(embed))
            .await?;

        Ok(())
    }
}

/// Notifier posting into a fixed channel, used by join-traffic lookups.
pub struct ChannelNotifier<'a> {
    pub http: &'a serenity::Http,
    pub channel_id: serenity::ChannelId,
}

impl Notifier for ChannelNotifier<'_> {
    async fn notify(&self, text: &str) -> anyhow::Result<()> {
        self.channel_id.say(self.http, text).await?;
        Ok(())
    }

    async fn render_entry(
        &self,
        entry: &TrustlistEntry,
        actor: Option<&ResolvedActor>,
        user_id: u64,
    ) -> anyhow::Result<()> {
        let display = actor.map(|a| a.display_name.as_str());
        let embed = trustlist_record_embed(entry, display, user_id);
        self.channel_id
            .send_message(self.http, serenity::CreateMessage::new().embed(embed))
            .await?;

        Ok(())
    }
}

/// Reduce a guild member to the workflow-facing actor shape, resolving
/// whether they hold guild-management permission.
pub async fn resolve_actor(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    member: &serenity::Member,
) -> anyhow::Result<ResolvedActor> {
    let manages_guild = has_guild_permission(
        http,
        guild_id,
        member.user.id,
        serenity::Permissions::MANAGE_GUILD,
    )
    .await?;

    Ok(ResolvedActor {
        user_id: member.user.id.get(),
        is_bot: member.user.bot,
        manages_guild,
        display_name: member.display_name().to_owned(),
    })
}

/// Display-only actor for rendering users who are not guild members.
pub fn display_actor(user: &serenity::User) -> ResolvedActor {
    ResolvedActor {
        user_id: user.id.get(),
        is_bot: user.bot,
        manages_guild: false,
        display_name: user
            .global_name
            .clone()
            .unwrap_or_else(|| user.name.clone()),
    }
}
