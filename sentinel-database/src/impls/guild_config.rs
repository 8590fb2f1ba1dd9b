use anyhow::Context as _;

use crate::cache::{CONFIG_CACHE_TTL, guild_config_key, invalidate_guild_config};
use crate::database::Database;
use crate::model::guild_config::GuildConfig;

/// Fetch the guild's configuration row, creating the default row on first
/// access. Never reports "not found".
pub async fn find_or_create_guild_config(
    db: &Database,
    guild_id: u64,
) -> anyhow::Result<GuildConfig> {
    let cache_key = guild_config_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || async {
            let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

            // Two statements instead of one RETURNING upsert: DO NOTHING
            // keeps concurrent first touches from clobbering each other.
            sqlx::query("INSERT INTO guild_config (guild_id) VALUES ($1) ON CONFLICT (guild_id) DO NOTHING")
                .bind(guild_id_i64)
                .execute(db.pool())
                .await?;

            let config = sqlx::query_as::<_, GuildConfig>(
                "SELECT guild_id, api_login, api_password, auto_ban_blacklisted, \
                 ban_log_channel, join_log_channel, suppress_clean_joins \
                 FROM guild_config WHERE guild_id = $1",
            )
            .bind(guild_id_i64)
            .fetch_one(db.pool())
            .await?;

            Ok(config)
        })
        .await
}

pub async fn set_api_credentials(
    db: &Database,
    guild_id: u64,
    login: &str,
    password: &str,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO guild_config (guild_id, api_login, api_password) VALUES ($1, $2, $3) \
         ON CONFLICT (guild_id) DO UPDATE SET api_login = $2, api_password = $3",
    )
    .bind(guild_id_i64)
    .bind(login)
    .bind(password)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn set_auto_ban(db: &Database, guild_id: u64, enabled: bool) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO guild_config (guild_id, auto_ban_blacklisted) VALUES ($1, $2) \
         ON CONFLICT (guild_id) DO UPDATE SET auto_ban_blacklisted = $2",
    )
    .bind(guild_id_i64)
    .bind(enabled)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn set_ban_log_channel(
    db: &Database,
    guild_id: u64,
    channel_id: Option<u64>,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let channel_id_i64 = channel_id
        .map(i64::try_from)
        .transpose()
        .context("channel_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO guild_config (guild_id, ban_log_channel) VALUES ($1, $2) \
         ON CONFLICT (guild_id) DO UPDATE SET ban_log_channel = $2",
    )
    .bind(guild_id_i64)
    .bind(channel_id_i64)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn set_join_log_channel(
    db: &Database,
    guild_id: u64,
    channel_id: Option<u64>,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let channel_id_i64 = channel_id
        .map(i64::try_from)
        .transpose()
        .context("channel_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO guild_config (guild_id, join_log_channel) VALUES ($1, $2) \
         ON CONFLICT (guild_id) DO UPDATE SET join_log_channel = $2",
    )
    .bind(guild_id_i64)
    .bind(channel_id_i64)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn set_suppress_clean_joins(
    db: &Database,
    guild_id: u64,
    enabled: bool,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO guild_config (guild_id, suppress_clean_joins) VALUES ($1, $2) \
         ON CONFLICT (guild_id) DO UPDATE SET suppress_clean_joins = $2",
    )
    .bind(guild_id_i64)
    .bind(enabled)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await?;

    Ok(())
}
