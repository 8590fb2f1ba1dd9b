use poise::serenity_prelude as serenity;

/// Resolve a member's effective guild-level permissions.
///
/// The guild owner and anyone holding `ADMINISTRATOR` resolve to the full
/// permission set. Everyone else gets the union of their role permissions
/// (including the implicit `@everyone` role).
pub async fn effective_guild_permissions(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> anyhow::Result<serenity::Permissions> {
    let guild = guild_id.to_partial_guild(http).await?;
    if guild.owner_id == user_id {
        return Ok(serenity::Permissions::all());
    }

    let member = guild_id.member(http, user_id).await?;
    let roles = guild_id.roles(http).await?;

    // The @everyone role shares the guild's id.
    let everyone_role_id = serenity::RoleId::new(guild_id.get());

    let mut resolved = serenity::Permissions::empty();
    for role in roles.values() {
        if role.id == everyone_role_id || member.roles.contains(&role.id) {
            resolved |= role.permissions;
        }
    }

    if resolved.contains(serenity::Permissions::ADMINISTRATOR) {
        return Ok(serenity::Permissions::all());
    }

    Ok(resolved)
}

/// Whether a member holds the required permission (directly or via
/// `ADMINISTRATOR`/ownership).
pub async fn has_guild_permission(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    required: serenity::Permissions,
) -> anyhow::Result<bool> {
    let perms = effective_guild_permissions(http, guild_id, user_id).await?;
    Ok(perms.contains(required))
}
