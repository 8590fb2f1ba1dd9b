use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-guild bot settings.
///
/// A row is lazily created with these defaults the first time a guild is
/// touched: no API credentials, auto-ban disabled, no log channels.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct GuildConfig {
    pub guild_id: i64,
    pub api_login: Option<String>,
    pub api_password: Option<String>,
    /// Auto-ban users whose record reaches the blacklist level.
    pub auto_ban_blacklisted: bool,
    pub ban_log_channel: Option<i64>,
    pub join_log_channel: Option<i64>,
    /// Skip join-log output for users with a clean record.
    pub suppress_clean_joins: bool,
}

impl GuildConfig {
    pub fn defaults(guild_id: i64) -> Self {
        Self {
            guild_id,
            api_login: None,
            api_password: None,
            auto_ban_blacklisted: false,
            ban_log_channel: None,
            join_log_channel: None,
            suppress_clean_joins: false,
        }
    }

    /// The guild's API credential pair, when both halves are set and
    /// non-empty.
    pub fn api_credentials(&self) -> Option<(&str, &str)> {
        match (self.api_login.as_deref(), self.api_password.as_deref()) {
            (Some(login), Some(password)) if !login.is_empty() && !password.is_empty() => {
                Some((login, password))
            }
            _ => None,
        }
    }

    pub fn has_api_credentials(&self) -> bool {
        self.api_credentials().is_some()
    }
}
