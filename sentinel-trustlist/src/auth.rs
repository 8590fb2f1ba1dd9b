use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use tokio::sync::RwLock;
use tracing::debug;

use crate::model::{LoginRequest, TokenResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tokens are considered stale this long before the server-reported expiry,
/// so an in-flight call never rides a token that lapses mid-request.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
struct CachedToken {
    token: String,
    valid_until: i64,
}

impl CachedToken {
    fn is_fresh(&self, now_unix: i64) -> bool {
        self.valid_until - REFRESH_MARGIN.as_secs() as i64 > now_unix
    }
}

/// Client for the trustlist auth endpoint, with a per-guild token cache.
///
/// Callers ask for a token per request; the caching here is an internal
/// detail and never leaks stale tokens past their refresh margin.
#[derive(Clone, Debug)]
pub struct AuthService {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<RwLock<HashMap<u64, CachedToken>>>,
}

impl AuthService {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sentinel/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build auth HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
            tokens: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = env::var("TRUSTLIST_API_URL").context("TRUSTLIST_API_URL is not set")?;
        Self::new(&base_url)
    }

    /// Return a valid API token for the guild, logging in again only when the
    /// cached token is missing or about to expire.
    pub async fn get_or_refresh_token(
        &self,
        guild_id: u64,
        login: &str,
        password: &str,
    ) -> anyhow::Result<String> {
        let now = now_unix_secs();

        if let Some(cached) = self.tokens.read().await.get(&guild_id) {
            if cached.is_fresh(now) {
                return Ok(cached.token.clone());
            }
        }

        debug!(guild_id, "refreshing trustlist API token");
        let fresh = self.login(login, password).await?;
        let token = fresh.token.clone();

        self.tokens.write().await.insert(
            guild_id,
            CachedToken {
                token: fresh.token,
                valid_until: fresh.valid_until,
            },
        );

        Ok(token)
    }

    async fn login(&self, login: &str, password: &str) -> anyhow::Result<TokenResponse> {
        let url = format!("{}/api/v3/auth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { login, password })
            .send()
            .await
            .context("auth login request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("auth login failed: {status} (check the configured access key)");
        }

        response
            .json::<TokenResponse>()
            .await
            .context("failed to decode auth token response")
    }
}

fn now_unix_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs()) as i64
}

#[cfg(test)]
mod tests {
    use super::CachedToken;

    #[test]
    fn tokens_go_stale_before_expiry() {
        let cached = CachedToken {
            token: "t".to_owned(),
            valid_until: 1_000,
        };

        assert!(cached.is_fresh(0));
        assert!(cached.is_fresh(939));
        // Inside the refresh margin.
        assert!(!cached.is_fresh(940));
        assert!(!cached.is_fresh(1_000));
        assert!(!cached.is_fresh(2_000));
    }
}
