use std::env;
use std::time::Duration;

use anyhow::Context as _;

use crate::model::TrustlistEntry;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the remote trustlist registry.
#[derive(Clone, Debug)]
pub struct TrustlistService {
    client: reqwest::Client,
    base_url: String,
}

impl TrustlistService {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sentinel/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build trustlist HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = env::var("TRUSTLIST_API_URL").context("TRUSTLIST_API_URL is not set")?;
        Self::new(&base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the current record for a user.
    ///
    /// Ids the registry has never seen are not an error: the service answers
    /// 404 and we report a clean zero-level record instead.
    pub async fn lookup_user(&self, user_id: u64) -> anyhow::Result<TrustlistEntry> {
        let url = format!("{}/api/v3/user/{}", self.base_url, user_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("trustlist lookup request failed")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(TrustlistEntry::clean(user_id));
        }

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!(
                "trustlist lookup failed: {} ({})",
                status,
                response_summary(response).await
            );
        }

        response
            .json::<TrustlistEntry>()
            .await
            .context("failed to decode trustlist entry")
    }

    /// Insert a new record, or escalate the existing one for the same id.
    pub async fn insert_or_escalate_user(
        &self,
        record: &TrustlistEntry,
        token: &str,
    ) -> anyhow::Result<()> {
        let url = format!("{}/api/v3/user/insert", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(record)
            .send()
            .await
            .context("trustlist insert request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!(
                "trustlist insert failed: {} ({})",
                status,
                response_summary(response).await
            );
        }

        Ok(())
    }
}

/// Condense a failed response body into something safe for a user-facing
/// error message.
async fn response_summary(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no response body".to_owned()
            } else {
                let mut summary: String = trimmed.chars().take(200).collect();
                if trimmed.chars().count() > 200 {
                    summary.push('…');
                }
                summary
            }
        }
        Err(_) => "unreadable response body".to_owned(),
    }
}
