use anyhow::{Result, bail};
use log::debug;
use serde::Serialize;

use crate::config::NotifierSettings;
use crate::domain::{MatchedPair, PlayerId};
use crate::http::JsonClient;

/// Body of the orchestrator's match endpoint
#[derive(Debug, Serialize)]
struct MatchNotification {
    killer: PlayerId,
    victim: PlayerId,
    quality: f64,
}

impl From<&MatchedPair> for MatchNotification {
    fn from(pair: &MatchedPair) -> Self {
        Self {
            killer: pair.killer,
            victim: pair.victim,
            quality: pair.quality,
        }
    }
}

/// Reports decided pairs to the game orchestrator (the bot)
#[derive(Clone)]
pub struct OrchestratorClient {
    client: JsonClient,
    match_url: String,
}

impl OrchestratorClient {
    pub fn new(settings: &NotifierSettings) -> Result<Self> {
        let client = JsonClient::new(settings.user_agent, settings.timeout_secs, &settings.secret_key)?;
        let match_url = format!("{}/match", settings.bot_url.trim_end_matches('/'));

        Ok(Self { client, match_url })
    }

    pub fn match_url(&self) -> &str {
        &self.match_url
    }

    /// One delivery attempt; any non-2xx answer is an error
    pub async fn notify(&self, pair: &MatchedPair) -> Result<()> {
        let status = self
            .client
            .post_json(&self.match_url, &MatchNotification::from(pair))
            .await?;
        debug!(
            "Orchestrator answered {} for {} -> {}",
            status, pair.killer, pair.victim
        );

        if !status.is_success() {
            bail!("orchestrator responded with status {}", status);
        }
        Ok(())
    }
}
