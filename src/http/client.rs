use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

/// HTTP client that posts JSON with a shared-secret header
#[derive(Clone)]
pub struct JsonClient {
    client: Client,
    secret_key: String,
}

pub const SECRET_HEADER: &str = "secret-key";

impl JsonClient {
    pub fn new(user_agent: &str, timeout_secs: u64, secret_key: &str) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout_secs)?;

        Ok(Self {
            client,
            secret_key: secret_key.to_string(),
        })
    }

    pub async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<StatusCode> {
        let response = self.send_post_request(url, body).await?;
        Ok(response.status())
    }

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }

    async fn send_post_request<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        self.client
            .post(url)
            .header(SECRET_HEADER, &self.secret_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))
    }
}
