// Shared HTTP plumbing for connectors.
//
// A thin reqwest wrapper: one client per connector, browser-like UA, and an
// explicit per-request timeout from configuration. `get_json` serves the
// API paths, where a non-2xx status is an error. `get_text` serves the
// scrape paths, which need to inspect the status and final URL of whatever
// came back to detect authwalls and login redirects — so it only fails on
// transport problems.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

/// A fetched page with enough metadata to detect redirect-to-login blocks.
pub struct FetchedPage {
    /// URL after redirects — an authwall shows up here, not in the status.
    pub final_url: String,
    pub status: StatusCode,
    pub body: String,
}

/// HTTP client shared by both paths of one connector.
pub struct FetchClient {
    client: reqwest::Client,
}

impl FetchClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    /// GET a JSON endpoint and deserialize the response. Non-2xx statuses
    /// are errors carrying the response body for diagnostics.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<T> {
        debug!(url = url, "GET json");

        let mut request = self.client.get(url).query(params);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request failed: {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{url} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize response from {url}"))
    }

    /// GET a page as text. Any HTTP response is Ok — callers inspect the
    /// status and final URL themselves. Only transport failures error.
    pub async fn get_text(&self, url: &str, params: &[(&str, &str)]) -> Result<FetchedPage> {
        debug!(url = url, "GET text");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .with_context(|| format!("Request failed: {url}"))?;

        let final_url = response.url().to_string();
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read body from {url}"))?;

        Ok(FetchedPage {
            final_url,
            status,
            body,
        })
    }
}
