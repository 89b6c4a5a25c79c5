use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::paginate::parse_next_link;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Environment variable that points the client at another API host.
pub const API_BASE_ENV: &str = "PKGGUARD_API_BASE_URL";

const API_VERSION: &str = "2022-11-28";

/// One page of a list endpoint plus the URL of the page after it.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    api_base: String,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        let api_base = std::env::var(API_BASE_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| GITHUB_API_BASE.to_string());
        Self::with_api_base(token, api_base)
    }

    pub fn with_api_base(token: Option<String>, api_base: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pkgguard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            token: token.filter(|t| !t.is_empty()),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Fetch a single page of a JSON array endpoint.
    #[instrument(skip(self))]
    pub async fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<Page<T>> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("{url} returned HTTP {status}");
        }

        let next = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_next_link);

        let items = response
            .json()
            .await
            .with_context(|| format!("failed to parse JSON array from {url}"))?;

        Ok(Page { items, next })
    }
}
