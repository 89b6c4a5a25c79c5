use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::fetcher::{AdvisoryQuery, AdvisorySource};
use crate::ghsa::GhsaAdvisory;
use crate::github::GitHubClient;

/// Upper bound on pages followed for a single query.
pub const MAX_PAGES: usize = 1000;

/// Walks a list endpoint page by page using the `Link` response header.
#[derive(Clone)]
pub struct Paginator {
    client: GitHubClient,
}

impl Paginator {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, query), fields(affects = query.affects.len()))]
    pub async fn fetch_all(&self, query: &AdvisoryQuery) -> Result<Vec<GhsaAdvisory>> {
        let first = query
            .url(self.client.api_base())
            .context("failed to build advisory query URL")?;

        let mut items = Vec::new();
        let mut next = Some(first);
        let mut pages = 0;

        while let Some(url) = next {
            if pages == MAX_PAGES {
                bail!("gave up after {MAX_PAGES} pages of advisories");
            }
            let page = self.client.get_page::<GhsaAdvisory>(&url).await?;
            pages += 1;
            debug!(page = pages, items = page.items.len(), "fetched advisory page");
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }
}

#[async_trait]
impl AdvisorySource for Paginator {
    async fn fetch(&self, query: &AdvisoryQuery) -> Result<Vec<GhsaAdvisory>> {
        self.fetch_all(query).await
    }
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
///
/// Targets are located by their angle brackets rather than by splitting on
/// commas, since a target URI may itself contain commas.
pub fn parse_next_link(header: &str) -> Option<String> {
    let mut rest = header;

    while let Some(open) = rest.find('<') {
        let after_open = &rest[open + 1..];
        let close = after_open.find('>')?;
        let target = &after_open[..close];

        let tail = &after_open[close + 1..];
        let params_end = tail.find('<').unwrap_or(tail.len());
        let params = &tail[..params_end];

        if params.split([';', ',']).any(is_next_rel) {
            return Some(target.to_string());
        }
        rest = tail;
    }

    None
}

fn is_next_rel(param: &str) -> bool {
    let Some((key, value)) = param.split_once('=') else {
        return false;
    };
    key.trim().eq_ignore_ascii_case("rel")
        && value
            .trim()
            .trim_matches('"')
            .split_whitespace()
            .any(|rel| rel.eq_ignore_ascii_case("next"))
}
