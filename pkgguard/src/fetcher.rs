use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::ghsa::{GhsaAdvisory, ECOSYSTEM};
use crate::package::Package;

/// The advisory API rejects `affects` lists longer than this.
pub const MAX_PACKAGES_PER_QUERY: usize = 1000;

pub const PER_PAGE: u32 = 100;

/// Parameters of one `GET /advisories` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryQuery {
    pub ecosystem: String,
    pub per_page: u32,
    pub affects: Vec<String>,
    pub sort: String,
    pub direction: String,
}

impl AdvisoryQuery {
    pub fn for_packages(packages: &[Package]) -> Self {
        Self {
            ecosystem: ECOSYSTEM.to_string(),
            per_page: PER_PAGE,
            affects: packages.iter().map(Package::affects).collect(),
            sort: "updated".to_string(),
            direction: "desc".to_string(),
        }
    }

    /// URL of the first page, relative to `api_base`.
    pub fn url(&self, api_base: &str) -> Result<String> {
        let per_page = self.per_page.to_string();
        let affects = self.affects.join(",");
        let url = reqwest::Url::parse_with_params(
            &format!("{api_base}/advisories"),
            [
                ("ecosystem", self.ecosystem.as_str()),
                ("per_page", per_page.as_str()),
                ("affects", affects.as_str()),
                ("sort", self.sort.as_str()),
                ("direction", self.direction.as_str()),
            ],
        )?;
        Ok(url.into())
    }
}

/// Anything that can answer an advisory query with every matching item.
#[async_trait]
pub trait AdvisorySource: Send + Sync {
    async fn fetch(&self, query: &AdvisoryQuery) -> Result<Vec<GhsaAdvisory>>;
}

pub fn chunk_packages(packages: &[Package]) -> Vec<&[Package]> {
    packages.chunks(MAX_PACKAGES_PER_QUERY).collect()
}

/// Query `source` once per chunk, one chunk at a time, and concatenate
/// the results in chunk order.
#[instrument(skip(source, packages), fields(packages = packages.len()))]
pub async fn fetch_feed(
    source: &dyn AdvisorySource,
    packages: &[Package],
) -> Result<Vec<GhsaAdvisory>> {
    let chunks = chunk_packages(packages);
    let mut feed = Vec::new();

    for (index, chunk) in chunks.iter().enumerate() {
        let query = AdvisoryQuery::for_packages(chunk);
        let items = source.fetch(&query).await?;
        debug!(
            chunk = index,
            chunk_len = chunk.len(),
            items = items.len(),
            "fetched advisories for chunk"
        );
        feed.extend(items);
    }

    Ok(feed)
}
