use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::advisory::{Advisory, AdvisoryLevel};
use crate::fetcher::{fetch_feed, AdvisorySource};
use crate::ghsa::classify;
use crate::github::GitHubClient;
use crate::package::Package;
use crate::paginate::Paginator;

/// Version of the scanner contract the host installer negotiates against.
pub const PROTOCOL_VERSION: &str = "1";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub packages: Vec<Package>,
}

/// The capability a host installer calls before installing packages.
///
/// Returning `Ok(vec![])` means nothing was found. An `Err` means the scan
/// could not be completed and safety is unknown.
#[async_trait]
pub trait SecurityScanner: Send + Sync {
    fn version(&self) -> &str {
        PROTOCOL_VERSION
    }

    async fn scan(&self, request: ScanRequest) -> Result<Vec<Advisory>>;
}

/// Scanner backed by the GitHub Security Advisory database.
#[derive(Clone)]
pub struct GhsaScanner {
    source: Arc<dyn AdvisorySource>,
}

impl GhsaScanner {
    pub fn new(source: Arc<dyn AdvisorySource>) -> Self {
        Self { source }
    }

    pub fn from_client(client: GitHubClient) -> Self {
        Self::new(Arc::new(Paginator::new(client)))
    }
}

#[async_trait]
impl SecurityScanner for GhsaScanner {
    #[instrument(skip(self, request), fields(packages = request.packages.len()))]
    async fn scan(&self, request: ScanRequest) -> Result<Vec<Advisory>> {
        let feed = fetch_feed(&*self.source, &request.packages).await?;
        let advisories = classify(&feed);

        let fatal = advisories
            .iter()
            .filter(|a| a.level == AdvisoryLevel::Fatal)
            .count();
        info!(
            feed = feed.len(),
            advisories = advisories.len(),
            fatal,
            "scan complete"
        );

        Ok(advisories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use anyhow::bail;
    use serde_json::json;

    use crate::fetcher::AdvisoryQuery;
    use crate::ghsa::GhsaAdvisory;

    struct StaticSource {
        items: serde_json::Value,
        calls: Mutex<usize>,
    }

    impl StaticSource {
        fn new(items: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                items,
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl AdvisorySource for StaticSource {
        async fn fetch(&self, _query: &AdvisoryQuery) -> Result<Vec<GhsaAdvisory>> {
            *self.calls.lock().unwrap() += 1;
            Ok(serde_json::from_value(self.items.clone())?)
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl AdvisorySource for BrokenSource {
        async fn fetch(&self, _query: &AdvisoryQuery) -> Result<Vec<GhsaAdvisory>> {
            bail!("https://api.github.com/advisories returned HTTP 401 Unauthorized")
        }
    }

    fn request(packages: &[(&str, &str)]) -> ScanRequest {
        ScanRequest {
            packages: packages
                .iter()
                .map(|(name, version)| Package::new(*name, *version))
                .collect(),
        }
    }

    #[test]
    fn version_is_protocol_version() {
        let scanner = GhsaScanner::new(StaticSource::new(json!([])));
        assert_eq!(scanner.version(), "1");
    }

    #[test]
    fn scan_request_deserializes_host_shape() {
        let req: ScanRequest = serde_json::from_value(json!({
            "packages": [{"name": "left-pad", "version": "1.0.0"}]
        }))
        .unwrap();
        assert_eq!(req, request(&[("left-pad", "1.0.0")]));
    }

    #[tokio::test]
    async fn malware_hit_is_reported_twice_as_fatal() {
        let source = StaticSource::new(json!([{
            "type": "malware",
            "ghsa_id": "GHSA-1",
            "description": "d",
            "html_url": "u",
            "vulnerabilities": [{"package": {"ecosystem": "npm", "name": "left-pad"}}]
        }]));
        let scanner = GhsaScanner::new(source);

        let advisories = scanner
            .scan(request(&[("left-pad", "1.0.0")]))
            .await
            .unwrap();

        assert_eq!(
            advisories,
            vec![
                Advisory {
                    level: AdvisoryLevel::Fatal,
                    package: "left-pad".into(),
                    url: "u".into(),
                    description: "d".into(),
                },
                Advisory {
                    level: AdvisoryLevel::Fatal,
                    package: "GHSA-1".into(),
                    url: "u".into(),
                    description: "d".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn empty_request_skips_network() {
        let source = StaticSource::new(json!([{"type": "malware", "ghsa_id": "GHSA-1"}]));
        let scanner = GhsaScanner::new(source.clone());

        let advisories = scanner.scan(ScanRequest::default()).await.unwrap();
        assert!(advisories.is_empty());
        assert_eq!(*source.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn source_failure_propagates() {
        let scanner = GhsaScanner::new(Arc::new(BrokenSource));
        let err = scanner
            .scan(request(&[("left-pad", "1.0.0")]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
