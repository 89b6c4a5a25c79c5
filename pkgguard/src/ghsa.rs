use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument};

use crate::advisory::{Advisory, AdvisoryLevel};

/// The only ecosystem this scanner queries and reports on.
pub const ECOSYSTEM: &str = "npm";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GhsaType {
    Reviewed,
    Unreviewed,
    Malware,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GhsaSeverity {
    Low,
    Medium,
    High,
    Critical,
    Unknown,
    #[serde(other)]
    Other,
}

/// One item of the `GET /advisories` feed, reduced to the fields we map.
#[derive(Debug, Clone, Deserialize)]
pub struct GhsaAdvisory {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ghsa_id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub advisory_type: GhsaType,
    #[serde(default)]
    pub severity: Option<GhsaSeverity>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub html_url: String,
    #[serde(default)]
    pub vulnerabilities: Option<Vec<GhsaVulnerability>>,
}

// A JSON `null` decodes the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
pub struct GhsaVulnerability {
    #[serde(default)]
    pub package: Option<GhsaPackage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GhsaPackage {
    #[serde(default)]
    pub ecosystem: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl GhsaAdvisory {
    pub fn is_unreviewed(&self) -> bool {
        self.advisory_type == GhsaType::Unreviewed
    }

    pub fn level(&self) -> AdvisoryLevel {
        let is_fatal = self.advisory_type == GhsaType::Malware
            || self.severity == Some(GhsaSeverity::Critical);
        if is_fatal {
            AdvisoryLevel::Fatal
        } else {
            AdvisoryLevel::Warn
        }
    }

    fn record(&self, level: AdvisoryLevel, package: String) -> Advisory {
        Advisory {
            level,
            package,
            url: self.html_url.clone(),
            description: self.description.clone().unwrap_or_default(),
        }
    }
}

/// Turn the raw feed into advisory records.
///
/// Unreviewed items are dropped. Every other item yields one record per
/// npm vulnerability it lists, followed by one record keyed by its GHSA id,
/// so each advisory shows up at least once.
#[instrument(skip(feed), fields(feed_len = feed.len()))]
pub fn classify(feed: &[GhsaAdvisory]) -> Vec<Advisory> {
    let mut results = Vec::new();

    for item in feed {
        if item.is_unreviewed() {
            debug!(ghsa_id = %item.ghsa_id, "skipping unreviewed advisory");
            continue;
        }

        let level = item.level();

        for vulnerability in item.vulnerabilities.iter().flatten() {
            let Some(package) = &vulnerability.package else {
                continue;
            };
            if package.ecosystem.as_deref() != Some(ECOSYSTEM) {
                continue;
            }

            let name = package
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| item.ghsa_id.clone());
            results.push(item.record(level, name));
        }

        results.push(item.record(level, item.ghsa_id.clone()));
    }

    results
}
