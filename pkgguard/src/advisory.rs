use std::fmt;

use serde::{Deserialize, Serialize};

/// How the host installer should react to an advisory.
///
/// `Fatal` stops the install outright; `Warn` lets the host prompt the user
/// (or cancel when there is no TTY). Ordered so the worst level sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryLevel {
    Warn,
    Fatal,
}

impl fmt::Display for AdvisoryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryLevel::Warn => write!(f, "warn"),
            AdvisoryLevel::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub level: AdvisoryLevel,
    pub package: String,
    pub url: String,
    pub description: String,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = self.level.to_string().to_uppercase();
        if self.description.is_empty() {
            writeln!(f, "{level} {}", self.package)?;
        } else {
            writeln!(f, "{level} {}: {}", self.package, self.description)?;
        }
        write!(f, "    {}", self.url)
    }
}

pub fn has_fatal(advisories: &[Advisory]) -> bool {
    advisories.iter().any(|a| a.level == AdvisoryLevel::Fatal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_advisory(package: &str, level: AdvisoryLevel) -> Advisory {
        Advisory {
            level,
            package: package.to_string(),
            url: format!("https://github.com/advisories/{package}"),
            description: format!("Advisory for {package}"),
        }
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_value(make_advisory("left-pad", AdvisoryLevel::Fatal)).unwrap();
        assert_eq!(json["level"], "fatal");
        assert_eq!(json["package"], "left-pad");

        let json = serde_json::to_value(make_advisory("lodash", AdvisoryLevel::Warn)).unwrap();
        assert_eq!(json["level"], "warn");
    }

    #[test]
    fn fatal_outranks_warn() {
        assert!(AdvisoryLevel::Fatal > AdvisoryLevel::Warn);
    }

    #[test]
    fn display_includes_level_package_and_url() {
        let text = make_advisory("left-pad", AdvisoryLevel::Fatal).to_string();
        assert_eq!(
            text,
            "FATAL left-pad: Advisory for left-pad\n    https://github.com/advisories/left-pad"
        );
    }

    #[test]
    fn display_without_description() {
        let mut adv = make_advisory("GHSA-1", AdvisoryLevel::Warn);
        adv.description.clear();
        assert!(adv.to_string().starts_with("WARN GHSA-1\n"));
    }

    #[test]
    fn has_fatal_detects_any_fatal() {
        let advisories = vec![
            make_advisory("a", AdvisoryLevel::Warn),
            make_advisory("b", AdvisoryLevel::Fatal),
        ];
        assert!(has_fatal(&advisories));
        assert!(!has_fatal(&advisories[..1]));
        assert!(!has_fatal(&[]));
    }
}
