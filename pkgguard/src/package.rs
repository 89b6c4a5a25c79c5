use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A dependency about to be installed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// The `name@version` form the advisory API's `affects` filter expects.
    pub fn affects(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

impl FromStr for Package {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        // Scoped names carry a leading '@', so split on the last one.
        let Some((name, version)) = raw.rsplit_once('@') else {
            bail!("missing '@' in package reference: {raw}");
        };

        if name.is_empty() || name == "@" {
            bail!("missing package name in: {raw}");
        }
        if version.is_empty() {
            bail!("missing version in package reference: {raw}");
        }

        Ok(Self::new(name, version))
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
