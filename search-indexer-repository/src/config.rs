//! Configuration types for the IndexGateway.

use std::fmt;
use std::str::FromStr;

/// How documents are spread across indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexLayout {
    /// One index per site holding every content type (index name = site).
    #[default]
    SitePerIndex,
    /// One index per site and content bucket (index name = `<site>-<bucket>`).
    SiteAndBucket,
}

impl FromStr for IndexLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "site" | "site-per-index" | "shared" => Ok(Self::SitePerIndex),
            "site-bucket" | "site_bucket" | "per-type" | "bucket" => Ok(Self::SiteAndBucket),
            other => Err(format!("unknown index layout: {}", other)),
        }
    }
}

impl fmt::Display for IndexLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SitePerIndex => f.write_str("site"),
            Self::SiteAndBucket => f.write_str("site-bucket"),
        }
    }
}

/// Shard and replica counts written into every index template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }
}

/// Configuration for the IndexGateway.
#[derive(Debug, Clone, Default)]
pub struct IndexGatewayConfig {
    /// Index layout. Defaults to one index per site.
    pub layout: IndexLayout,
    /// Settings used when an index is created on demand.
    pub settings: IndexSettings,
}

impl IndexGatewayConfig {
    /// Create a config with the given layout and default settings.
    pub fn with_layout(layout: IndexLayout) -> Self {
        Self {
            layout,
            settings: IndexSettings::default(),
        }
    }
}
