// Generated content record and its platform

use chrono::Local;
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Format of `GeneratedRecord::timestamp`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Marketplace a record was generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Fiverr,
    Upwork,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Fiverr, Platform::Upwork];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Fiverr => "Fiverr",
            Platform::Upwork => "Upwork",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| eyre!("Unknown platform: {} (expected Fiverr or Upwork)", s))
    }
}

/// One generated gig or proposal
///
/// Field names match the persisted layout, except `tags`, which is stored as `hashtags`
/// for both platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRecord {
    pub platform: Platform,
    pub category: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "hashtags")]
    pub tags: String,
    pub pricing: String,
    pub timestamp: String,
}

impl GeneratedRecord {
    /// Build a record stamped with the current local time
    pub fn new(
        platform: Platform,
        category: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        tags: impl Into<String>,
        pricing: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            category: category.into(),
            title: title.into(),
            description: description.into(),
            tags: tags.into(),
            pricing: pricing.into(),
            timestamp: now_timestamp(),
        }
    }
}

/// Current local time in `TIMESTAMP_FORMAT`
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
