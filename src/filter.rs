// Platform filtering for listings

use crate::record::{GeneratedRecord, Platform};

/// Sentinel accepted by `PlatformFilter::parse` for "no filtering"
pub const ALL: &str = "All";

/// Filter applied by `list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformFilter {
    /// Every record
    All,
    /// Records for one platform
    Only(Platform),
    /// A value outside the platform set; matches nothing
    Unknown(String),
}

impl PlatformFilter {
    /// Parse a user-supplied filter value. Never fails: unrecognised values become `Unknown`.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case(ALL) {
            return PlatformFilter::All;
        }
        match value.parse::<Platform>() {
            Ok(platform) => PlatformFilter::Only(platform),
            Err(_) => PlatformFilter::Unknown(value.to_string()),
        }
    }

    pub fn matches(&self, record: &GeneratedRecord) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Only(platform) => record.platform == *platform,
            PlatformFilter::Unknown(_) => false,
        }
    }
}

impl From<Platform> for PlatformFilter {
    fn from(platform: Platform) -> Self {
        PlatformFilter::Only(platform)
    }
}

impl std::fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformFilter::All => write!(f, "{}", ALL),
            PlatformFilter::Only(platform) => write!(f, "{}", platform),
            PlatformFilter::Unknown(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(platform: Platform) -> GeneratedRecord {
        GeneratedRecord {
            platform,
            category: "Translation".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            tags: "x".to_string(),
            pricing: "50".to_string(),
            timestamp: "2024-01-01 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(PlatformFilter::parse("All"), PlatformFilter::All);
        assert_eq!(PlatformFilter::parse("all"), PlatformFilter::All);
        assert_eq!(PlatformFilter::parse("Fiverr"), PlatformFilter::Only(Platform::Fiverr));
        assert_eq!(PlatformFilter::parse("Upwork"), PlatformFilter::Only(Platform::Upwork));
        assert_eq!(
            PlatformFilter::parse("Toptal"),
            PlatformFilter::Unknown("Toptal".to_string())
        );
    }

    #[test]
    fn test_filter_matches() {
        let fiverr = record(Platform::Fiverr);
        let upwork = record(Platform::Upwork);

        assert!(PlatformFilter::All.matches(&fiverr));
        assert!(PlatformFilter::All.matches(&upwork));
        assert!(PlatformFilter::from(Platform::Fiverr).matches(&fiverr));
        assert!(!PlatformFilter::from(Platform::Fiverr).matches(&upwork));
        assert!(!PlatformFilter::Unknown("".to_string()).matches(&fiverr));
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(PlatformFilter::All.to_string(), "All");
        assert_eq!(PlatformFilter::Only(Platform::Upwork).to_string(), "Upwork");
    }
}
