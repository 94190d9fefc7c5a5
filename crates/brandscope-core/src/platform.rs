use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Social platforms the analysis covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    #[serde(rename = "tiktok")]
    TikTok,
    Twitter,
    Facebook,
    #[serde(rename = "youtube")]
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Instagram,
        Platform::TikTok,
        Platform::Twitter,
        Platform::Facebook,
        Platform::YouTube,
    ];

    /// Platforms searched for third-party mentions of a brand.
    pub const MENTION_SOURCES: [Platform; 4] = [
        Platform::Instagram,
        Platform::TikTok,
        Platform::Twitter,
        Platform::Facebook,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
            Platform::YouTube => "youtube",
        }
    }

    /// Whether a share counts toward per-post engagement on this platform.
    #[must_use]
    pub fn counts_shares(self) -> bool {
        matches!(
            self,
            Platform::TikTok | Platform::Twitter | Platform::Facebook
        )
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" | "ig" => Ok(Platform::Instagram),
            "tiktok" => Ok(Platform::TikTok),
            "twitter" | "x" => Ok(Platform::Twitter),
            "facebook" | "fb" => Ok(Platform::Facebook),
            "youtube" | "yt" => Ok(Platform::YouTube),
            other => Err(format!("unknown platform '{other}'")),
        }
    }
}
