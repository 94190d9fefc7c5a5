use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::ConfigError;

/// A session compares one focus brand against at most this many competitors.
pub const MAX_COMPETITORS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandProfile {
    pub name: String,
    /// Account handle per platform. A platform without a handle is "not configured".
    #[serde(default)]
    pub handles: BTreeMap<Platform, String>,
}

impl BrandProfile {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handles: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_handle(mut self, platform: Platform, handle: impl Into<String>) -> Self {
        self.handles.insert(platform, handle.into());
        self
    }

    /// The configured handle for `platform`, if any, with `@` and padding removed.
    #[must_use]
    pub fn handle(&self, platform: Platform) -> Option<&str> {
        self.handles
            .get(&platform)
            .map(|h| h.trim().trim_start_matches('@').trim())
            .filter(|h| !h.is_empty())
    }
}

/// On-disk description of one comparative analysis session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    pub focus: BrandProfile,
    #[serde(default)]
    pub competitors: Vec<BrandProfile>,
    /// Comma-separated universe keywords for share of voice. Auto-generated when absent.
    #[serde(default)]
    pub universe_keywords: Option<String>,
}

impl SessionFile {
    /// Focus brand first, then competitors in configured order.
    pub fn brands(&self) -> impl Iterator<Item = &BrandProfile> {
        std::iter::once(&self.focus).chain(self.competitors.iter())
    }
}

/// Load and validate a session description from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_session_file(path: &Path) -> Result<SessionFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SessionFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let session: SessionFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SessionFileParse)?;

    validate_session(&session)?;

    Ok(session)
}

/// Check brand names and the competitor limit.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] describing the first problem found.
pub fn validate_session(session: &SessionFile) -> Result<(), ConfigError> {
    if session.competitors.len() > MAX_COMPETITORS {
        return Err(ConfigError::Validation(format!(
            "at most {MAX_COMPETITORS} competitors are allowed, got {}",
            session.competitors.len()
        )));
    }

    let mut seen_names = HashSet::new();
    for brand in session.brands() {
        if brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(brand.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{}'",
                brand.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
