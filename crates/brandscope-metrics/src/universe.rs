//! Keyword universe used for share-of-voice.
//!
//! When a session does not supply its own universe keywords, they are picked
//! from a category table: each category lists name fragments that identify
//! brands in it (`brand_hints`) and the conversation keywords that define
//! its market. The built-in table targets the Indonesian consumer market and
//! can be replaced from YAML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum UniverseCatalogError {
    #[error("failed to read universe catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse universe catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("universe catalog has no categories and no fallback keywords")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseCategory {
    pub name: String,
    /// Lowercase brand-name fragments that place a brand in this category.
    pub brand_hints: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseCatalog {
    pub categories: Vec<UniverseCategory>,
    /// Used when no brand matches any category.
    #[serde(default)]
    pub fallback: Vec<String>,
}

fn category(name: &str, hints: &[&str], keywords: &[&str]) -> UniverseCategory {
    UniverseCategory {
        name: name.to_string(),
        brand_hints: hints.iter().map(|s| (*s).to_string()).collect(),
        keywords: keywords.iter().map(|s| (*s).to_string()).collect(),
    }
}

impl Default for UniverseCatalog {
    fn default() -> Self {
        Self {
            categories: vec![
                category(
                    "coffee",
                    &["kopi", "coffee", "cafe", "kenangan", "janji jiwa", "starbucks", "tuku"],
                    &["kopi", "coffee", "kopi susu", "latte", "ngopi", "cafe"],
                ),
                category(
                    "tea",
                    &["tea", "teh", "boba", "chatime", "mixue", "haus"],
                    &["teh", "boba", "milk tea", "es teh", "bubble tea"],
                ),
                category(
                    "beauty",
                    &["beauty", "skin", "glow", "wardah", "somethinc", "scarlett", "emina"],
                    &["skincare", "makeup", "serum", "sunscreen", "kosmetik"],
                ),
                category(
                    "fast food",
                    &["burger", "pizza", "chicken", "kfc", "mcd", "richeese"],
                    &["burger", "fried chicken", "pizza", "fast food", "makan siang"],
                ),
                category(
                    "ecommerce",
                    &["shop", "tokopedia", "shopee", "lazada", "blibli", "bukalapak"],
                    &["belanja online", "checkout", "flash sale", "gratis ongkir", "marketplace"],
                ),
                category(
                    "telco",
                    &["telkomsel", "indosat", "smartfren", "axis", "xl"],
                    &["sinyal", "kuota", "paket data", "internet", "provider"],
                ),
                category(
                    "finance",
                    &["bank", "bca", "mandiri", "bni", "bri", "gopay", "ovo", "dana"],
                    &["transfer", "mobile banking", "e-wallet", "bayar", "tabungan"],
                ),
            ],
            fallback: vec![
                "review".to_string(),
                "rekomendasi".to_string(),
                "recommended".to_string(),
                "viral".to_string(),
                "worth it".to_string(),
            ],
        }
    }
}

impl UniverseCatalog {
    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseCatalogError::Parse`] on malformed YAML and
    /// [`UniverseCatalogError::Empty`] when the catalog could never produce a
    /// keyword.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, UniverseCatalogError> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        if catalog.categories.is_empty() && catalog.fallback.is_empty() {
            return Err(UniverseCatalogError::Empty);
        }
        Ok(catalog)
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseCatalogError::Io`] if the file cannot be read, or
    /// any error from [`UniverseCatalog::from_yaml_str`].
    pub fn load(path: &Path) -> Result<Self, UniverseCatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| UniverseCatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Keywords for every category any of `brand_names` falls into, in
    /// catalog order, or the fallback list when none match.
    #[must_use]
    pub fn keywords_for(&self, brand_names: &[&str]) -> Vec<String> {
        let lowered: Vec<String> = brand_names.iter().map(|name| name.to_lowercase()).collect();

        let mut keywords = Vec::new();
        for category in &self.categories {
            let matched = category
                .brand_hints
                .iter()
                .any(|hint| lowered.iter().any(|name| hint_matches(name, hint)));
            if matched {
                push_unique(&mut keywords, &category.keywords);
            }
        }
        if keywords.is_empty() {
            push_unique(&mut keywords, &self.fallback);
        }
        keywords
    }

    /// User-supplied keywords when any are given, otherwise the catalog's
    /// pick for `brand_names`.
    #[must_use]
    pub fn resolve(&self, user_supplied: Option<&str>, brand_names: &[&str]) -> Vec<String> {
        let parsed = user_supplied.map(parse_universe_keywords).unwrap_or_default();
        if parsed.is_empty() {
            self.keywords_for(brand_names)
        } else {
            parsed
        }
    }
}

/// Split a comma-separated keyword list, trimming and dropping duplicates
/// (case-insensitive) and blanks.
#[must_use]
pub fn parse_universe_keywords(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for keyword in raw.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        if !out.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
            out.push(keyword.to_string());
        }
    }
    out
}

fn push_unique(into: &mut Vec<String>, keywords: &[String]) {
    for keyword in keywords {
        if !into.contains(keyword) {
            into.push(keyword.clone());
        }
    }
}

/// `hint` occurs in the lowercase `name` at the start of a word. Hints of
/// four characters or fewer must cover the whole word (`tea` matches
/// "Tea Garden" but not "Steak" or "Teater").
fn hint_matches(name: &str, hint: &str) -> bool {
    let hint = hint.trim().to_lowercase();
    if hint.is_empty() {
        return false;
    }
    let whole_word = hint.chars().count() <= 4;
    name.match_indices(hint.as_str()).any(|(start, _)| {
        let end = start + hint.len();
        let starts_word = name[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let ends_word = name[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        starts_word && (!whole_word || ends_word)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_name_fragments_select_categories() {
        let catalog = UniverseCatalog::default();
        let keywords = catalog.keywords_for(&["Kopi Kenangan", "Janji Jiwa"]);
        assert_eq!(keywords[0], "kopi");
        assert!(keywords.contains(&"latte".to_string()));
        assert!(!keywords.contains(&"boba".to_string()));
    }

    #[test]
    fn multiple_categories_are_merged_without_duplicates() {
        let catalog = UniverseCatalog::default();
        let keywords = catalog.keywords_for(&["Starbucks", "Chatime", "Kopi Nako"]);
        assert!(keywords.contains(&"coffee".to_string()));
        assert!(keywords.contains(&"milk tea".to_string()));
        let kopi = keywords.iter().filter(|k| *k == "kopi").count();
        assert_eq!(kopi, 1);
    }

    #[test]
    fn short_hints_need_a_whole_word() {
        let catalog = UniverseCatalog::default();
        for name in ["Steak Hotel", "Teater Koma"] {
            assert_eq!(catalog.keywords_for(&[name]), catalog.fallback, "brand {name}");
        }
        assert!(catalog
            .keywords_for(&["Es Teh Indonesia"])
            .contains(&"milk tea".to_string()));
        assert!(catalog
            .keywords_for(&["Tea Garden"])
            .contains(&"boba".to_string()));
    }

    #[test]
    fn long_hints_match_at_word_start() {
        let catalog = UniverseCatalog::default();
        assert!(catalog
            .keywords_for(&["Starbucks Reserve"])
            .contains(&"latte".to_string()));
        assert!(catalog
            .keywords_for(&["Beauty-Haul"])
            .contains(&"skincare".to_string()));
        assert_eq!(catalog.keywords_for(&["Megabank Co"]), catalog.fallback);
    }

    #[test]
    fn short_hint_matches_whole_word_at_end() {
        let catalog = UniverseCatalog::default();
        assert!(catalog.keywords_for(&["XL"]).contains(&"kuota".to_string()));
        assert!(!catalog.keywords_for(&["XLarge"]).contains(&"kuota".to_string()));
    }

    #[test]
    fn unknown_brands_use_fallback() {
        let catalog = UniverseCatalog::default();
        assert_eq!(catalog.keywords_for(&["Acme"]), catalog.fallback);
    }

    #[test]
    fn user_keywords_take_precedence() {
        let catalog = UniverseCatalog::default();
        let keywords = catalog.resolve(Some(" kopi, Kopi ,, latte "), &["Acme"]);
        assert_eq!(keywords, ["kopi", "latte"]);

        let blank = catalog.resolve(Some(" , "), &["Acme"]);
        assert_eq!(blank, catalog.fallback);
    }

    #[test]
    fn yaml_override_replaces_table() {
        let yaml = r"
categories:
  - name: snacks
    brand_hints: [chitato, qtela]
    keywords: [keripik, snack]
";
        let catalog = UniverseCatalog::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.keywords_for(&["Chitato"]), ["keripik", "snack"]);
        assert!(catalog.keywords_for(&["Kopi Kenangan"]).is_empty());
    }

    #[test]
    fn empty_yaml_catalog_is_rejected() {
        let err = UniverseCatalog::from_yaml_str("categories: []\n").unwrap_err();
        assert!(matches!(err, UniverseCatalogError::Empty));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = UniverseCatalog::load(Path::new("/nonexistent/universe.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/universe.yaml"));
    }
}
