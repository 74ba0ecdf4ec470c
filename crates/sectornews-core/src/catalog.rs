//! Keyword catalog: sector name -> ordered keyword search terms.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::ConfigError;

/// Validated mapping of sector name to its keyword list.
///
/// Sectors iterate in sorted order; keywords keep their file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCatalog {
    sectors: BTreeMap<String, Vec<String>>,
}

impl KeywordCatalog {
    /// Builds a catalog from raw sector -> keyword lists, trimming names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a sector or keyword is blank,
    /// a keyword repeats inside one sector, or the catalog has no keywords.
    pub fn new<I, K>(raw: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, K)>,
        K: IntoIterator<Item = String>,
    {
        let mut sectors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (sector, keywords) in raw {
            let sector = sector.trim().to_string();
            if sector.is_empty() {
                return Err(ConfigError::Validation(
                    "sector name must be non-empty".to_string(),
                ));
            }

            let mut seen = HashSet::new();
            let mut cleaned = Vec::new();
            for keyword in keywords {
                let keyword = keyword.trim().to_string();
                if keyword.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "sector '{sector}' contains an empty keyword"
                    )));
                }
                if !seen.insert(keyword.clone()) {
                    return Err(ConfigError::Validation(format!(
                        "duplicate keyword '{keyword}' in sector '{sector}'"
                    )));
                }
                cleaned.push(keyword);
            }

            if sectors.insert(sector.clone(), cleaned).is_some() {
                return Err(ConfigError::Validation(format!(
                    "duplicate sector name: '{sector}'"
                )));
            }
        }

        let catalog = Self { sectors };
        if catalog.keyword_count() == 0 {
            return Err(ConfigError::Validation(
                "catalog must contain at least one keyword".to_string(),
            ));
        }
        Ok(catalog)
    }

    /// Every (sector, keyword) pair, sectors sorted, keywords in file order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.sectors.iter().flat_map(|(sector, keywords)| {
            keywords
                .iter()
                .map(move |keyword| (sector.as_str(), keyword.as_str()))
        })
    }

    pub fn sectors(&self) -> impl Iterator<Item = &str> + '_ {
        self.sectors.keys().map(String::as_str)
    }

    #[must_use]
    pub fn keywords(&self, sector: &str) -> Option<&[String]> {
        self.sectors.get(sector).map(Vec::as_slice)
    }

    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.sectors.values().map(Vec::len).sum()
    }

    /// A catalog holding only `sector`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `sector` is not configured or
    /// has no keywords.
    pub fn restricted_to(&self, sector: &str) -> Result<Self, ConfigError> {
        let keywords = self.sectors.get(sector).ok_or_else(|| {
            ConfigError::Validation(format!("sector '{sector}' not found in catalog"))
        })?;
        if keywords.is_empty() {
            return Err(ConfigError::Validation(format!(
                "sector '{sector}' has no keywords"
            )));
        }
        let mut sectors = BTreeMap::new();
        sectors.insert(sector.to_string(), keywords.clone());
        Ok(Self { sectors })
    }
}

/// Load and validate the keyword catalog.
///
/// `.yaml` / `.yml` files are read as YAML; anything else as JSON.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<KeywordCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let raw: BTreeMap<String, Vec<String>> = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    KeywordCatalog::new(raw)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
