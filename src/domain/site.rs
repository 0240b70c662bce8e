// Site domain model
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal selector that expands to every site in a catalog.
pub const ALL_SITES: &str = "All Sites";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(String);

impl SiteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SiteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
}

impl Site {
    pub fn new(id: SiteId) -> Self {
        let name = Self::format_name(id.as_str());
        Self { id, name }
    }

    fn format_name(id: &str) -> String {
        // Convert "Site_A_" to "Site A"
        id.trim_end_matches('_').replace('_', " ")
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SelectionError {
    #[error("unknown site '{0}'")]
    UnknownSite(String),
}

/// Site selection as supplied by a caller, before wildcard expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteSelection {
    All,
    Sites(Vec<SiteId>),
}

impl SiteSelection {
    /// Parse a comma separated list. Any `All Sites` entry selects the whole catalog.
    pub fn parse(raw: &str) -> Self {
        let ids: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if ids.iter().any(|id| *id == ALL_SITES) {
            return Self::All;
        }
        Self::Sites(ids.into_iter().map(SiteId::from).collect())
    }

    /// Expand into the ordered, de-duplicated site list used for generation.
    pub fn resolve(&self, catalog: &[SiteId]) -> Result<Vec<SiteId>, SelectionError> {
        match self {
            Self::All => Ok(catalog.to_vec()),
            Self::Sites(ids) => {
                let mut resolved: Vec<SiteId> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !catalog.contains(id) {
                        return Err(SelectionError::UnknownSite(id.to_string()));
                    }
                    if !resolved.contains(id) {
                        resolved.push(id.clone());
                    }
                }
                Ok(resolved)
            }
        }
    }
}

impl Default for SiteSelection {
    fn default() -> Self {
        Self::All
    }
}
