//! Static directory of known organizations
//!
//! `search` is pure and synchronous. Callers that search as the user types
//! go through [`SearchDebouncer`] instead of calling it per keystroke.

mod debounce;

pub use debounce::{SearchDebouncer, SearchResults};

use cld_common::{OrganizationRef, Result};
use std::path::Path;

/// Maximum number of matches returned by [`Directory::search`]
pub const SEARCH_RESULT_LIMIT: usize = 10;

const BUILTIN_DIRECTORY: &str = include_str!("../../data/directory.json");

/// In-memory organization directory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: Vec<OrganizationRef>,
}

impl Directory {
    pub fn new(entries: Vec<OrganizationRef>) -> Self {
        Self { entries }
    }

    /// Directory compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_DIRECTORY)
    }

    /// JSON array of `{name, domain, ticker?}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<OrganizationRef> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let directory = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            entries = directory.len(),
            "Loaded organization directory"
        );
        Ok(directory)
    }

    pub fn entries(&self) -> &[OrganizationRef] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match on name or domain
    ///
    /// Blank queries match nothing. Results keep directory order and are
    /// capped at [`SEARCH_RESULT_LIMIT`].
    pub fn search(&self, query: &str) -> Vec<OrganizationRef> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|org| {
                org.name.to_lowercase().contains(&needle)
                    || org.domain.to_lowercase().contains(&needle)
            })
            .take(SEARCH_RESULT_LIMIT)
            .cloned()
            .collect()
    }

    /// Exact (trimmed, case-insensitive) match on name or domain
    pub fn resolve(&self, text: &str) -> Option<&OrganizationRef> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.entries
            .iter()
            .find(|org| org.name.to_lowercase() == needle || org.domain.to_lowercase() == needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Directory {
        Directory::new(vec![
            OrganizationRef::new("Acme Co", "acme.com"),
            OrganizationRef::new("Beta Industries", "beta.io").with_ticker("BETA"),
            OrganizationRef::new("Gamma Holdings", "gamma-acme.net"),
        ])
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        let dir = sample();
        assert!(dir.search("").is_empty());
        assert!(dir.search("   ").is_empty());
        assert!(dir.search("\t\n").is_empty());
    }

    #[test]
    fn test_matches_name_or_domain_case_insensitive() {
        let dir = sample();

        let names: Vec<String> = dir.search("ACME").into_iter().map(|o| o.name).collect();
        // "Gamma Holdings" matches through its domain; directory order kept
        assert_eq!(names, vec!["Acme Co", "Gamma Holdings"]);

        let by_domain = dir.search(" .IO ");
        assert_eq!(by_domain.len(), 1);
        assert_eq!(by_domain[0].ticker.as_deref(), Some("BETA"));
    }

    #[test]
    fn test_no_match() {
        assert!(sample().search("zeta").is_empty());
    }

    #[test]
    fn test_result_cap() {
        let entries = (0..25)
            .map(|i| OrganizationRef::new(format!("Org {}", i), format!("org{}.example", i)))
            .collect();
        let dir = Directory::new(entries);

        let results = dir.search("org");
        assert_eq!(results.len(), SEARCH_RESULT_LIMIT);
        assert_eq!(results[0].name, "Org 0");
        assert_eq!(results[9].name, "Org 9");
    }

    #[test]
    fn test_builtin_directory_properties() {
        let dir = Directory::builtin().expect("embedded directory parses");
        assert!(dir.len() > SEARCH_RESULT_LIMIT);

        for query in ["a", "N", "com", "shell", "Group"] {
            let needle = query.to_lowercase();
            let results = dir.search(query);
            assert!(results.len() <= SEARCH_RESULT_LIMIT);
            for org in &results {
                assert!(
                    org.name.to_lowercase().contains(&needle)
                        || org.domain.to_lowercase().contains(&needle),
                    "{} does not match {}",
                    org.name,
                    query
                );
            }
        }
    }

    #[test]
    fn test_resolve_exact_only() {
        let dir = sample();
        assert_eq!(dir.resolve("acme.com").map(|o| o.name.as_str()), Some("Acme Co"));
        assert_eq!(dir.resolve("  ACME CO ").map(|o| o.name.as_str()), Some("Acme Co"));
        assert!(dir.resolve("acme").is_none());
        assert!(dir.resolve("").is_none());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.json");
        std::fs::write(&path, r#"[{"name":"Delta","domain_or_identifier":"delta.org"}]"#).unwrap();

        let loaded = Directory::from_json_file(&path).unwrap();
        assert_eq!(loaded.entries()[0].domain, "delta.org");
    }
}
