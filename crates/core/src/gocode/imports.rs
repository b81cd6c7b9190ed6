//! Import set with tiered ordering.
//!
//! Paths are stored once and partitioned at emission time:
//! standard library first, then third-party (first segment contains a dot),
//! then first-party paths under the configured prefix. Each tier is sorted.

use std::collections::BTreeSet;

/// Import tier, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportTier {
    Std,
    ThirdParty,
    Local,
}

impl ImportTier {
    /// Classify a path against the first-party prefix.
    ///
    /// An empty prefix never matches, so every dotted path is third-party.
    pub fn classify(path: &str, local_prefix: &str) -> Self {
        let prefix = local_prefix.trim_end_matches('/');
        if !prefix.is_empty()
            && (path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/')))
        {
            return ImportTier::Local;
        }
        let first_segment = path.split('/').next().unwrap_or(path);
        if first_segment.contains('.') {
            ImportTier::ThirdParty
        } else {
            ImportTier::Std
        }
    }
}

/// Set of unique import paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    paths: BTreeSet<String>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path. Returns false when it was already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        assert!(!path.trim().is_empty(), "import path must not be empty");
        self.paths.insert(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Non-empty tiers in emission order, each sorted lexicographically.
    pub fn tiers(&self, local_prefix: &str) -> Vec<Vec<String>> {
        let mut std = Vec::new();
        let mut third_party = Vec::new();
        let mut local = Vec::new();
        // BTreeSet iteration is already sorted, so each tier stays sorted.
        for path in &self.paths {
            match ImportTier::classify(path, local_prefix) {
                ImportTier::Std => std.push(path.clone()),
                ImportTier::ThirdParty => third_party.push(path.clone()),
                ImportTier::Local => local.push(path.clone()),
            }
        }
        [std, third_party, local]
            .into_iter()
            .filter(|tier| !tier.is_empty())
            .collect()
    }

    /// All paths flattened in emission order.
    pub fn ordered(&self, local_prefix: &str) -> Vec<String> {
        self.tiers(local_prefix).into_iter().flatten().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ImportSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ImportSet::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiered_order() {
        let set: ImportSet = ["fmt", "github.com/a/b", "github.com/test/x", "strings"]
            .into_iter()
            .collect();
        assert_eq!(
            set.ordered("github.com/test"),
            vec!["fmt", "strings", "github.com/a/b", "github.com/test/x"]
        );
    }

    #[test]
    fn test_tiers_are_grouped() {
        let set: ImportSet = [
            "net/http",
            "context",
            "github.com/go-playground/validator/v10",
            "example.com/acme/svc/models",
        ]
        .into_iter()
        .collect();
        assert_eq!(
            set.tiers("example.com/acme/svc"),
            vec![
                vec!["context".to_string(), "net/http".to_string()],
                vec!["github.com/go-playground/validator/v10".to_string()],
                vec!["example.com/acme/svc/models".to_string()],
            ]
        );
    }

    #[test]
    fn test_prefix_must_match_whole_segment() {
        assert_eq!(
            ImportTier::classify("github.com/testing/x", "github.com/test"),
            ImportTier::ThirdParty
        );
        assert_eq!(
            ImportTier::classify("github.com/test", "github.com/test/"),
            ImportTier::Local
        );
    }

    #[test]
    fn test_empty_prefix_never_local() {
        assert_eq!(ImportTier::classify("github.com/a/b", ""), ImportTier::ThirdParty);
        assert_eq!(ImportTier::classify("encoding/json", ""), ImportTier::Std);
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut set = ImportSet::new();
        assert!(set.insert("fmt"));
        assert!(!set.insert("fmt"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    #[should_panic(expected = "import path must not be empty")]
    fn test_empty_path_panics() {
        ImportSet::new().insert("  ");
    }
}
