use serde::{Deserialize, Serialize};

/// Tags discovered for one repository at one commit.
///
/// Serialized as `{"commit": "...", "tags": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// HEAD commit hash the tags were listed at
    pub commit: String,
    /// Tags in the order ansible-playbook printed them
    pub tags: Vec<String>,
}

impl CacheEntry {
    /// Create a new entry.
    pub fn new(commit: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            commit: commit.into(),
            tags,
        }
    }

    /// Whether this entry was recorded at `commit`.
    pub fn is_at(&self, commit: &str) -> bool {
        self.commit == commit
    }

    /// Whether `tag` is one of the recorded tags.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Outcome of [`TagCache::resolve`](crate::TagCache::resolve).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Tags were served from a fresh cache entry
    Cached(Vec<String>),
    /// Tags were freshly discovered and stored
    Discovered(Vec<String>),
}

impl Lookup {
    /// The resolved tags regardless of where they came from.
    pub fn tags(&self) -> &[String] {
        match self {
            Lookup::Cached(tags) | Lookup::Discovered(tags) => tags,
        }
    }

    /// Consume and return the tags.
    pub fn into_tags(self) -> Vec<String> {
        match self {
            Lookup::Cached(tags) | Lookup::Discovered(tags) => tags,
        }
    }

    /// Whether the tags came from the cache.
    pub fn is_cached(&self) -> bool {
        matches!(self, Lookup::Cached(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_wire_format() {
        let entry = CacheEntry::new("abc", vec!["x".to_string(), "y".to_string()]);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"commit":"abc","tags":["x","y"]}"#);
    }

    #[test]
    fn test_entry_helpers() {
        let entry = CacheEntry::new("abc", vec!["plex".to_string()]);
        assert!(entry.is_at("abc"));
        assert!(!entry.is_at("abd"));
        assert!(entry.contains("plex"));
        assert!(!entry.contains("emby"));
    }

    #[test]
    fn test_lookup_accessors() {
        let cached = Lookup::Cached(vec!["a".to_string()]);
        assert!(cached.is_cached());
        assert_eq!(cached.tags(), ["a".to_string()]);

        let discovered = Lookup::Discovered(vec!["b".to_string()]);
        assert!(!discovered.is_cached());
        assert_eq!(discovered.into_tags(), vec!["b".to_string()]);
    }
}
