//! File-backed tag cache.
//!
//! The whole mapping is loaded by [`TagCache::open`] and written back by
//! [`TagCache::flush`]. Writes land in a sibling `.tmp` file that is renamed
//! over the cache file. Concurrent writers are not coordinated; the last flush
//! wins.

use crate::error::{Error, Result};
use crate::types::{CacheEntry, Lookup};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Commit-keyed cache of playbook tags, one entry per repository path.
#[derive(Debug)]
pub struct TagCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl TagCache {
    /// Load the cache stored at `path`.
    ///
    /// A missing or unreadable file yields an empty cache. A file that can be
    /// read but is not valid UTF-8 JSON is reported as [`Error::Corrupt`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() == ErrorKind::NotFound {
                    log::debug!("Tag cache {} does not exist yet", path.display());
                } else {
                    log::warn!(
                        "Could not read tag cache {}: {}; starting empty",
                        path.display(),
                        e
                    );
                }
                return Ok(Self::empty(path));
            }
        };

        let entries: BTreeMap<String, CacheEntry> = serde_json::from_slice(&content)
            .map_err(|source| Error::Corrupt {
                path: path.clone(),
                source,
            })?;

        log::debug!(
            "Loaded {} tag cache entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { path, entries })
    }

    /// An empty cache that will be written to `path` on flush.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of cached repositories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `repo_path`, if any.
    pub fn get(&self, repo_path: &str) -> Option<&CacheEntry> {
        self.entries.get(repo_path)
    }

    /// Record `tags` for `repo_path` at `commit`, replacing any previous entry.
    ///
    /// Only the in-memory mapping changes; call [`flush`](Self::flush) to persist.
    pub fn put(&mut self, repo_path: &str, commit: &str, tags: Vec<String>) {
        log::debug!(
            "Caching {} tags for {} at {}",
            tags.len(),
            repo_path,
            commit
        );
        self.entries
            .insert(repo_path.to_string(), CacheEntry::new(commit, tags));
    }

    /// True iff an entry exists for `repo_path` and was recorded at `current_commit`.
    pub fn is_fresh(&self, repo_path: &str, current_commit: &str) -> bool {
        self.get(repo_path)
            .is_some_and(|entry| entry.is_at(current_commit))
    }

    /// Requested tags that are absent from the cached tag set.
    ///
    /// Without an entry for `repo_path` nothing is reported missing, so a first
    /// run never blocks on an empty cache.
    pub fn missing_tags<I, S>(&self, repo_path: &str, requested: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(entry) = self.get(repo_path) else {
            return BTreeSet::new();
        };

        requested
            .into_iter()
            .filter(|tag| !entry.contains(tag.as_ref()))
            .map(|tag| tag.as_ref().to_string())
            .collect()
    }

    /// Cached tags when fresh, otherwise run `discover` and store its result.
    ///
    /// A failing `discover` leaves the cache untouched. The caller still has to
    /// [`flush`](Self::flush) a [`Lookup::Discovered`] result.
    pub fn resolve<F>(&mut self, repo_path: &str, current_commit: &str, discover: F) -> Result<Lookup>
    where
        F: FnOnce() -> Result<Vec<String>>,
    {
        if let Some(entry) = self.get(repo_path)
            && entry.is_at(current_commit)
        {
            log::debug!("Tag cache hit for {} at {}", repo_path, current_commit);
            return Ok(Lookup::Cached(entry.tags.clone()));
        }

        log::debug!("Tag cache miss for {} at {}", repo_path, current_commit);
        let tags = discover()?;
        self.put(repo_path, current_commit, tags.clone());
        Ok(Lookup::Discovered(tags))
    }

    /// Write the whole mapping back to disk.
    pub fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string(&self.entries).map_err(Error::Serialize)?;

        let tmp = self.tmp_path();
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;

        log::debug!(
            "Saved {} tag cache entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "cache.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn cache_with(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = TagCache::open(dir.path().join("cache.json")).unwrap();
        assert!(cache.is_empty());
        assert!(cache.get("A").is_none());
    }

    #[test]
    fn test_uncached_repo_is_never_fresh_and_misses_nothing() {
        let dir = TempDir::new().unwrap();
        let cache = TagCache::open(dir.path().join("cache.json")).unwrap();
        assert!(!cache.is_fresh("/srv/git/saltbox", "abc"));
        assert!(!cache.is_fresh("/srv/git/saltbox", ""));
        assert!(cache.missing_tags("/srv/git/saltbox", ["plex", "sonarr"]).is_empty());
    }

    #[test]
    fn test_scenario_from_existing_file() {
        let (_dir, path) = cache_with(r#"{"A": {"commit": "abc", "tags": ["x","y"]}}"#);
        let cache = TagCache::open(&path).unwrap();

        assert!(cache.is_fresh("A", "abc"));
        assert!(!cache.is_fresh("A", "def"));

        let missing = cache.missing_tags("A", ["x", "z"]);
        assert_eq!(missing, BTreeSet::from(["z".to_string()]));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (_dir, path) = cache_with("{not json");
        let err = TagCache::open(&path).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_non_utf8_file_is_corrupt_and_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, [0xFF, 0xFE]).unwrap();

        assert!(TagCache::open(&path).unwrap_err().is_corrupt());
        assert_eq!(fs::read(&path).unwrap(), vec![0xFF, 0xFE]);
    }

    #[test]
    fn test_unreadable_path_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::create_dir(&path).unwrap();

        let cache = TagCache::open(&path).unwrap();
        assert!(cache.is_empty());
        assert!(!cache.is_fresh("A", "abc"));
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let (_dir, path) = cache_with(r#"{"A": ["x", "y"]}"#);
        assert!(TagCache::open(&path).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let mut cache = TagCache::open(dir.path().join("cache.json")).unwrap();

        cache.put("A", "abc", tags(&["x", "y"]));

        let entry = cache.get("A").unwrap();
        assert_eq!(entry.commit, "abc");
        assert_eq!(entry.tags, tags(&["x", "y"]));
    }

    #[test]
    fn test_put_survives_flush_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let mut cache = TagCache::open(&path).unwrap();
        cache.put("A", "abc", tags(&["y", "x"]));
        cache.flush().unwrap();

        let reopened = TagCache::open(&path).unwrap();
        assert_eq!(
            reopened.get("A"),
            Some(&CacheEntry::new("abc", tags(&["y", "x"])))
        );
        assert!(!path.with_file_name("cache.json.tmp").exists());
    }

    #[test]
    fn test_put_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = TagCache::open(&path).unwrap();
        cache.put("A", "abc", tags(&["x"]));
        cache.flush().unwrap();
        let once = fs::read_to_string(&path).unwrap();

        cache.put("A", "abc", tags(&["x"]));
        cache.flush().unwrap();
        let twice = fs::read_to_string(&path).unwrap();

        assert_eq!(once, twice);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_merges_with_other_entries() {
        let (_dir, path) = cache_with(
            r#"{"A": {"commit": "abc", "tags": ["x"]}, "B": {"commit": "111", "tags": ["b"]}}"#,
        );

        let mut cache = TagCache::open(&path).unwrap();
        cache.put("A", "def", tags(&["x", "z"]));
        cache.flush().unwrap();

        let reopened = TagCache::open(&path).unwrap();
        assert_eq!(reopened.get("B"), Some(&CacheEntry::new("111", tags(&["b"]))));
        assert!(reopened.is_fresh("A", "def"));
        assert!(!reopened.is_fresh("A", "abc"));
    }

    #[test]
    fn test_missing_tags_subset_is_empty() {
        let mut cache = TagCache::empty("/nonexistent/cache.json");
        cache.put("A", "abc", tags(&["x", "y", "z"]));
        assert!(cache.missing_tags("A", ["z", "x"]).is_empty());
        assert!(cache.missing_tags("A", Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_missing_tags_reports_absent_only() {
        let mut cache = TagCache::empty("/nonexistent/cache.json");
        cache.put("A", "abc", tags(&["x", "y"]));
        let missing = cache.missing_tags("A", ["x", "nope", "y", "nope"]);
        assert_eq!(missing, BTreeSet::from(["nope".to_string()]));
    }

    #[test]
    fn test_resolve_uses_fresh_entry() {
        let mut cache = TagCache::empty("/nonexistent/cache.json");
        cache.put("A", "abc", tags(&["x"]));

        let lookup = cache
            .resolve("A", "abc", || panic!("discovery must not run"))
            .unwrap();
        assert_eq!(lookup, Lookup::Cached(tags(&["x"])));
    }

    #[test]
    fn test_resolve_rediscovers_stale_entry() {
        let mut cache = TagCache::empty("/nonexistent/cache.json");
        cache.put("A", "abc", tags(&["x"]));

        let lookup = cache.resolve("A", "def", || Ok(tags(&["x", "y"]))).unwrap();
        assert_eq!(lookup, Lookup::Discovered(tags(&["x", "y"])));
        assert!(cache.is_fresh("A", "def"));
    }

    #[test]
    fn test_resolve_failure_leaves_cache_untouched() {
        let mut cache = TagCache::empty("/nonexistent/cache.json");
        cache.put("A", "abc", tags(&["x"]));

        let result = cache.resolve("A", "def", || Err(Error::Discovery("exit 2".into())));
        assert!(result.is_err());
        assert!(cache.is_fresh("A", "abc"));
    }
}
