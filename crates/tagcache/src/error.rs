use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, writing or filling the tag cache.
///
/// A missing cache file is not an error; it loads as an empty cache.
#[derive(Debug, Error)]
pub enum Error {
    /// The cache file exists but does not parse
    #[error("tag cache {path} is corrupt: {source}")]
    Corrupt {
        /// Path of the offending cache file
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// The cache could not be serialized
    #[error("failed to serialize tag cache: {0}")]
    Serialize(#[source] serde_json::Error),

    /// `ansible-playbook --list-tags` output had no `TASK TAGS:` line
    #[error("'TASK TAGS:' not found in the ansible-playbook output")]
    MissingTaskTags,

    /// Tag discovery failed for a reason reported by the caller
    #[error("tag discovery failed: {0}")]
    Discovery(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if the persisted cache itself is unusable
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Error::Corrupt { .. })
    }
}

/// Result type for tag cache operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let corrupt = Error::Corrupt {
            path: PathBuf::from("/srv/git/sb/cache.json"),
            source: parse_err,
        };
        assert!(corrupt.is_corrupt());
        assert!(corrupt.to_string().contains("/srv/git/sb/cache.json"));

        assert!(!Error::MissingTaskTags.is_corrupt());
        assert!(!Error::Discovery("boom".to_string()).is_corrupt());
    }
}
