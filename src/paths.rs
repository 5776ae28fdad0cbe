//! Path resolution for sb
//!
//! sb runs as root on a Saltbox host, so its defaults are absolute system
//! paths rather than per-user directories.
//!
//! # Environment Variables
//!
//! - `SB_CONFIG` - Override the settings file (default `/srv/git/sb/sb.toml`)

use std::path::PathBuf;

/// Environment variable for settings file override
pub const ENV_CONFIG: &str = "SB_CONFIG";

/// Default settings file, next to the sb checkout
pub const DEFAULT_CONFIG_FILE: &str = "/srv/git/sb/sb.toml";

/// Get the settings file path
///
/// Priority:
/// 1. `SB_CONFIG` env var
/// 2. `/srv/git/sb/sb.toml`
pub fn config_file() -> PathBuf {
    if let Ok(file) = std::env::var(ENV_CONFIG) {
        let path = expand(&file);
        log::debug!("Using settings file from {}: {}", ENV_CONFIG, path.display());
        return path;
    }

    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables leave the string as it was.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_file_env_override() {
        let original = env::var(ENV_CONFIG).ok();
        // SAFETY: no other test reads SB_CONFIG
        unsafe { env::set_var(ENV_CONFIG, "/custom/sb.toml") };
        let result = config_file();
        match original {
            // SAFETY: as above
            Some(v) => unsafe { env::set_var(ENV_CONFIG, v) },
            None => unsafe { env::remove_var(ENV_CONFIG) },
        }
        assert_eq!(result, PathBuf::from("/custom/sb.toml"));
    }

    #[test]
    fn test_expand_with_tilde() {
        let result = expand("~/test/path");
        let home = dirs::home_dir().unwrap();
        assert_eq!(result, home.join("test").join("path"));
    }

    #[test]
    fn test_expand_absolute() {
        assert_eq!(expand("/srv/git/saltbox"), PathBuf::from("/srv/git/saltbox"));
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/srv/$NONEXISTENT_SB_VAR_12345/cache.json");
        assert_eq!(
            result,
            PathBuf::from("/srv/$NONEXISTENT_SB_VAR_12345/cache.json")
        );
    }
}
