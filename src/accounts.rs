//! Saltbox `accounts.yml`, read for the name of the Saltbox user.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Accounts {
    pub user: AccountUser,
}

#[derive(Debug, Deserialize)]
pub struct AccountUser {
    pub name: String,
}

impl Accounts {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("The file '{}' was not found", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// `user:user` owner argument for chown
    pub fn owner(&self) -> String {
        format!("{0}:{0}", self.user.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
---
user:
  name: seed
  pass: password1234
  domain: testsaltbox.ml
  email: your@email.com
cloudflare:
  email:
  api:
"#;

    #[test]
    fn test_parse_user_name() {
        let accounts = Accounts::parse(SAMPLE).unwrap();
        assert_eq!(accounts.user.name, "seed");
        assert_eq!(accounts.owner(), "seed:seed");
    }

    #[test]
    fn test_missing_user_is_error() {
        assert!(Accounts::parse("cloudflare:\n  api: x\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Accounts::load(&dir.path().join("accounts.yml")).unwrap_err();
        assert!(err.to_string().contains("was not found"));
    }
}
