use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

// ============================================================================
// Settings
// ============================================================================

/// sb settings, read from `sb.toml`. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// ansible-playbook binary inside the Saltbox venv
    pub ansible_playbook: String,
    /// Tag cache file
    pub cache_file: String,
    /// Checkout of sb itself
    pub sb_repo: String,
    /// Root of the Ansible virtual environment
    pub venv_dir: String,
    /// Saltbox `accounts.yml`
    pub accounts_file: String,
    /// Saltbox localhost inventory overrides
    pub inventory_file: String,
    /// Benchmark script location
    pub bench_url: String,
    pub saltbox: ProjectConfig,
    pub sandbox: ProjectConfig,
    pub saltbox_mod: ProjectConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub repo: String,
    /// Playbook file name relative to `repo`
    pub playbook: String,
}

impl ProjectConfig {
    fn new(repo: &str, playbook: &str) -> Self {
        Self {
            repo: repo.to_string(),
            playbook: playbook.to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ansible_playbook: "/usr/local/bin/ansible-playbook".to_string(),
            cache_file: "/srv/git/sb/cache.json".to_string(),
            sb_repo: "/srv/git/sb".to_string(),
            venv_dir: "/srv/ansible".to_string(),
            accounts_file: "/srv/git/saltbox/accounts.yml".to_string(),
            inventory_file: "/srv/git/saltbox/inventories/host_vars/localhost.yml".to_string(),
            bench_url: "https://bench.sh".to_string(),
            saltbox: ProjectConfig::new("/srv/git/saltbox", "saltbox.yml"),
            sandbox: ProjectConfig::new("/opt/sandbox", "sandbox.yml"),
            saltbox_mod: ProjectConfig::new("/opt/saltbox_mod", "saltbox_mod.yml"),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn ansible_playbook(&self) -> PathBuf {
        paths::expand(&self.ansible_playbook)
    }

    pub fn cache_file(&self) -> PathBuf {
        paths::expand(&self.cache_file)
    }

    pub fn sb_repo(&self) -> PathBuf {
        paths::expand(&self.sb_repo)
    }

    pub fn venv_dir(&self) -> PathBuf {
        paths::expand(&self.venv_dir)
    }

    pub fn accounts_file(&self) -> PathBuf {
        paths::expand(&self.accounts_file)
    }

    pub fn inventory_file(&self) -> PathBuf {
        paths::expand(&self.inventory_file)
    }

    /// Resolve one project
    pub fn project(&self, kind: ProjectKind) -> Project {
        let config = match kind {
            ProjectKind::Saltbox => &self.saltbox,
            ProjectKind::Sandbox => &self.sandbox,
            ProjectKind::SaltboxMod => &self.saltbox_mod,
        };
        let repo = paths::expand(&config.repo);
        let playbook = repo.join(&config.playbook);
        Project {
            kind,
            repo,
            playbook,
        }
    }

    /// Projects present on this machine, in listing order.
    ///
    /// Saltbox and Sandbox are always included; Saltbox_mod only when checked out.
    pub fn projects(&self) -> Vec<Project> {
        let mut projects = vec![
            self.project(ProjectKind::Saltbox),
            self.project(ProjectKind::Sandbox),
        ];
        let saltbox_mod = self.project(ProjectKind::SaltboxMod);
        if saltbox_mod.repo.is_dir() {
            projects.push(saltbox_mod);
        }
        projects
    }
}

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectKind {
    Saltbox,
    Sandbox,
    SaltboxMod,
}

impl ProjectKind {
    pub fn name(self) -> &'static str {
        match self {
            ProjectKind::Saltbox => "Saltbox",
            ProjectKind::Sandbox => "Sandbox",
            ProjectKind::SaltboxMod => "Saltbox_mod",
        }
    }

    /// Prefix selecting this project on `sb install`
    pub fn tag_prefix(self) -> Option<&'static str> {
        match self {
            ProjectKind::Saltbox => None,
            ProjectKind::Sandbox => Some("sandbox-"),
            ProjectKind::SaltboxMod => Some("mod-"),
        }
    }

    /// Tags skipped on top of `always` when listing
    pub fn list_skip_tags(self) -> &'static str {
        match self {
            ProjectKind::Saltbox => "",
            ProjectKind::Sandbox | ProjectKind::SaltboxMod => "sanity_check",
        }
    }

    /// Saltbox_mod is a user checkout without a stable HEAD worth caching
    pub fn is_cacheable(self) -> bool {
        !matches!(self, ProjectKind::SaltboxMod)
    }

    /// Route a prefixed install tag to its project, returning the bare tag
    pub fn route(tag: &str) -> (ProjectKind, &str) {
        for kind in [ProjectKind::SaltboxMod, ProjectKind::Sandbox] {
            if let Some(prefix) = kind.tag_prefix()
                && let Some(bare) = tag.strip_prefix(prefix)
            {
                return (kind, bare);
            }
        }
        (ProjectKind::Saltbox, tag)
    }
}

/// One Ansible repository driven by sb
#[derive(Debug, Clone)]
pub struct Project {
    pub kind: ProjectKind,
    pub repo: PathBuf,
    pub playbook: PathBuf,
}

impl Project {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Cache key for this project
    pub fn cache_key(&self) -> String {
        self.repo.to_string_lossy().into_owned()
    }

    /// Heading printed above this project's tag listing
    pub fn list_title(&self) -> String {
        match self.kind.tag_prefix() {
            Some(prefix) => format!("{} tags (prepend {prefix}):", self.name()),
            None => format!("{} tags:", self.name()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
