//! ansible-playbook invocation and tag discovery.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::path::Path;
use std::process::Command;
use tagcache::{Lookup, TagCache, parse_list_tags};
use thiserror::Error;

use crate::config::Project;
use crate::git;
use crate::ui;

/// Tags every settings refresh runs with
pub const SETTINGS_TAGS: &[&str] = &["settings"];

/// Tags skipped on settings refreshes
pub const SETTINGS_SKIP_TAGS: &[&str] = &["sanity-check", "pre-tasks"];

/// A playbook run that exited unsuccessfully; sb exits with the same code.
#[derive(Debug, Error)]
#[error("Playbook {playbook} run failed, scroll up to the failed task to review.")]
pub struct PlaybookFailed {
    pub playbook: String,
    pub code: i32,
}

/// Options for one ansible-playbook run
#[derive(Debug, Clone, Default)]
pub struct PlaybookRun {
    pub tags: Vec<String>,
    pub skip_tags: Vec<String>,
    pub verbosity: u8,
    pub extra_vars: Map<String, Value>,
}

impl PlaybookRun {
    /// The `settings` refresh run after updates and branch switches
    pub fn settings(verbosity: u8) -> Self {
        Self {
            tags: SETTINGS_TAGS.iter().map(ToString::to_string).collect(),
            skip_tags: SETTINGS_SKIP_TAGS.iter().map(ToString::to_string).collect(),
            verbosity,
            extra_vars: Map::new(),
        }
    }

    /// ansible-playbook arguments for `playbook`
    pub fn args(&self, playbook: &Path) -> Vec<String> {
        let mut args = vec![playbook.display().to_string(), "--become".to_string()];

        if !self.tags.is_empty() {
            args.push("--tags".to_string());
            args.push(self.tags.join(","));
        }

        if !self.skip_tags.is_empty() {
            args.push("--skip-tags".to_string());
            args.push(self.skip_tags.join(","));
        }

        if self.verbosity > 0 {
            args.push(format!("-{}", "v".repeat(self.verbosity as usize)));
        }

        if !self.extra_vars.is_empty() {
            args.push("--extra-vars".to_string());
            args.push(Value::Object(self.extra_vars.clone()).to_string());
        }

        args
    }
}

/// Combine `key=value` pairs into one JSON object; later keys win
pub fn parse_extra_vars(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut vars = Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid extra var '{pair}': expected key=value");
        };
        vars.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(vars)
}

/// Quote an argument for display in a POSIX shell
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r#"'"'"'"#))
    }
}

/// Run `project`'s playbook with inherited stdio
pub fn run_playbook(ansible: &Path, project: &Project, run: &PlaybookRun) -> Result<()> {
    let args = run.args(&project.playbook);
    let shown: Vec<String> = std::iter::once(ansible.display().to_string())
        .chain(args.iter().cloned())
        .map(|a| shell_quote(&a))
        .collect();
    ui::info(&format!(
        "Executing Ansible playbook with command: {}",
        shown.join(" ")
    ));

    let status = Command::new(ansible)
        .args(&args)
        .current_dir(&project.repo)
        .status()
        .with_context(|| format!("Failed to execute {}", ansible.display()))?;

    let playbook = project.playbook.display().to_string();
    if !status.success() {
        return Err(PlaybookFailed {
            playbook,
            code: status.code().unwrap_or(1),
        }
        .into());
    }

    println!();
    ui::success(&format!("Playbook {playbook} executed successfully."));
    println!();
    Ok(())
}

/// ansible-playbook arguments listing `project`'s tags
pub fn list_tags_args(project: &Project) -> Vec<String> {
    vec![
        project.playbook.display().to_string(),
        "--become".to_string(),
        "--list-tags".to_string(),
        format!("--skip-tags=always,{}", project.kind.list_skip_tags()),
    ]
}

/// Run `--list-tags` for `project` and parse the result
pub fn discover_tags(ansible: &Path, project: &Project) -> tagcache::Result<Vec<String>> {
    log::info!("Listing tags for {}", project.name());
    let output = Command::new(ansible)
        .args(list_tags_args(project))
        .current_dir(&project.repo)
        .output()?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    match parse_list_tags(&combined) {
        Err(tagcache::Error::MissingTaskTags) if !output.status.success() => {
            Err(tagcache::Error::Discovery(format!(
                "{} --list-tags exited with {}: {}",
                project.playbook.display(),
                output.status,
                combined.trim()
            )))
        }
        other => other,
    }
}

/// Tags for `project`, from the cache when HEAD hasn't moved.
///
/// Fresh discoveries are written back to the cache file immediately.
pub fn resolve_tags(cache: &mut TagCache, ansible: &Path, project: &Project) -> Result<Lookup> {
    if !project.kind.is_cacheable() {
        let tags = discover_tags(ansible, project)?;
        return Ok(Lookup::Discovered(tags));
    }

    let commit = git::commit_hash(&project.repo)?;
    let lookup = cache.resolve(&project.cache_key(), &commit, || {
        discover_tags(ansible, project)
    })?;

    if !lookup.is_cached() {
        cache
            .flush()
            .with_context(|| format!("Failed to write {}", cache.path().display()))?;
    }
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProjectKind, Settings};
    use std::path::PathBuf;

    #[test]
    fn test_settings_run_args() {
        let project = Settings::default().project(ProjectKind::Saltbox);
        let args = PlaybookRun::settings(0).args(&project.playbook);
        assert_eq!(
            args,
            vec![
                "/srv/git/saltbox/saltbox.yml",
                "--become",
                "--tags",
                "settings",
                "--skip-tags",
                "sanity-check,pre-tasks",
            ]
        );
    }

    #[test]
    fn test_run_args_with_verbosity_and_vars() {
        let run = PlaybookRun {
            tags: vec!["plex".into(), "sonarr".into()],
            skip_tags: vec![],
            verbosity: 3,
            extra_vars: parse_extra_vars(&["a=1".into(), "b=x=y".into()]).unwrap(),
        };
        let args = run.args(&PathBuf::from("/opt/sandbox/sandbox.yml"));
        assert_eq!(
            args,
            vec![
                "/opt/sandbox/sandbox.yml",
                "--become",
                "--tags",
                "plex,sonarr",
                "-vvv",
                "--extra-vars",
                r#"{"a":"1","b":"x=y"}"#,
            ]
        );
    }

    #[test]
    fn test_parse_extra_vars_last_wins() {
        let vars = parse_extra_vars(&["k=1".into(), "k=2".into()]).unwrap();
        assert_eq!(vars.get("k"), Some(&Value::String("2".into())));
    }

    #[test]
    fn test_parse_extra_vars_rejects_missing_equals() {
        assert!(parse_extra_vars(&["oops".into()]).is_err());
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("--become"), "--become");
        assert_eq!(shell_quote("/srv/git/saltbox/saltbox.yml"), "/srv/git/saltbox/saltbox.yml");
        assert_eq!(shell_quote(r#"{"a":"1"}"#), r#"'{"a":"1"}'"#);
        assert_eq!(shell_quote("it's"), r#"'it'"'"'s'"#);
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_list_tags_args() {
        let settings = Settings::default();
        assert_eq!(
            list_tags_args(&settings.project(ProjectKind::Saltbox)),
            vec![
                "/srv/git/saltbox/saltbox.yml",
                "--become",
                "--list-tags",
                "--skip-tags=always,",
            ]
        );
        assert_eq!(
            list_tags_args(&settings.project(ProjectKind::Sandbox))[3],
            "--skip-tags=always,sanity_check"
        );
    }

    #[test]
    fn test_playbook_failed_message() {
        let err = PlaybookFailed {
            playbook: "/srv/git/saltbox/saltbox.yml".into(),
            code: 2,
        };
        assert!(err.to_string().contains("saltbox.yml run failed"));
    }
}
