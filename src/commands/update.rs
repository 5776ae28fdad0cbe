//! `sb update` and the refresh steps shared with branch switching.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use crate::Context as AppContext;
use crate::ansible::{self, PlaybookRun};
use crate::config::{Project, ProjectKind};
use crate::git::{self, ResetOptions};
use crate::ui;
use crate::venv;

/// Branch `sb update` resets the projects to
pub const DEFAULT_BRANCH: &str = "master";

pub fn run(ctx: &AppContext) -> Result<()> {
    update_saltbox(ctx)?;
    update_sandbox(ctx)
}

fn update_saltbox(ctx: &AppContext) -> Result<()> {
    ui::header("Updating Saltbox...");

    let project = ctx.settings.project(ProjectKind::Saltbox);
    require_checkout(&project)?;

    let owner = ctx.owner()?;
    venv::provision(
        &ctx.settings.venv_dir(),
        &update_script(&project.repo),
        &owner,
        false,
    )?;

    let opts = ResetOptions {
        branch: DEFAULT_BRANCH,
        post_fetch_script: Some(format!("bash {}", update_script(&project.repo).display())),
        owner: Some(owner),
    };
    update_project(ctx, &project, &opts)?;

    ui::success("Saltbox Update Completed.");
    Ok(())
}

fn update_sandbox(ctx: &AppContext) -> Result<()> {
    ui::header("Updating Sandbox...");

    let project = ctx.settings.project(ProjectKind::Sandbox);
    require_checkout(&project)?;

    let opts = ResetOptions {
        branch: DEFAULT_BRANCH,
        post_fetch_script: None,
        owner: Some(ctx.owner()?),
    };
    update_project(ctx, &project, &opts)?;

    ui::success("Sandbox Update Completed.");
    Ok(())
}

/// Reset, re-apply settings, and refresh the tag cache if HEAD moved
fn update_project(ctx: &AppContext, project: &Project, opts: &ResetOptions<'_>) -> Result<()> {
    let old_commit = git::commit_hash(&project.repo)?;

    reset_and_apply_settings(ctx, project, opts)?;

    let new_commit = git::commit_hash(&project.repo)?;
    if old_commit != new_commit {
        ui::info(&format!(
            "{} Commit Hash changed, updating tags cache.",
            project.name()
        ));
        refresh_tags(ctx, project)?;
    }
    Ok(())
}

/// Fetch/reset `project`, restore its ansible.cfg and run the settings role
pub(crate) fn reset_and_apply_settings(
    ctx: &AppContext,
    project: &Project,
    opts: &ResetOptions<'_>,
) -> Result<()> {
    git::fetch_and_reset(&project.repo, opts)?;
    install_ansible_cfg(&project.repo)?;
    ansible::run_playbook(
        &ctx.settings.ansible_playbook(),
        project,
        &PlaybookRun::settings(ctx.verbose),
    )
}

/// Re-list `project`'s tags into the cache unless it is already current
pub(crate) fn refresh_tags(ctx: &AppContext, project: &Project) -> Result<()> {
    let mut cache = ctx.open_cache()?;
    let pb = ui::spinner(&format!("Listing {} tags...", project.name()));
    let result = ansible::resolve_tags(&mut cache, &ctx.settings.ansible_playbook(), project);
    pb.finish_and_clear();

    let lookup = result?;
    log::info!(
        "{} has {} tags{}",
        project.name(),
        lookup.tags().len(),
        if lookup.is_cached() { " (cached)" } else { "" }
    );
    Ok(())
}

pub(crate) fn require_checkout(project: &Project) -> Result<()> {
    if !project.repo.is_dir() {
        bail!(
            "{} does not exist or is not a directory.",
            project.repo.display()
        );
    }
    Ok(())
}

pub(crate) fn update_script(repo: &Path) -> PathBuf {
    repo.join("scripts").join("update.sh")
}

/// Copy `defaults/ansible.cfg.default` over `ansible.cfg`
pub(crate) fn install_ansible_cfg(repo: &Path) -> Result<()> {
    let source = repo.join("defaults").join("ansible.cfg.default");
    let target = repo.join("ansible.cfg");
    fs::copy(&source, &target).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            source.display(),
            target.display()
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_install_ansible_cfg() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("defaults")).unwrap();
        fs::write(
            dir.path().join("defaults").join("ansible.cfg.default"),
            "[defaults]\nforks = 10\n",
        )
        .unwrap();
        fs::write(dir.path().join("ansible.cfg"), "stale").unwrap();

        install_ansible_cfg(dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("ansible.cfg")).unwrap();
        assert_eq!(content, "[defaults]\nforks = 10\n");
    }

    #[test]
    fn test_install_ansible_cfg_missing_default() {
        let dir = TempDir::new().unwrap();
        assert!(install_ansible_cfg(dir.path()).is_err());
    }

    #[test]
    fn test_require_checkout() {
        let dir = TempDir::new().unwrap();
        let project = Project {
            kind: ProjectKind::Sandbox,
            repo: dir.path().join("sandbox"),
            playbook: dir.path().join("sandbox").join("sandbox.yml"),
        };
        assert!(require_checkout(&project).is_err());

        fs::create_dir_all(&project.repo).unwrap();
        assert!(require_checkout(&project).is_ok());
    }

    #[test]
    fn test_update_script_path() {
        assert_eq!(
            update_script(Path::new("/srv/git/saltbox")),
            PathBuf::from("/srv/git/saltbox/scripts/update.sh")
        );
    }
}
