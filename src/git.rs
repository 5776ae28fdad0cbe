//! Git plumbing for the project checkouts.

use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::runner;
use crate::ui;

/// Current HEAD commit hash of `repo`
pub fn commit_hash(repo: &Path) -> Result<String> {
    if !repo.is_dir() {
        bail!(
            "The folder '{}' does not exist. This indicates an incomplete install.",
            repo.display()
        );
    }
    runner::run_capture_in(repo, "git", &["rev-parse", "HEAD"])
        .with_context(|| format!("Failed to get the git commit hash of {}", repo.display()))
}

/// Name of the checked out branch
pub fn current_branch(repo: &Path) -> Result<String> {
    runner::run_capture_in(repo, "git", &["rev-parse", "--abbrev-ref", "HEAD"])
        .with_context(|| format!("Failed to get the current branch of {}", repo.display()))
}

/// Commit hash of `branch`'s upstream
pub fn upstream_hash(repo: &Path, branch: &str) -> Result<String> {
    let spec = format!("{branch}@{{upstream}}");
    runner::run_capture_in(repo, "git", &["rev-parse", spec.as_str()])
        .with_context(|| format!("Failed to resolve {spec} in {}", repo.display()))
}

/// Fetch from the default remote, showing git's output
pub fn fetch(repo: &Path) -> Result<()> {
    let status = runner::run_in(repo, "git", &["fetch"])?;
    if !status.success() {
        log::warn!("git fetch failed in {}: {}", repo.display(), status);
    }
    Ok(())
}

/// What to do around a fetch-and-reset
#[derive(Debug, Clone, Default)]
pub struct ResetOptions<'a> {
    /// Branch the checkout is expected to be on
    pub branch: &'a str,
    /// Shell snippet run after the reset
    pub post_fetch_script: Option<String>,
    /// `user:group` to chown the checkout to
    pub owner: Option<String>,
}

/// Pick the branch to reset onto.
///
/// When already on `target` there is nothing to ask. Otherwise `reset` decides
/// between moving to `target` and staying on `current`.
pub fn choose_branch<'a>(current: &'a str, target: &'a str, reset: bool) -> &'a str {
    if current == target || reset { target } else { current }
}

/// Hard-reset `repo` to its upstream, optionally switching branches.
///
/// Returns the branch the checkout ends up on.
pub fn fetch_and_reset(repo: &Path, opts: &ResetOptions<'_>) -> Result<String> {
    let current = current_branch(repo)?;

    let reset_to_target = if current != opts.branch {
        ui::info(&format!("Currently on branch '{current}'."));
        ui::confirm(
            &format!("Do you want to reset to the '{}' branch?", opts.branch),
            false,
        )?
    } else {
        true
    };
    let branch = choose_branch(&current, opts.branch, reset_to_target).to_string();
    if branch == current && current != opts.branch {
        ui::info(&format!("Updating the current branch '{current}'..."));
    }

    let owner_dir = repo.display().to_string();
    let mut steps: Vec<Vec<&str>> = vec![
        vec!["git", "fetch", "--quiet"],
        vec!["git", "clean", "--quiet", "-df"],
        vec!["git", "reset", "--quiet", "--hard", "@{u}"],
        vec!["git", "checkout", "--quiet", branch.as_str()],
        vec!["git", "clean", "--quiet", "-df"],
        vec!["git", "reset", "--quiet", "--hard", "@{u}"],
        vec!["git", "submodule", "update", "--init", "--recursive"],
    ];
    if let Some(owner) = &opts.owner {
        steps.push(vec!["chown", "-R", owner.as_str(), owner_dir.as_str()]);
    }

    for step in &steps {
        let (cmd, args) = step.split_first().context("empty command")?;
        if !runner::run_quiet_in(repo, cmd, args) {
            log::warn!("'{}' failed in {}", step.join(" "), repo.display());
        }
    }

    if let Some(script) = &opts.post_fetch_script
        && !runner::shell_quiet_in(repo, script)
    {
        log::warn!("'{}' failed in {}", script, repo.display());
    }

    ui::success(&format!(
        "Repository at {} has been updated. Current branch: '{}'.",
        repo.display(),
        branch
    ));
    Ok(branch)
}

/// Whether `dir` appears in `git config --get-all safe.directory` output
pub fn is_listed_safe(listing: &str, dir: &str) -> bool {
    listing.lines().any(|line| line.trim() == dir)
}

/// Mark `dir` as a git safe.directory unless it already is.
///
/// Returns true when the entry was added.
pub fn add_safe_directory(dir: &Path) -> Result<bool> {
    let dir = dir.display().to_string();
    // exits 1 when the key is unset
    let listing = runner::run_capture("git", &["config", "--global", "--get-all", "safe.directory"])
        .unwrap_or_default();

    if is_listed_safe(&listing, &dir) {
        return Ok(false);
    }

    runner::run_checked("git", &["config", "--global", "--add", "safe.directory", dir.as_str()])?;
    ui::info(&format!("Added {dir} to git safe.directory."));
    Ok(true)
}
