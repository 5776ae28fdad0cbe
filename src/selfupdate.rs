//! Keep the sb checkout current before running any command.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use crate::config::{ProjectKind, Settings};
use crate::git::{self, ResetOptions};
use crate::sudo;
use crate::ui;

/// Branch sb tracks
const SB_BRANCH: &str = "master";

/// Wrapper script made executable after every update
const SB_SCRIPT: &str = "sb.sh";

/// Outcome of the startup check
#[derive(Debug, PartialEq, Eq)]
pub enum Startup {
    /// Carry on with the requested command
    Continue,
    /// sb was updated and re-executed; exit with this code
    Relaunched(i32),
}

/// Update sb if it is behind upstream, then mark project checkouts safe.
pub fn check(settings: &Settings) -> Result<Startup> {
    let sb_repo = settings.sb_repo();
    if !sb_repo.is_dir() {
        bail!("Directory does not exist: {}", sb_repo.display());
    }

    git::fetch(&sb_repo)?;
    let head = git::commit_hash(&sb_repo)?;
    let upstream = git::upstream_hash(&sb_repo, SB_BRANCH)?;

    if head != upstream {
        ui::info("Not up to date with origin. Updating.");
        update_sb(&sb_repo)?;

        ui::info("Relaunching with previous arguments.");
        let status = sudo::reexec_with_sudo(&sudo::current_args())?;
        return Ok(Startup::Relaunched(sudo::exit_code(status)));
    }

    for kind in [
        ProjectKind::SaltboxMod,
        ProjectKind::Saltbox,
        ProjectKind::Sandbox,
    ] {
        let repo = settings.project(kind).repo;
        if repo.is_dir() {
            git::add_safe_directory(&repo)?;
        }
    }

    Ok(Startup::Continue)
}

/// Reset the sb checkout to upstream master
pub fn update_sb(sb_repo: &Path) -> Result<()> {
    ui::info("Updating sb...");

    if !sb_repo.is_dir() {
        bail!("{} does not exist or is not a directory.", sb_repo.display());
    }

    let opts = ResetOptions {
        branch: SB_BRANCH,
        ..Default::default()
    };
    git::fetch_and_reset(sb_repo, &opts)?;

    let script = sb_repo.join(SB_SCRIPT);
    make_executable(&script)?;
    ui::dim(&format!("Permissions changed for {}.", script.display()));

    ui::success("sb update completed.");
    Ok(())
}

/// chmod 775
#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o775))
        .with_context(|| format!("Failed to change permissions of {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> Result<()> {
    fs::metadata(path)
        .map(|_| ())
        .with_context(|| format!("Failed to stat {}", path.display()))
}
