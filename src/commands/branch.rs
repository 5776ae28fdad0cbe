//! `sb branch` and `sb sandbox-branch`.

use anyhow::Result;

use crate::Context;
use crate::cli::BranchArgs;
use crate::commands::update;
use crate::config::ProjectKind;
use crate::git::ResetOptions;
use crate::ui;

pub fn run(ctx: &Context, kind: ProjectKind, args: BranchArgs) -> Result<()> {
    let project = ctx.settings.project(kind);
    ui::header(&format!("Switching {} repository branch...", project.name()));
    update::require_checkout(&project)?;

    let opts = ResetOptions {
        branch: &args.branch_name,
        post_fetch_script: None,
        owner: Some(ctx.owner()?),
    };
    update::reset_and_apply_settings(ctx, &project, &opts)?;
    update::refresh_tags(ctx, &project)?;

    ui::success(&format!(
        "{} repository branch switched to {} and settings updated.",
        project.name(),
        args.branch_name
    ));
    Ok(())
}
