use anyhow::Result;

use crate::Context;
use crate::commands::update;
use crate::config::ProjectKind;
use crate::venv;

/// `sb recreate-venv`
pub fn recreate(ctx: &Context) -> Result<()> {
    let saltbox = ctx.settings.project(ProjectKind::Saltbox);
    venv::provision(
        &ctx.settings.venv_dir(),
        &update::update_script(&saltbox.repo),
        &ctx.owner()?,
        true,
    )
}
