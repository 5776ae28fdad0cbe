//! `sb install`: run playbooks for the requested tags.
//!
//! Tags are routed by prefix: `sandbox-` goes to Sandbox, `mod-` to
//! Saltbox_mod, everything else to Saltbox. Routed tags are checked against
//! the tag cache before anything runs.

use anyhow::{Result, bail};
use std::collections::BTreeSet;

use crate::Context;
use crate::ansible::{self, PlaybookRun};
use crate::cli::InstallArgs;
use crate::config::ProjectKind;
use crate::ui;

/// Requested tags grouped by project, prefixes stripped
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RoutedTags {
    pub saltbox: Vec<String>,
    pub sandbox: Vec<String>,
    pub saltbox_mod: Vec<String>,
}

impl RoutedTags {
    pub fn route(tags: &[String]) -> Self {
        let mut routed = Self::default();
        for tag in tags {
            let (kind, bare) = ProjectKind::route(tag);
            routed.for_kind_mut(kind).push(bare.to_string());
        }
        routed
    }

    fn for_kind_mut(&mut self, kind: ProjectKind) -> &mut Vec<String> {
        match kind {
            ProjectKind::Saltbox => &mut self.saltbox,
            ProjectKind::Sandbox => &mut self.sandbox,
            ProjectKind::SaltboxMod => &mut self.saltbox_mod,
        }
    }

    /// Non-empty groups in run order
    pub fn groups(&self) -> Vec<(ProjectKind, &[String])> {
        [
            (ProjectKind::Saltbox, self.saltbox.as_slice()),
            (ProjectKind::SaltboxMod, self.saltbox_mod.as_slice()),
            (ProjectKind::Sandbox, self.sandbox.as_slice()),
        ]
        .into_iter()
        .filter(|(_, tags)| !tags.is_empty())
        .collect()
    }
}

/// Split comma separated arguments, trimming and dropping blanks
pub fn split_tag_args(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

pub fn run(ctx: &Context, args: InstallArgs) -> Result<()> {
    let tags = split_tag_args(&args.tags);
    let skip_tags = split_tag_args(&args.skip_tags);
    let extra_vars = ansible::parse_extra_vars(&args.extra_vars)?;

    if tags.is_empty() {
        bail!("No tags given");
    }

    let routed = RoutedTags::route(&tags);
    let groups = routed.groups();

    validate(ctx, &groups)?;

    let ansible_bin = ctx.settings.ansible_playbook();
    for (kind, tags) in groups {
        let project = ctx.settings.project(kind);
        let run = PlaybookRun {
            tags: tags.to_vec(),
            skip_tags: skip_tags.clone(),
            verbosity: ctx.verbose,
            extra_vars: extra_vars.clone(),
        };
        ansible::run_playbook(&ansible_bin, &project, &run)?;
    }

    Ok(())
}

/// Refuse tags the cached listing doesn't know about.
///
/// Stale entries are re-listed first so a fresh checkout's new roles are
/// accepted. Projects without a cache entry are not checked.
fn validate(ctx: &Context, groups: &[(ProjectKind, &[String])]) -> Result<()> {
    let mut cache = ctx.open_cache()?;
    let ansible_bin = ctx.settings.ansible_playbook();
    let mut unknown: Vec<String> = Vec::new();

    for (kind, tags) in groups {
        if !kind.is_cacheable() {
            continue;
        }
        let project = ctx.settings.project(*kind);
        let key = project.cache_key();
        if cache.get(&key).is_none() {
            log::debug!("No cached tags for {}, skipping validation", project.name());
            continue;
        }

        ansible::resolve_tags(&mut cache, &ansible_bin, &project)?;

        let missing: BTreeSet<String> = cache.missing_tags(&key, tags.iter());
        let prefix = kind.tag_prefix().unwrap_or_default();
        unknown.extend(missing.into_iter().map(|tag| format!("{prefix}{tag}")));
    }

    if !unknown.is_empty() {
        ui::warn("Run 'sb list' to see the available tags.");
        bail!("Unknown tags: {}", unknown.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_split_tag_args() {
        let tags = split_tag_args(&strings(&["plex, sonarr", "", " radarr ,", "lidarr"]));
        assert_eq!(tags, strings(&["plex", "sonarr", "radarr", "lidarr"]));
    }

    #[test]
    fn test_route_by_prefix() {
        let routed = RoutedTags::route(&strings(&[
            "plex",
            "sandbox-code_server",
            "mod-custom",
            "sandbox-bazarr",
        ]));
        assert_eq!(routed.saltbox, strings(&["plex"]));
        assert_eq!(routed.sandbox, strings(&["code_server", "bazarr"]));
        assert_eq!(routed.saltbox_mod, strings(&["custom"]));
    }

    #[test]
    fn test_groups_skip_empty_and_keep_order() {
        let routed = RoutedTags::route(&strings(&["sandbox-a", "b"]));
        let kinds: Vec<_> = routed.groups().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![ProjectKind::Saltbox, ProjectKind::Sandbox]);
    }
}
