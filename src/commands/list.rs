//! `sb list`: tags of every installed project.
//!
//! Projects whose cache entry is current are printed straight from the cache.
//! The rest are listed with `ansible-playbook --list-tags` in parallel, then
//! written back to the cache one at a time.

use anyhow::{Context, Result};
use colored::Colorize;
use rayon::prelude::*;
use std::collections::HashMap;

use crate::Context as AppContext;
use crate::ansible;
use crate::config::{Project, ProjectKind};
use crate::git;
use crate::ui;

/// Where a project's tags come from this run
enum Plan {
    Cached(Vec<String>),
    /// Needs discovery; `commit` is set for cacheable projects
    Discover { commit: Option<String> },
    Failed(String),
}

pub fn run(ctx: &AppContext) -> Result<()> {
    let mut cache = ctx.open_cache()?;
    let projects = ctx.settings.projects();

    let plans: Vec<Plan> = projects
        .iter()
        .map(|project| plan(&cache, project))
        .collect();

    let pending: Vec<&Project> = projects
        .iter()
        .zip(&plans)
        .filter(|(_, plan)| matches!(plan, Plan::Discover { .. }))
        .map(|(project, _)| project)
        .collect();

    let ansible_bin = ctx.settings.ansible_playbook();
    let mut discovered: HashMap<ProjectKind, tagcache::Result<Vec<String>>> = HashMap::new();
    if !pending.is_empty() {
        let names: Vec<&str> = pending.iter().map(|p| p.name()).collect();
        let pb = ui::spinner(&format!("Listing tags for {}...", names.join(", ")));

        discovered = pending
            .par_iter()
            .map(|project| (project.kind, ansible::discover_tags(&ansible_bin, project)))
            .collect();

        pb.finish_and_clear();
    }

    for (index, (project, plan)) in projects.iter().zip(plans).enumerate() {
        if index > 0 {
            println!();
        }

        let (tags, cached) = match plan {
            Plan::Cached(tags) => (Ok(tags), true),
            Plan::Failed(message) => (Err(message), false),
            Plan::Discover { commit } => {
                let result = discovered
                    .remove(&project.kind)
                    .unwrap_or_else(|| Err(tagcache::Error::Discovery("not run".to_string())));
                match result {
                    Ok(tags) => {
                        if let Some(commit) = commit
                            && let Err(e) = store(&mut cache, project, &commit, tags.clone())
                        {
                            ui::error(&format!("{e:#}"));
                        }
                        (Ok(tags), false)
                    }
                    Err(e) => (Err(e.to_string()), false),
                }
            }
        };

        print_project(project, tags, cached);
    }

    Ok(())
}

/// Record freshly listed tags and write the cache back
fn store(
    cache: &mut tagcache::TagCache,
    project: &Project,
    commit: &str,
    tags: Vec<String>,
) -> Result<()> {
    cache.put(&project.cache_key(), commit, tags);
    cache
        .flush()
        .with_context(|| format!("Failed to write {}", cache.path().display()))
}

fn plan(cache: &tagcache::TagCache, project: &Project) -> Plan {
    if !project.kind.is_cacheable() {
        return Plan::Discover { commit: None };
    }

    let commit = match git::commit_hash(&project.repo) {
        Ok(commit) => commit,
        Err(e) => return Plan::Failed(format!("{e:#}")),
    };

    let key = project.cache_key();
    if cache.is_fresh(&key, &commit)
        && let Some(entry) = cache.get(&key)
    {
        return Plan::Cached(entry.tags.clone());
    }

    Plan::Discover {
        commit: Some(commit),
    }
}

fn print_project(project: &Project, tags: Result<Vec<String>, String>, cached: bool) {
    let status = if cached { " (cached)" } else { "" };
    println!("{}{}", project.list_title().bold(), status.dimmed());
    println!();

    match tags {
        Ok(tags) => ui::print_columns(&tags),
        Err(message) => ui::error(&format!("Error: {message}")),
    }
}
