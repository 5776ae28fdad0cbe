//! Parsing of `ansible-playbook --list-tags` output.

use crate::error::{Error, Result};

/// Marker preceding the tag list in `--list-tags` output.
pub const TASK_TAGS_MARKER: &str = "TASK TAGS:";

/// Extract the tag list from `ansible-playbook --list-tags` output.
///
/// Ansible prints one summary line per play, e.g.
/// `      TASK TAGS: [authelia, docker, plex]`. The first such line wins.
/// Order is preserved and blank items are dropped.
pub fn parse_list_tags(output: &str) -> Result<Vec<String>> {
    let line = output
        .lines()
        .find(|line| line.contains(TASK_TAGS_MARKER))
        .ok_or(Error::MissingTaskTags)?;

    let list = line
        .split_once(TASK_TAGS_MARKER)
        .map(|(_, rest)| rest)
        .unwrap_or_default()
        .replace(['[', ']'], "");

    Ok(list
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect())
}
