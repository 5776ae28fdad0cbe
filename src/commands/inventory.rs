use anyhow::{Result, bail};

use crate::Context;
use crate::runner;
use crate::ui;

/// Editor used when `$EDITOR` is unset or rejected
const DEFAULT_EDITOR: &str = "nano";

/// Editors opened without asking
const APPROVED_EDITORS: &[&str] = &["nano", "vim", "vi", "emacs", "gedit", "code"];

#[derive(Debug, PartialEq, Eq)]
enum EditorChoice {
    /// Known editor, open directly
    Approved(String),
    /// Unrecognized `$EDITOR`; ask before using it
    Unrecognized(String),
}

fn choose_editor(env_editor: Option<&str>) -> EditorChoice {
    let editor = env_editor
        .filter(|e| !e.trim().is_empty())
        .unwrap_or(DEFAULT_EDITOR);

    if APPROVED_EDITORS.contains(&editor) {
        EditorChoice::Approved(editor.to_string())
    } else {
        EditorChoice::Unrecognized(editor.to_string())
    }
}

pub fn run(ctx: &Context) -> Result<()> {
    let file = ctx.settings.inventory_file();
    if !file.is_file() {
        bail!(
            "The inventory file '{}' does not yet exist.",
            file.display()
        );
    }

    let env_editor = std::env::var("EDITOR").ok();
    let editor = match choose_editor(env_editor.as_deref()) {
        EditorChoice::Approved(editor) => editor,
        EditorChoice::Unrecognized(editor) => {
            ui::warn(&format!(
                "The EDITOR variable is set to an unrecognized value: {editor}"
            ));
            if ui::confirm("Are you sure you want to use it to edit the file?", false)? {
                editor
            } else {
                ui::info(&format!("Using default editor: {DEFAULT_EDITOR}"));
                DEFAULT_EDITOR.to_string()
            }
        }
    };

    let editor = if editor != DEFAULT_EDITOR && !runner::command_exists(&editor) {
        ui::warn(&format!("{editor} not found, using {DEFAULT_EDITOR}"));
        DEFAULT_EDITOR.to_string()
    } else {
        editor
    };

    let path = file.display().to_string();
    let status = runner::run(&editor, &[path.as_str()])?;
    if !status.success() {
        log::warn!("{editor} exited with {status}");
    }
    Ok(())
}
