use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Ask a yes/no question on the terminal
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?;
    Ok(confirmed)
}

/// Spinner shown while a slow command runs
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

// ============================================================================
// Column Layout
// ============================================================================

/// Terminal width, or 80 when stdout isn't a terminal
pub fn terminal_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map_or(80, |(_, cols)| cols as usize)
}

/// Lay `items` out column-major in rows that fit `width`.
///
/// Every cell is padded to the longest item plus `padding`.
pub fn columns(items: &[String], width: usize, padding: usize) -> Vec<String> {
    let Some(longest) = items.iter().map(|i| i.chars().count()).max() else {
        return Vec::new();
    };

    let cell = longest + padding;
    let num_columns = (width / cell).max(1);
    let num_rows = items.len().div_ceil(num_columns);

    (0..num_rows)
        .map(|row| {
            (0..num_columns)
                .filter_map(|col| items.get(row + col * num_rows))
                .map(|item| format!("{item:<cell$}"))
                .collect::<String>()
        })
        .collect()
}

/// Print `items` in as many columns as the terminal allows
pub fn print_columns(items: &[String]) {
    for row in columns(items, terminal_width(), 2) {
        println!("{}", row.trim_end());
    }
}

// ============================================================================
// Tests
// ============================================================================
