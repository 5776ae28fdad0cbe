use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

fn describe(cmd: &str, args: &[&str]) -> String {
    if args.is_empty() {
        cmd.to_string()
    } else {
        format!("{} {}", cmd, args.join(" "))
    }
}

/// Run a command and inherit stdio (shows output in real-time)
pub fn run(cmd: &str, args: &[&str]) -> Result<ExitStatus> {
    log::debug!("Running: {}", describe(cmd, args));
    Command::new(cmd)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to execute: {}", describe(cmd, args)))
}

/// Run a command in `dir` and inherit stdio
pub fn run_in(dir: &Path, cmd: &str, args: &[&str]) -> Result<ExitStatus> {
    log::debug!("Running in {}: {}", dir.display(), describe(cmd, args));
    Command::new(cmd)
        .args(args)
        .current_dir(dir)
        .status()
        .with_context(|| format!("Failed to execute: {}", describe(cmd, args)))
}

/// Run a command and fail unless it exits successfully
pub fn run_checked(cmd: &str, args: &[&str]) -> Result<()> {
    let status = run(cmd, args)?;
    if !status.success() {
        bail!("Command failed ({}): {}", status, describe(cmd, args));
    }
    Ok(())
}

/// Run a command and capture output
pub fn run_capture(cmd: &str, args: &[&str]) -> Result<String> {
    capture(Command::new(cmd).args(args), cmd, args)
}

/// Run a command in `dir` and capture output
pub fn run_capture_in(dir: &Path, cmd: &str, args: &[&str]) -> Result<String> {
    capture(Command::new(cmd).args(args).current_dir(dir), cmd, args)
}

fn capture(command: &mut Command, cmd: &str, args: &[&str]) -> Result<String> {
    log::debug!("Capturing: {}", describe(cmd, args));
    let output = command
        .output()
        .with_context(|| format!("Failed to execute: {}", describe(cmd, args)))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("Command failed: {}", stderr.trim())
    }
}

/// Run a command in `dir` silently, returning success/failure
pub fn run_quiet_in(dir: &Path, cmd: &str, args: &[&str]) -> bool {
    log::debug!("Running quietly in {}: {}", dir.display(), describe(cmd, args));
    Command::new(cmd)
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a shell snippet in `dir` silently, returning success/failure
pub fn shell_quiet_in(dir: &Path, script: &str) -> bool {
    run_quiet_in(dir, "sh", &["-c", script])
}

/// Check if a command exists
pub fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
