//! Root privileges.
//!
//! sb manages system-wide checkouts under /srv and /opt, so every command
//! runs as root. A non-root invocation re-executes itself through sudo with
//! the same arguments.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::process::{Command, ExitStatus};

/// Whether the effective user is root
#[cfg(unix)]
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}

/// Arguments this process was started with, minus the program name
pub fn current_args() -> Vec<OsString> {
    std::env::args_os().skip(1).collect()
}

/// Re-run the current executable with `args` under sudo and wait for it
pub fn reexec_with_sudo(args: &[OsString]) -> Result<ExitStatus> {
    let exe = std::env::current_exe().context("Could not determine the sb executable path")?;
    log::debug!("Re-executing {} through sudo", exe.display());

    Command::new("sudo")
        .arg(&exe)
        .args(args)
        .status()
        .context("Failed to relaunch with root privileges")
}

/// Process exit code mirroring a child's status
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_exit_code_mirrors_child() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
        // killed by SIGINT: no code
        assert_eq!(exit_code(ExitStatus::from_raw(2)), 1);
    }
}
