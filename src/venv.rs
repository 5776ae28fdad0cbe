//! Ansible virtual environment provisioning.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use crate::runner;
use crate::ui;

/// Python packages the Saltbox roles import
pub const REQUIRED_PACKAGES: &[&str] = &[
    "tld",
    "argon2_cffi",
    "ndg-httpsclient",
    "dnspython",
    "lxml",
    "jmespath",
    "passlib",
    "PyMySQL",
    "docker",
    "pyOpenSSL",
    "requests",
    "netaddr",
    "jinja2",
];

const DEADSNAKES_PPA: &str = "ppa:deadsnakes/ppa";

/// How to get a Python able to host the venv
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PythonSource {
    /// Install python3.10 from the deadsnakes PPA
    Deadsnakes,
    /// The distribution's python3 is recent enough
    System,
}

impl PythonSource {
    /// Pick the Python source for an Ubuntu release codename
    pub fn for_release(codename: &str) -> Result<Self> {
        match codename {
            "focal" => Ok(PythonSource::Deadsnakes),
            "jammy" | "noble" => Ok(PythonSource::System),
            other => bail!("Unsupported OS release: {other}"),
        }
    }

    pub fn interpreter(self) -> &'static str {
        match self {
            PythonSource::Deadsnakes => "python3.10",
            PythonSource::System => "python3",
        }
    }
}

/// Create (or rebuild) the venv and install the Saltbox requirements.
///
/// `update_script` is Saltbox's `scripts/update.sh`; `owner` receives the venv.
pub fn provision(venv_dir: &Path, update_script: &Path, owner: &str, recreate: bool) -> Result<()> {
    if recreate {
        ui::info("Recreating Ansible venv.");
    } else {
        ui::info("Updating Ansible venv.");
    }

    let release = runner::run_capture("lsb_release", &["-cs"])?;
    log::debug!("Ubuntu release: {release}");

    if recreate && venv_dir.exists() {
        fs::remove_dir_all(venv_dir)
            .with_context(|| format!("Failed to remove {}", venv_dir.display()))?;
    }

    if !venv_dir.is_dir() {
        let source = PythonSource::for_release(&release)?;
        if source == PythonSource::Deadsnakes {
            install_deadsnakes_python()?;
        }

        fs::create_dir_all(venv_dir)
            .with_context(|| format!("Failed to create {}", venv_dir.display()))?;
        let status = runner::run_in(venv_dir, source.interpreter(), &["-m", "venv", "venv"])?;
        if !status.success() {
            bail!("Failed to create the venv in {}", venv_dir.display());
        }
    }

    let script = update_script.display().to_string();
    runner::run_checked("bash", &[script.as_str()]).context("Update script failed.")?;

    let pip = venv_dir.join("venv").join("bin").join("pip");
    let pip = pip.display().to_string();
    runner::run_checked(&pip, &["install", "-U", "pip"])?;

    let mut install = vec!["install"];
    install.extend_from_slice(REQUIRED_PACKAGES);
    runner::run_checked(&pip, &install)?;

    let dir = venv_dir.display().to_string();
    runner::run_checked("chown", &["-R", owner, dir.as_str()])?;

    if recreate {
        ui::success("Done recreating Ansible venv.");
    } else {
        ui::success("Done updating Ansible venv.");
    }
    Ok(())
}

fn install_deadsnakes_python() -> Result<()> {
    runner::run_checked("add-apt-repository", &[DEADSNAKES_PPA, "--yes"])?;
    runner::run_checked(
        "apt",
        &[
            "install",
            "python3.10",
            "python3.10-dev",
            "python3.10-distutils",
            "python3.10-venv",
            "-y",
        ],
    )?;
    runner::run_checked("add-apt-repository", &[DEADSNAKES_PPA, "-r", "--yes"])?;

    for leftover in [
        "/etc/apt/sources.list.d/deadsnakes-ubuntu-ppa-focal.list",
        "/etc/apt/sources.list.d/deadsnakes-ubuntu-ppa-focal.list.save",
    ] {
        if let Err(e) = fs::remove_file(leftover)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            log::warn!("Could not remove {leftover}: {e}");
        }
    }

    runner::run_checked("python3.10", &["-m", "ensurepip"])
}
