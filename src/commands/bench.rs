//! `sb bench`: download bench.sh and run it.

use anyhow::{Context as _, Result, bail};
use std::io::Write;
use std::process::{Command, Stdio};

use crate::Context;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let url = &ctx.settings.bench_url;

    let pb = ui::spinner(&format!("Downloading {url}..."));
    let script = download(url);
    pb.finish_and_clear();
    let script = script?;

    log::debug!("Downloaded {} bytes from {}", script.len(), url);
    run_script(&script).context("An error occurred while executing the benchmark")
}

fn download(url: &str) -> Result<String> {
    let script = ureq::get(url)
        .header("User-Agent", concat!("sb/", env!("CARGO_PKG_VERSION")))
        .call()
        .with_context(|| format!("Failed to download {url}"))?
        .body_mut()
        .read_to_string()
        .with_context(|| format!("Failed to read response from {url}"))?;
    Ok(script)
}

/// Pipe `script` into bash, like `wget -qO- bench.sh | bash`
fn run_script(script: &str) -> Result<()> {
    let mut child = Command::new("bash")
        .stdin(Stdio::piped())
        .spawn()
        .context("Failed to start bash")?;

    child
        .stdin
        .take()
        .context("bash stdin unavailable")?
        .write_all(script.as_bytes())
        .context("Failed to pass the script to bash")?;

    let status = child.wait()?;
    if !status.success() {
        bail!("bench.sh exited with {status}");
    }
    Ok(())
}
