//! Desktop notifications through `notify-send`.

use std::ffi::OsString;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context};
use tracing::debug;

pub const APP_NAME: &str = "ChromaDesk";
const ICON: &str = "preferences-desktop-wallpaper";
const TIMEOUT_MS: &str = "5000";

fn notify_bin() -> OsString {
    std::env::var_os("CHROMADESK_NOTIFY_BIN").unwrap_or_else(|| "notify-send".into())
}

pub fn send(title: &str, body: &str) -> anyhow::Result<()> {
    debug!(title, body, "Sending notification");
    let output = Command::new(notify_bin())
        .args(["-a", APP_NAME, "-u", "low", "-t", TIMEOUT_MS, "-i", ICON, "--"])
        .arg(title)
        .arg(body)
        .stdin(Stdio::null())
        .output()
        .context("run notify-send")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "notify-send exited with {}: {}",
            output.status,
            stderr.trim()
        ));
    }
    Ok(())
}
