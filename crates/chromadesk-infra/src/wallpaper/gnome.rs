use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context};
use tracing::debug;

use super::file_uri;

const SCHEMA: &str = "org.gnome.desktop.background";

fn gsettings_bin() -> OsString {
    std::env::var_os("CHROMADESK_GSETTINGS_BIN").unwrap_or_else(|| "gsettings".into())
}

fn gsettings_set(key: &str, value: &str) -> anyhow::Result<()> {
    let output = Command::new(gsettings_bin())
        .arg("set")
        .arg(SCHEMA)
        .arg(key)
        .arg(value)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("run gsettings ({key})"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("gsettings failed ({key})")).with_context(|| stderr.trim().to_string());
    }
    Ok(())
}

pub fn set_wallpaper(image_abs: &Path) -> anyhow::Result<()> {
    let uri = file_uri(image_abs)?;

    gsettings_set("picture-uri", &uri)?;

    // GNOME 42+ keeps a separate key for the dark style.
    if let Err(e) = gsettings_set("picture-uri-dark", &uri) {
        debug!(error = %e, "picture-uri-dark not set");
    }
    if let Err(e) = gsettings_set("picture-options", "zoom") {
        debug!(error = %e, "picture-options not set");
    }

    Ok(())
}
