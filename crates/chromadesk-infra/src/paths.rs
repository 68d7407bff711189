//! XDG locations for configuration and stored wallpapers.

use std::path::PathBuf;

use anyhow::anyhow;

pub const APP_DIR: &str = "chromadesk";

pub fn config_home() -> anyhow::Result<PathBuf> {
    if let Some(v) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(v));
    }
    Ok(home()?.join(".config"))
}

fn home() -> anyhow::Result<PathBuf> {
    let home = std::env::var_os("HOME").ok_or_else(|| anyhow!("HOME not set"))?;
    Ok(PathBuf::from(home))
}

pub fn app_config_dir() -> anyhow::Result<PathBuf> {
    Ok(config_home()?.join(APP_DIR))
}

/// `CHROMADESK_CONFIG` if set, else `$XDG_CONFIG_HOME/chromadesk/config.toml`.
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    if let Some(p) = std::env::var_os("CHROMADESK_CONFIG").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    Ok(app_config_dir()?.join("config.toml"))
}

pub fn default_wallpaper_dir() -> anyhow::Result<PathBuf> {
    Ok(app_config_dir()?.join("wallpapers"))
}

pub fn default_log_path() -> anyhow::Result<PathBuf> {
    Ok(app_config_dir()?.join("chromadesk.log"))
}

/// Expand a leading `~/` against `$HOME`.
pub fn expand_home(raw: &str) -> anyhow::Result<PathBuf> {
    if raw == "~" {
        return home();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => Ok(home()?.join(rest)),
        None => Ok(PathBuf::from(raw)),
    }
}
