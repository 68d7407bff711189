use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

use crate::atomic::atomic_write;
use crate::paths::config_home;

const SOURCE_NEEDLE: &str = "source: Path(\"";

fn background_dir() -> anyhow::Result<PathBuf> {
    Ok(config_home()?.join("cosmic/com.system76.CosmicBackground/v1"))
}

/// Swap the path inside `source: Path("...")` of a cosmic-bg entry.
fn replace_source(text: &str, new_path: &str) -> anyhow::Result<String> {
    let start = text
        .find(SOURCE_NEEDLE)
        .ok_or_else(|| anyhow!("COSMIC config: missing `source: Path(\"...\")`"))?;
    let path_start = start + SOURCE_NEEDLE.len();
    let end_rel = text[path_start..]
        .find("\")")
        .ok_or_else(|| anyhow!("COSMIC config: unterminated source path"))?;

    let mut out = text.to_string();
    out.replace_range(path_start..path_start + end_rel, new_path);
    Ok(out)
}

pub fn set_wallpaper(image_abs: &Path) -> anyhow::Result<()> {
    // cosmic-bg watches its cosmic-config files and reloads on change.
    let base = background_dir()?;
    let all = base.join("all");

    let new_path = image_abs
        .to_str()
        .ok_or_else(|| anyhow!("path is not valid UTF-8"))?;

    let text = fs::read_to_string(&all).with_context(|| {
        format!(
            "read {} (open COSMIC Wallpaper settings once)",
            all.display()
        )
    })?;
    let updated = replace_source(&text, new_path)?;

    atomic_write(&base.join("same-on-all"), b"true\n").context("write same-on-all")?;
    atomic_write(&all, updated.as_bytes()).context("write all")?;
    Ok(())
}
