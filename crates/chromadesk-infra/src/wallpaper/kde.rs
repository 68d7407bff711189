use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context};

use super::file_uri;

fn find_qdbus() -> Option<&'static str> {
    // Plasma 6 often ships qdbus6, Plasma 5 ships qdbus.
    ["qdbus6", "qdbus"].into_iter().find(|exe| {
        Command::new(exe)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    })
}

fn plasma_script(uri: &str) -> String {
    let uri = uri.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "var allDesktops = desktops();\n\
         for (var i = 0; i < allDesktops.length; i++) {{\n\
           var d = allDesktops[i];\n\
           d.wallpaperPlugin = 'org.kde.image';\n\
           d.currentConfigGroup = ['Wallpaper', 'org.kde.image', 'General'];\n\
           d.writeConfig('Image', '{uri}');\n\
           d.writeConfig('FillMode', '2');\n\
         }}\n"
    )
}

pub fn set_wallpaper(image_abs: &Path) -> anyhow::Result<()> {
    let qdbus = find_qdbus().ok_or_else(|| anyhow!("qdbus not found (qdbus6/qdbus)"))?;
    let script = plasma_script(&file_uri(image_abs)?);

    let output = Command::new(qdbus)
        .arg("org.kde.plasmashell")
        .arg("/PlasmaShell")
        .arg("org.kde.PlasmaShell.evaluateScript")
        .arg(script)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("run {qdbus} PlasmaShell.evaluateScript"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("qdbus wallpaper script failed")).with_context(|| stderr.trim().to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_targets_every_desktop_and_escapes_quotes() {
        let s = plasma_script("file:///home/u/it's.jpg");
        assert!(s.contains("desktops()"));
        assert!(s.contains("d.writeConfig('Image', 'file:///home/u/it\\'s.jpg');"));
        assert!(s.contains("org.kde.image"));
    }
}
