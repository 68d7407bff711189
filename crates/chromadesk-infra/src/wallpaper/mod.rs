//! Desktop wallpaper backends behind [`BackgroundApplier`].

use std::path::Path;

use anyhow::{anyhow, Context};
use tracing::{debug, info};
use url::Url;

use chromadesk_core::ports::BackgroundApplier;
use chromadesk_core::ApplyError;

use crate::env_detect::{detect_desktop, DesktopKind};
use crate::notify;

mod cosmic;
mod gnome;
mod kde;

/// Applies wallpapers on GNOME, KDE Plasma or COSMIC.
#[derive(Debug, Clone, Default)]
pub struct DesktopApplier {
    /// `None` detects the desktop from the session on every call.
    desktop: Option<DesktopKind>,
}

impl DesktopApplier {
    pub fn new(desktop: Option<DesktopKind>) -> Self {
        Self { desktop }
    }

    fn desktop(&self) -> DesktopKind {
        self.desktop.unwrap_or_else(detect_desktop)
    }
}

impl BackgroundApplier for DesktopApplier {
    fn apply(&self, path: &Path) -> Result<(), ApplyError> {
        if !path.is_file() {
            return Err(ApplyError::MissingFile(path.to_path_buf()));
        }
        let abs = path
            .canonicalize()
            .map_err(|_| ApplyError::MissingFile(path.to_path_buf()))?;

        let desktop = self.desktop();
        debug!(%desktop, path = %abs.display(), "Setting wallpaper");
        match desktop {
            DesktopKind::Cosmic => cosmic::set_wallpaper(&abs).context("COSMIC wallpaper")?,
            DesktopKind::Gnome => gnome::set_wallpaper(&abs).context("GNOME wallpaper")?,
            DesktopKind::Kde => kde::set_wallpaper(&abs).context("KDE wallpaper")?,
            DesktopKind::Other => {
                let seen = std::env::var("XDG_CURRENT_DESKTOP").unwrap_or_else(|_| "unset".into());
                return Err(ApplyError::UnsupportedDesktop(seen));
            }
        }
        info!(%desktop, "Wallpaper set");
        Ok(())
    }

    fn notify(&self, title: &str, body: &str) -> anyhow::Result<()> {
        notify::send(title, body)
    }
}

fn file_uri(path: &Path) -> anyhow::Result<String> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|_| anyhow!("path must be absolute: {}", path.display()))
}
