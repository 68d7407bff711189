//! Desktop environment detection.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopKind {
    Cosmic,
    Gnome,
    Kde,
    Other,
}

impl fmt::Display for DesktopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cosmic => "cosmic",
            Self::Gnome => "gnome",
            Self::Kde => "kde",
            Self::Other => "other",
        })
    }
}

impl FromStr for DesktopKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosmic" => Ok(Self::Cosmic),
            "gnome" => Ok(Self::Gnome),
            "kde" | "plasma" => Ok(Self::Kde),
            other => Err(anyhow!("unknown desktop {other:?} (expected gnome, kde or cosmic)")),
        }
    }
}

/// Classify an `XDG_CURRENT_DESKTOP`-style value (colon separated, e.g. `ubuntu:GNOME`).
pub fn classify_desktop(value: &str) -> DesktopKind {
    let mut found = DesktopKind::Other;
    for token in value.split(':').map(|t| t.trim().to_ascii_lowercase()) {
        // COSMIC sessions may also list GNOME; the more specific name wins.
        if token.contains("cosmic") {
            return DesktopKind::Cosmic;
        }
        if token == "kde" || token.contains("plasma") {
            found = DesktopKind::Kde;
        } else if token.contains("gnome") && found == DesktopKind::Other {
            found = DesktopKind::Gnome;
        }
    }
    found
}

/// Detect the running desktop from the session environment variables.
pub fn detect_desktop() -> DesktopKind {
    for var in ["XDG_CURRENT_DESKTOP", "XDG_SESSION_DESKTOP", "DESKTOP_SESSION"] {
        let Some(value) = std::env::var_os(var) else {
            continue;
        };
        let kind = classify_desktop(&value.to_string_lossy());
        if kind != DesktopKind::Other {
            return kind;
        }
    }
    DesktopKind::Other
}
