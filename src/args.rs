//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "chromadesk", version)]
#[command(about = "Daily featured wallpaper updater", long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the daily update once (no-op if already done today).
    Update,

    /// Set wallpaper to a local image, or download one with `--url`.
    Set {
        /// Absolute or relative path to an image file.
        #[arg(required_unless_present = "url")]
        image: Option<PathBuf>,

        /// Image URL to download into the wallpaper directory and apply.
        #[arg(long, conflicts_with = "image")]
        url: Option<String>,
    },

    /// Download today's featured image without applying it.
    Fetch {
        /// Market code, e.g. en-GB. Defaults to the configured region.
        #[arg(long)]
        region: Option<String>,
    },

    /// List stored wallpapers, newest first.
    History,

    /// Inspect or edit the config file.
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective settings.
    Show,

    /// Print the config file path.
    Path,

    /// Create the config file, or add missing keys to it.
    Init,

    /// Set a single key, e.g. `config set settings enabled true`.
    Set {
        section: String,
        key: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["chromadesk", "history", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.cmd, Command::History));
    }

    #[test]
    fn parses_config_set() {
        let cli = Cli::try_parse_from(["chromadesk", "config", "set", "settings", "enabled", "true"])
            .unwrap();
        match cli.cmd {
            Command::Config {
                cmd: ConfigCommand::Set { section, key, value },
            } => {
                assert_eq!((section.as_str(), key.as_str(), value.as_str()), ("settings", "enabled", "true"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn set_takes_a_path_or_a_url() {
        let cli = Cli::try_parse_from(["chromadesk", "set", "a.jpg"]).unwrap();
        assert!(
            matches!(cli.cmd, Command::Set { image: Some(ref p), url: None } if p == &PathBuf::from("a.jpg"))
        );

        let cli = Cli::try_parse_from(["chromadesk", "set", "--url", "https://x/a.jpg"]).unwrap();
        assert!(matches!(cli.cmd, Command::Set { image: None, url: Some(ref u) } if u == "https://x/a.jpg"));

        assert!(Cli::try_parse_from(["chromadesk", "set", "a.jpg", "--url", "https://x/a.jpg"]).is_err());
    }

    #[test]
    fn fetch_region_is_optional() {
        let cli = Cli::try_parse_from(["chromadesk", "fetch"]).unwrap();
        assert!(matches!(cli.cmd, Command::Fetch { region: None }));
        assert!(Cli::try_parse_from(["chromadesk", "set"]).is_err());
    }
}
