//! TOML-backed settings and update state.
//!
//! The file has two tables, `[settings]` and `[state]`. Values are read once into
//! [`Settings`]; anything missing or invalid falls back to its default with a warning.
//! Only `state.last_update_date` is ever written by the update run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use toml::{Table, Value};
use tracing::warn;

use chromadesk_core::ports::UpdateStateStore;
use chromadesk_core::state::{parse_iso_date, DEFAULT_KEEP_HISTORY, DEFAULT_REGION};
use chromadesk_core::{StateError, UpdateState};

use crate::atomic::atomic_write;
use crate::env_detect::DesktopKind;
use crate::paths;

pub const SETTINGS: &str = "settings";
pub const STATE: &str = "state";

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub enabled: bool,
    pub region: String,
    pub keep_history: i64,
    /// `None` means the default directory under the config root.
    pub wallpaper_dir: Option<PathBuf>,
    /// `None` means detect from the session.
    pub desktop: Option<DesktopKind>,
    pub notify: bool,
    pub log_level: String,
    pub last_update_date: Option<NaiveDate>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            region: DEFAULT_REGION.to_string(),
            keep_history: DEFAULT_KEEP_HISTORY,
            wallpaper_dir: None,
            desktop: None,
            notify: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            last_update_date: None,
        }
    }
}

impl Settings {
    /// Build settings from a parsed file. Returns the settings plus one message per value
    /// that was present but unusable.
    pub fn from_table(table: &Table) -> (Self, Vec<String>) {
        let mut r = Reader {
            table,
            warnings: Vec::new(),
        };
        let d = Self::default();

        let settings = Self {
            enabled: r.get(SETTINGS, "enabled", bool_value, d.enabled),
            region: r.get(SETTINGS, "region", non_empty_string, d.region),
            keep_history: r.get(SETTINGS, "keep_history", int_value, d.keep_history),
            wallpaper_dir: r.get(SETTINGS, "wallpaper_dir", dir_value, d.wallpaper_dir),
            desktop: r.get(SETTINGS, "desktop", desktop_value, d.desktop),
            notify: r.get(SETTINGS, "notify", bool_value, d.notify),
            log_level: r.get(SETTINGS, "log_level", non_empty_string, d.log_level),
            last_update_date: r.get(STATE, "last_update_date", date_value, d.last_update_date),
        };
        (settings, r.warnings)
    }

    pub fn to_table(&self) -> Table {
        let mut settings = Table::new();
        settings.insert("enabled".into(), Value::Boolean(self.enabled));
        settings.insert("region".into(), Value::String(self.region.clone()));
        settings.insert("keep_history".into(), Value::Integer(self.keep_history));
        settings.insert(
            "wallpaper_dir".into(),
            Value::String(
                self.wallpaper_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
        );
        settings.insert(
            "desktop".into(),
            Value::String(self.desktop.map_or_else(|| "auto".to_string(), |d| d.to_string())),
        );
        settings.insert("notify".into(), Value::Boolean(self.notify));
        settings.insert("log_level".into(), Value::String(self.log_level.clone()));

        let mut state = Table::new();
        state.insert(
            "last_update_date".into(),
            Value::String(
                self.last_update_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
        );

        let mut table = Table::new();
        table.insert(SETTINGS.into(), Value::Table(settings));
        table.insert(STATE.into(), Value::Table(state));
        table
    }

    pub fn to_toml_string(&self) -> Result<String, StateError> {
        toml::to_string(&self.to_table()).map_err(|e| StateError::Encode(e.to_string()))
    }

    pub fn update_state(&self) -> UpdateState {
        UpdateState {
            enabled: self.enabled,
            region: self.region.clone(),
            last_update_date: self.last_update_date,
            keep_history: self.keep_history,
        }
    }

    pub fn wallpaper_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.wallpaper_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::default_wallpaper_dir(),
        }
    }
}

struct Reader<'a> {
    table: &'a Table,
    warnings: Vec<String>,
}

impl Reader<'_> {
    fn get<T>(
        &mut self,
        section: &str,
        key: &str,
        parse: impl Fn(&Value) -> Option<T>,
        default: T,
    ) -> T {
        let table = self.table;
        let Some(value) = table
            .get(section)
            .and_then(Value::as_table)
            .and_then(|t| t.get(key))
        else {
            return default;
        };
        match parse(value) {
            Some(v) => v,
            None => {
                self.warnings
                    .push(format!("invalid value {value} for {section}.{key}, using default"));
                default
            }
        }
    }
}

/// Boolean spellings accepted the way INI-style settings files usually accept them.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

fn bool_value(v: &Value) -> Option<bool> {
    match v {
        Value::Boolean(b) => Some(*b),
        Value::String(s) => parse_bool(s),
        Value::Integer(0) => Some(false),
        Value::Integer(1) => Some(true),
        _ => None,
    }
}

fn int_value(v: &Value) -> Option<i64> {
    match v {
        Value::Integer(i) => Some(*i),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty_string(v: &Value) -> Option<String> {
    v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn dir_value(v: &Value) -> Option<Option<PathBuf>> {
    let raw = v.as_str()?.trim();
    if raw.is_empty() {
        return Some(None);
    }
    paths::expand_home(raw).ok().map(Some)
}

fn desktop_value(v: &Value) -> Option<Option<DesktopKind>> {
    let raw = v.as_str()?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        return Some(None);
    }
    raw.parse().ok().map(Some)
}

fn date_value(v: &Value) -> Option<Option<NaiveDate>> {
    let raw = v.as_str()?.trim();
    if raw.is_empty() {
        return Some(None);
    }
    parse_iso_date(raw).map(Some)
}

/// The config file on disk.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `explicit`, else `CHROMADESK_CONFIG`, else `$XDG_CONFIG_HOME/chromadesk/config.toml`.
    pub fn locate(explicit: Option<PathBuf>) -> anyhow::Result<Self> {
        match explicit {
            Some(p) => Ok(Self::new(p)),
            None => Ok(Self::new(paths::default_config_path()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the file. `Ok(None)` when it does not exist.
    pub fn load_table(&self) -> Result<Option<Table>, StateError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StateError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        text.parse::<Table>()
            .map(Some)
            .map_err(|e| StateError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }

    /// Load settings, returning warnings instead of logging them.
    pub fn load_with_warnings(&self) -> (Settings, Vec<String>) {
        match self.load_table() {
            Ok(Some(table)) => Settings::from_table(&table),
            Ok(None) => (Settings::default(), Vec::new()),
            Err(e) => (
                Settings::default(),
                vec![format!("{e}; using default settings")],
            ),
        }
    }

    pub fn load(&self) -> Settings {
        let (settings, warnings) = self.load_with_warnings();
        for w in warnings {
            warn!(path = %self.path.display(), "{w}");
        }
        settings
    }

    /// Create the file with defaults, or add any keys missing from an existing one.
    /// Returns whether the file was written.
    pub fn init(&self) -> Result<bool, StateError> {
        let existing = self.load_table()?;
        let created = existing.is_none();
        let mut table = existing.unwrap_or_default();
        let added = backfill_defaults(&mut table);
        if created || added > 0 {
            self.save(&table)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Set a single key. Known keys are validated and stored with their proper type;
    /// unknown keys are stored as strings.
    pub fn set(&self, section: &str, key: &str, raw: &str) -> Result<(), StateError> {
        let section = section.trim().to_ascii_lowercase();
        let key = key.trim().to_ascii_lowercase();
        let value = typed_value(&section, &key, raw)?;

        let mut table = self.load_table()?.unwrap_or_default();
        backfill_defaults(&mut table);
        with_section(&mut table, &section, |t| t.insert(key, value));
        self.save(&table)
    }

    fn save(&self, table: &Table) -> Result<(), StateError> {
        let text = toml::to_string(table).map_err(|e| StateError::Encode(e.to_string()))?;
        atomic_write(&self.path, text.as_bytes()).map_err(|e| StateError::Io {
            path: self.path.clone(),
            source: io::Error::other(format!("{e:#}")),
        })
    }
}

impl UpdateStateStore for ConfigFile {
    fn read(&self) -> UpdateState {
        self.load().update_state()
    }

    fn write_last_update_date(&self, date: NaiveDate) -> Result<(), StateError> {
        self.set(STATE, "last_update_date", &date.format("%Y-%m-%d").to_string())
    }
}

/// Run `edit` on `section`, creating it (or replacing a non-table value) first.
fn with_section<R>(table: &mut Table, section: &str, edit: impl FnOnce(&mut Table) -> R) -> R {
    let mut current = match table.remove(section) {
        Some(Value::Table(t)) => t,
        Some(_) => {
            warn!(section, "Replacing non-table config entry");
            Table::new()
        }
        None => Table::new(),
    };
    let out = edit(&mut current);
    table.insert(section.to_string(), Value::Table(current));
    out
}

/// Add default values for missing keys. Returns how many keys were added.
fn backfill_defaults(table: &mut Table) -> usize {
    let mut added = 0;
    for (section, defaults) in Settings::default().to_table() {
        let Value::Table(defaults) = defaults else {
            continue;
        };
        added += with_section(table, &section, |target| {
            let mut n = 0;
            for (key, value) in defaults {
                if !target.contains_key(&key) {
                    target.insert(key, value);
                    n += 1;
                }
            }
            n
        });
    }
    added
}

fn typed_value(section: &str, key: &str, raw: &str) -> Result<Value, StateError> {
    let invalid = || StateError::Invalid {
        key: format!("{section}.{key}"),
        value: raw.to_string(),
    };
    let value = match (section, key) {
        (SETTINGS, "enabled" | "notify") => Value::Boolean(parse_bool(raw).ok_or_else(invalid)?),
        (SETTINGS, "keep_history") => Value::Integer(raw.trim().parse().map_err(|_| invalid())?),
        (SETTINGS, "desktop") => {
            desktop_value(&Value::String(raw.to_string())).ok_or_else(invalid)?;
            Value::String(raw.trim().to_ascii_lowercase())
        }
        (STATE, "last_update_date") => {
            date_value(&Value::String(raw.to_string())).ok_or_else(invalid)?;
            Value::String(raw.trim().to_string())
        }
        (SETTINGS, "region" | "wallpaper_dir" | "log_level") => Value::String(raw.trim().to_string()),
        _ => {
            warn!(section, key, "Setting unknown config key");
            Value::String(raw.to_string())
        }
    };
    Ok(value)
}
