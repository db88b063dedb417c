use anyhow::{Context, Result};
use chrono_tz::Tz;
use moodboard_core::CalendarStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_moodboard_home, moodboard_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profile: ProfileSection,
    #[serde(default)]
    pub calendar: CalendarSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSection {
    /// IANA zone used to resolve "tomorrow", "at 10am", ...
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSection {
    /// Also plan the mood preset block on every `log`.
    #[serde(default)]
    pub automation: bool,
    #[serde(default = "default_title_suffix")]
    pub title_suffix: String,
    #[serde(default = "default_color")]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// tracing-subscriber filter; `RUST_LOG` wins when set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

fn default_title_suffix() -> String {
    CalendarStyle::default().title_suffix
}

fn default_color() -> String {
    CalendarStyle::default().color
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for ProfileSection {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl Default for CalendarSection {
    fn default() -> Self {
        Self {
            automation: false,
            title_suffix: default_title_suffix(),
            color: default_color(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        let name = &self.profile.timezone;
        name.parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid [profile] timezone {name:?}: {e}"))
    }

    pub fn calendar_style(&self) -> CalendarStyle {
        CalendarStyle {
            title_suffix: self.calendar.title_suffix.clone(),
            color: self.calendar.color.clone(),
        }
    }
}

/// Reading never creates the home directory; only `save_config` does.
pub fn config_path() -> Result<PathBuf> {
    Ok(moodboard_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Defaults when `path` does not exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_moodboard_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    println!("# {}", config_path()?.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
