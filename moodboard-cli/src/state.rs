use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$MOODBOARD_HOME`, else `~/.moodboard`.
pub fn moodboard_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("MOODBOARD_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".moodboard"))
}

pub fn ensure_moodboard_home() -> Result<PathBuf> {
    let dir = moodboard_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Writers create the parent directory on demand.
pub fn rules_path() -> Result<PathBuf> {
    Ok(moodboard_home()?.join("rules.jsonl"))
}

pub fn history_path() -> Result<PathBuf> {
    Ok(moodboard_home()?.join("history.jsonl"))
}

/// Who is logging; falls back to "local" when `$USER` is unset.
pub fn current_user() -> String {
    std::env::var("USER")
        .ok()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "local".to_string())
}
