//! JSON-lines persistence for rules and execution history under the
//! moodboard home directory.

use anyhow::{Context, Result};
use moodboard_core::{ExecutionResult, Rule, RuleStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// One rule per line. Every write rewrites the whole file; lines that no
/// longer deserialize are carried through verbatim.
#[derive(Debug, Clone)]
pub struct FileRuleStore {
    path: PathBuf,
}

#[derive(Debug, Clone)]
enum StoredLine {
    Rule(Rule),
    Unreadable(String),
}

impl FileRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_lines(&self) -> Result<Vec<StoredLine>, StoreError> {
        read_rule_lines(&self.path).map_err(backend)
    }

    fn read_rules(&self) -> Result<Vec<Rule>, StoreError> {
        Ok(self
            .read_lines()?
            .into_iter()
            .filter_map(|line| match line {
                StoredLine::Rule(rule) => Some(rule),
                StoredLine::Unreadable(_) => None,
            })
            .collect())
    }

    fn write_lines(&self, lines: &[StoredLine]) -> Result<(), StoreError> {
        write_rule_lines(&self.path, lines).map_err(backend)
    }
}

fn backend(err: anyhow::Error) -> StoreError {
    StoreError::Backend(format!("{err:#}"))
}

fn find_rule<'a>(lines: &'a mut [StoredLine], id: &str) -> Option<&'a mut Rule> {
    lines.iter_mut().find_map(|line| match line {
        StoredLine::Rule(rule) if rule.id == id => Some(rule),
        _ => None,
    })
}

impl RuleStore for FileRuleStore {
    fn save(&self, rule: Rule) -> Result<(), StoreError> {
        let mut lines = self.read_lines()?;
        match find_rule(&mut lines, &rule.id) {
            Some(existing) => *existing = rule,
            None => lines.push(StoredLine::Rule(rule)),
        }
        self.write_lines(&lines)
    }

    fn list_active(&self) -> Result<Vec<Rule>, StoreError> {
        Ok(self.read_rules()?.into_iter().filter(|r| r.is_active).collect())
    }

    fn list_all(&self) -> Result<Vec<Rule>, StoreError> {
        self.read_rules()
    }

    fn deactivate(&self, id: &str) -> Result<Rule, StoreError> {
        let mut lines = self.read_lines()?;
        let rule = find_rule(&mut lines, id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        rule.deactivate();
        let updated = rule.clone();
        self.write_lines(&lines)?;
        Ok(updated)
    }
}

/// A logged mood and what its rules did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub logged_at: chrono::DateTime<chrono::Utc>,
    pub mood: String,
    pub user_id: String,
    pub result: ExecutionResult,
}

pub fn append_history(path: &Path, records: &[HistoryRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    for r in records {
        writeln!(f, "{}", serde_json::to_string(r)?)?;
    }
    Ok(())
}

/// Last `limit` records, oldest first.
pub fn read_history(path: &Path, limit: usize) -> Result<Vec<HistoryRecord>> {
    let mut rows: Vec<HistoryRecord> = read_jsonl(path)?;
    let skip = rows.len().saturating_sub(limit);
    Ok(rows.split_off(skip))
}

fn read_jsonl<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let f = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut rows = Vec::new();
    for (i, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(v) => rows.push(v),
            Err(e) => tracing::warn!(
                path = %path.display(),
                line = i + 1,
                error = %e,
                "skipping unreadable line"
            ),
        }
    }
    Ok(rows)
}

fn read_rule_lines(path: &Path) -> Result<Vec<StoredLine>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let f = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut lines = Vec::new();
    for (i, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Rule>(&line) {
            Ok(rule) => lines.push(StoredLine::Rule(rule)),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = i + 1,
                    error = %e,
                    "keeping unreadable rule line as-is"
                );
                lines.push(StoredLine::Unreadable(line));
            }
        }
    }
    Ok(lines)
}

fn write_rule_lines(path: &Path, lines: &[StoredLine]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = path.with_extension("jsonl.tmp");
    {
        let mut f = fs::File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
        for line in lines {
            match line {
                StoredLine::Rule(rule) => writeln!(f, "{}", serde_json::to_string(rule)?)?,
                StoredLine::Unreadable(raw) => writeln!(f, "{raw}")?,
            }
        }
        f.flush()?;
    }
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
