use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use moodboard_core::{
    ActionType, CALENDAR_PRESETS, CalendarEvent, ExecutionResult, MoodEntry, PlannedEffects, Rule,
    RuleStore, events_to_ics, match_and_execute, plan_preset, validate,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod rule_file;
mod state;

use rule_file::{FileRuleStore, HistoryRecord};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("MOODBOARD_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "moodboard", version = VERSION, about = "Mood-triggered automation rules")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a rule and print it without saving
    Check {
        /// e.g. "If I feel stressed, remind me to take a break"
        rule: String,
    },

    /// Compile a rule and save it
    Add { rule: String },

    /// List saved rules
    List {
        /// Include deactivated rules
        #[arg(long, default_value_t = false)]
        all: bool,
    },

    /// Deactivate a rule by id
    Remove { id: String },

    /// Log a mood and run every rule it fires
    Log {
        /// Mood label, optionally emoji-prefixed ("😫 Tired")
        #[arg(long)]
        mood: String,

        #[arg(long)]
        note: Option<String>,

        /// Write planned calendar events to this .ics file
        #[arg(long)]
        ics: Option<PathBuf>,
    },

    /// Show recent automation results
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Print the mood -> calendar preset table
    Presets,

    /// Manage ~/.moodboard/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the active config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_tracing(&cfg.logging.filter);

    match cli.command {
        Command::Check { rule } => {
            let rule = compile_or_exit(&rule);
            println!("{}", serde_json::to_string_pretty(&rule)?);
        }

        Command::Add { rule } => {
            let rule = compile_or_exit(&rule);
            let store = open_store()?;
            store.save(rule.clone())?;
            println!("Saved {}: when {} -> {}", rule.id, rule.mood, rule.action_summary);
        }

        Command::List { all } => {
            let store = open_store()?;
            let rules = if all { store.list_all()? } else { store.list_active()? };
            if rules.is_empty() {
                println!("No rules in {}", store.path().display());
            }
            for r in &rules {
                let flag = if r.is_active { "" } else { " (inactive)" };
                println!(
                    "{} [{}] {} -> {}{}",
                    r.id,
                    r.mood,
                    r.original_text,
                    r.action_summary,
                    flag
                );
            }
        }

        Command::Remove { id } => {
            let rule = open_store()?.deactivate(&id)?;
            println!("Deactivated {}: {}", rule.id, rule.original_text);
        }

        Command::Log { mood, note, ics } => {
            log_mood(&cfg, mood, note, ics).await?;
        }

        Command::History { limit } => {
            let records = rule_file::read_history(&state::history_path()?, limit)?;
            if records.is_empty() {
                println!("No automation history yet.");
            }
            for h in &records {
                println!(
                    "{} {} {}",
                    h.logged_at.format("%Y-%m-%d %H:%M"),
                    h.mood,
                    result_line(&h.result)
                );
            }
        }

        Command::Presets => {
            for p in CALENDAR_PRESETS {
                println!(
                    "{:<12} {:<14} {:>3} min  {}",
                    p.mood, p.event_type, p.duration_minutes, p.color
                );
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Validation failures are user input problems: print the message alone.
fn compile_or_exit(text: &str) -> Rule {
    match validate(text) {
        Ok(rule) => rule,
        Err(err) => {
            tracing::debug!(error = ?err, "rule rejected");
            eprintln!("{err}");
            std::process::exit(2);
        }
    }
}

fn open_store() -> Result<FileRuleStore> {
    Ok(FileRuleStore::new(state::rules_path()?))
}

async fn log_mood(
    cfg: &config::Config,
    mood: String,
    note: Option<String>,
    ics: Option<PathBuf>,
) -> Result<()> {
    if mood.trim().is_empty() {
        bail!("--mood must not be empty");
    }

    let mut entry = MoodEntry::new(mood, Utc::now()).with_user(state::current_user());
    if let Some(note) = note {
        entry = entry.with_note(note);
    }

    let rules = open_store()?.list_active()?;
    let effects = PlannedEffects::new(cfg.timezone()?).with_style(cfg.calendar_style());
    let results = match_and_execute(&entry, &rules, &effects).await;

    if results.is_empty() {
        println!("No rules fired for {}", entry.mood);
    }
    for r in &results {
        println!("{}", result_line(r));
    }

    let mut events: Vec<CalendarEvent> = results
        .iter()
        .filter(|r| r.success && r.action_type == ActionType::CalendarBlock)
        .filter_map(|r| r.payload.clone())
        .filter_map(|p| serde_json::from_value(p).ok())
        .collect();

    if cfg.calendar.automation {
        if let Some(event) = plan_preset(&entry) {
            println!("Calendar preset: {} ({} min)", event.title, event.duration_minutes);
            events.push(event);
        }
    }

    let history: Vec<HistoryRecord> = results
        .into_iter()
        .map(|result| HistoryRecord {
            logged_at: entry.timestamp,
            mood: entry.mood.clone(),
            user_id: entry.user_id.clone(),
            result,
        })
        .collect();
    rule_file::append_history(&state::history_path()?, &history)?;

    if let Some(path) = ics {
        std::fs::write(&path, events_to_ics(&events))
            .with_context(|| format!("write {}", path.display()))?;
        println!("Wrote {} event(s) to {}", events.len(), path.display());
    }

    Ok(())
}

fn result_line(r: &ExecutionResult) -> String {
    match (&r.error, r.success) {
        (_, true) => format!("ok   {} {}", r.action_type.as_str(), r.message),
        (Some(err), false) => format!("FAIL {} {}: {}", r.action_type.as_str(), r.rule_id, err),
        (None, false) => format!("FAIL {} {}", r.action_type.as_str(), r.rule_id),
    }
}
