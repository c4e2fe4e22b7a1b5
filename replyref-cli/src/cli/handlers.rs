//! CLI command handlers

use crate::fixture::Fixture;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use replyref_core::models::{Configuration, LogLevel, MessageId, MAX_SESSION_COUNT};
use replyref_core::reply::{classify_change, dependencies_of, Dependency};
use replyref_core::{ReplyAnomaly, ReplyReference};
use serde_json::json;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Load the configuration from `path`, or from the default location
pub fn load_configuration(path: Option<&Path>) -> Result<Configuration> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Configuration::default_config_path()
            .map_err(|e| anyhow::anyhow!("Failed to get default config path: {}", e))?,
    };
    let config = Configuration::load_from_file(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path.display(), e))?;
    config
        .validate()
        .map_err(|errors| anyhow::anyhow!("Invalid configuration: {}", errors.join(", ")))?;
    Ok(config)
}

pub fn parse_log_level(value: &str) -> Result<LogLevel> {
    match value.trim().to_lowercase().as_str() {
        "error" => Ok(LogLevel::Error),
        "warn" => Ok(LogLevel::Warn),
        "info" => Ok(LogLevel::Info),
        "debug" => Ok(LogLevel::Debug),
        "trace" => Ok(LogLevel::Trace),
        other => Err(anyhow::anyhow!("Unknown log level '{}'", other)),
    }
}

fn log_level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

fn format_date(date: i32) -> String {
    DateTime::<Utc>::from_timestamp(i64::from(date), 0)
        .map(|date| date.to_rfc3339())
        .unwrap_or_else(|| date.to_string())
}

fn anomaly_messages(anomalies: &[ReplyAnomaly]) -> Vec<String> {
    anomalies.iter().map(ToString::to_string).collect()
}

/// Handle the 'build' command
pub fn handle_build(config: &Configuration, fixture: &Path, json: bool) -> Result<()> {
    let fixture = Fixture::load(fixture)?;
    let owner = fixture.owner.to_owner();
    let result = fixture.build(config.session_count);
    let reply = &result.value;
    let view = reply
        .to_view(owner.chat_id)
        .context("Failed to describe the reply")?;

    if json {
        let output = json!({
            "view": view,
            "anomalies": anomaly_messages(&result.anomalies),
            "needs_reget": reply.needs_reget(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Owner: {} in {}", owner.message_id, owner.chat_id);
    println!("Reply: {}", reply);
    if let Some(full_id) = reply.reply_message_full_id(owner.chat_id) {
        println!("  Target: {}", full_id);
    }
    if let Some(origin) = reply.origin() {
        println!("  Origin: {}", origin);
    }
    if let Some(date) = reply.origin_date() {
        println!("  Sent: {}", format_date(date));
    }
    if !reply.quote().is_empty() {
        println!(
            "  Quote{}: {:?}",
            if reply.is_quote_manual() { " (manual)" } else { "" },
            reply.quote().text
        );
    }
    if let Some(content) = reply.content() {
        println!("  Content: {}", content.kind());
    }
    if reply.needs_reget() {
        println!("  Content is outdated; the message should be fetched again");
    }
    if result.anomalies.is_empty() {
        println!("No anomalies");
    } else {
        println!("Anomalies:");
        for message in anomaly_messages(&result.anomalies) {
            println!("  - {}", message);
        }
    }
    Ok(())
}

/// Options of the 'compare' command describing the owning message
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    pub unsent: bool,
    pub top_thread: Option<i32>,
    pub deleted: Vec<i32>,
    pub json: bool,
}

/// Handle the 'compare' command
pub fn handle_compare(config: &Configuration, old: &Path, new: &Path, options: CompareOptions) -> Result<()> {
    let old = Fixture::load(old)?.build(config.session_count).into_value();
    let new = Fixture::load(new)?.build(config.session_count).into_value();

    let deleted: Vec<MessageId> = options.deleted.iter().copied().map(MessageId::Server).collect();
    let is_reply_to_deleted_message =
        |reply: &ReplyReference| reply.target_message_id().is_some_and(|id| deleted.contains(&id));
    let verdict = classify_change(
        &old,
        &new,
        options.top_thread.map(MessageId::Server),
        options.unsent,
        is_reply_to_deleted_message,
    );
    tracing::debug!(old = %old, new = %new, verdict = ?verdict, "Compared fixtures");

    if options.json {
        let output = json!({
            "verdict": format!("{:?}", verdict),
            "notify": verdict.needs_notification(),
            "equal": old == new,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Old: {}", old);
        println!("New: {}", new);
        println!("Verdict: {:?}", verdict);
        println!(
            "{}",
            if verdict.needs_notification() {
                "The change should be shown to the user"
            } else {
                "The change is not worth a notification"
            }
        );
    }
    Ok(())
}

fn describe_dependency(dependency: &Dependency) -> String {
    match dependency {
        Dependency::Chat(chat_id) => chat_id.to_string(),
        Dependency::User(user_id) => user_id.to_string(),
        Dependency::CustomEmoji(id) => format!("custom emoji {}", id),
        Dependency::Story {
            sender_chat_id,
            story_id,
        } => format!("story {} of {}", story_id, sender_chat_id),
    }
}

/// Handle the 'deps' command
pub fn handle_deps(config: &Configuration, fixture: &Path, is_bot: bool, json: bool) -> Result<()> {
    let reply = Fixture::load(fixture)?.build(config.session_count).into_value();
    let dependencies = dependencies_of(&reply, is_bot);
    let mandatory: Vec<String> = dependencies.mandatory().map(describe_dependency).collect();
    let best_effort: Vec<String> = dependencies.best_effort().map(describe_dependency).collect();

    if json {
        let output = json!({
            "mandatory": mandatory,
            "best_effort": best_effort,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if dependencies.is_empty() {
        println!("The reply depends on nothing");
        return Ok(());
    }
    for dependency in mandatory {
        println!("required: {}", dependency);
    }
    for dependency in best_effort {
        println!("optional: {}", dependency);
    }
    Ok(())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;
    let mut buffer = String::new();
    input.read_line(&mut buffer).context("Failed to read from stdin")?;
    Ok(buffer.trim().to_string())
}

/// Handle the 'config --init' command, asking for each setting on `input`
pub fn handle_config_init<R: BufRead, W: Write>(config_path: PathBuf, input: &mut R, output: &mut W) -> Result<()> {
    writeln!(output, "Initializing replyref configuration")?;
    writeln!(output, "Config file: {}", config_path.display())?;

    let mut config = if config_path.exists() {
        writeln!(output, "Configuration file already exists. Loading existing values...")?;
        Configuration::load_from_file(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to load existing config: {}", e))?
    } else {
        Configuration::default()
    };

    let answer = prompt(
        input,
        output,
        &format!(
            "Log level (error/warn/info/debug/trace) [{}]: ",
            log_level_name(config.log_level)
        ),
    )?;
    if !answer.is_empty() {
        match parse_log_level(&answer) {
            Ok(level) => config.log_level = level,
            Err(_) => writeln!(output, "Invalid log level, keeping {}", log_level_name(config.log_level))?,
        }
    }

    let answer = prompt(
        input,
        output,
        &format!(
            "Number of active sessions (1-{}) [{}]: ",
            MAX_SESSION_COUNT, config.session_count
        ),
    )?;
    if !answer.is_empty() {
        match answer.parse::<u32>() {
            Ok(count) => config.session_count = count,
            Err(_) => writeln!(output, "Invalid session count, keeping {}", config.session_count)?,
        }
    }

    if let Err(errors) = config.validate() {
        for error in &errors {
            writeln!(output, "  - {}", error)?;
        }
        return Err(anyhow::anyhow!("Configuration is invalid"));
    }

    config
        .save_to_file(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to save config: {}", e))?;
    writeln!(output, "Configuration saved to {}", config_path.display())?;
    Ok(())
}
