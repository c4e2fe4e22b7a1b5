mod cli;
mod fixture;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::handlers;
use replyref_core::models::Configuration;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "replyref")]
#[command(version)]
#[command(about = "Inspect how chat reply headers are sanitized and compared")]
struct Cli {
    /// Path to configuration file (default: ~/.config/replyref/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Reply(ReplyCommand),

    /// Configure replyref settings interactively
    Config {
        /// Start interactive configuration setup
        #[arg(long)]
        init: bool,

        /// Path to configuration file
        #[arg(long)]
        config_file: Option<PathBuf>,
    },
}

/// Commands that read fixtures and need a loaded configuration
#[derive(Subcommand)]
enum ReplyCommand {
    /// Build a reply reference from a captured header
    ///
    /// The fixture is a JSON object with the owning message, the raw header
    /// and optionally the users known locally:
    ///   {"owner": {"chat": {"_": "user", "user_id": 1}, "message_id": 600, "date": 1700000000},
    ///    "header": {"reply_to_msg_id": 500, "quote_text": "hi", "quote": true},
    ///    "known_users": [1, 2]}
    Build {
        /// Fixture file
        fixture: PathBuf,

        /// Output the client view and anomalies as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decide whether replacing one reply with another should be shown to the user
    Compare {
        /// Fixture with the previous header
        old: PathBuf,

        /// Fixture with the updated header
        new: PathBuf,

        /// The owning message is still being sent
        #[arg(long)]
        unsent: bool,

        /// Thread root of the owning message before the update
        #[arg(long)]
        top_thread: Option<i32>,

        /// Server message ids that were deleted locally
        #[arg(long, num_args = 1..)]
        deleted: Vec<i32>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List what must be loaded before a reply can be displayed
    Deps {
        /// Fixture file
        fixture: PathBuf,

        /// The owning message was sent by a bot
        #[arg(long)]
        bot: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // an invalid config file must not prevent rewriting it
        Commands::Config { init, config_file } => handle_config(init, config_file.or(cli.config)),
        Commands::Reply(command) => run(command, cli.config, cli.log_level),
    }
}

fn handle_config(init: bool, config_file: Option<PathBuf>) -> Result<()> {
    if !init {
        println!("Config command requires --init flag");
        println!("Usage: replyref config --init [--config-file PATH]");
        return Ok(());
    }
    let config_path = match config_file {
        Some(path) => path,
        None => Configuration::default_config_path()
            .map_err(|e| anyhow::anyhow!("Failed to get default config path: {}", e))?,
    };
    let stdin = std::io::stdin();
    handlers::handle_config_init(config_path, &mut stdin.lock(), &mut std::io::stdout())
}

fn run(command: ReplyCommand, config_path: Option<PathBuf>, log_level: Option<String>) -> Result<()> {
    let mut config = handlers::load_configuration(config_path.as_deref())?;
    if let Some(level) = &log_level {
        config.log_level = handlers::parse_log_level(level)?;
    }
    replyref_core::services::logging::init_logging(config.log_level)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match command {
        ReplyCommand::Build { fixture, json } => {
            handlers::handle_build(&config, &fixture, json)?;
        }
        ReplyCommand::Compare {
            old,
            new,
            unsent,
            top_thread,
            deleted,
            json,
        } => {
            let options = handlers::CompareOptions {
                unsent,
                top_thread,
                deleted,
                json,
            };
            handlers::handle_compare(&config, &old, &new, options)?;
        }
        ReplyCommand::Deps { fixture, bot, json } => {
            handlers::handle_deps(&config, &fixture, bot, json)?;
        }
    }

    Ok(())
}
