//! flowbot - a Flowdock chat bot that routes messages to commands.

mod app;
mod commands;

use std::path::PathBuf;

use bot_config_and_utils::{init_logging, Config, Paths};
use clap::{Parser, Subcommand};

/// flowbot command-line interface.
#[derive(Parser)]
#[command(name = "flowbot")]
#[command(about = "Flowdock chat bot that routes messages to commands")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for config and logs. Defaults to ~/.flowbot
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen on the configured flows and answer commands
    Run,
    /// List flows visible to the API token
    Flows,
    /// List users visible to the API token
    Users,
    /// Post a message to a flow
    Send {
        /// Flow ID, name or slug
        flow: String,
        /// Message text
        content: String,
        /// Reply inside this thread
        #[arg(long)]
        thread: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let mut config = Config::load(&paths)?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    let command = cli.command.unwrap_or(Commands::Run);
    let foreground = matches!(command, Commands::Run);
    init_logging(&config.log_level, &paths, foreground)?;

    match command {
        Commands::Run => app::run_bot(config).await?,
        Commands::Flows => app::list_flows(config).await?,
        Commands::Users => app::list_users(config).await?,
        Commands::Send {
            flow,
            content,
            thread,
        } => app::send(config, flow, content, thread).await?,
    }

    Ok(())
}
