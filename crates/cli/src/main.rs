use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ignite", about = "Game session telemetry harness", version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "ignite.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run a scripted demo session and print the submitted payload
    Demo {
        /// Game identifier stamped on the session
        #[arg(long, default_value = "crossword_puzzle")]
        game_id: String,
    },
    /// Deliver queued reports to stdout and clear the queue
    Flush,
    /// Show queue location and pending report count
    Status,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { game_id } => {
            commands::demo::run(&cli.config, &game_id)?;
        }
        Commands::Flush => {
            commands::flush::run(&cli.config)?;
        }
        Commands::Status => {
            commands::status::run(&cli.config)?;
        }
    }

    Ok(())
}
