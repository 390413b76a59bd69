use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "dashboard-cli", version, about = "Personal dashboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pomodoro timer
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Notes
    Notes {
        #[command(subcommand)]
        action: commands::notes::NotesAction,
    },
    /// Todo list
    Tasks {
        #[command(subcommand)]
        action: commands::tasks::TasksAction,
    },
    /// Quick links
    Links {
        #[command(subcommand)]
        action: commands::links::LinksAction,
    },
    /// Pomodoro session statistics
    Stats,
    /// Current weather for the configured location
    Weather,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dashboard_cli=info,dashboard_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action).await,
        Commands::Notes { action } => commands::notes::run(action).await,
        Commands::Tasks { action } => commands::tasks::run(action).await,
        Commands::Links { action } => commands::links::run(action).await,
        Commands::Stats => commands::stats::run().await,
        Commands::Weather => commands::weather::run().await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
