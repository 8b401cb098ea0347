mod app;
mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::App;

#[derive(Parser)]
#[command(name = "horas")]
#[command(about = "Track work hours by syncing tagged calendar events into tasks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync one user's calendar
    Sync {
        /// Email of the calendar owner
        user: String,

        /// Clear stored sync state first, forcing a full resync
        #[arg(long)]
        reset: bool,
    },
    /// Sync every configured user, isolating failures per user
    SyncAll {
        /// Clear stored sync state first, forcing full resyncs
        #[arg(long)]
        reset: bool,
    },
    /// Show per-user sync state
    Status,
    /// Manage tasks and their tags
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List all tasks
    List,
    /// Create a task
    Add {
        /// Task name
        name: String,

        /// Tag that links calendar events to this task (e.g. "#ACCIO")
        #[arg(long)]
        tag: String,

        /// Owning project id
        #[arg(long, default_value_t = 1)]
        project: i64,

        #[arg(long)]
        description: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let app = App::new()?;

    match cli.command {
        Commands::Sync { user, reset } => commands::sync::run_one(&app, &user, reset).await,
        Commands::SyncAll { reset } => commands::sync::run_all(&app, reset).await,
        Commands::Status => commands::status::run(&app),
        Commands::Task { command } => match command {
            TaskCommands::List => commands::task::list(&app),
            TaskCommands::Add {
                name,
                tag,
                project,
                description,
            } => commands::task::add(&app, &name, &tag, project, description),
        },
    }
}
