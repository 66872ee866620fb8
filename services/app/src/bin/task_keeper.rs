//! services/app/src/bin/task_keeper.rs

use app_lib::{
    adapters::{ConsolePrompt, FileStorage, HttpTokenEndpoint},
    config::Config,
    error::AppError,
    session::{SessionError, SessionService},
};
use clap::Parser;
use std::sync::Arc;
use task_keeper_core::domain::UnknownStatus;
use task_keeper_core::{Task, TaskDraft, TaskFilter, TaskStatus, UserStore};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "task_keeper")]
#[command(about = "Per-user task lists behind an OAuth2 login", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Show who is logged in (the default)
    Status,
    /// Sign in through the identity provider
    Login,
    /// Sign out, keeping the saved tasks
    Logout,
    /// Delete every user's saved tasks
    Clear,
    /// List the active user's tasks, optionally only one status
    List {
        /// pendente, aberta or concluida
        #[arg(value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// Create a pending task
    Add { title: String, description: String },
    /// Show a task; a pending task becomes opened
    View { id: String },
    /// Bring a task back to opened
    Open { id: String },
    /// Complete one or more tasks
    Complete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete one or more tasks
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn parse_status(raw: &str) -> Result<TaskStatus, UnknownStatus> {
    raw.parse()
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
    }
    for task in tasks {
        println!(
            "{:<10} {}  {}  ({})",
            task.status,
            task.created_at.format("%Y-%m-%d %H:%M"),
            task.title,
            task.id
        );
    }
}

/// Shows the short message on stderr and keeps the full error for the exit status.
fn report(e: SessionError) -> AppError {
    eprintln!("{}", e.user_message());
    e.into()
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded.");

    // --- 2. Open the Medium & Rehydrate the Store ---
    let storage = Arc::new(FileStorage::open(&config.data_dir).await?);
    let store = Arc::new(UserStore::new(storage));
    let session = SessionService::new(
        store,
        Arc::new(ConsolePrompt),
        Arc::new(HttpTokenEndpoint::new(config.oauth.token_url.clone())),
        config.oauth.clone(),
        &config.app_scheme,
    );
    let active = session.restore().await?;

    // --- 3. Run the Command ---
    match cli.command.unwrap_or(Command::Status) {
        Command::Status => match active {
            Some(record) => println!(
                "Logged in as {} ({}), {} task(s).",
                record.user.name,
                record.user.login,
                record.tasks.len()
            ),
            None => println!("Not logged in."),
        },
        Command::Login => match session.login().await.map_err(report)? {
            outcome if outcome.created => {
                println!("Welcome! Your account was created with sample tasks.")
            }
            _ => println!("Welcome back!"),
        },
        Command::Logout => session.logout().await?,
        Command::Clear => session.clear_data().await?,
        Command::List { status } => {
            let filter = status.map(TaskFilter::Status).unwrap_or_default();
            let tasks = session.list_tasks(&filter).await.map_err(report)?;
            print_tasks(&tasks);
        }
        Command::Add { title, description } => {
            let task = session
                .create_task(TaskDraft::new(title, description))
                .await
                .map_err(report)?;
            println!("Created task {}.", task.id);
        }
        Command::View { id } => {
            let task = session.view_task(&id).await.map_err(report)?;
            print_tasks(std::slice::from_ref(&task));
            println!("\n{}", task.description);
        }
        Command::Open { id } => session.open_task(&id).await.map_err(report)?,
        Command::Complete { ids } => match ids.as_slice() {
            [id] => session.complete_task(id).await.map_err(report)?,
            _ => session.complete_tasks(&ids).await.map_err(report)?,
        },
        Command::Remove { ids } => match ids.as_slice() {
            [id] => session.remove_task(id).await.map_err(report)?,
            _ => session.remove_tasks(&ids).await.map_err(report)?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_accepts_a_status_and_rejects_unknown_ones() {
        let cli = Cli::try_parse_from(["task_keeper", "list", "Concluida"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::List { status: Some(TaskStatus::Concluida) })
        ));

        let cli = Cli::try_parse_from(["task_keeper"]).unwrap();
        assert!(cli.command.is_none());

        assert!(Cli::try_parse_from(["task_keeper", "list", "todas"]).is_err());
        assert!(Cli::try_parse_from(["task_keeper", "frobnicate"]).is_err());
    }

    #[test]
    fn task_commands_take_their_arguments() {
        let cli = Cli::try_parse_from(["task_keeper", "add", "Pagar contas", "luz"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Add { ref title, ref description }) if title == "Pagar contas" && description == "luz"
        ));

        let cli = Cli::try_parse_from(["task_keeper", "complete", "a", "b"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Complete { ref ids }) if ids.len() == 2));

        assert!(Cli::try_parse_from(["task_keeper", "remove"]).is_err());
    }
}
