//! todo-sync - terminal front end for the todo sync engine.
//!
//! Runs one sync session against an in-memory store: subscribes to creation
//! events, loads the list, then reads commands from stdin. The list is
//! re-rendered to stdout on every change; logs go to stderr.

mod app;
mod commands;
mod config;
mod error;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use todo_sync_engine::{MemoryStore, Record, SyncEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{render, App, Outcome};
use crate::commands::Command;
use crate::config::Config;
use crate::error::AppError;

/// Todos every fresh store starts with when seeding is on.
fn starter_todos() -> Vec<Record> {
    vec![
        Record::new("0", "create-react-app amplify-hands-on", false),
        Record::new("1", "yarn global add @aws-amplify-cli", false),
        Record::new("2", "yarn add aws-amplify aws-amplify-react", true),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_sync=info,todo_sync_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Build the store and engine
    let mut store = if config.seed {
        MemoryStore::with_records(starter_todos())
    } else {
        MemoryStore::new()
    };
    if let Some(latency) = config.latency {
        store = store.with_latency(latency);
    }
    let engine = SyncEngine::new(Arc::new(store), config.sync);

    tracing::info!(
        seed = config.seed,
        latency_ms = config.latency.map(|d| d.as_millis() as u64),
        create_policy = ?engine.config().create_policy,
        delete_policy = ?engine.config().delete_policy,
        commit_toggles = engine.config().commit_toggles,
        "Starting todo-sync"
    );

    // The stream guard lives until main returns; dropping it unsubscribes
    let stream = engine.open_creation_stream().await?;
    tracing::info!(subscription = %stream.id(), "Listening for new todos");
    if let Err(err) = engine.initialize().await {
        tracing::warn!(error = %err, "Could not load todos; use `reload` to retry");
    }

    // Re-render on every change
    let mut changes = engine.watch();
    let renderer = tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let view = render(changes.borrow_and_update().records());
            println!("{view}\n");
        }
    });

    let app = App::new(engine);
    println!("{}\n", render(&app.engine().records()));
    println!("type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let result = match line.parse::<Command>() {
            Ok(command) => app.execute(command).await,
            Err(err) => Err(AppError::from(err)),
        };

        match result {
            Ok(Outcome::Print(text)) => println!("{text}"),
            Ok(Outcome::Quiet) => {}
            Ok(Outcome::Quit) => break,
            Err(err) if err.is_recoverable() => eprintln!("error: {err}"),
            Err(err) => return Err(err.into()),
        }
    }

    drop(stream);
    renderer.abort();
    tracing::info!("Session closed");

    Ok(())
}
