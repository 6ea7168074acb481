//! Command dispatch against a running sync session.

use todo_sync_engine::{MemoryStore, Record, RemoteStore, SyncEngine};

use crate::commands::{Command, HELP};
use crate::error::Result;

/// What the prompt loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print this and keep going
    Print(String),
    /// Nothing to print; list changes are rendered by the watcher
    Quiet,
    Quit,
}

/// A sync session over the in-memory store.
pub struct App {
    engine: SyncEngine<MemoryStore>,
}

impl App {
    pub fn new(engine: SyncEngine<MemoryStore>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &SyncEngine<MemoryStore> {
        &self.engine
    }

    /// Run one command.
    pub async fn execute(&self, command: Command) -> Result<Outcome> {
        tracing::debug!(?command, "Executing command");

        let outcome = match command {
            Command::List => Outcome::Print(render(&self.engine.records())),
            Command::Add(name) => {
                let created = self.engine.add_record(&name).await?;
                tracing::info!(id = %created.id, "Todo added");
                Outcome::Quiet
            }
            Command::Delete(id) => {
                self.engine.delete_record(&id).await?;
                Outcome::Quiet
            }
            Command::Toggle(id) => match self.engine.toggle_done(&id).await? {
                Some(_) => Outcome::Quiet,
                None => Outcome::Print(format!("no todo with id {id}")),
            },
            Command::Reload => {
                let count = self.engine.initialize().await?;
                Outcome::Print(format!("loaded {count} todos"))
            }
            Command::RemoteAdd(name) => {
                let created = self.engine.store().create(name.into()).await?;
                tracing::info!(id = %created.id, "Remote client created a todo");
                Outcome::Quiet
            }
            Command::Fail(op) => {
                self.engine.store().fail_next(op, "injected failure");
                Outcome::Print(format!("next {op} call will fail"))
            }
            Command::Gaps => {
                let gaps = self.engine.consistency_gaps();
                if gaps.is_empty() {
                    Outcome::Print("local state matches the store".to_string())
                } else {
                    Outcome::Print(format!("toggled locally, not saved: {}", gaps.join(", ")))
                }
            }
            Command::Export => {
                Outcome::Print(serde_json::to_string_pretty(&self.engine.records())?)
            }
            Command::Help => Outcome::Print(HELP.to_string()),
            Command::Quit => Outcome::Quit,
        };

        Ok(outcome)
    }
}

/// Render records one per line, in display order.
pub fn render(records: &[Record]) -> String {
    if records.is_empty() {
        return "(no todos)".to_string();
    }

    records
        .iter()
        .map(|r| {
            let mark = if r.done { "x" } else { " " };
            format!("[{mark}] {}  {}", r.id, r.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
