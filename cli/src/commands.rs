//! Command parsing.
//!
//! One command per input line: a keyword, optionally followed by an
//! argument that runs to the end of the line.

use std::str::FromStr;

use todo_sync_engine::{RecordId, StoreOp};

/// A parsed user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the current list
    List,
    /// Create a todo through the engine
    Add(String),
    /// Delete a todo
    Delete(RecordId),
    /// Flip a todo's done flag
    Toggle(RecordId),
    /// Reload the list from the store
    Reload,
    /// Create a todo as another client would, bypassing the engine
    RemoteAdd(String),
    /// Make the next store call of this kind fail
    Fail(StoreOp),
    /// Print ids whose local state was never confirmed
    Gaps,
    /// Print the list as JSON
    Export,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        let argument = |name: &'static str| -> Result<String, ParseError> {
            if rest.is_empty() {
                Err(ParseError::MissingArgument { command: name })
            } else {
                Ok(rest.to_string())
            }
        };

        match keyword.to_ascii_lowercase().as_str() {
            "" => Err(ParseError::Empty),
            "list" | "ls" => Ok(Command::List),
            // Names keep their inner whitespace; blank names are left for the engine to reject
            "add" => Ok(Command::Add(rest.to_string())),
            "delete" | "rm" => argument("delete").map(Command::Delete),
            "toggle" | "t" => argument("toggle").map(Command::Toggle),
            "reload" => Ok(Command::Reload),
            "remote-add" => argument("remote-add").map(Command::RemoteAdd),
            "fail" => {
                let op = argument("fail")?;
                op.parse()
                    .map(Command::Fail)
                    .map_err(|_| ParseError::UnknownOperation(op))
            }
            "gaps" => Ok(Command::Gaps),
            "export" => Ok(Command::Export),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  list                 show the todo list
  add <name>           create a todo
  delete <id>          delete a todo
  toggle <id>          flip a todo's done flag
  reload               reload the list from the store
  remote-add <name>    create a todo as another client
  fail <op>            fail the next list|create|update|delete|subscribe call
  gaps                 show todos toggled locally but never saved remotely
  export               print the list as JSON
  help                 show this help
  quit                 exit";

/// Command parse errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("{command} needs an argument")]
    MissingArgument { command: &'static str },

    #[error("unknown store operation: {0}")]
    UnknownOperation(String),
}
