//! # Todo Sync Engine
//!
//! Client-side list synchronization for a remote todo store.
//!
//! The engine keeps an in-memory, ordered list of todo records consistent
//! with an authoritative remote store that is reached through three
//! independent channels: a bulk read, point mutations, and a push stream of
//! creation events. These arrive in no particular order relative to each
//! other; the engine merges them into one view without duplicates or lost
//! updates.
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] has a store-assigned id, a name, and a `done` flag. The id
//! never changes after creation.
//!
//! ### Remote store
//!
//! [`RemoteStore`] is the boundary to the authoritative service. The engine
//! only relies on this trait. [`MemoryStore`] is an in-process
//! implementation with failure injection, used for tests and the CLI.
//!
//! ### Local collection
//!
//! [`LocalCollection`] holds at most one record per id. Incoming creations
//! are merged by identity: inserted only when no record shares the id. This
//! absorbs the echo of the client's own creates and any duplicate event.
//!
//! ### Engine
//!
//! [`SyncEngine`] drives the initial load, forwards mutations, and keeps the
//! creation stream open through a [`CreationStream`] guard that unsubscribes
//! when dropped.
//!
//! - `add_record` / `delete_record` follow [`CreatePolicy`] / [`DeletePolicy`]
//! - `toggle_done` is local-only unless a [`ToggleCommit`] hook is installed
//!
//! Only creations are pushed by the store. Updates and deletes made by other
//! clients are picked up on the next [`SyncEngine::initialize`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use todo_sync_engine::{MemoryStore, Record, SyncConfig, SyncEngine};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> todo_sync_engine::Result<()> {
//! // 1. A store with one record
//! let store = Arc::new(MemoryStore::with_records(vec![Record::new("0", "A", false)]));
//!
//! // 2. Start a session: subscribe, then load
//! let engine = SyncEngine::new(store, SyncConfig::default());
//! let _stream = engine.start().await?;
//!
//! // 3. Mutate
//! let created = engine.add_record("buy milk").await?;
//! engine.toggle_done(&created.id).await?;
//!
//! // 4. The echoed creation event never duplicates the record
//! assert!(!engine.merge_created(created));
//! assert_eq!(engine.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod engine;
pub mod error;
pub mod hook;
pub mod memory;
pub mod record;
pub mod remote;

// Re-export main types at crate root
pub use collection::{LocalCollection, Removed};
pub use config::{ConfigError, CreatePolicy, DeletePolicy, SyncConfig};
pub use engine::{CreationStream, SyncEngine};
pub use error::{Error, Result, StoreOp};
pub use hook::{RemoteToggleCommit, ToggleCommit};
pub use memory::MemoryStore;
pub use record::{CreateRecord, CreationEvent, Record, RecordPatch};
pub use remote::{RemoteStore, Subscription, SubscriptionId};

/// Store-assigned record identifier
pub type RecordId = String;
