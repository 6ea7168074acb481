//! Toggle commit hook.
//!
//! By default `toggle_done` only flips the flag locally and the remote store
//! never hears about it. Installing a [`ToggleCommit`] hook turns the toggle
//! into an optimistic mutation: the engine flips locally, awaits the hook,
//! and rolls back if the hook fails. The merge core is the same either way.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::remote::RemoteStore;
use crate::{Record, RecordPatch};

/// Persists a locally flipped record.
#[async_trait]
pub trait ToggleCommit: Send + Sync + 'static {
    /// Commit the flipped record and return the canonical version.
    async fn commit(&self, record: &Record) -> Result<Record>;
}

/// Hook that writes the new `done` value through [`RemoteStore::update`].
#[derive(Debug)]
pub struct RemoteToggleCommit<S: RemoteStore> {
    store: Arc<S>,
}

impl<S: RemoteStore> RemoteToggleCommit<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: RemoteStore> ToggleCommit for RemoteToggleCommit<S> {
    async fn commit(&self, record: &Record) -> Result<Record> {
        self.store
            .update(&record.id, RecordPatch::done(record.done))
            .await
    }
}
