//! SyncEngine - keeps the local collection consistent with the remote store.
//!
//! Three sources feed the collection: the bulk snapshot from
//! [`RemoteStore::list_all`], confirmed local mutations, and the creation
//! event stream. None of them is ordered with respect to the others, so:
//!
//! - every incoming creation is merged by identity, never appended blindly;
//! - every mutation re-reads the collection when its remote call resolves
//!   instead of reusing a value captured before the call was issued.
//!
//! The collection lives inside a `watch` channel. Each change is one
//! synchronous `send_if_modified` closure, which gives read-modify-write
//! steps that never span an `.await` and a change notification for free.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::{CreatePolicy, DeletePolicy, SyncConfig};
use crate::error::{Error, Result};
use crate::hook::{RemoteToggleCommit, ToggleCommit};
use crate::remote::{RemoteStore, Subscription, SubscriptionId};
use crate::{CreateRecord, CreationEvent, LocalCollection, Record, RecordId};

/// Client-side sync engine over a [`RemoteStore`].
pub struct SyncEngine<S: RemoteStore> {
    store: Arc<S>,
    config: SyncConfig,
    state: Arc<watch::Sender<LocalCollection>>,
    toggle_hook: Option<Arc<dyn ToggleCommit>>,
}

impl<S: RemoteStore> SyncEngine<S> {
    /// Create an engine with an empty collection.
    ///
    /// With `commit_toggles` set, toggles are persisted through
    /// [`RemoteToggleCommit`].
    pub fn new(store: Arc<S>, config: SyncConfig) -> Self {
        let (state, _) = watch::channel(LocalCollection::new());

        let toggle_hook: Option<Arc<dyn ToggleCommit>> = if config.commit_toggles {
            Some(Arc::new(RemoteToggleCommit::new(Arc::clone(&store))))
        } else {
            None
        };

        Self {
            store,
            config,
            state: Arc::new(state),
            toggle_hook,
        }
    }

    /// Install a custom toggle commit hook.
    pub fn with_toggle_hook(mut self, hook: impl ToggleCommit) -> Self {
        self.toggle_hook = Some(Arc::new(hook));
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Get the remote store handle.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Open the creation stream, then load the initial snapshot.
    ///
    /// If the load fails the stream is released before the error is
    /// returned; call `start` again to retry.
    pub async fn start(&self) -> Result<CreationStream<S>> {
        let stream = self.open_creation_stream().await?;
        self.initialize().await?;
        Ok(stream)
    }

    /// Replace the collection with the store's current snapshot.
    ///
    /// Returns the number of records loaded. On failure the collection is
    /// left as it was and the engine stays usable.
    ///
    /// The snapshot replaces the collection verbatim. A creation merged
    /// while `list_all` is in flight (from the stream or a confirmed
    /// `add_record`) is dropped if the snapshot predates it, and only comes
    /// back on the next reload.
    pub async fn initialize(&self) -> Result<usize> {
        let records = self.store.list_all().await.map_err(|err| {
            tracing::warn!(error = %err, "Initial load failed");
            err
        })?;

        let count = records.len();
        self.state.send_modify(|collection| collection.replace(records));

        tracing::info!(count, "Loaded records from remote store");

        Ok(count)
    }

    /// Subscribe to creation events and merge them for as long as the
    /// returned guard is alive.
    pub async fn open_creation_stream(&self) -> Result<CreationStream<S>> {
        let Subscription { id, mut events } =
            self.store.subscribe_on_create().await.map_err(|err| {
                tracing::warn!(error = %err, "Failed to open creation stream");
                Error::Subscription(err.to_string())
            })?;

        let state = Arc::clone(&self.state);
        let subscription = id.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                match event {
                    Ok(CreationEvent {
                        created: Some(record),
                    }) => {
                        merge_into(&state, record);
                    }
                    Ok(CreationEvent { created: None }) => {
                        tracing::debug!(%subscription, "Creation event without payload");
                    }
                    Err(err) => {
                        tracing::warn!(%subscription, error = %err, "Creation stream error");
                    }
                }
            }
            tracing::debug!(%subscription, "Creation stream ended");
        });

        Ok(CreationStream {
            id,
            store: Arc::clone(&self.store),
            task,
        })
    }

    /// Merge a created record by identity.
    ///
    /// Returns `true` if it was inserted, `false` if its id was already known.
    pub fn merge_created(&self, record: Record) -> bool {
        merge_into(&self.state, record)
    }

    /// Create a record on the store.
    ///
    /// The store-returned record is what lands in the collection, either
    /// right away or through the creation stream depending on
    /// [`CreatePolicy`]. Blank names are rejected without a remote call.
    pub async fn add_record(&self, name: &str) -> Result<Record> {
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        let record = self
            .store
            .create(CreateRecord::new(name))
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Create failed");
                err
            })?;

        match self.config.create_policy {
            CreatePolicy::AppendConfirmed => {
                merge_into(&self.state, record.clone());
            }
            CreatePolicy::AwaitStream => {
                tracing::debug!(id = %record.id, "Created; waiting for creation stream");
            }
        }

        Ok(record)
    }

    /// Delete a record.
    ///
    /// Unknown ids are a no-op. See [`DeletePolicy`] for when the local
    /// removal happens.
    pub async fn delete_record(&self, id: &str) -> Result<()> {
        let present = self.state.borrow().contains(id);
        if !present {
            tracing::debug!(id, "Delete of unknown record ignored");
            return Ok(());
        }

        let id: RecordId = id.to_string();

        match self.config.delete_policy {
            DeletePolicy::Confirmed => {
                let removed = self.store.delete(&id).await.map_err(|err| {
                    tracing::warn!(id = %id, error = %err, "Delete failed");
                    err
                })?;

                if removed != id {
                    tracing::warn!(requested = %id, removed = %removed, "Store deleted a different id");
                }
                self.state
                    .send_if_modified(|collection| collection.remove(&removed).is_some());
            }
            DeletePolicy::Optimistic => {
                let mut taken = None;
                self.state.send_if_modified(|collection| {
                    taken = collection.remove(&id);
                    taken.is_some()
                });

                match self.store.delete(&id).await {
                    Ok(removed) => {
                        if removed != id {
                            tracing::warn!(requested = %id, removed = %removed, "Store deleted a different id");
                            self.state
                                .send_if_modified(|collection| collection.remove(&removed).is_some());
                        }
                    }
                    Err(err) => {
                        if let Some(removed) = taken {
                            let restored = self
                                .state
                                .send_if_modified(|collection| collection.restore(removed));
                            tracing::debug!(id = %id, restored, "Rolled back optimistic delete");
                        }
                        tracing::warn!(id = %id, error = %err, "Delete failed");
                        return Err(err);
                    }
                }
            }
        }

        tracing::debug!(id = %id, "Record deleted");

        Ok(())
    }

    /// Flip the `done` flag of a record in place.
    ///
    /// Without a commit hook the flip stays local and the id is reported by
    /// [`consistency_gaps`](Self::consistency_gaps). With a hook the flip is
    /// optimistic and rolled back if the hook fails. Unknown ids return
    /// `Ok(None)`.
    pub async fn toggle_done(&self, id: &str) -> Result<Option<Record>> {
        let local_only = self.toggle_hook.is_none();

        let mut flipped = None;
        self.state.send_if_modified(|collection| {
            flipped = collection.toggle(id);
            if flipped.is_some() && local_only {
                collection.flip_gap(id);
            }
            flipped.is_some()
        });

        let Some(flipped) = flipped else {
            tracing::debug!(id, "Toggle of unknown record ignored");
            return Ok(None);
        };

        let Some(hook) = &self.toggle_hook else {
            tracing::debug!(id, done = flipped.done, "Toggled locally, not persisted");
            return Ok(Some(flipped));
        };

        match hook.commit(&flipped).await {
            Ok(canonical) => {
                let applied = canonical.clone();
                self.state
                    .send_if_modified(|collection| collection.replace_record(applied));
                tracing::debug!(id, done = canonical.done, "Toggle committed");
                Ok(Some(canonical))
            }
            Err(err) => {
                self.state.send_if_modified(|collection| {
                    let still_flipped = collection
                        .get(&flipped.id)
                        .is_some_and(|current| current.done == flipped.done);
                    if still_flipped {
                        collection.toggle(&flipped.id);
                    }
                    still_flipped
                });
                tracing::warn!(id, error = %err, "Toggle commit failed, rolled back");
                Err(err)
            }
        }
    }

    /// Snapshot of the collection in display order.
    pub fn records(&self) -> Vec<Record> {
        self.state.borrow().records().to_vec()
    }

    /// Get a record by ID.
    pub fn get(&self, id: &str) -> Option<Record> {
        self.state.borrow().get(id).cloned()
    }

    /// Number of records in the collection.
    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    /// Ids whose local `done` flag was never confirmed by the store.
    pub fn consistency_gaps(&self) -> Vec<RecordId> {
        self.state.borrow().consistency_gaps().cloned().collect()
    }

    /// Observe collection changes. Notified only on effective changes.
    pub fn watch(&self) -> watch::Receiver<LocalCollection> {
        self.state.subscribe()
    }
}

fn merge_into(state: &watch::Sender<LocalCollection>, record: Record) -> bool {
    let id = record.id.clone();
    let inserted = state.send_if_modified(|collection| collection.merge(record));

    if inserted {
        tracing::debug!(id = %id, "Merged created record");
    } else {
        tracing::trace!(id = %id, "Created record already present");
    }

    inserted
}

/// Guard for an open creation subscription.
///
/// Dropping it stops the merge task and unsubscribes from the store, on
/// every exit path.
pub struct CreationStream<S: RemoteStore> {
    id: SubscriptionId,
    store: Arc<S>,
    task: JoinHandle<()>,
}

impl<S: RemoteStore> CreationStream<S> {
    /// The subscription handle.
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    /// Check if the merge task is still consuming events.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Release the subscription now.
    pub fn close(self) {}
}

impl<S: RemoteStore> Drop for CreationStream<S> {
    fn drop(&mut self) {
        self.task.abort();
        self.store.unsubscribe(&self.id);
        tracing::debug!(subscription = %self.id, "Creation stream closed");
    }
}

impl<S: RemoteStore> std::fmt::Debug for CreationStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreationStream")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
