//! The remote store boundary.
//!
//! The engine never talks to a transport directly. Anything that can list,
//! mutate and push creation events implements [`RemoteStore`]; the in-process
//! [`MemoryStore`](crate::MemoryStore) is the reference implementation.
//!
//! Only creations are pushed. There is no update or delete subscription:
//! changes made by other clients to existing records reach this client on
//! the next [`RemoteStore::list_all`].

use crate::{error::Result, CreateRecord, CreationEvent, Record, RecordId, RecordPatch};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Handle identifying an open creation subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub String);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An open creation subscription: its handle plus the lazy event sequence.
///
/// The stream ends once the store releases the subscription.
pub struct Subscription {
    pub id: SubscriptionId,
    pub events: BoxStream<'static, Result<CreationEvent>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Authoritative todo store.
///
/// Every call may fail; failures surface only through the returned `Result`.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetch every record, in the store's order.
    async fn list_all(&self) -> Result<Vec<Record>>;

    /// Create a record. The returned record is canonical.
    async fn create(&self, input: CreateRecord) -> Result<Record>;

    /// Apply a partial update and return the canonical record.
    async fn update(&self, id: &RecordId, patch: RecordPatch) -> Result<Record>;

    /// Delete a record, returning the id the store actually removed.
    async fn delete(&self, id: &RecordId) -> Result<RecordId>;

    /// Open a creation event subscription.
    async fn subscribe_on_create(&self) -> Result<Subscription>;

    /// Release a subscription. Unknown handles are ignored.
    fn unsubscribe(&self, id: &SubscriptionId);
}
