//! In-process remote store.
//!
//! Holds records in memory and fans creation events out to every open
//! subscription, including the subscription of the client that created the
//! record. Supports injected failures and simulated latency so engine
//! behaviour can be exercised without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::channel::mpsc;
use futures::StreamExt;

use crate::error::{Error, Result, StoreOp};
use crate::remote::{RemoteStore, Subscription, SubscriptionId};
use crate::{CreateRecord, CreationEvent, Record, RecordId, RecordPatch};

/// Sender half of a creation subscription.
type EventSender = mpsc::UnboundedSender<Result<CreationEvent>>;

/// A stored record with its insertion sequence number.
#[derive(Debug, Clone)]
struct Stored {
    seq: u64,
    record: Record,
}

/// Thread-safe in-memory implementation of [`RemoteStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<RecordId, Stored>,
    subscribers: DashMap<SubscriptionId, EventSender>,
    failures: DashMap<StoreOp, VecDeque<String>>,
    next_seq: AtomicU64,
    latency: Option<Duration>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given records, in order.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next call of `op` fail with `message`.
    ///
    /// Failures queue up; each call consumes one.
    pub fn fail_next(&self, op: StoreOp, message: impl Into<String>) {
        self.failures.entry(op).or_default().push_back(message.into());
    }

    /// Push a raw event to every open subscription without storing anything.
    ///
    /// Returns the number of subscriptions that received it.
    pub fn publish(&self, event: CreationEvent) -> usize {
        let mut sent_count = 0;

        for entry in self.subscribers.iter() {
            if entry.value().unbounded_send(Ok(event.clone())).is_ok() {
                sent_count += 1;
            }
        }

        tracing::debug!(recipients = sent_count, "Published creation event");

        sent_count
    }

    /// Number of open subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Number of stored records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    fn insert(&self, record: Record) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.records
            .insert(record.id.clone(), Stored { seq, record });
    }

    /// Simulate the round trip: wait out the latency, then consume an injected failure.
    async fn round_trip(&self, op: StoreOp) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(mut queue) = self.failures.get_mut(&op) {
            if let Some(message) = queue.pop_front() {
                tracing::debug!(operation = %op, %message, "Injected store failure");
                return Err(Error::transport(op, message));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Record>> {
        self.round_trip(StoreOp::List).await?;

        let mut stored: Vec<Stored> = self.records.iter().map(|e| e.value().clone()).collect();
        stored.sort_by_key(|s| s.seq);

        Ok(stored.into_iter().map(|s| s.record).collect())
    }

    async fn create(&self, input: CreateRecord) -> Result<Record> {
        self.round_trip(StoreOp::Create).await?;

        if input.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        let record = Record::new(uuid::Uuid::new_v4().to_string(), input.name, input.done);
        self.insert(record.clone());

        tracing::debug!(id = %record.id, "Record created");
        self.publish(CreationEvent::created(record.clone()));

        Ok(record)
    }

    async fn update(&self, id: &RecordId, patch: RecordPatch) -> Result<Record> {
        self.round_trip(StoreOp::Update).await?;

        let mut stored = self
            .records
            .get_mut(id)
            .ok_or_else(|| Error::RecordNotFound(id.clone()))?;
        stored.record.apply_patch(&patch);

        tracing::debug!(id = %id, "Record updated");

        Ok(stored.record.clone())
    }

    async fn delete(&self, id: &RecordId) -> Result<RecordId> {
        self.round_trip(StoreOp::Delete).await?;

        let (id, _) = self
            .records
            .remove(id)
            .ok_or_else(|| Error::RecordNotFound(id.clone()))?;

        tracing::debug!(id = %id, "Record deleted");

        Ok(id)
    }

    async fn subscribe_on_create(&self) -> Result<Subscription> {
        self.round_trip(StoreOp::Subscribe).await?;

        let (tx, rx) = mpsc::unbounded();
        let id = SubscriptionId(uuid::Uuid::new_v4().to_string());
        self.subscribers.insert(id.clone(), tx);

        tracing::info!(subscription = %id, "Creation subscription opened");

        Ok(Subscription {
            id,
            events: rx.boxed(),
        })
    }

    fn unsubscribe(&self, id: &SubscriptionId) {
        if self.subscribers.remove(id).is_some() {
            tracing::info!(
                subscription = %id,
                remaining = self.subscribers.len(),
                "Creation subscription released"
            );
        }
    }
}
