//! LocalCollection - the engine's ordered, identity-unique record list.
//!
//! All methods are synchronous and pure with respect to the outside world.
//! The engine wraps the collection in a watch channel and runs every
//! mutation as a single read-modify-write step.

use crate::{Record, RecordId};
use std::collections::BTreeSet;

/// A record taken out of the collection by [`LocalCollection::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    /// Former position in display order
    pub index: usize,
    pub record: Record,
    /// Whether the record carried an unconfirmed local toggle
    pub gap: bool,
}

/// Ordered records, at most one per id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalCollection {
    records: Vec<Record>,
    /// Ids whose `done` flag was flipped locally and never confirmed remotely
    gaps: BTreeSet<RecordId>,
}

impl LocalCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection from an authoritative snapshot.
    pub fn from_snapshot(records: Vec<Record>) -> Self {
        Self {
            records,
            gaps: BTreeSet::new(),
        }
    }

    /// Replace everything with an authoritative snapshot.
    ///
    /// The snapshot is taken verbatim. Local-only state, gaps included, is
    /// discarded.
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
        self.gaps.clear();
    }

    /// Get a record by ID.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Position of a record in display order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Records in display order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterate records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Merge-by-identity: append `record` unless its id is already present.
    ///
    /// Returns `true` if the record was inserted.
    pub fn merge(&mut self, record: Record) -> bool {
        if self.contains(&record.id) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Remove a record, returning enough to put it back.
    pub fn remove(&mut self, id: &str) -> Option<Removed> {
        let index = self.position(id)?;
        let gap = self.gaps.remove(id);
        Some(Removed {
            index,
            record: self.records.remove(index),
            gap,
        })
    }

    /// Put a removed record back at (or as close as possible to) its old
    /// position, reopening its consistency gap if it had one.
    ///
    /// Does nothing if a record with the same id has reappeared meanwhile.
    pub fn restore(&mut self, removed: Removed) -> bool {
        let Removed { index, record, gap } = removed;
        if self.contains(&record.id) {
            return false;
        }
        if gap {
            self.gaps.insert(record.id.clone());
        }
        let index = index.min(self.records.len());
        self.records.insert(index, record);
        true
    }

    /// Flip `done` on a record in place. Returns the new value.
    pub fn toggle(&mut self, id: &str) -> Option<Record> {
        let index = self.position(id)?;
        let toggled = self.records[index].toggled();
        self.records[index] = toggled.clone();
        Some(toggled)
    }

    /// Swap in the store's canonical version of a record, keeping its position.
    ///
    /// Returns `false` if the record is no longer present.
    pub fn replace_record(&mut self, record: Record) -> bool {
        match self.position(&record.id) {
            Some(index) => {
                self.gaps.remove(&record.id);
                self.records[index] = record;
                true
            }
            None => false,
        }
    }

    /// Record that a local-only flip happened on `id`.
    ///
    /// A second flip brings the record back to its remote value and closes
    /// the gap.
    pub fn flip_gap(&mut self, id: &str) {
        if !self.gaps.remove(id) {
            self.gaps.insert(id.to_string());
        }
    }

    /// Ids diverging from the last remote-confirmed state.
    pub fn consistency_gaps(&self) -> impl Iterator<Item = &RecordId> {
        self.gaps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> LocalCollection {
        LocalCollection::from_snapshot(vec![
            Record::new("0", "create-react-app amplify-hands-on", false),
            Record::new("1", "yarn global add @aws-amplify-cli", false),
            Record::new("2", "yarn add aws-amplify aws-amplify-react", true),
        ])
    }

    #[test]
    fn merge_skips_known_ids() {
        let mut collection = seeded();

        assert!(!collection.merge(Record::new("0", "A", true)));
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.get("0").unwrap().name, "create-react-app amplify-hands-on");

        assert!(collection.merge(Record::new("3", "deploy", false)));
        assert_eq!(collection.len(), 4);
        assert_eq!(collection.records()[3].id, "3");
    }

    #[test]
    fn merge_twice_is_idempotent() {
        let mut collection = seeded();
        let event = Record::new("9", "echo", false);

        collection.merge(event.clone());
        let after_first = collection.clone();
        collection.merge(event);

        assert_eq!(collection, after_first);
    }

    #[test]
    fn toggle_preserves_order_and_other_records() {
        let mut collection = seeded();
        let before = collection.clone();

        let toggled = collection.toggle("1").unwrap();
        assert!(toggled.done);
        assert_eq!(collection.position("1"), Some(1));
        assert_eq!(collection.records()[0], before.records()[0]);
        assert_eq!(collection.records()[2], before.records()[2]);

        collection.toggle("1");
        assert_eq!(collection, before);
    }

    #[test]
    fn toggle_missing_is_none() {
        let mut collection = seeded();
        assert!(collection.toggle("missing").is_none());
        assert_eq!(collection, seeded());
    }

    #[test]
    fn remove_and_restore_position() {
        let mut collection = seeded();

        let removed = collection.remove("1").unwrap();
        assert_eq!(removed.index, 1);
        assert!(!removed.gap);
        assert!(!collection.contains("1"));
        assert!(collection.remove("1").is_none());

        assert!(collection.restore(removed));
        assert_eq!(collection, seeded());
    }

    #[test]
    fn restore_skips_reappeared_record() {
        let mut collection = seeded();
        let removed = collection.remove("2").unwrap();

        collection.merge(Record::new("2", "came back", false));
        assert!(!collection.restore(removed));
        assert_eq!(collection.get("2").unwrap().name, "came back");
    }

    #[test]
    fn restore_clamps_index() {
        let mut collection = seeded();
        let mut removed = collection.remove("0").unwrap();
        collection.remove("1");
        collection.remove("2");

        removed.index = 5;
        assert!(collection.restore(removed));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn restore_reopens_gap() {
        let mut collection = seeded();
        collection.toggle("0");
        collection.flip_gap("0");

        let removed = collection.remove("0").unwrap();
        assert!(removed.gap);
        assert_eq!(collection.consistency_gaps().count(), 0);

        assert!(collection.restore(removed));
        assert!(collection.get("0").unwrap().done);
        assert_eq!(collection.consistency_gaps().collect::<Vec<_>>(), vec!["0"]);
    }

    #[test]
    fn gaps_close_on_second_flip() {
        let mut collection = seeded();

        collection.flip_gap("0");
        assert_eq!(collection.consistency_gaps().collect::<Vec<_>>(), vec!["0"]);

        collection.flip_gap("0");
        assert_eq!(collection.consistency_gaps().count(), 0);
    }

    #[test]
    fn replace_discards_local_state() {
        let mut collection = seeded();
        collection.merge(Record::new("local", "never confirmed", false));
        collection.flip_gap("0");

        collection.replace(vec![Record::new("5", "fresh", false)]);

        assert_eq!(collection.len(), 1);
        assert!(!collection.contains("local"));
        assert_eq!(collection.consistency_gaps().count(), 0);
    }

    #[test]
    fn replace_record_keeps_position_and_closes_gap() {
        let mut collection = seeded();
        collection.toggle("1");
        collection.flip_gap("1");

        assert!(collection.replace_record(Record::new("1", "canonical", true)));
        assert_eq!(collection.position("1"), Some(1));
        assert_eq!(collection.get("1").unwrap().name, "canonical");
        assert_eq!(collection.consistency_gaps().count(), 0);

        assert!(!collection.replace_record(Record::new("missing", "x", true)));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        #[derive(Debug, Clone)]
        enum Step {
            Merge(u8),
            Remove(u8),
            Toggle(u8),
        }

        fn arb_step() -> impl Strategy<Value = Step> {
            prop_oneof![
                (0u8..16).prop_map(Step::Merge),
                (0u8..16).prop_map(Step::Remove),
                (0u8..16).prop_map(Step::Toggle),
            ]
        }

        proptest! {
            #[test]
            fn prop_ids_stay_unique(
                snapshot in prop::collection::hash_set(0u8..16, 0..8),
                steps in prop::collection::vec(arb_step(), 0..64),
            ) {
                let mut collection = LocalCollection::from_snapshot(
                    snapshot
                        .iter()
                        .map(|id| Record::new(id.to_string(), "seed", false))
                        .collect(),
                );

                for step in steps {
                    match step {
                        Step::Merge(id) => {
                            collection.merge(Record::new(id.to_string(), "event", false));
                        }
                        Step::Remove(id) => {
                            collection.remove(&id.to_string());
                        }
                        Step::Toggle(id) => {
                            collection.toggle(&id.to_string());
                        }
                    }

                    let ids: HashSet<_> = collection.iter().map(|r| r.id.clone()).collect();
                    prop_assert_eq!(ids.len(), collection.len());
                }
            }

            #[test]
            fn prop_toggle_twice_restores(
                flags in prop::collection::vec(any::<bool>(), 1..16),
                pick in any::<prop::sample::Index>(),
            ) {
                let records: Vec<_> = flags
                    .iter()
                    .enumerate()
                    .map(|(i, done)| Record::new(i.to_string(), format!("todo {i}"), *done))
                    .collect();
                let mut collection = LocalCollection::from_snapshot(records);
                let before = collection.clone();
                let id = pick.index(flags.len()).to_string();

                collection.toggle(&id);
                collection.toggle(&id);

                prop_assert_eq!(collection, before);
            }
        }
    }
}
