//! The decided log and the application of its entries to the store.

use std::collections::HashSet;

use tracing::debug;
use tracing::warn;

use crate::operation::OpId;
use crate::operation::OpKind;
use crate::operation::Operation;
use crate::operation::Outcome;
use crate::proposal::Slot;
use crate::store::KvStore;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecidedEntry<N> {
    pub slot: Slot,
    pub operation: Operation<N>,
    pub outcome: Outcome,
}

/// Applies decided operations to a [`KvStore`], in decision order.
#[derive(Debug)]
pub struct OperationLog<N, S> {
    store: S,
    entries: Vec<DecidedEntry<N>>,
    /// Ids of every operation applied so far. Like `entries` this is never
    /// truncated.
    applied: HashSet<OpId>,
}

impl<N: Copy + std::fmt::Debug, S: KvStore> OperationLog<N, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: Vec::new(),
            applied: HashSet::new(),
        }
    }

    /// Appends `operation` as the decision for `slot` and applies it.
    ///
    /// The same operation may be decided for more than one slot. Only its
    /// first occurrence changes the store; later ones are answered without
    /// effect, which every replica does alike.
    pub fn apply(&mut self, slot: Slot, operation: Operation<N>) -> Outcome {
        if slot != self.next_slot() {
            warn!(
                "Applying slot {} while the log ends before slot {}.",
                slot,
                self.next_slot()
            );
        }

        let outcome = if self.applied.insert(operation.id) {
            apply_to(&mut self.store, &operation)
        } else {
            debug!("Operation {} was applied before.", operation.id);

            match operation.kind {
                OpKind::Read => Outcome::Value(self.store.get(operation.key).unwrap_or_default()),
                OpKind::Write | OpKind::Cas => Outcome::Done,
            }
        };

        self.entries.push(DecidedEntry {
            slot,
            operation,
            outcome,
        });

        outcome
    }

    /// Slot whose decision is applied next.
    pub fn next_slot(&self) -> Slot {
        self.entries.len() as Slot
    }

    /// Index of the last applied entry, `None` while the log is empty.
    pub fn committed_index(&self) -> Option<usize> {
        self.entries.len().checked_sub(1)
    }

    pub fn entries(&self) -> &[DecidedEntry<N>] {
        &self.entries
    }

    pub fn contains(&self, id: OpId) -> bool {
        self.applied.contains(&id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn apply_to<N, S: KvStore>(store: &mut S, operation: &Operation<N>) -> Outcome {
    match operation.kind {
        OpKind::Read => Outcome::Value(store.get(operation.key).unwrap_or_default()),
        OpKind::Write => {
            store.set(operation.key, operation.value);
            Outcome::Done
        }
        OpKind::Cas => {
            // A failed comparison is not reported.
            store.compare_and_set(operation.key, operation.value, operation.value2);
            Outcome::Done
        }
    }
}
