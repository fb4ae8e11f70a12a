//! The recorder, QuePaxa's acceptor role.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use tracing::trace;

use crate::proposal::Proposal;
use crate::proposal::Slot;
use crate::proposal::Step;

/// A recorder's answer to a certification request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Certificate<N> {
    /// The recorder's current step, which may be ahead of the requested one.
    pub step: Step,
    /// First proposal the recorder received at `step`.
    pub first: Proposal<N>,
    /// Best proposal of step `step - 1`, if the recorder went through it.
    pub previous_best: Option<Proposal<N>>,
    /// Proposals certified at `step` so far.
    pub certifications: u32,
}

/// Recorder state of a single slot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecorderState<N> {
    step: Step,
    first: Proposal<N>,
    current_best: Proposal<N>,
    previous_best: Option<Proposal<N>>,
    proposal_count: u32,
}

impl<N: Copy> RecorderState<N> {
    fn new(step: Step, proposal: Proposal<N>) -> Self {
        Self {
            step,
            first: proposal,
            current_best: proposal,
            previous_best: None,
            proposal_count: 1,
        }
    }

    /// Certifies `proposal` for `step`.
    ///
    /// Requests for a step below the current one leave the state untouched.
    pub fn certify(&mut self, step: Step, proposal: Proposal<N>) -> Certificate<N> {
        if step == self.step {
            if proposal.outranks(Some(&self.current_best)) {
                self.current_best = proposal;
                self.proposal_count += 1;
            }
        } else if step > self.step {
            self.previous_best = if step == self.step + 1 {
                Some(self.current_best)
            } else {
                None
            };
            self.step = step;
            self.first = proposal;
            self.current_best = proposal;
            self.proposal_count = 1;
        }

        self.certificate()
    }

    pub fn certificate(&self) -> Certificate<N> {
        Certificate {
            step: self.step,
            first: self.first,
            previous_best: self.previous_best,
            certifications: self.proposal_count,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn current_best(&self) -> &Proposal<N> {
        &self.current_best
    }
}

/// A node's recorder, holding one [`RecorderState`] per slot.
///
/// Slots are never pruned, so the map grows by one entry per decided slot.
/// A proposer that lags behind may still ask about any earlier slot, and
/// dropping its state would let that slot be recorded afresh.
#[derive(Debug)]
pub struct Recorder<N> {
    slots: BTreeMap<Slot, RecorderState<N>>,
}

impl<N> Default for Recorder<N> {
    fn default() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }
}

impl<N: Copy + std::fmt::Debug> Recorder<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn certify(&mut self, slot: Slot, step: Step, proposal: Proposal<N>) -> Certificate<N> {
        let certificate = match self.slots.entry(slot) {
            btree_map::Entry::Vacant(e) => e.insert(RecorderState::new(step, proposal)).certificate(),
            btree_map::Entry::Occupied(e) => e.into_mut().certify(step, proposal),
        };

        trace!(
            "Certified {:?} for slot {} at step {}, now at step {}.",
            proposal,
            slot,
            step,
            certificate.step
        );

        certificate
    }

    pub fn state(&self, slot: Slot) -> Option<&RecorderState<N>> {
        self.slots.get(&slot)
    }
}
