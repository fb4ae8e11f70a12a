//! Proposals, their priorities and the step/phase arithmetic of a round.

use serde::Deserialize;
use serde::Serialize;

use crate::operation::Operation;

/// Index of a consensus instance, i.e. a position in the decided log.
pub type Slot = u64;

/// A certification round within a slot.
pub type Step = u64;

/// Every slot's first step. It is also the first phase 0 step.
pub const FIRST_STEP: Step = 4;

/// Rank used to resolve contention between proposals.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Priority(u32);

impl Priority {
    /// The reserved priority `H`.
    ///
    /// A proposal carrying it asserts that its proposer believes the round to
    /// be uncontended. Random priorities are always lower.
    pub const UNCONTENDED: Priority = Priority(65_536);

    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Draws a priority uniformly from `[0, H)`.
    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..Self::UNCONTENDED.0))
    }

    pub fn is_uncontended(self) -> bool {
        self == Self::UNCONTENDED
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// The sub-algorithm a step runs, i.e. `step % 4`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Phase {
    /// Phase 0, may decide on the fast path.
    Fast,
    /// Phase 1, re-certifies the carried proposal.
    Certify,
    /// Phase 2, may decide on the slow path.
    Converge,
    /// Phase 3, carries the best certified proposal on.
    Carry,
}

impl Phase {
    pub fn of(step: Step) -> Self {
        match step % 4 {
            0 => Phase::Fast,
            1 => Phase::Certify,
            2 => Phase::Converge,
            _ => Phase::Carry,
        }
    }
}

/// A candidate decree for a slot.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct Proposal<N> {
    pub priority: Priority,
    /// Authoring node, for bookkeeping only.
    pub proposer: N,
    pub operation: Operation<N>,
}

impl<N> Proposal<N> {
    pub fn new(priority: Priority, proposer: N, operation: Operation<N>) -> Self {
        Self {
            priority,
            proposer,
            operation,
        }
    }

    /// Whether this proposal ranks above `other`.
    ///
    /// Every proposal outranks the absence of one.
    pub fn outranks(&self, other: Option<&Proposal<N>>) -> bool {
        other.map_or(true, |o| self.priority > o.priority)
    }
}

/// Replaces `best` with `candidate` if the latter ranks higher.
pub(crate) fn keep_best<N: Copy>(best: &mut Option<Proposal<N>>, candidate: Option<&Proposal<N>>) {
    if let Some(candidate) = candidate {
        if candidate.outranks(best.as_ref()) {
            *best = Some(*candidate);
        }
    }
}
