//! The proposer, which drives one operation at a time through the phases of a
//! slot.
//!
//! The proposer performs no I/O. It returns [`ProposerAction`]s that the
//! caller turns into messages and state machine applications.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use smallvec::smallvec;
use smallvec::SmallVec;
use tracing::debug;
use tracing::trace;

use crate::operation::OpId;
use crate::operation::Operation;
use crate::proposal::keep_best;
use crate::proposal::Phase;
use crate::proposal::Priority;
use crate::proposal::Proposal;
use crate::proposal::Slot;
use crate::proposal::Step;
use crate::proposal::FIRST_STEP;
use crate::quorum::Quorum;
use crate::recorder::Certificate;
use crate::Identifier;

pub type ProposerActions<N> = SmallVec<[ProposerAction<N>; 2]>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProposerAction<N> {
    /// Send `Record(slot, step, proposal)` to every recorder.
    Broadcast {
        slot: Slot,
        step: Step,
        proposal: Proposal<N>,
    },
    /// Phase 0 saw a first proposal without the reserved priority.
    Contended { slot: Slot, step: Step },
    /// The slot converged on `operation`.
    Decide {
        slot: Slot,
        step: Step,
        operation: Operation<N>,
        fast_path: bool,
    },
}

/// State of the round in flight.
#[derive(Clone, Debug)]
struct Round<N> {
    step: Step,
    /// The operation this node set out to get decided.
    own: Operation<N>,
    proposal: Proposal<N>,
    fast_best: Option<Proposal<N>>,
    certified_best: Option<Proposal<N>>,
    leader_round: bool,
    quorum: Quorum<N>,
}

impl<N: Identifier> Round<N> {
    fn reset_best(&mut self) {
        self.fast_best = None;
        self.certified_best = None;
        self.leader_round = true;
        self.quorum.reset();
    }
}

#[derive(Debug)]
pub struct Proposer<N> {
    id: N,
    leader: bool,
    cluster_size: usize,
    rng: StdRng,
    slot: Slot,
    round: Option<Round<N>>,
    queue: VecDeque<Operation<N>>,
}

impl<N: Identifier> Proposer<N> {
    pub fn new(id: N, leader: bool, cluster_size: usize, rng: StdRng) -> Self {
        Self {
            id,
            leader,
            cluster_size,
            rng,
            slot: 0,
            round: None,
            queue: VecDeque::new(),
        }
    }

    /// The slot this proposer is currently working on.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// The step of the round in flight.
    pub fn step(&self) -> Option<Step> {
        self.round.as_ref().map(|r| r.step)
    }

    pub fn is_idle(&self) -> bool {
        self.round.is_none()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Whether `id` is in flight or queued.
    pub fn knows(&self, id: OpId) -> bool {
        self.round.as_ref().map_or(false, |r| r.own.id == id)
            || self.queue.iter().any(|op| op.id == id)
    }

    /// Starts a round for `operation` if none is in flight, otherwise queues it.
    pub fn submit(&mut self, operation: Operation<N>) -> ProposerActions<N> {
        if self.knows(operation.id) {
            trace!("Operation {} is already known.", operation.id);
            return SmallVec::new();
        }

        if self.round.is_some() {
            trace!("Queueing operation {}.", operation.id);
            self.queue.push_back(operation);
            return SmallVec::new();
        }

        smallvec![self.start(operation)]
    }

    fn start(&mut self, operation: Operation<N>) -> ProposerAction<N> {
        debug!(
            "Proposing operation {} for slot {}.",
            operation.id, self.slot
        );

        self.round = Some(Round {
            step: FIRST_STEP,
            own: operation,
            proposal: Proposal::new(Priority::UNCONTENDED, self.id, operation),
            fast_best: None,
            certified_best: None,
            leader_round: true,
            quorum: Quorum::new(self.cluster_size),
        });

        self.broadcast()
    }

    /// Broadcasts the current proposal at the current step.
    ///
    /// Only the leader may use the reserved priority, and only at a slot's
    /// first step. Later steps never carry it, and later phase 0 steps always
    /// draw a fresh priority.
    fn broadcast(&mut self) -> ProposerAction<N> {
        let round = self
            .round
            .as_mut()
            .expect("broadcast requires a round in flight");

        round.reset_best();

        let reroll = if round.step == FIRST_STEP {
            !self.leader
        } else {
            Phase::of(round.step) == Phase::Fast || round.proposal.priority.is_uncontended()
        };

        if reroll {
            round.proposal.priority = Priority::random(&mut self.rng);
        }

        ProposerAction::Broadcast {
            slot: self.slot,
            step: round.step,
            proposal: round.proposal,
        }
    }

    /// Folds a recorder's reply into the round in flight.
    pub fn on_certificate(
        &mut self,
        recorder: N,
        slot: Slot,
        certificate: Certificate<N>,
    ) -> ProposerActions<N> {
        if slot != self.slot {
            trace!(
                "Ignoring certificate for slot {}, working on {}.",
                slot,
                self.slot
            );
            return SmallVec::new();
        }

        let round = match self.round.as_mut() {
            Some(round) => round,
            None => return SmallVec::new(),
        };

        if certificate.step < round.step {
            trace!(
                "Ignoring stale certificate for step {} from {:?}.",
                certificate.step,
                recorder
            );
            return SmallVec::new();
        }

        if certificate.step > round.step {
            debug!(
                "Recorder {:?} is at step {}, catching up from {}.",
                recorder, certificate.step, round.step
            );

            round.step = certificate.step;
            round.proposal = certificate.first;

            return smallvec![self.broadcast()];
        }

        if round.quorum.contains(&recorder) {
            trace!(
                "Ignoring repeated certificate for step {} from {:?}.",
                certificate.step,
                recorder
            );
            return SmallVec::new();
        }

        let phase = Phase::of(round.step);

        keep_best(&mut round.fast_best, Some(&certificate.first));
        keep_best(&mut round.certified_best, certificate.previous_best.as_ref());
        if phase == Phase::Fast {
            round.leader_round &= certificate.first.priority.is_uncontended();
        }

        if !round.quorum.track(recorder) {
            return SmallVec::new();
        }

        trace!(
            "Quorum of {} reached at step {} of slot {}.",
            round.quorum.threshold(),
            round.step,
            slot
        );

        let mut actions = SmallVec::new();

        match phase {
            Phase::Fast => {
                let fast_best = round
                    .fast_best
                    .expect("a quorum implies at least one first proposal");

                if round.leader_round {
                    let step = round.step;
                    return self.decide(step, fast_best.operation, true);
                }

                actions.push(ProposerAction::Contended {
                    slot,
                    step: round.step,
                });
                round.proposal = fast_best;
            }
            Phase::Certify => {}
            Phase::Converge => {
                let converged = round
                    .certified_best
                    .map_or(false, |best| best == round.proposal);

                if converged {
                    let (step, operation) = (round.step, round.proposal.operation);
                    return self.decide(step, operation, false);
                }
            }
            Phase::Carry => {
                if let Some(best) = round.certified_best {
                    round.proposal = best;
                }
            }
        }

        round.step += 1;
        actions.push(self.broadcast());

        actions
    }

    fn decide(&mut self, step: Step, operation: Operation<N>, fast_path: bool) -> ProposerActions<N> {
        let slot = self.slot;
        let round = self.round.take().expect("deciding requires a round in flight");

        debug!(
            "Slot {} converged on operation {} at step {} (fast path: {}).",
            slot, operation.id, step, fast_path
        );

        self.queue.retain(|op| op.id != operation.id);
        if round.own.id != operation.id {
            self.queue.push_front(round.own);
        }

        self.slot += 1;

        let mut actions: ProposerActions<N> = smallvec![ProposerAction::Decide {
            slot,
            step,
            operation,
            fast_path,
        }];

        if let Some(next) = self.queue.pop_front() {
            actions.push(self.start(next));
        }

        actions
    }
}
