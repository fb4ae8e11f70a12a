use crate::operation::ClientResponse;
use crate::operation::OpId;
use crate::operation::Operation;
use crate::operation::Outcome;
use crate::proposal::Slot;
use crate::proposal::Step;

/// Emitted by a node's [`poll_events`][crate::Node::poll_events] method.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event<N> {
    /// This node's proposer started working on `operation`.
    Proposing { slot: Slot, operation: Operation<N> },

    /// Phase 0 detected contention, the round continues on the slow path.
    Contention { slot: Slot, step: Step },

    /// This node decided and applied `operation` for `slot`.
    Decided {
        slot: Slot,
        step: Step,
        operation: Operation<N>,
        outcome: Outcome,
        fast_path: bool,
    },

    /// A client of this node was answered.
    Answered { id: OpId, response: ClientResponse },
}
