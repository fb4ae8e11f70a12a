//! QuePaxa is a leaderless, round-based consensus protocol in the Paxos family.
//! This crate uses it to replicate a key-value store: a cluster of nodes
//! agrees, one operation at a time, on the next read, write or
//! compare-and-set to apply.
//!
//! # Usage
//!
//! A node is assembled with the [node builder][node_builder]. It needs its
//! own id, the cluster's members, the designated leader and a
//! [`Communicator`][communicator::Communicator] through which it reaches the
//! other members. Spawning a node yields a [`RequestHandler`], through which
//! the transport layer delivers inbound messages, and a [`NodeKernel`], which
//! must be polled (see [`Node::next_event`]) to make progress.
//!
//! Clients talk to a node through its [`NodeHandle`].
//!
//! # Protocol
//!
//! Every node plays three roles at once.
//!
//! 1. **Submitter**
//!
//!    Accepts client requests, tags each with a random id and broadcasts a
//!    `Propose` message to all other members. The origin node also hands the
//!    operation to its own proposer. Once any node announces a decision for
//!    the id, the submitter answers the client.
//!
//! 2. **Proposer**
//!
//!    Drives one operation at a time through consensus; further operations
//!    are queued. Each consensus instance (a _slot_) consists of _steps_,
//!    grouped into cycles of four _phases_ (`step % 4`). A proposer sends
//!    `Record(slot, step, proposal)` to every recorder and waits for a
//!    majority of `RecordOk` replies at its current step.
//!
//!    - Phase 0: If every reply reported the reserved priority
//!      [`H`][proposal::Priority::UNCONTENDED] as the first proposal at this
//!      step, the round was uncontended and the proposal is decided right
//!      away (_fast path_). Otherwise the best first proposal is carried on.
//!    - Phase 1: Nothing is decided, the carried proposal is re-certified.
//!    - Phase 2: If the best proposal certified one step earlier matches the
//!      carried one, it is decided.
//!    - Phase 3: The best previously certified proposal is carried on.
//!
//!    Only the designated leader proposes with priority `H`, and only at the
//!    first step of a slot. Everyone else draws a random priority below `H`.
//!
//! 3. **Recorder**
//!
//!    Certifies, per slot, the highest priority proposal it has seen at its
//!    current step and reports the first proposal of that step together with
//!    the best proposal of the preceding step. These two reports are what
//!    makes agreement across steps safe.
//!
//! A node that decides applies the operation to its
//! [`OperationLog`][log::OperationLog] and announces the outcome to the
//! operation's origin.
//!
//! # Limitations
//!
//! There is no timeout or retry. A round that never hears from a majority of
//! recorders never decides. Recorder state is not durable.

//
// Lint configuration
#![warn(rust_2018_idioms)]
#![warn(clippy::wildcard_imports)]

pub mod communicator;
pub mod config;
pub mod error;
pub mod event;
pub mod log;
pub mod message;
pub mod node;
pub mod operation;
pub mod proposal;
pub mod proposer;
#[cfg(feature = "prototyping")]
pub mod prototyping;
pub mod quorum;
pub mod recorder;
pub mod store;
pub mod submitter;

use std::fmt::Debug;
use std::hash::Hash;

pub use config::ClusterConfig;
pub use event::Event;
pub use message::Message;
#[doc(inline)]
pub use node::builder as node_builder;
pub use node::Node;
pub use node::NodeCore;
pub use node::NodeHandle;
pub use node::NodeKernel;
pub use node::RequestHandler;
pub use operation::ClientRequest;
pub use operation::ClientResponse;
pub use operation::Operation;
pub use proposal::Proposal;
pub use store::KvStore;
pub use store::MemoryStore;

/// Trait bound of node ids.
pub trait Identifier:
    'static
    + Copy
    + Debug
    + Eq
    + Hash
    + Ord
    + Send
    + Sync
    + Unpin
    + serde::Serialize
    + serde::de::DeserializeOwned
{
}

impl<T> Identifier for T where
    T: 'static
        + Copy
        + Debug
        + Eq
        + Hash
        + Ord
        + Send
        + Sync
        + Unpin
        + serde::Serialize
        + serde::de::DeserializeOwned
{
}
