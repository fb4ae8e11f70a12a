//! The submitter, a node's front door for clients.

use std::collections::HashMap;

use rand::rngs::StdRng;
use tracing::debug;
use tracing::trace;

use crate::operation::ClientRequest;
use crate::operation::ClientResponse;
use crate::operation::OpId;
use crate::operation::Operation;
use crate::operation::Outcome;

/// A client request awaiting its decision.
#[derive(Debug)]
pub struct PendingRequest<N, T> {
    /// Whatever is needed to answer the client.
    pub client: T,
    pub operation: Operation<N>,
}

/// Tracks client requests from submission until some node announces their
/// decision.
///
/// `T` is the handle through which a client is answered.
#[derive(Debug)]
pub struct Submitter<N, T> {
    origin: N,
    rng: StdRng,
    pending: HashMap<OpId, PendingRequest<N, T>>,
    answered: Vec<Operation<N>>,
}

impl<N: Copy + std::fmt::Debug, T> Submitter<N, T> {
    pub fn new(origin: N, rng: StdRng) -> Self {
        Self {
            origin,
            rng,
            pending: HashMap::new(),
            answered: Vec::new(),
        }
    }

    /// Turns `request` into an operation with a fresh id and tracks it.
    pub fn accept(&mut self, request: ClientRequest, client: T) -> Operation<N> {
        let id = loop {
            let id = OpId::random(&mut self.rng);
            if !self.pending.contains_key(&id) {
                break id;
            }
        };

        let operation = Operation::from_request(id, self.origin, request);

        debug!("Accepted {:?} as operation {}.", request, id);

        self.pending.insert(id, PendingRequest { client, operation });

        operation
    }

    /// Settles the pending request for a decided operation.
    ///
    /// Returns `None` for operations that aren't pending, e.g. because
    /// another node announced the same decision first.
    pub fn resolve(
        &mut self,
        operation: &Operation<N>,
        outcome: Outcome,
    ) -> Option<(T, ClientResponse)> {
        let pending = match self.pending.remove(&operation.id) {
            Some(pending) => pending,
            None => {
                trace!("Operation {} is not pending.", operation.id);
                return None;
            }
        };

        self.answered.push(pending.operation);

        Some((
            pending.client,
            ClientResponse::for_outcome(pending.operation.kind, outcome),
        ))
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Operations answered so far, in the order they were answered.
    pub fn answered(&self) -> &[Operation<N>] {
        &self.answered
    }
}
