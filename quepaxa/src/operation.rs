//! Client requests, the operations they turn into and their outcomes.

use serde::Deserialize;
use serde::Serialize;

pub type Key = i64;
pub type Value = i64;

/// Correlates a decision with the client request it answers.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize,
)]
pub struct OpId(u64);

impl OpId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen())
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for OpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum OpKind {
    Read,
    Write,
    Cas,
}

/// A client-requested read or mutation, as it travels through consensus.
///
/// `value` is the value to write, or the expected value of a
/// compare-and-set. `value2` is only used by compare-and-set and holds the
/// value to swap in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct Operation<N> {
    pub id: OpId,
    /// Node whose submitter holds the client request.
    pub origin: N,
    pub kind: OpKind,
    pub key: Key,
    pub value: Value,
    pub value2: Value,
}

impl<N> Operation<N> {
    pub fn from_request(id: OpId, origin: N, request: ClientRequest) -> Self {
        let (kind, key, value, value2) = match request {
            ClientRequest::Read { key } => (OpKind::Read, key, 0, 0),
            ClientRequest::Write { key, value } => (OpKind::Write, key, value, 0),
            ClientRequest::Cas { key, from, to } => (OpKind::Cas, key, from, to),
        };

        Self {
            id,
            origin,
            kind,
            key,
            value,
            value2,
        }
    }
}

/// Result of applying an operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Outcome {
    /// The value read.
    Value(Value),
    /// The operation was carried out.
    ///
    /// A compare-and-set whose comparison failed is reported this way, too.
    Done,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum ClientRequest {
    Read { key: Key },
    Write { key: Key, value: Value },
    Cas { key: Key, from: Value, to: Value },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum ClientResponse {
    ReadOk { value: Value },
    WriteOk,
    CasOk,
}

impl ClientResponse {
    /// The response for a decided operation of the given kind.
    pub fn for_outcome(kind: OpKind, outcome: Outcome) -> Self {
        match kind {
            OpKind::Read => ClientResponse::ReadOk {
                value: match outcome {
                    Outcome::Value(value) => value,
                    Outcome::Done => Value::default(),
                },
            },
            OpKind::Write => ClientResponse::WriteOk,
            OpKind::Cas => ClientResponse::CasOk,
        }
    }
}
