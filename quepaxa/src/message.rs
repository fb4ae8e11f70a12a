//! Messages exchanged between cluster members.

use serde::Deserialize;
use serde::Serialize;

use crate::error::CodecError;
use crate::operation::Operation;
use crate::operation::Outcome;
use crate::proposal::Proposal;
use crate::proposal::Slot;
use crate::proposal::Step;
use crate::recorder::Certificate;
use crate::Identifier;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Message<N> {
    /// Asks the receiver to get `operation` decided. Not answered.
    Propose { operation: Operation<N> },

    /// Asks the receiver's recorder to certify `proposal`. Answered with
    /// `RecordOk`.
    Record {
        slot: Slot,
        step: Step,
        proposal: Proposal<N>,
    },

    RecordOk {
        slot: Slot,
        certificate: Certificate<N>,
    },

    /// Announces a decision to the operation's origin. Not answered.
    OpDecision {
        operation: Operation<N>,
        outcome: Outcome,
    },
}

impl<N: Identifier> Message<N> {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Propose { .. } => "propose",
            Message::Record { .. } => "record",
            Message::RecordOk { .. } => "record_ok",
            Message::OpDecision { .. } => "op_decision",
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
