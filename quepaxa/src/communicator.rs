use std::future::Future;

use crate::message::Message;
use crate::Identifier;

pub type ErrorOf<C> = <C as Communicator>::Error;
pub type NodeOf<C> = <C as Communicator>::Node;

/// Carries messages from one node to another.
///
/// Every message is one-way. Replies, such as a `RecordOk` answering a
/// `Record`, are sent back as messages of their own. Delivery need not be
/// reliable, but a message that does arrive must arrive intact. Implementors
/// hand inbound messages to the receiver's
/// [`RequestHandler`][crate::RequestHandler].
pub trait Communicator: 'static {
    type Node: Identifier;

    type Error: std::fmt::Debug + Send + Sync + 'static;

    type SendMessage: Future<Output = Result<(), Self::Error>> + 'static;

    fn send(&mut self, receiver: Self::Node, message: Message<Self::Node>) -> Self::SendMessage;
}
