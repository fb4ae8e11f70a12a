use futures::channel::mpsc;

use crate::error::HandleError;
use crate::error::ShutDown;
use crate::message::Message;
use crate::Identifier;

pub(crate) type Inbound<N> = (N, Message<N>);

/// Used by [`Communicator`][crate::communicator::Communicator]s to hand
/// inbound messages to a node.
#[derive(Debug)]
pub struct RequestHandler<N>(mpsc::UnboundedSender<Inbound<N>>);

impl<N> Clone for RequestHandler<N> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<N: Identifier> RequestHandler<N> {
    pub(crate) fn new(sender: mpsc::UnboundedSender<Inbound<N>>) -> Self {
        Self(sender)
    }

    /// Queues `message`, which was sent by `sender`, for processing.
    pub fn handle(&self, sender: N, message: Message<N>) -> Result<(), ShutDown> {
        self.0
            .unbounded_send((sender, message))
            .map_err(|_| ShutDown)
    }

    /// Decodes a message received off the wire and queues it.
    pub fn handle_encoded(&self, sender: N, bytes: &[u8]) -> Result<(), HandleError> {
        let message = Message::decode(bytes)?;

        Ok(self.handle(sender, message)?)
    }
}
