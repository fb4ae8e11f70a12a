use std::future::Future;

use futures::channel::mpsc;
use futures::channel::oneshot;
use futures::future::FutureExt;
use futures::sink::SinkExt;

use crate::error::ShutDown;
use crate::error::SubmitError;
use crate::operation::ClientRequest;
use crate::operation::ClientResponse;
use crate::operation::Key;
use crate::operation::Value;

// macros
use crate::dispatch_node_handle_req;

pub type RequestAndResponseSender = (NodeHandleRequest, oneshot::Sender<NodeHandleResponse>);

/// A remote handle for a quepaxa [`Node`][crate::Node].
///
/// This is how clients reach a node's submitter.
#[derive(Clone)]
pub struct NodeHandle {
    sender: mpsc::Sender<RequestAndResponseSender>,
}

impl NodeHandle {
    pub(crate) fn new(sender: mpsc::Sender<RequestAndResponseSender>) -> Self {
        Self { sender }
    }

    /// Submits a client request and resolves once some node announced its
    /// decision.
    pub fn submit(
        &self,
        request: ClientRequest,
    ) -> impl Future<Output = Result<ClientResponse, SubmitError>> {
        dispatch_node_handle_req!(self, Submit, (request)).map(|r| r.ok_or(SubmitError::ShutDown))
    }

    /// Reads `key` from the node's local store without going through
    /// consensus. The value may lag behind other nodes'.
    pub fn read_stale(&self, key: Key) -> impl Future<Output = Result<Option<Value>, ShutDown>> {
        dispatch_node_handle_req!(self, ReadStale, (key)).map(|r| r.ok_or(ShutDown))
    }
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "quepaxa::NodeHandle")
    }
}

#[derive(Debug)]
pub enum NodeHandleRequest {
    Submit(ClientRequest),
    ReadStale(Key),
}

#[derive(Debug)]
pub enum NodeHandleResponse {
    Submit(ClientResponse),
    ReadStale(Option<Value>),
}

mod macros {
    #[doc(hidden)]
    #[macro_export]
    macro_rules! dispatch_node_handle_req {
        ($self:ident, $name:ident, $args:tt) => {{
            let req = NodeHandleRequest::$name $args;

            let mut sender = $self.sender.clone();
            let (s, r) = oneshot::channel();

            async move {
                let send_res = sender.send((req, s)).await;

                match (send_res, r.await) {
                    (Ok(_), Ok(NodeHandleResponse::$name(r))) => Some(r),
                    (Err(_), _) | (_, Err(_)) => None,
                    _ => unreachable!(),
                }
            }
        }};
    }
}
