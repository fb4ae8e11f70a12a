use std::collections::VecDeque;
use std::task::Context;
use std::task::Poll;

use futures::channel::mpsc;
use futures::channel::oneshot;
use futures::future::FutureExt;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::stream::StreamExt;
use tracing::debug;

use crate::communicator::Communicator;
use crate::communicator::NodeOf;
use crate::config::ClusterConfig;
use crate::event::Event;
use crate::log::OperationLog;
use crate::store::KvStore;

use super::core::Action;
use super::core::Actions;
use super::core::NodeCore;
use super::handle::NodeHandleRequest;
use super::handle::NodeHandleResponse;
use super::handle::RequestAndResponseSender;
use super::req_handler::Inbound;
use super::Node;
use super::NodeHandle;
use super::RequestHandler;

type Client = oneshot::Sender<NodeHandleResponse>;

/// The default [`Node`][crate::Node] implementation.
///
/// Drives a [`NodeCore`] off its inbound queue and hands outbound messages to
/// the communicator. Messages a node sends to itself are looped back through
/// the inbound queue, behind everything that is already queued.
pub struct NodeKernel<S, C: Communicator> {
    core: NodeCore<NodeOf<C>, S, Client>,
    communicator: C,
    inbound_send: mpsc::UnboundedSender<Inbound<NodeOf<C>>>,
    inbound_recv: mpsc::UnboundedReceiver<Inbound<NodeOf<C>>>,
    handle_send: mpsc::Sender<RequestAndResponseSender>,
    handle_recv: mpsc::Receiver<RequestAndResponseSender>,
    sends: FuturesUnordered<LocalBoxFuture<'static, ()>>,
    events: VecDeque<Event<NodeOf<C>>>,
}

impl<S, C> Node for NodeKernel<S, C>
where
    S: KvStore,
    C: Communicator,
{
    type Communicator = C;
    type Store = S;

    fn id(&self) -> NodeOf<C> {
        self.core.id()
    }

    /// Polls the node's event stream.
    ///
    /// Processing inbound messages, client requests and outbound sends all
    /// happens in here, so the node makes no progress unless polled.
    fn poll_events(&mut self, cx: &mut Context<'_>) -> Poll<Event<NodeOf<C>>> {
        self.poll_handle_reqs(cx);

        while let Poll::Ready(Some((sender, message))) = self.inbound_recv.poll_next_unpin(cx) {
            let actions = self.core.handle(sender, message);
            self.perform(actions);
        }

        while let Poll::Ready(Some(())) = self.sends.poll_next_unpin(cx) {
            // keep going
        }

        match self.events.pop_front() {
            Some(event) => {
                tracing::trace!("Emitting event {:?}.", event);
                Poll::Ready(event)
            }
            None => Poll::Pending,
        }
    }

    fn handle(&self) -> NodeHandle {
        NodeHandle::new(self.handle_send.clone())
    }

    fn log(&self) -> &OperationLog<NodeOf<C>, S> {
        self.core.log()
    }
}

impl<S, C> NodeKernel<S, C>
where
    S: KvStore,
    C: Communicator,
{
    pub(crate) fn spawn(
        config: ClusterConfig<NodeOf<C>>,
        communicator: C,
        store: S,
        seed: u64,
    ) -> (RequestHandler<NodeOf<C>>, NodeKernel<S, C>) {
        let (inbound_send, inbound_recv) = mpsc::unbounded();
        let (handle_send, handle_recv) = mpsc::channel(32);

        let req_handler = RequestHandler::new(inbound_send.clone());

        let node = NodeKernel {
            core: NodeCore::new(config, store, seed),
            communicator,
            inbound_send,
            inbound_recv,
            handle_send,
            handle_recv,
            sends: FuturesUnordered::new(),
            events: VecDeque::new(),
        };

        (req_handler, node)
    }

    pub fn core(&self) -> &NodeCore<NodeOf<C>, S, Client> {
        &self.core
    }

    fn poll_handle_reqs(&mut self, cx: &mut Context<'_>) {
        while let Poll::Ready(Some((req, send))) = self.handle_recv.poll_next_unpin(cx) {
            self.process_handle_req(req, send);
        }
    }

    fn process_handle_req(&mut self, req: NodeHandleRequest, send: Client) {
        match req {
            NodeHandleRequest::Submit(request) => {
                let actions = self.core.submit(request, send);
                self.perform(actions);
            }
            NodeHandleRequest::ReadStale(key) => {
                let _ = send.send(NodeHandleResponse::ReadStale(self.core.read_stale(key)));
            }
        }
    }

    fn perform(&mut self, actions: Actions<NodeOf<C>, Client>) {
        let id = self.core.id();

        for action in actions {
            match action {
                Action::Send { receiver, message } if receiver == id => {
                    // The receiving end lives in `self`.
                    let _ = self.inbound_send.unbounded_send((id, message));
                }
                Action::Send { receiver, message } => {
                    let kind = message.kind();
                    let send = self.communicator.send(receiver, message);

                    self.sends.push(
                        async move {
                            if let Err(err) = send.await {
                                debug!("Failed to send {} to {:?}: {:?}", kind, receiver, err);
                            }
                        }
                        .boxed_local(),
                    );
                }
                Action::Reply { client, response } => {
                    // The client may have given up waiting.
                    let _ = client.send(NodeHandleResponse::Submit(response));
                }
                Action::Emit(event) => self.events.push_back(event),
            }
        }
    }
}

impl<S, C> std::fmt::Debug for NodeKernel<S, C>
where
    S: KvStore,
    C: Communicator,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("quepaxa::NodeKernel")
            .field("id", &self.core.id())
            .field("slot", &self.core.proposer().slot())
            .finish()
    }
}
