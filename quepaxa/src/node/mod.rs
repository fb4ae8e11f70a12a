pub mod builder;
mod core;
mod handle;
mod kernel;
mod req_handler;

use std::task::Context;
use std::task::Poll;

use crate::communicator::Communicator;
use crate::log::OperationLog;
use crate::store::KvStore;
use crate::Event;

pub use self::core::Action;
pub use self::core::Actions;
pub use self::core::NodeCore;
pub use builder::NodeBuilder;
pub use handle::NodeHandle;
pub use kernel::NodeKernel;
pub use req_handler::RequestHandler;

pub type CommunicatorOf<N> = <N as Node>::Communicator;
pub type NodeIdOf<N> = crate::communicator::NodeOf<CommunicatorOf<N>>;
pub type EventFor<N> = Event<NodeIdOf<N>>;

pub fn builder() -> builder::NodeBuilderBlank {
    builder::NodeBuilderBlank::new()
}

pub trait Node: Sized {
    type Communicator: Communicator;
    type Store: KvStore;

    fn id(&self) -> NodeIdOf<Self>;

    /// Polls the node's event stream.
    ///
    /// It is important to poll the node's event stream because it implicitly
    /// drives the actions that keep the node up to date.
    fn poll_events(&mut self, cx: &mut Context<'_>) -> Poll<EventFor<Self>>;

    fn next_event(&mut self) -> NextEvent<'_, Self> {
        NextEvent(self)
    }

    fn handle(&self) -> NodeHandle;

    /// The decided operations, in slot order, and the store they were
    /// applied to.
    fn log(&self) -> &OperationLog<NodeIdOf<Self>, Self::Store>;
}

pub struct NextEvent<'a, N: ?Sized>(&'a mut N);

impl<'a, N> std::future::Future for NextEvent<'a, N>
where
    N: Node,
{
    type Output = EventFor<N>;

    fn poll(mut self: std::pin::Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.poll_events(cx)
    }
}
