//! Runs whole clusters on a single-threaded executor for the integration
//! tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::task::Poll;
use std::time::Duration;

use futures::executor::LocalPool;
use futures::executor::LocalSpawner;
use futures::future::FutureExt;
use futures::task::LocalSpawnExt;

use quepaxa::log::DecidedEntry;
use quepaxa::operation::Key;
use quepaxa::operation::Value;
use quepaxa::prototyping::DirectCommunicator;
use quepaxa::prototyping::DirectCommunicators;
use quepaxa::prototyping::PrototypingNode;
use quepaxa::ClientRequest;
use quepaxa::ClientResponse;
use quepaxa::Event;
use quepaxa::MemoryStore;
use quepaxa::Node;
use quepaxa::NodeHandle;
use quepaxa::NodeKernel;

pub type Communicators = DirectCommunicators<PrototypingNode>;
pub type Kernel = NodeKernel<MemoryStore, DirectCommunicator<PrototypingNode>>;
pub type Events = Rc<RefCell<Vec<(PrototypingNode, Event<PrototypingNode>)>>>;

/// Index of the designated leader in every cluster.
pub const LEADER: usize = 1;

pub struct Cluster {
    pool: LocalPool,
    communicators: Communicators,
    ids: Vec<PrototypingNode>,
    nodes: Vec<Rc<RefCell<Kernel>>>,
    handles: Vec<NodeHandle>,
    events: Events,
}

impl Cluster {
    /// A cluster of `size` nodes connected by a perfect network.
    pub fn new(size: usize) -> Self {
        Self::with_network(size, DirectCommunicators::new())
    }

    pub fn with_network(size: usize, communicators: Communicators) -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();

        let ids: Vec<_> = (0..size).map(PrototypingNode::with_id).collect();
        let leader = ids[LEADER.min(size - 1)];
        let events = Events::default();

        let mut nodes = Vec::new();
        let mut handles = Vec::new();

        for (i, &id) in ids.iter().enumerate() {
            let (handler, node) = quepaxa::node_builder()
                .for_node(id)
                .in_cluster(ids.clone())
                .led_by(leader)
                .communicating_via(communicators.create_communicator_for(id))
                .with_seed(1000 + i as u64)
                .spawn()
                .expect("spawn node");

            communicators.register(id, handler);
            handles.push(node.handle());

            let node = Rc::new(RefCell::new(node));
            drive(&spawner, Rc::clone(&node), Rc::clone(&events));
            nodes.push(node);
        }

        Self {
            pool,
            communicators,
            ids,
            nodes,
            handles,
            events,
        }
    }

    pub fn id(&self, node: usize) -> PrototypingNode {
        self.ids[node]
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn communicators(&mut self) -> &mut Communicators {
        &mut self.communicators
    }

    /// Submits `request` at `node` and runs the cluster until it is answered.
    pub fn submit(&mut self, node: usize, request: ClientRequest) -> ClientResponse {
        let submission = self.handles[node].submit(request);

        self.pool
            .run_until(submission)
            .expect("node shut down unexpectedly")
    }

    /// Submits all `requests` at once and runs the cluster until every one of
    /// them is answered. Responses are returned in request order.
    pub fn submit_all(&mut self, requests: Vec<(usize, ClientRequest)>) -> Vec<ClientResponse> {
        let submissions = requests
            .into_iter()
            .map(|(node, request)| self.handles[node].submit(request));

        self.pool
            .run_until(futures::future::join_all(submissions))
            .into_iter()
            .map(|r| r.expect("node shut down unexpectedly"))
            .collect()
    }

    /// Submits `request` at `node`, giving up after `timeout`.
    pub fn try_submit(
        &mut self,
        node: usize,
        request: ClientRequest,
        timeout: Duration,
    ) -> Option<ClientResponse> {
        let submission = self.handles[node].submit(request).map(|r| r.ok());
        let timeout = futures_timer::Delay::new(timeout).map(|_| None::<ClientResponse>);

        let first = futures::future::select(submission.boxed_local(), timeout);

        self.pool.run_until(first.map(|e| e.factor_first().0))
    }

    pub fn read_stale(&mut self, node: usize, key: Key) -> Option<Value> {
        let read = self.handles[node].read_stale(key);

        self.pool.run_until(read).expect("node shut down unexpectedly")
    }

    /// Runs the cluster until each of `nodes` decided `slots` slots.
    pub fn await_decisions(&mut self, nodes: &[usize], slots: usize) {
        let watched: Vec<_> = nodes.iter().map(|&n| Rc::clone(&self.nodes[n])).collect();

        self.pool.run_until(async move {
            while !watched
                .iter()
                .all(|n| n.borrow().log().entries().len() >= slots)
            {
                futures_timer::Delay::new(Duration::from_millis(5)).await;
            }
        });
    }

    /// Runs the cluster until no node can make further progress without
    /// timers firing.
    pub fn settle(&mut self) {
        self.pool.run_until_stalled();
    }

    pub fn log(&self, node: usize) -> Vec<DecidedEntry<PrototypingNode>> {
        self.nodes[node].borrow().log().entries().to_vec()
    }

    pub fn store(&self, node: usize) -> MemoryStore {
        self.nodes[node].borrow().log().store().clone()
    }

    pub fn events(&self) -> Vec<(PrototypingNode, Event<PrototypingNode>)> {
        self.events.borrow().clone()
    }

    /// Asserts that all of `nodes` decided the same operations in the same
    /// order and hold the same store contents.
    pub fn assert_agreement(&self, nodes: &[usize]) {
        if let Some((&first, rest)) = nodes.split_first() {
            for &node in rest {
                assert_eq!(
                    self.log(node),
                    self.log(first),
                    "log of node {} differs from node {}",
                    node,
                    first
                );
                assert_eq!(self.store(node), self.store(first));
            }
        }
    }

    pub fn all(&self) -> Vec<usize> {
        (0..self.size()).collect()
    }
}

fn drive(spawner: &LocalSpawner, node: Rc<RefCell<Kernel>>, events: Events) {
    spawner
        .spawn_local(futures::future::poll_fn(move |cx| {
            let mut node = node.borrow_mut();

            while let Poll::Ready(event) = node.poll_events(cx) {
                tracing::trace!("Node {:?} emitted {:?}.", node.id(), event);
                events.borrow_mut().push((node.id(), event));
            }

            Poll::<()>::Pending
        }))
        .expect("spawn node task");
}

/// Installs a subscriber printing `info` and above, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}
