use rand::Rng;

use crate::communicator::Communicator;
use crate::config::ClusterConfig;
use crate::error::SpawnError;
use crate::store::KvStore;
use crate::store::MemoryStore;
use crate::Identifier;

use super::NodeKernel;
use super::RequestHandler;

#[derive(Default)]
pub struct NodeBuilderBlank;

impl NodeBuilderBlank {
    pub fn new() -> Self {
        Self
    }

    pub fn for_node<N: Identifier>(self, node_id: N) -> NodeBuilderWithNodeId<N> {
        NodeBuilderWithNodeId { node_id }
    }
}

pub struct NodeBuilderWithNodeId<N> {
    node_id: N,
}

impl<N: Identifier> NodeBuilderWithNodeId<N> {
    /// Sets the cluster's members, this node included.
    pub fn in_cluster(self, members: impl IntoIterator<Item = N>) -> NodeBuilderWithMembers<N> {
        NodeBuilderWithMembers {
            node_id: self.node_id,
            members: members.into_iter().collect(),
        }
    }
}

pub struct NodeBuilderWithMembers<N> {
    node_id: N,
    members: Vec<N>,
}

impl<N: Identifier> NodeBuilderWithMembers<N> {
    /// Designates the node that may skip contention at the start of a slot.
    pub fn led_by(self, leader: N) -> NodeBuilderWithMembersAndLeader<N> {
        NodeBuilderWithMembersAndLeader {
            node_id: self.node_id,
            members: self.members,
            leader,
        }
    }
}

pub struct NodeBuilderWithMembersAndLeader<N> {
    node_id: N,
    members: Vec<N>,
    leader: N,
}

impl<N: Identifier> NodeBuilderWithMembersAndLeader<N> {
    pub fn communicating_via<C>(self, communicator: C) -> NodeBuilder<MemoryStore, C>
    where
        C: Communicator<Node = N>,
    {
        NodeBuilder {
            node_id: self.node_id,
            members: self.members,
            leader: self.leader,
            communicator,
            store: MemoryStore::new(),
            seed: None,
        }
    }
}

pub struct NodeBuilder<S, C: Communicator> {
    node_id: C::Node,
    members: Vec<C::Node>,
    leader: C::Node,
    communicator: C,
    store: S,
    seed: Option<u64>,
}

impl<S, C> NodeBuilder<S, C>
where
    S: KvStore,
    C: Communicator,
{
    /// Applies decided operations to `store` instead of an empty
    /// [`MemoryStore`].
    ///
    /// Every member must start out with the same store contents.
    pub fn with_store<T: KvStore>(self, store: T) -> NodeBuilder<T, C> {
        NodeBuilder {
            node_id: self.node_id,
            members: self.members,
            leader: self.leader,
            communicator: self.communicator,
            store,
            seed: self.seed,
        }
    }

    /// Seeds the node's random number generators, which are seeded from
    /// entropy otherwise.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn spawn(self) -> Result<(RequestHandler<C::Node>, NodeKernel<S, C>), SpawnError> {
        let config = ClusterConfig::new(self.node_id, self.members, self.leader)?;
        let seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());

        tracing::info!(
            "Spawning node {:?} in a cluster of {}.",
            config.node_id(),
            config.cluster_size()
        );

        Ok(NodeKernel::spawn(config, self.communicator, self.store, seed))
    }
}
