//! Cluster configuration as supplied by the membership layer.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::quorum::majority;
use crate::Identifier;

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct ClusterConfig<N> {
    node_id: N,
    members: Vec<N>,
    leader: N,
}

impl<N: Identifier> ClusterConfig<N> {
    pub fn new(node_id: N, members: Vec<N>, leader: N) -> Result<Self, ConfigError> {
        if members.is_empty() {
            return Err(ConfigError::EmptyCluster);
        }

        for (i, m) in members.iter().enumerate() {
            if members[..i].contains(m) {
                return Err(ConfigError::DuplicateMember(format!("{:?}", m)));
            }
        }

        if !members.contains(&node_id) {
            return Err(ConfigError::UnknownNode(format!("{:?}", node_id)));
        }

        if !members.contains(&leader) {
            return Err(ConfigError::UnknownLeader(format!("{:?}", leader)));
        }

        Ok(Self {
            node_id,
            members,
            leader,
        })
    }

    pub fn node_id(&self) -> N {
        self.node_id
    }

    /// All members, this node included.
    pub fn members(&self) -> &[N] {
        &self.members
    }

    /// All members but this node.
    pub fn peers(&self) -> impl Iterator<Item = N> + '_ {
        self.members
            .iter()
            .copied()
            .filter(move |&m| m != self.node_id)
    }

    pub fn leader(&self) -> N {
        self.leader
    }

    pub fn is_leader(&self) -> bool {
        self.node_id == self.leader
    }

    pub fn cluster_size(&self) -> usize {
        self.members.len()
    }

    pub fn majority(&self) -> usize {
        majority(self.cluster_size())
    }
}
