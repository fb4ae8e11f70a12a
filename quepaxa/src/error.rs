use thiserror::Error;

/// A node could not be spawned.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("invalid cluster configuration")]
    InvalidConfig(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cluster has no members")]
    EmptyCluster,

    #[error("node {0} is listed more than once")]
    DuplicateMember(String),

    #[error("node {0} is not a cluster member")]
    UnknownNode(String),

    #[error("leader {0} is not a cluster member")]
    UnknownLeader(String),
}

/// Submitting a client request failed.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("node is shut down")]
    ShutDown,
}

#[derive(Debug, Error)]
#[error("node is shut down")]
pub struct ShutDown;

#[derive(Debug, Error)]
#[error("malformed message")]
pub struct CodecError(#[from] bincode::Error);

/// An inbound message could not be handed to the node.
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("failed to decode message")]
    Decode(#[from] CodecError),

    #[error("node is shut down")]
    ShutDown(#[from] ShutDown),
}
