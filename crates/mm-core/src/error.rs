use crate::id::NodeId;

/// Failures of map operations. None of them are fatal: the triggering
/// interaction is dropped and the map is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("no node with id `{0}`")]
    UnknownNode(NodeId),
    #[error("node `{0}` cannot be linked to itself")]
    SelfLoop(NodeId),
}

pub type Result<T> = std::result::Result<T, MapError>;
