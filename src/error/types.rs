use thiserror::Error;

use crate::layout::NodeId;

/// Unified result type for the stackbox crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by structural operations on containers and layout trees.
///
/// The sizing algorithm itself never fails; these only guard tree edits.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout tree has no root")]
    EmptyLayout,
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),
    #[error("node {0:?} is not a container")]
    NotAContainer(NodeId),
    #[error("node {0:?} is not a leaf")]
    NotALeaf(NodeId),
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("node {child:?} is already attached to {parent:?}")]
    AlreadyAttached { child: NodeId, parent: NodeId },
    #[error("root node {0:?} cannot be attached as a child")]
    RootAttach(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
    #[error("index {index} out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },
}
