//! Layout module orchestrator.
//!
//! The sizing algorithm lives in `linear` and is shared by the two front ends:
//! [`LinearContainer`], which owns its children directly, and [`LayoutTree`],
//! an arena of nodes with upward invalidation and per-pass reports.

mod axis;
mod container;
mod core;
mod linear;

pub use self::core::{LayoutNode, LayoutReport, LayoutTree, NodeId, NodeKind};
pub use axis::{Axis, Orientation};
pub use container::{Child, LinearContainer};
pub use linear::{LayoutChild, LinearLayout, Pass, Resolution, UNBOUNDED_EXTENT};
