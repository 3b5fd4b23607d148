//! Per-box sizing and spacing preferences consumed by containers.

mod types;

pub use types::{LayoutProperties, SizeSpec};
