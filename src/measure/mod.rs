//! Measurement contract shared by every box in a layout.
//!
//! `spec` holds the per-axis constraint mode, `capability` the trait
//! containers use to query and place heterogeneous children.

mod capability;
mod spec;

pub use capability::{IntrinsicBox, Measurable};
pub use spec::MeasureSpec;
