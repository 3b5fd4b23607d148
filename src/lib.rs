//! Constraint-based linear box layout.
//!
//! Boxes are measured under per-axis [`MeasureSpec`] constraints and arranged
//! into vertical or horizontal stacks with margins, padding, weights and
//! gravity. Host content plugs in through the [`Measurable`] trait.

pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod measure;
pub mod metrics;
pub mod properties;

pub use config::LayoutConfig;
pub use error::{LayoutError, Result};
pub use geometry::{Insets, Rect, Size};
pub use layout::{
    Axis, Child, LayoutChild, LayoutNode, LayoutReport, LayoutTree, LinearContainer, LinearLayout,
    NodeId, NodeKind, Orientation, Pass, Resolution, UNBOUNDED_EXTENT,
};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use measure::{IntrinsicBox, MeasureSpec, Measurable};
pub use metrics::{LayoutMetrics, MetricSnapshot};
pub use properties::{LayoutProperties, SizeSpec};
