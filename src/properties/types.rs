use serde::{Deserialize, Serialize};

use crate::geometry::Insets;
use crate::layout::Axis;

/// Sizing preference for one axis of a box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeSpec {
    /// Exact extent, floored at zero when applied.
    Fixed(f32),
    /// Sized by content.
    #[default]
    Natural,
    /// Match the container on this axis when the container is exactly sized.
    ///
    /// Only honoured on the cross axis; on the stacking axis it behaves like
    /// `Natural` and `weight` is the way to take up leftover space.
    StretchToParent,
}

impl SizeSpec {
    pub fn fixed(value: f32) -> Self {
        SizeSpec::Fixed(value.max(0.0))
    }
}

/// Layout preferences attached to a single child.
///
/// Clamps nest as `max(min, min(requested, max))`, so a misconfigured
/// `min > max` resolves to `min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutProperties {
    pub width: SizeSpec,
    pub height: SizeSpec,
    pub min_width: f32,
    #[serde(with = "unbounded")]
    pub max_width: f32,
    pub min_height: f32,
    #[serde(with = "unbounded")]
    pub max_height: f32,
    pub margin: Insets,
    /// Share of leftover main-axis space; zero means not flexible.
    pub weight: f32,
    pub horizontal_gravity: f32,
    pub vertical_gravity: f32,
    /// A hidden box still occupies its slot when set.
    pub hidden_takes_space: bool,
}

impl Default for LayoutProperties {
    fn default() -> Self {
        Self {
            width: SizeSpec::Natural,
            height: SizeSpec::Natural,
            min_width: 0.0,
            max_width: f32::INFINITY,
            min_height: 0.0,
            max_height: f32::INFINITY,
            margin: Insets::ZERO,
            weight: 0.0,
            horizontal_gravity: 0.0,
            vertical_gravity: 0.0,
            hidden_takes_space: false,
        }
    }
}

impl LayoutProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, width: SizeSpec) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: SizeSpec) -> Self {
        self.height = height;
        self
    }

    pub fn with_fixed_size(self, width: f32, height: f32) -> Self {
        self.with_width(SizeSpec::fixed(width))
            .with_height(SizeSpec::fixed(height))
    }

    pub fn with_width_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_width = min;
        self.max_width = max;
        self
    }

    pub fn with_height_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_height = min;
        self.max_height = max;
        self
    }

    pub fn with_margin(mut self, margin: Insets) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight.max(0.0);
        self
    }

    pub fn with_gravity(mut self, horizontal: f32, vertical: f32) -> Self {
        self.horizontal_gravity = horizontal;
        self.vertical_gravity = vertical;
        self
    }

    pub fn with_hidden_takes_space(mut self, takes_space: bool) -> Self {
        self.hidden_takes_space = takes_space;
        self
    }

    pub fn is_weighted(&self) -> bool {
        self.weight > 0.0
    }

    pub fn size_spec(&self, axis: Axis) -> SizeSpec {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub fn min(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.min_width,
            Axis::Vertical => self.min_height,
        }
    }

    pub fn max(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.max_width,
            Axis::Vertical => self.max_height,
        }
    }

    /// Alignment fraction used when this box sits on `axis` as a cross axis,
    /// clamped to `[0, 1]`.
    pub fn gravity(&self, axis: Axis) -> f32 {
        let raw = match axis {
            Axis::Horizontal => self.horizontal_gravity,
            Axis::Vertical => self.vertical_gravity,
        };
        if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) }
    }

    /// `requested` limited to `[min, max]` on `axis`; min wins on conflict.
    pub fn constrain(&self, axis: Axis, requested: f32) -> f32 {
        self.min(axis).max(requested.min(self.max(axis)))
    }

    /// Upper bound for a content-sized box on `axis`.
    pub fn upper_bound(&self, axis: Axis) -> f32 {
        self.min(axis).max(self.max(axis))
    }
}

mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f32, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or(f32::INFINITY))
    }
}
