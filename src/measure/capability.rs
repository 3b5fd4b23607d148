use crate::geometry::{Rect, Size};

use super::MeasureSpec;

/// Capability every box in a layout provides.
///
/// Containers only ever talk to children through this trait, so leaves
/// supplied by a host and nested containers mix freely.
pub trait Measurable {
    /// Size this box would choose under the given constraints.
    ///
    /// Must not have side effects. Containers honour `Exact` by returning the
    /// available value on that axis; leaves may report their intrinsic size
    /// and leave clamping to the caller.
    fn measure(&self, available: Size, width: MeasureSpec, height: MeasureSpec) -> Size;

    /// Commit the final rectangle, relative to the parent container.
    fn arrange(&mut self, frame: Rect);

    /// Whether a structural change is waiting for the next layout pass.
    fn needs_layout(&self) -> bool {
        false
    }

    /// Preferred size within `target`, bounding only the required axes.
    fn fitting_size(&self, target: Size, fit_width: bool, fit_height: bool) -> Size {
        self.measure(
            target,
            MeasureSpec::fitting(fit_width),
            MeasureSpec::fitting(fit_height),
        )
    }
}

/// Leaf with a fixed preferred size that remembers where it was placed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntrinsicBox {
    intrinsic: Size,
    frame: Option<Rect>,
}

impl IntrinsicBox {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_size(Size::new(width, height))
    }

    pub fn with_size(intrinsic: Size) -> Self {
        Self {
            intrinsic: Size::new(intrinsic.width.max(0.0), intrinsic.height.max(0.0)),
            frame: None,
        }
    }

    pub fn intrinsic(&self) -> Size {
        self.intrinsic
    }

    /// Last frame committed by a container, if any.
    pub fn frame(&self) -> Option<Rect> {
        self.frame
    }
}

impl Measurable for IntrinsicBox {
    fn measure(&self, _available: Size, _width: MeasureSpec, _height: MeasureSpec) -> Size {
        self.intrinsic
    }

    fn arrange(&mut self, frame: Rect) {
        self.frame = Some(frame);
    }
}
