//! Two-phase measurement and arrangement for linear stacks.
//!
//! Children with `weight == 0` are measured first against whatever space is
//! left along the main axis. Weighted children then split the remainder in
//! order: each one takes `remaining * weight / total_weight` of the pool as it
//! stands when its turn comes, so earlier children absorb rounding surplus.
//! Both orientations run through the same code, parameterized by [`Axis`].

use serde::{Deserialize, Serialize};

use crate::geometry::{Insets, Rect, Size};
use crate::measure::MeasureSpec;
use crate::properties::{LayoutProperties, SizeSpec};

use super::axis::{Axis, Orientation};

/// Working bound substituted for an `Unspecified` axis.
pub const UNBOUNDED_EXTENT: f32 = 16_777_215.0;

/// Read-only view of a child the algorithm needs.
pub trait LayoutChild {
    fn properties(&self) -> &LayoutProperties;

    fn is_hidden(&self) -> bool;

    fn measure(&self, available: Size, width: MeasureSpec, height: MeasureSpec) -> Size;

    /// Hidden children only occupy space when their properties ask for it.
    fn takes_space(&self) -> bool {
        !self.is_hidden() || self.properties().hidden_takes_space
    }
}

/// Whether a pass only sizes the container or also places its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Size query; weighted children count at their minimum main extent.
    Measure,
    /// Full layout; weighted children get their distributed share.
    Arrange,
}

/// Outcome of running the algorithm over a child list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resolution {
    /// Resolved container size.
    pub size: Size,
    /// One entry per child for [`Pass::Arrange`], `None` where a hidden child
    /// was skipped. Empty for [`Pass::Measure`].
    pub frames: Vec<Option<Rect>>,
}

/// Parameters of a linear stack: stacking direction and inner padding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearLayout {
    pub orientation: Orientation,
    pub padding: Insets,
}

impl LinearLayout {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            padding: Insets::ZERO,
        }
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    /// Size the container would take under the given constraints.
    pub fn measure<C: LayoutChild>(
        &self,
        children: &[C],
        available: Size,
        width: MeasureSpec,
        height: MeasureSpec,
    ) -> Size {
        self.resolve(children, available, width, height, Pass::Measure)
            .size
    }

    /// Child frames for a container whose own size is already decided.
    pub fn arrange_frames<C: LayoutChild>(&self, children: &[C], size: Size) -> Resolution {
        self.resolve(
            children,
            size,
            MeasureSpec::Exact,
            MeasureSpec::Exact,
            Pass::Arrange,
        )
    }

    /// Run both sizing phases and the placement walk.
    ///
    /// Pure with respect to the children: only `measure` is called on them.
    pub fn resolve<C: LayoutChild>(
        &self,
        children: &[C],
        available: Size,
        width: MeasureSpec,
        height: MeasureSpec,
        pass: Pass,
    ) -> Resolution {
        let main = self.orientation.main_axis();
        let cross = self.orientation.cross_axis();
        let main_mode = mode_along(main, width, height);
        let cross_mode = mode_along(cross, width, height);
        let padded = self.padded_bounds(available, width, height);

        let mut sizes = vec![Size::ZERO; children.len()];
        let mut total_weight = 0.0_f32;
        let mut reserved_min = 0.0_f32;
        let mut remaining = padded.along(main);

        // Phase A: everything without weight, in order.
        for (child, slot) in children.iter().zip(sizes.iter_mut()) {
            if !child.takes_space() {
                continue;
            }
            let props = child.properties();
            let margins = props.margin.total(main);
            if props.is_weighted() {
                total_weight += props.weight;
                remaining -= margins + props.min(main);
                reserved_min += props.min(main);
                continue;
            }

            let main_bound = (remaining - margins).max(0.0);
            let (main_limit, main_spec) = axis_limit(props, main, main_bound, main_mode, false);
            let (cross_limit, cross_spec) = cross_axis_limit(props, cross, padded, cross_mode);
            let measured = measure_child(
                child,
                Size::from_axes(main, main_limit, cross_limit),
                main,
                main_spec,
                cross_spec,
            );
            remaining -= margins + measured.along(main);
            *slot = measured;
        }

        // Phase B: weighted children share what is left, greedily and in order.
        remaining += reserved_min;
        for (child, slot) in children.iter().zip(sizes.iter_mut()) {
            if !child.takes_space() || !child.properties().is_weighted() {
                continue;
            }
            let props = child.properties();
            let want = remaining * props.weight / total_weight;
            let main_limit = remaining.max(0.0).min(props.constrain(main, want));
            let (cross_limit, cross_spec) = cross_axis_limit(props, cross, padded, cross_mode);
            let measured = measure_child(
                child,
                Size::from_axes(main, main_limit, cross_limit),
                main,
                MeasureSpec::Exact,
                cross_spec,
            );
            let main_size = match pass {
                Pass::Arrange => measured.along(main),
                Pass::Measure => main_limit.min(props.min(main)),
            };
            *slot = Size::from_axes(main, main_size, measured.along(cross));
            remaining -= measured.along(main);
            total_weight -= props.weight;
        }

        self.place(children, &sizes, available, padded, width, height, pass)
    }

    /// Padded content box; `Unspecified` axes become [`UNBOUNDED_EXTENT`].
    fn padded_bounds(&self, available: Size, width: MeasureSpec, height: MeasureSpec) -> Size {
        let mut padded = Size::new(
            (available.width - self.padding.horizontal()).max(0.0),
            (available.height - self.padding.vertical()).max(0.0),
        );
        if width == MeasureSpec::Unspecified {
            padded.width = UNBOUNDED_EXTENT;
        }
        if height == MeasureSpec::Unspecified {
            padded.height = UNBOUNDED_EXTENT;
        }
        padded
    }

    #[allow(clippy::too_many_arguments)]
    fn place<C: LayoutChild>(
        &self,
        children: &[C],
        sizes: &[Size],
        available: Size,
        padded: Size,
        width: MeasureSpec,
        height: MeasureSpec,
        pass: Pass,
    ) -> Resolution {
        let main = self.orientation.main_axis();
        let cross = self.orientation.cross_axis();
        let lead_main = self.padding.leading(main);
        let lead_cross = self.padding.leading(cross);

        let mut frames = Vec::new();
        if pass == Pass::Arrange {
            frames.reserve(children.len());
        }
        let mut main_extent = lead_main;
        let mut cross_extent = lead_cross;
        let mut cursor = lead_main;

        for (child, size) in children.iter().zip(sizes) {
            if !child.takes_space() {
                if pass == Pass::Arrange {
                    frames.push(None);
                }
                continue;
            }
            let props = child.properties();
            let margin = props.margin;

            let main_pos = cursor + margin.leading(main);
            let mut cross_pos = lead_cross + margin.leading(cross);
            if pass == Pass::Arrange {
                let slack = padded.along(cross) - margin.total(cross) - size.along(cross);
                cross_pos += slack * props.gravity(cross);
            }
            cross_extent = cross_extent.max(cross_pos + size.along(cross) + margin.trailing(cross));

            let next = main_pos + size.along(main) + margin.trailing(main);
            main_extent = main_extent.max(next);
            cursor = next;

            if pass == Pass::Arrange {
                frames.push(Some(frame_from_axes(main, main_pos, cross_pos, *size)));
            }
        }

        main_extent += self.padding.trailing(main);
        cross_extent += self.padding.trailing(cross);
        let content = Size::from_axes(main, main_extent, cross_extent);

        Resolution {
            size: Size::new(
                width.resolve(content.width, available.width),
                height.resolve(content.height, available.height),
            ),
            frames,
        }
    }
}

fn mode_along(axis: Axis, width: MeasureSpec, height: MeasureSpec) -> MeasureSpec {
    match axis {
        Axis::Horizontal => width,
        Axis::Vertical => height,
    }
}

/// Bound and mode for one axis of a child's constraint box.
fn axis_limit(
    props: &LayoutProperties,
    axis: Axis,
    bound: f32,
    parent_mode: MeasureSpec,
    allow_stretch: bool,
) -> (f32, MeasureSpec) {
    match props.size_spec(axis) {
        SizeSpec::StretchToParent if allow_stretch && parent_mode == MeasureSpec::Exact => {
            (bound.min(props.upper_bound(axis)), MeasureSpec::Exact)
        }
        SizeSpec::Fixed(value) => (
            bound.min(props.constrain(axis, value.max(0.0))),
            MeasureSpec::Exact,
        ),
        _ => (bound.min(props.upper_bound(axis)), parent_mode.inherited()),
    }
}

fn cross_axis_limit(
    props: &LayoutProperties,
    cross: Axis,
    padded: Size,
    cross_mode: MeasureSpec,
) -> (f32, MeasureSpec) {
    let bound = (padded.along(cross) - props.margin.total(cross)).max(0.0);
    axis_limit(props, cross, bound, cross_mode, true)
}

/// Measure a child, enforce the requested modes, then clamp into its limits.
fn measure_child<C: LayoutChild>(
    child: &C,
    limits: Size,
    main: Axis,
    main_spec: MeasureSpec,
    cross_spec: MeasureSpec,
) -> Size {
    let (width_spec, height_spec) = match main {
        Axis::Horizontal => (main_spec, cross_spec),
        Axis::Vertical => (cross_spec, main_spec),
    };
    let props = child.properties();
    let reported = child.measure(limits, width_spec, height_spec);
    let width = width_spec.resolve(reported.width, limits.width);
    let height = height_spec.resolve(reported.height, limits.height);
    Size::new(
        limits.width.min(props.min_width.max(width)),
        limits.height.min(props.min_height.max(height)),
    )
}

fn frame_from_axes(main: Axis, main_pos: f32, cross_pos: f32, size: Size) -> Rect {
    match main {
        Axis::Horizontal => Rect::new(main_pos, cross_pos, size.width, size.height),
        Axis::Vertical => Rect::new(cross_pos, main_pos, size.width, size.height),
    }
}
