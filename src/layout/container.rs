use std::fmt;

use crate::error::{LayoutError, Result};
use crate::geometry::{Insets, Rect, Size};
use crate::measure::{MeasureSpec, Measurable};
use crate::properties::LayoutProperties;

use super::axis::Orientation;
use super::linear::{LayoutChild, LinearLayout};

/// A box owned by a [`LinearContainer`] together with its layout preferences.
pub struct Child {
    properties: LayoutProperties,
    hidden: bool,
    frame: Option<Rect>,
    content: Box<dyn Measurable>,
}

impl Child {
    pub fn new(content: impl Measurable + 'static, properties: LayoutProperties) -> Self {
        Self::boxed(Box::new(content), properties)
    }

    pub fn boxed(content: Box<dyn Measurable>, properties: LayoutProperties) -> Self {
        Self {
            properties,
            hidden: false,
            frame: None,
            content,
        }
    }

    pub fn properties(&self) -> &LayoutProperties {
        &self.properties
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Frame committed by the last arrangement, relative to the container.
    pub fn frame(&self) -> Option<Rect> {
        self.frame
    }

    pub fn content(&self) -> &dyn Measurable {
        self.content.as_ref()
    }

    pub fn into_content(self) -> Box<dyn Measurable> {
        self.content
    }
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Child")
            .field("properties", &self.properties)
            .field("hidden", &self.hidden)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl LayoutChild for Child {
    fn properties(&self) -> &LayoutProperties {
        &self.properties
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn measure(&self, available: Size, width: MeasureSpec, height: MeasureSpec) -> Size {
        self.content.measure(available, width, height)
    }
}

/// Linear stack that owns its children.
///
/// Nests inside other containers through [`Measurable`]. Every edit flags the
/// container until the next [`arrange`](Measurable::arrange).
#[derive(Debug)]
pub struct LinearContainer {
    layout: LinearLayout,
    children: Vec<Child>,
    frame: Rect,
    needs_layout: bool,
}

impl Default for LinearContainer {
    fn default() -> Self {
        Self::vertical()
    }
}

impl LinearContainer {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            layout: LinearLayout::new(orientation),
            children: Vec::new(),
            frame: Rect::default(),
            needs_layout: true,
        }
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.layout.padding = padding;
        self
    }

    /// Builder form of [`push`](Self::push).
    pub fn with_child(
        mut self,
        content: impl Measurable + 'static,
        properties: LayoutProperties,
    ) -> Self {
        self.push(content, properties);
        self
    }

    pub fn linear_layout(&self) -> &LinearLayout {
        &self.layout
    }

    pub fn orientation(&self) -> Orientation {
        self.layout.orientation
    }

    pub fn padding(&self) -> Insets {
        self.layout.padding
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.layout.orientation = orientation;
        self.needs_layout = true;
    }

    pub fn set_padding(&mut self, padding: Insets) {
        self.layout.padding = padding;
        self.needs_layout = true;
    }

    /// Append a child and return its index.
    pub fn push(
        &mut self,
        content: impl Measurable + 'static,
        properties: LayoutProperties,
    ) -> usize {
        self.children.push(Child::new(content, properties));
        self.needs_layout = true;
        self.children.len() - 1
    }

    pub fn insert(
        &mut self,
        index: usize,
        content: impl Measurable + 'static,
        properties: LayoutProperties,
    ) -> Result<()> {
        if index > self.children.len() {
            return Err(LayoutError::IndexOutOfBounds {
                index,
                len: self.children.len(),
            });
        }
        self.children.insert(index, Child::new(content, properties));
        self.needs_layout = true;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<Child> {
        if index >= self.children.len() {
            return None;
        }
        self.needs_layout = true;
        Some(self.children.remove(index))
    }

    /// Show or hide a child. Returns `false` when the index is out of range.
    pub fn set_hidden(&mut self, index: usize, hidden: bool) -> bool {
        match self.children.get_mut(index) {
            Some(child) => {
                if child.hidden != hidden {
                    child.hidden = hidden;
                    self.needs_layout = true;
                }
                true
            }
            None => false,
        }
    }

    /// Mutable access to a child's properties; flags the container.
    pub fn properties_mut(&mut self, index: usize) -> Option<&mut LayoutProperties> {
        let child = self.children.get_mut(index)?;
        self.needs_layout = true;
        Some(&mut child.properties)
    }

    /// Mutable access to a child's content; flags the container.
    pub fn content_mut(&mut self, index: usize) -> Option<&mut (dyn Measurable + 'static)> {
        let child = self.children.get_mut(index)?;
        self.needs_layout = true;
        Some(child.content.as_mut())
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Child> {
        self.children.get(index)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Arrange as a root box filling `size` at the origin.
    pub fn layout(&mut self, size: Size) {
        self.arrange(Rect::from_size(size));
    }

    fn commit(&mut self, frames: Vec<Option<Rect>>) {
        for (child, frame) in self.children.iter_mut().zip(frames) {
            child.frame = frame;
            if let Some(frame) = frame {
                child.content.arrange(frame);
            }
        }
    }
}

impl Measurable for LinearContainer {
    fn measure(&self, available: Size, width: MeasureSpec, height: MeasureSpec) -> Size {
        self.layout.measure(&self.children, available, width, height)
    }

    fn arrange(&mut self, frame: Rect) {
        self.frame = frame;
        let resolution = self.layout.arrange_frames(&self.children, frame.size());
        self.commit(resolution.frames);
        self.needs_layout = false;
    }

    fn needs_layout(&self) -> bool {
        self.needs_layout || self.children.iter().any(|child| child.content.needs_layout())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::measure::IntrinsicBox;
    use crate::properties::SizeSpec;

    fn frame_of(container: &LinearContainer, index: usize) -> Rect {
        container.child(index).and_then(Child::frame).expect("child arranged")
    }

    #[test]
    fn arranges_children_top_to_bottom() {
        let mut column = LinearContainer::vertical()
            .with_padding(Insets::uniform(4.0))
            .with_child(IntrinsicBox::new(30.0, 10.0), LayoutProperties::new())
            .with_child(
                IntrinsicBox::new(20.0, 15.0),
                LayoutProperties::new().with_margin(Insets::new(6.0, 0.0, 0.0, 2.0)),
            );
        column.layout(Size::new(100.0, 200.0));

        assert_eq!(frame_of(&column, 0), Rect::new(4.0, 4.0, 30.0, 10.0));
        assert_eq!(frame_of(&column, 1), Rect::new(6.0, 20.0, 20.0, 15.0));
        assert_eq!(column.frame(), Rect::new(0.0, 0.0, 100.0, 200.0));
        assert!(!column.needs_layout());
    }

    #[test]
    fn nested_container_is_measured_and_arranged() {
        let row = LinearContainer::horizontal()
            .with_child(IntrinsicBox::new(10.0, 8.0), LayoutProperties::new())
            .with_child(IntrinsicBox::new(0.0, 8.0), LayoutProperties::new().with_weight(1.0));
        let mut column = LinearContainer::vertical()
            .with_child(IntrinsicBox::new(40.0, 12.0), LayoutProperties::new())
            .with_child(row, LayoutProperties::new().with_width(SizeSpec::StretchToParent));

        let fitted = column.fitting_size(Size::new(300.0, 300.0), true, false);
        // Weighted children count at their minimum while measuring.
        assert_eq!(fitted, Size::new(40.0, 20.0));

        column.layout(Size::new(120.0, 60.0));
        assert_eq!(frame_of(&column, 1), Rect::new(0.0, 12.0, 120.0, 8.0));
    }

    #[test]
    fn fitting_size_wraps_content_when_unconstrained() {
        let column = LinearContainer::vertical()
            .with_padding(Insets::uniform(2.0))
            .with_child(IntrinsicBox::new(40.0, 12.0), LayoutProperties::new())
            .with_child(IntrinsicBox::new(25.0, 5.0), LayoutProperties::new());
        let fitted = column.fitting_size(Size::new(300.0, 300.0), false, false);
        assert_eq!(fitted, Size::new(44.0, 21.0));
        let bounded = column.fitting_size(Size::new(30.0, 10.0), true, true);
        assert_eq!(bounded, Size::new(30.0, 10.0));
    }

    #[test]
    fn measurement_is_idempotent() {
        let column = LinearContainer::vertical()
            .with_child(IntrinsicBox::new(40.0, 12.0), LayoutProperties::new().with_weight(2.0))
            .with_child(IntrinsicBox::new(25.0, 5.0), LayoutProperties::new().with_weight(1.0))
            .with_child(IntrinsicBox::new(25.0, 5.0), LayoutProperties::new());
        let available = Size::new(90.0, 70.0);
        let first = column.measure(available, MeasureSpec::AtMost, MeasureSpec::AtMost);
        let second = column.measure(available, MeasureSpec::AtMost, MeasureSpec::AtMost);
        assert_eq!(first, second);
    }

    #[test]
    fn edits_flag_the_container() {
        let mut column = LinearContainer::vertical()
            .with_child(IntrinsicBox::new(10.0, 10.0), LayoutProperties::new());
        column.layout(Size::new(50.0, 50.0));
        assert!(!column.needs_layout());

        assert!(column.set_hidden(0, true));
        assert!(column.needs_layout());
        column.layout(Size::new(50.0, 50.0));

        assert!(!column.set_hidden(3, true));
        assert!(!column.needs_layout());

        column.properties_mut(0).unwrap().weight = 1.0;
        assert!(column.needs_layout());
    }

    struct Flagged(Rc<Cell<bool>>);

    impl Measurable for Flagged {
        fn measure(&self, _available: Size, _width: MeasureSpec, _height: MeasureSpec) -> Size {
            Size::new(5.0, 5.0)
        }

        fn arrange(&mut self, _frame: Rect) {
            self.0.set(false);
        }

        fn needs_layout(&self) -> bool {
            self.0.get()
        }
    }

    #[test]
    fn nested_flag_is_visible_from_the_root() {
        let dirty = Rc::new(Cell::new(false));
        let inner = LinearContainer::horizontal()
            .with_child(Flagged(Rc::clone(&dirty)), LayoutProperties::new());
        let mut outer = LinearContainer::vertical().with_child(inner, LayoutProperties::new());
        outer.layout(Size::new(50.0, 50.0));
        assert!(!outer.needs_layout());

        dirty.set(true);
        assert!(outer.needs_layout());
        outer.layout(Size::new(50.0, 50.0));
        assert!(!dirty.get());
        assert!(!outer.needs_layout());
    }

    #[test]
    fn hidden_child_closes_the_gap() {
        let mut column = LinearContainer::vertical()
            .with_child(IntrinsicBox::new(10.0, 10.0), LayoutProperties::new())
            .with_child(IntrinsicBox::new(10.0, 30.0), LayoutProperties::new())
            .with_child(IntrinsicBox::new(10.0, 10.0), LayoutProperties::new());
        column.set_hidden(1, true);
        column.layout(Size::new(50.0, 100.0));

        assert_eq!(frame_of(&column, 2).y, 10.0);
        assert_eq!(column.child(1).and_then(Child::frame), None);
        let height = column
            .measure(Size::new(50.0, 100.0), MeasureSpec::AtMost, MeasureSpec::Unspecified)
            .height;
        assert_eq!(height, 20.0);
    }

    #[test]
    fn insert_and_remove_keep_order() {
        let mut row = LinearContainer::horizontal();
        row.push(IntrinsicBox::new(10.0, 5.0), LayoutProperties::new());
        row.push(IntrinsicBox::new(30.0, 5.0), LayoutProperties::new());
        row.insert(1, IntrinsicBox::new(20.0, 5.0), LayoutProperties::new())
            .unwrap();
        assert!(matches!(
            row.insert(9, IntrinsicBox::new(1.0, 1.0), LayoutProperties::new()),
            Err(LayoutError::IndexOutOfBounds { index: 9, len: 3 })
        ));

        row.layout(Size::new(100.0, 5.0));
        assert_eq!(frame_of(&row, 1).x, 10.0);
        assert_eq!(frame_of(&row, 2).x, 30.0);

        let removed = row.remove(0).expect("child removed");
        assert_eq!(
            removed.content().measure(
                Size::ZERO,
                MeasureSpec::Unspecified,
                MeasureSpec::Unspecified,
            ),
            Size::new(10.0, 5.0)
        );
        assert!(row.remove(5).is_none());
        row.layout(Size::new(100.0, 5.0));
        assert_eq!(frame_of(&row, 1).x, 20.0);
    }

    #[test]
    fn horizontal_mirrors_vertical() {
        let specs = [
            (
                Size::new(12.0, 7.0),
                LayoutProperties::new().with_margin(Insets::new(1.0, 2.0, 3.0, 4.0)),
            ),
            (
                Size::new(5.0, 9.0),
                LayoutProperties::new().with_weight(2.0).with_gravity(0.5, 0.5),
            ),
            (Size::new(8.0, 3.0), LayoutProperties::new().with_gravity(1.0, 1.0)),
            (
                Size::new(4.0, 4.0),
                LayoutProperties::new()
                    .with_weight(1.0)
                    .with_width(SizeSpec::StretchToParent)
                    .with_height(SizeSpec::StretchToParent),
            ),
        ];

        let mut column = LinearContainer::vertical().with_padding(Insets::new(3.0, 5.0, 7.0, 2.0));
        let mut row = LinearContainer::horizontal().with_padding(Insets::new(2.0, 7.0, 5.0, 3.0));
        for (size, props) in specs {
            column.push(IntrinsicBox::with_size(size), props);
            let transposed = LayoutProperties {
                width: props.height,
                height: props.width,
                min_width: props.min_height,
                max_width: props.max_height,
                min_height: props.min_width,
                max_height: props.max_width,
                margin: Insets::new(
                    props.margin.left,
                    props.margin.bottom,
                    props.margin.right,
                    props.margin.top,
                ),
                horizontal_gravity: props.vertical_gravity,
                vertical_gravity: props.horizontal_gravity,
                ..props
            };
            row.push(IntrinsicBox::new(size.height, size.width), transposed);
        }

        column.layout(Size::new(60.0, 90.0));
        row.layout(Size::new(90.0, 60.0));
        for index in 0..column.len() {
            let v = frame_of(&column, index);
            let h = frame_of(&row, index);
            assert_eq!(Rect::new(v.y, v.x, v.height, v.width), h, "child {index}");
        }
    }

    #[test]
    fn arranged_children_stay_inside_padding_and_margins() {
        let paddings = [Insets::ZERO, Insets::uniform(3.0), Insets::new(1.0, 6.0, 2.0, 9.0)];
        let margins = [Insets::ZERO, Insets::uniform(2.0), Insets::new(5.0, 0.0, 1.0, 3.0)];
        let gravities = [0.0, 0.3, 1.0];

        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            for padding in paddings {
                for (step, margin) in margins.iter().enumerate() {
                    for gravity in gravities {
                        let mut container = LinearContainer::new(orientation).with_padding(padding);
                        container.push(
                            IntrinsicBox::new(15.0, 10.0),
                            LayoutProperties::new()
                                .with_margin(*margin)
                                .with_gravity(gravity, gravity),
                        );
                        container.push(
                            IntrinsicBox::new(5.0, 5.0),
                            LayoutProperties::new()
                                .with_margin(*margin)
                                .with_weight(1.0 + step as f32)
                                .with_gravity(gravity, gravity),
                        );
                        container.push(
                            IntrinsicBox::new(200.0, 4.0),
                            LayoutProperties::new()
                                .with_margin(*margin)
                                .with_gravity(1.0 - gravity, 1.0 - gravity),
                        );

                        let outer = Rect::new(0.0, 0.0, 80.0, 70.0);
                        container.layout(outer.size());
                        let content = outer.inset(padding);
                        for child in container.children() {
                            let frame = child.frame().expect("visible child arranged");
                            let allowed = content.inset(child.properties().margin);
                            assert!(
                                allowed.contains_rect(&frame),
                                "{orientation:?} {frame:?} escapes {allowed:?}"
                            );
                        }
                    }
                }
            }
        }
    }
}
