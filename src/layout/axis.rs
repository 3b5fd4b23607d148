use serde::{Deserialize, Serialize};

/// Direction in which a linear container stacks its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Top to bottom.
    #[default]
    Vertical,
    /// Left to right.
    Horizontal,
}

impl Orientation {
    /// Axis children are stacked along.
    pub fn main_axis(self) -> Axis {
        match self {
            Orientation::Vertical => Axis::Vertical,
            Orientation::Horizontal => Axis::Horizontal,
        }
    }

    /// Axis gravity aligns children on.
    pub fn cross_axis(self) -> Axis {
        self.main_axis().other()
    }
}

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_axis_is_perpendicular() {
        assert_eq!(Orientation::Vertical.main_axis(), Axis::Vertical);
        assert_eq!(Orientation::Vertical.cross_axis(), Axis::Horizontal);
        assert_eq!(Orientation::Horizontal.main_axis(), Axis::Horizontal);
        assert_eq!(Orientation::Horizontal.cross_axis(), Axis::Vertical);
    }
}
