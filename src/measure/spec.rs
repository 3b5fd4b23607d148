use serde::{Deserialize, Serialize};

/// How a numeric bound on one axis must be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureSpec {
    /// No bound; the axis grows with its content.
    #[default]
    Unspecified,
    /// The box must end up exactly at the given value.
    Exact,
    /// The box may take any size up to the given value.
    AtMost,
}

impl MeasureSpec {
    /// Mode handed to a content-sized child of a container measured with `self`.
    pub fn inherited(self) -> Self {
        match self {
            MeasureSpec::Unspecified => MeasureSpec::Unspecified,
            MeasureSpec::Exact | MeasureSpec::AtMost => MeasureSpec::AtMost,
        }
    }

    /// Mode for a fitting query: required axes are bounded, the rest are free.
    pub fn fitting(required: bool) -> Self {
        if required {
            MeasureSpec::AtMost
        } else {
            MeasureSpec::Unspecified
        }
    }

    /// Final extent of a box measured with this mode.
    ///
    /// `Exact` ignores the content entirely, `AtMost` caps it.
    pub fn resolve(self, content: f32, available: f32) -> f32 {
        match self {
            MeasureSpec::Exact => available,
            MeasureSpec::AtMost => content.min(available),
            MeasureSpec::Unspecified => content,
        }
    }
}
