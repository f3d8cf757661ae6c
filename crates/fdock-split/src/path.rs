//! Orientation, sides, and paths into a split tree.

use serde::{Deserialize, Serialize};

/// Axis along which a split node divides its area.
///
/// `Horizontal` places the children side by side (first left, second right);
/// `Vertical` stacks them (first top, second bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            _ => None,
        }
    }

    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }

    pub const fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Horizontal),
            1 => Some(Self::Vertical),
            _ => None,
        }
    }
}

/// Side of a split on which a child sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Orientation of the split that has a child on this side.
    #[must_use]
    pub const fn orientation(self) -> Orientation {
        match self {
            Self::Left | Self::Right => Orientation::Horizontal,
            Self::Top | Self::Bottom => Orientation::Vertical,
        }
    }

    /// Whether this side is the first child of its split.
    #[must_use]
    pub const fn is_first(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }

    /// Side of the `first` or `second` child of a split with `orientation`.
    #[must_use]
    pub const fn of(orientation: Orientation, first: bool) -> Self {
        match (orientation, first) {
            (Orientation::Horizontal, true) => Self::Left,
            (Orientation::Horizontal, false) => Self::Right,
            (Orientation::Vertical, true) => Self::Top,
            (Orientation::Vertical, false) => Self::Bottom,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Top => 2,
            Self::Bottom => 3,
        }
    }

    pub const fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            2 => Some(Self::Top),
            3 => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// One step of a [`SplitPath`]: which side of a split to take, and the
/// fraction of the split's extent that side occupies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub side: Side,
    pub size: f64,
}

impl PathStep {
    pub const fn new(side: Side, size: f64) -> Self {
        Self { side, size }
    }
}

/// Route from the root of a split tree down to where a dockable sits.
///
/// Every step but the last must meet a split node of the step's orientation;
/// the last step names the side on which the dockable is placed next to
/// whatever subtree the route arrived at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitPath {
    steps: Vec<PathStep>,
}

impl SplitPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_step(mut self, side: Side, size: f64) -> Self {
        self.steps.push(PathStep::new(side, size));
        self
    }

    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromIterator<PathStep> for SplitPath {
    fn from_iter<I: IntoIterator<Item = PathStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_orientation_pairs() {
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            for first in [true, false] {
                let side = Side::of(orientation, first);
                assert_eq!(side.orientation(), orientation);
                assert_eq!(side.is_first(), first);
            }
        }
    }

    #[test]
    fn names_parse_back() {
        for side in [Side::Left, Side::Right, Side::Top, Side::Bottom] {
            assert_eq!(Side::parse(side.as_str()), Some(side));
            assert_eq!(Side::from_byte(side.to_byte()), Some(side));
        }
        assert_eq!(Orientation::parse("diagonal"), None);
    }
}
