//! The three axes of a structured grid.

use std::fmt;

/// One axis of a structured grid.
///
/// Per-axis arrays throughout the workspace are indexed by
/// [`Axis::index`], so `dims[Axis::Y.index()]` is the Y cell count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// First (fastest-varying) axis.
    X,
    /// Second axis.
    Y,
    /// Third (slowest-varying) axis.
    Z,
}

impl Axis {
    /// All axes in storage order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in a per-axis array.
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// The axis stored at `index`, or `None` past the third axis.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Lower-case axis letter, as used in mesh descriptions.
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_index(axis.index()), Some(axis));
        }
        assert_eq!(Axis::from_index(3), None);
    }

    #[test]
    fn display_is_lower_case_letter() {
        assert_eq!(Axis::Z.to_string(), "z");
    }
}
