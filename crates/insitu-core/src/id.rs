//! Strongly-typed identifiers.

use std::fmt;

/// Number of completed time steps.
///
/// Starts at zero and is incremented once per published step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cycle(pub u64);

impl Cycle {
    /// The cycle after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Cycle {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a sub-domain handed to the runtime.
///
/// A single-rank simulation publishes exactly one domain, [`DomainId::ROOT`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(pub u32);

impl DomainId {
    /// The only domain of a single-rank simulation.
    pub const ROOT: DomainId = DomainId(0);
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DomainId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_next_increments() {
        assert_eq!(Cycle(0).next(), Cycle(1));
        assert_eq!(Cycle::default(), Cycle(0));
    }

    #[test]
    fn root_domain_is_zero() {
        assert_eq!(DomainId::ROOT, DomainId(0));
        assert_eq!(DomainId::ROOT.to_string(), "0");
    }
}
