//! The two-valued signal algebra (SPEC_FULL.md §3, §8).

use serde::{Deserialize, Serialize};

/// A logical signal level. There is no LOW: an unconnected net FLOATs,
/// and any HIGH driver on a net wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignalState {
    #[default]
    Float,
    High,
}

impl SignalState {
    /// Idempotent, commutative, associative OR over `{Float < High}`.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (SignalState::High, _) | (_, SignalState::High) => SignalState::High,
            (SignalState::Float, SignalState::Float) => SignalState::Float,
        }
    }

    pub fn is_high(self) -> bool {
        matches!(self, SignalState::High)
    }
}

impl std::ops::BitOr for SignalState {
    type Output = SignalState;
    fn bitor(self, rhs: Self) -> Self::Output {
        self.combine(rhs)
    }
}

/// Combine an iterator of states, defaulting to `Float` for an empty input
/// (an unreferenced tab contributes nothing and is never HIGH).
pub fn combine_all(states: impl IntoIterator<Item = SignalState>) -> SignalState {
    states
        .into_iter()
        .fold(SignalState::Float, SignalState::combine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use SignalState::{Float, High};

    #[test]
    fn commutative() {
        assert_eq!(Float.combine(High), High.combine(Float));
    }

    #[test]
    fn idempotent() {
        assert_eq!(High.combine(High), High);
        assert_eq!(Float.combine(Float), Float);
    }

    #[test]
    fn identity_is_float() {
        assert_eq!(High.combine(Float), High);
        assert_eq!(Float.combine(Float), Float);
    }

    #[test]
    fn high_absorbs() {
        assert_eq!(High.combine(High), High);
        assert_eq!(High.combine(Float), High);
    }

    #[test]
    fn associative() {
        let a = High;
        let b = Float;
        let c = High;
        assert_eq!(a.combine(b).combine(c), a.combine(b.combine(c)));
    }

    #[test]
    fn empty_combine_is_float() {
        assert_eq!(combine_all(std::iter::empty()), Float);
    }
}
