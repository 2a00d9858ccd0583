use std::fmt;

use serde::{Deserialize, Serialize};

/// How an expression's value moves as its input columns increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Monotonicity {
    StrictlyDecreasing,
    Decreasing,
    Constant,
    Increasing,
    StrictlyIncreasing,
    NotMonotonic,
}

impl Monotonicity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StrictlyDecreasing => "STRICTLY_DECREASING",
            Self::Decreasing => "DECREASING",
            Self::Constant => "CONSTANT",
            Self::Increasing => "INCREASING",
            Self::StrictlyIncreasing => "STRICTLY_INCREASING",
            Self::NotMonotonic => "NOT_MONOTONIC",
        }
    }

    /// Monotonicity of the negated expression.
    pub const fn reverse(self) -> Self {
        match self {
            Self::StrictlyDecreasing => Self::StrictlyIncreasing,
            Self::Decreasing => Self::Increasing,
            Self::Increasing => Self::Decreasing,
            Self::StrictlyIncreasing => Self::StrictlyDecreasing,
            other => other,
        }
    }

    /// Drop strictness, e.g. after FLOOR.
    pub const fn unstrict(self) -> Self {
        match self {
            Self::StrictlyDecreasing => Self::Decreasing,
            Self::StrictlyIncreasing => Self::Increasing,
            other => other,
        }
    }

    pub const fn is_constant(self) -> bool {
        matches!(self, Self::Constant)
    }

    pub const fn is_decreasing(self) -> bool {
        matches!(self, Self::StrictlyDecreasing | Self::Decreasing)
    }

    /// Monotonicity of `a + b`.
    pub fn plus(self, other: Self) -> Self {
        match (self, other) {
            (Self::Constant, m) | (m, Self::Constant) => m,
            (a, b) if a == b => a,
            (a, b) if a.unstrict() == b.unstrict() => a.unstrict(),
            _ => Self::NotMonotonic,
        }
    }

    /// Monotonicity of `a - b`.
    pub fn minus(self, other: Self) -> Self {
        self.plus(other.reverse())
    }

    /// Monotonicity of multiplying by a constant with the given sign.
    pub fn scale_by_sign(self, sign: i32) -> Self {
        match sign.signum() {
            0 => Self::Constant,
            1 => self,
            _ => self.reverse(),
        }
    }
}

impl fmt::Display for Monotonicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_and_minus() {
        use Monotonicity::*;
        assert_eq!(Constant, Constant.plus(Constant));
        assert_eq!(StrictlyIncreasing, StrictlyIncreasing.plus(Constant));
        assert_eq!(Increasing, StrictlyIncreasing.plus(Increasing));
        assert_eq!(NotMonotonic, Increasing.plus(Decreasing));
        assert_eq!(StrictlyDecreasing, Constant.minus(StrictlyIncreasing));
        assert_eq!(Increasing, Increasing.minus(Decreasing));
    }

    #[test]
    fn scale_by_sign() {
        use Monotonicity::*;
        assert_eq!(Decreasing, Increasing.scale_by_sign(-2));
        assert_eq!(Constant, Increasing.scale_by_sign(0));
    }
}
