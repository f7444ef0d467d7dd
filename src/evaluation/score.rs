use std::fmt::Display;
use std::ops::Neg;

use crate::environment::Player;
use crate::evaluation::EvaluationError;

/// The score represents the relative value of the position. Its unit is
/// whatever the [`crate::evaluation::Evaluator`] uses (centipawns for
/// [`crate::evaluation::material::Material`]).
///
/// A score is always finite except for [`Score::INFINITY`] and its negation,
/// which only appear as the initial bounds of the alpha-beta window.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Score {
    value: f64,
}

impl Score {
    /// Bound that is greater than any score an evaluator can produce.
    pub const INFINITY: Self = Self {
        value: f64::INFINITY,
    };

    /// Neutral score.
    pub const ZERO: Self = Self { value: 0.0 };

    /// Raw value of the score.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.value
    }

    /// Converts a White-relative score to the perspective of `player`.
    #[must_use]
    pub fn relative_to(self, player: Player) -> Self {
        Self {
            value: self.value * player.sign(),
        }
    }

    /// Returns the greater of two scores, preferring `self` when they are
    /// equal.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    /// Returns the smaller of two scores, preferring `self` when they are
    /// equal.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
}

impl TryFrom<f64> for Score {
    type Error = EvaluationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() {
            Ok(Self { value })
        } else {
            Err(EvaluationError { value })
        }
    }
}

impl Neg for Score {
    type Output = Self;

    /// Mirrors evaluation to other player's perspective.
    fn neg(self) -> Self::Output {
        Self { value: -self.value }
    }
}

impl Display for Score {
    /// Formats the score as centipawn units for UCI interface.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cp {}", self.value.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite() {
        assert!(Score::try_from(42.0).is_ok());
        assert!(Score::try_from(f64::NAN).is_err());
        assert!(Score::try_from(f64::INFINITY).is_err());
        assert!(Score::try_from(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn order() {
        let low = Score::try_from(-42.0).unwrap();
        let high = Score::try_from(43.0).unwrap();
        assert!(low < high);
        assert!(-Score::INFINITY < low);
        assert!(high < Score::INFINITY);
        assert_eq!(low.max(high), high);
        assert_eq!(low.min(high), low);
    }

    #[test]
    fn perspective() {
        let score = Score::try_from(42.0).unwrap();
        assert_eq!(score.relative_to(Player::White), score);
        assert_eq!(score.relative_to(Player::Black), -score);
        assert_eq!(-(-score), score);
    }

    #[test]
    fn display() {
        assert_eq!(Score::try_from(123.0).unwrap().to_string(), "cp 123");
        assert_eq!(Score::try_from(-0.4).unwrap().to_string(), "cp 0");
        assert_eq!(Score::try_from(-99.6).unwrap().to_string(), "cp -100");
    }
}
