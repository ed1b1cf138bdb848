/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::MAX_PLY;

/// A numerical representation of the evaluation of a position / move, in units of ["centipawns"](https://www.chessprogramming.org/Score).
///
/// Scores are always relative to the side to move. This value is internally capped at [`Self::INF`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Largest possible score ever achievable.
    pub const INF: Self = Self(i16::MAX as i32);

    /// Score of mate in the current position.
    pub const MATE: Self = Self(Self::INF.0 - 1);

    /// Score of a draw.
    pub const DRAW: Self = Self(0);

    /// Lowest possible score for mate.
    ///
    /// This is only obtainable if mate is possible in [`MAX_PLY`] plies.
    pub const LOWEST_MATE: Self = Self(Self::MATE.0 - MAX_PLY as i32);

    /// Score for delivering mate `ply` plies from the root.
    #[inline(always)]
    pub const fn mate_in(ply: usize) -> Self {
        Self(Self::MATE.0 - ply as i32)
    }

    /// Score for being mated `ply` plies from the root.
    ///
    /// # Example
    /// ```
    /// # use sable::Score;
    /// assert!(Score::mated_in(1) < Score::mated_in(3));
    /// assert_eq!(Score::mated_in(2), -Score::mate_in(2));
    /// ```
    #[inline(always)]
    pub const fn mated_in(ply: usize) -> Self {
        Self(-Self::MATE.0 + ply as i32)
    }

    #[inline(always)]
    pub const fn inner(&self) -> i32 {
        self.0
    }

    /// Returns `true` if the score is a mate score.
    #[inline(always)]
    pub const fn is_mate(&self) -> bool {
        self.0.abs() >= Self::LOWEST_MATE.0
    }

    /// Returns the number of plies (half moves) this score is from mate.
    #[inline(always)]
    pub const fn plies_to_mate(&self) -> i32 {
        Self::MATE.0 - self.0.abs()
    }

    /// Returns the number of moves (full moves) this score is from mate.
    ///
    /// Positive if the side to move delivers mate, negative if it gets mated.
    ///
    /// # Example
    /// ```
    /// # use sable::Score;
    /// assert_eq!(Score::mate_in(1).moves_to_mate(), 1);
    /// assert_eq!(Score::mate_in(3).moves_to_mate(), 2);
    /// assert_eq!(Score::mated_in(2).moves_to_mate(), -1);
    /// ```
    #[inline(always)]
    pub const fn moves_to_mate(&self) -> i32 {
        let plies = self.plies_to_mate();

        // The winning side still has to make its final move
        if self.0 > 0 {
            (plies + 1) / 2
        } else {
            -plies / 2
        }
    }

    /// Returns the absolute value of this [`Score`].
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// "Normalizes" a score so that it can be printed as a float, in pawns.
    #[inline(always)]
    pub fn normalize(&self) -> f32 {
        self.0 as f32 / 100.0
    }

    /// Performs linear interpolation between `self` and `other` by `t` where `t` is `[0, 100]`.
    #[inline(always)]
    pub const fn lerp(self, other: Self, t: i32) -> Self {
        Self(self.0 + (other.0 - self.0) * t / 100)
    }
}

impl From<i32> for Score {
    #[inline(always)]
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Arithmetic works on other scores and on plain centipawn values alike.
macro_rules! impl_score_arithmetic {
    ($($op:ident::$fn:ident, $op_assign:ident::$fn_assign:ident;)*) => {$(
        impl<T: Into<Score>> std::ops::$op<T> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: T) -> Self::Output {
                Self(std::ops::$op::$fn(self.0, rhs.into().0))
            }
        }

        impl<T: Into<Score>> std::ops::$op_assign<T> for Score {
            #[inline(always)]
            fn $fn_assign(&mut self, rhs: T) {
                *self = std::ops::$op::$fn(*self, rhs);
            }
        }
    )*};
}

impl_score_arithmetic! {
    Add::add, AddAssign::add_assign;
    Sub::sub, SubAssign::sub_assign;
    Mul::mul, MulAssign::mul_assign;
    Div::div, DivAssign::div_assign;
}

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl fmt::Display for Score {
    /// Mate scores print as `#N` (or `#-N` when getting mated), anything else in centipawns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            write!(f, "#{}", self.moves_to_mate())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_scores_prefer_shorter_mates() {
        assert!(Score::mate_in(1) > Score::mate_in(3));
        assert!(Score::mated_in(1) < Score::mated_in(3));
        assert!(Score::mate_in(MAX_PLY).is_mate());
        assert!(!Score(2_000).is_mate());
        assert_eq!(Score::mated_in(4).plies_to_mate(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(Score(-35).to_string(), "-35");
        assert_eq!(Score::mate_in(1).to_string(), "#1");
        assert_eq!(Score::mated_in(2).to_string(), "#-1");
    }

    #[test]
    fn test_lerp() {
        assert_eq!(Score(100).lerp(Score(200), 0), Score(100));
        assert_eq!(Score(100).lerp(Score(200), 50), Score(150));
        assert_eq!(Score(100).lerp(Score(200), 100), Score(200));
    }
}
