/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not},
};

use super::{Color, File, Rank, Square};

/// Multiplier of the de Bruijn sequence used by [`Bitboard::first_set`].
const DE_BRUIJN: u64 = 0x03F79D71B4CB0A89;

/// Maps `((b ^ (b - 1)) * DE_BRUIJN) >> 58` back to the index of the lowest set bit of `b`.
const DE_BRUIJN_INDEX: [i32; 64] = [
    0, 47, 1, 56, 48, 27, 2, 60, 57, 49, 41, 37, 28, 16, 3, 61, //
    54, 58, 35, 52, 50, 42, 21, 44, 38, 32, 29, 23, 17, 11, 4, 62, //
    46, 55, 26, 59, 40, 36, 15, 53, 34, 51, 20, 43, 31, 22, 10, 45, //
    25, 39, 14, 33, 19, 30, 9, 24, 13, 18, 8, 12, 7, 6, 5, 63, //
];

/// One of the eight compass directions a sliding piece can travel in.
///
/// "North" is towards the eighth rank.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const COUNT: usize = 8;

    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        use Direction::*;
        [North, NorthEast, East, SouthEast, South, SouthWest, West, NorthWest]
    }

    /// The `(file, rank)` step taken by one move in this direction.
    #[inline(always)]
    pub const fn delta(&self) -> (i8, i8) {
        match self {
            Self::North => (0, 1),
            Self::NorthEast => (1, 1),
            Self::East => (1, 0),
            Self::SouthEast => (1, -1),
            Self::South => (0, -1),
            Self::SouthWest => (-1, -1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, 1),
        }
    }

    /// Returns `true` if travelling in this direction increases the square index.
    #[inline(always)]
    pub const fn is_ascending(&self) -> bool {
        matches!(
            self,
            Self::North | Self::NorthEast | Self::East | Self::NorthWest
        )
    }

    /// `true` for the four rook directions.
    #[inline(always)]
    pub const fn is_orthogonal(&self) -> bool {
        matches!(self, Self::North | Self::East | Self::South | Self::West)
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

/// A [`Bitboard`] is a set of squares packed into a `u64`.
///
/// Bit `i` is set if and only if square `i` (see [`Square`]) is a member of the set.
/// The low order bits represent the first rank, so a bitboard of the first rank looks like this:
/// ```text
/// 00000000
/// 00000000
/// 00000000
/// 00000000
/// 00000000
/// 00000000
/// 00000000
/// 11111111
/// ```
///
/// Squares are addressed by index in `[0, 63]`; passing anything else is a caller bug and is only
/// caught by debug assertions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Bitboard(pub(crate) u64);

impl Bitboard {
    pub const FILE_A: Self = Self(0x0101010101010101);
    pub const FILE_H: Self = Self(0x8080808080808080);
    pub const RANK_1: Self = Self(0x00000000000000FF);
    pub const RANK_2: Self = Self(0x000000000000FF00);
    pub const RANK_4: Self = Self(0x00000000FF000000);
    pub const RANK_5: Self = Self(0x000000FF00000000);
    pub const RANK_7: Self = Self(0x00FF000000000000);
    pub const RANK_8: Self = Self(0xFF00000000000000);
    pub const A1_H8_DIAG: Self = Self(0x8040201008040201);
    pub const EMPTY_BOARD: Self = Self(0x0000000000000000);
    pub const FULL_BOARD: Self = Self(0xFFFFFFFFFFFFFFFF);

    /// Constructs a new [`Bitboard`] from the provided bit pattern.
    ///
    /// # Example
    /// ```
    /// # use sable::Bitboard;
    /// let board = Bitboard::new(255);
    /// assert_eq!(board.to_hex_string(), "0x00000000000000FF");
    /// ```
    #[inline(always)]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Constructs a [`Bitboard`] with only the bit for `square` set.
    #[inline(always)]
    pub const fn from_square(square: Square) -> Self {
        Self(1 << square.index())
    }

    /// Constructs a [`Bitboard`] containing an entire file.
    ///
    /// # Example
    /// ```
    /// # use sable::{Bitboard, File};
    /// let board = Bitboard::from_file(File::F);
    /// assert_eq!(board.to_hex_string(), "0x2020202020202020");
    /// ```
    #[inline(always)]
    pub const fn from_file(file: File) -> Self {
        Self(Self::FILE_A.0 << file.0)
    }

    /// Constructs a [`Bitboard`] containing an entire rank.
    #[inline(always)]
    pub const fn from_rank(rank: Rank) -> Self {
        Self(Self::RANK_1.0 << (rank.0 * 8))
    }

    /// The seventh rank from `color`'s perspective: where its pawns stand just before promoting.
    #[inline(always)]
    pub const fn seventh_rank(color: Color) -> Self {
        match color {
            Color::White => Self::RANK_7,
            Color::Black => Self::RANK_2,
        }
    }

    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }

    /// Returns `true` if the bit at `index` is set.
    ///
    /// # Example
    /// ```
    /// # use sable::Bitboard;
    /// let mut board = Bitboard::default();
    /// board.set(42);
    /// assert!(board.is_set(42));
    /// assert!(board.is_clear(41));
    /// ```
    #[inline(always)]
    pub const fn is_set(&self, index: usize) -> bool {
        debug_assert!(index < Square::COUNT);
        self.0 & (1 << index) != 0
    }

    /// Returns `true` if the bit at `index` is not set.
    #[inline(always)]
    pub const fn is_clear(&self, index: usize) -> bool {
        !self.is_set(index)
    }

    /// Returns `true` if `square` is a member of this set.
    #[inline(always)]
    pub const fn contains(&self, square: Square) -> bool {
        self.is_set(square.index())
    }

    #[inline(always)]
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < Square::COUNT);
        self.0 |= 1 << index;
    }

    #[inline(always)]
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < Square::COUNT);
        self.0 &= !(1 << index);
    }

    /// Adds every square of `other` to this set.
    #[inline(always)]
    pub fn combine(&mut self, other: Self) -> &mut Self {
        self.0 |= other.0;
        self
    }

    /// Keeps only the squares also present in `other`.
    #[inline(always)]
    pub fn intersect(&mut self, other: Self) -> &mut Self {
        self.0 &= other.0;
        self
    }

    /// Removes every square of `other` from this set.
    ///
    /// Computed as `self ^ (other & self)`, so squares of `other` that were never in the set stay out.
    #[inline(always)]
    pub fn exclude(&mut self, other: Self) -> &mut Self {
        self.0 ^= other.0 & self.0;
        self
    }

    /// Wrapping multiplication of the raw bits, used to mix a set into a hash index.
    #[inline(always)]
    pub fn multiply(&mut self, other: Self) -> &mut Self {
        self.0 = self.0.wrapping_mul(other.0);
        self
    }

    /// Index of the lowest set bit, or `-1` if the set is empty.
    ///
    /// The lowest bit is isolated (together with the zeros below it) by `b ^ (b - 1)` and
    /// multiplied by a de Bruijn constant; the top six bits of the product are unique per bit.
    ///
    /// # Example
    /// ```
    /// # use sable::{Bitboard, Square};
    /// assert_eq!(Bitboard::EMPTY_BOARD.first_set(), -1);
    /// assert_eq!(Bitboard::from_square(Square::D5).first_set(), 35);
    /// assert_eq!(Bitboard::RANK_8.first_set(), 56);
    /// ```
    #[inline(always)]
    pub const fn first_set(&self) -> i32 {
        if self.0 == 0 {
            return -1;
        }

        let isolated = self.0 ^ (self.0 - 1);
        DE_BRUIJN_INDEX[(isolated.wrapping_mul(DE_BRUIJN) >> 58) as usize]
    }

    /// Walks from `index` in `direction` (not including `index` itself) and returns the first set
    /// square met before falling off the board, or `-1` if there is none.
    ///
    /// # Example
    /// ```
    /// # use sable::{Bitboard, Direction, Square};
    /// let blockers = Bitboard::from_square(Square::A4) | Bitboard::from_square(Square::A7);
    /// assert_eq!(blockers.first_set_from(Square::A1.index(), Direction::North), Square::A4.index() as i32);
    /// assert_eq!(blockers.first_set_from(Square::A5.index(), Direction::North), Square::A7.index() as i32);
    /// assert_eq!(blockers.first_set_from(Square::A1.index(), Direction::East), -1);
    /// ```
    #[inline(always)]
    pub const fn first_set_from(&self, index: usize, direction: Direction) -> i32 {
        let (df, dr) = direction.delta();
        let mut square = Square::from_index_unchecked(index);

        while let Some(next) = square.offset(df, dr) {
            if self.is_set(next.index()) {
                return next.index() as i32;
            }
            square = next;
        }

        -1
    }

    /// Clears `index` and every square after it in `direction`, up to the edge of the board.
    #[inline(always)]
    pub fn clear_from(&mut self, index: usize, direction: Direction) -> &mut Self {
        let (df, dr) = direction.delta();
        let mut square = Some(Square::from_index_unchecked(index));

        while let Some(current) = square {
            self.clear(current.index());
            square = current.offset(df, dr);
        }

        self
    }

    /// Number of squares in this set.
    #[inline(always)]
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// The lowest square in this set, if any.
    #[inline(always)]
    pub const fn to_square(&self) -> Option<Square> {
        match self.first_set() {
            -1 => None,
            index => Some(Square::from_index_unchecked(index as usize)),
        }
    }

    /// Removes and returns the lowest square in this set, if any.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<Square> {
        let square = self.to_square()?;
        self.0 &= self.0 - 1;
        Some(square)
    }

    /// Iterates over every square in this set, lowest index first.
    #[inline(always)]
    pub const fn iter(&self) -> BitboardIter {
        BitboardIter { bitboard: *self }
    }

    #[inline(always)]
    pub const fn and(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[inline(always)]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline(always)]
    pub const fn xor(self, other: Self) -> Self {
        Self(self.0 ^ other.0)
    }

    #[inline(always)]
    pub const fn not(self) -> Self {
        Self(!self.0)
    }

    pub fn to_hex_string(&self) -> String {
        format!("0x{:016X}", self.0)
    }
}

impl Not for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

macro_rules! impl_bitwise_op {
    ($trait:ident, $fn:ident, $trait_assign:ident, $fn_assign:ident, $op:tt) => {
        impl $trait for Bitboard {
            type Output = Self;
            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0 $op rhs.0)
            }
        }

        impl $trait<Square> for Bitboard {
            type Output = Self;
            #[inline(always)]
            fn $fn(self, rhs: Square) -> Self::Output {
                Self(self.0 $op rhs.bitboard().0)
            }
        }

        impl $trait_assign for Bitboard {
            #[inline(always)]
            fn $fn_assign(&mut self, rhs: Self) {
                self.0 = self.0 $op rhs.0;
            }
        }

        impl $trait_assign<Square> for Bitboard {
            #[inline(always)]
            fn $fn_assign(&mut self, rhs: Square) {
                self.0 = self.0 $op rhs.bitboard().0;
            }
        }
    };
}

impl_bitwise_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
impl_bitwise_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
impl_bitwise_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl From<Square> for Bitboard {
    #[inline(always)]
    fn from(value: Square) -> Self {
        Self::from_square(value)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<T: IntoIterator<Item = Square>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY_BOARD, |bb, square| bb | square)
    }
}

impl fmt::UpperHex for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl fmt::Display for Bitboard {
    /// Draws the set as an 8x8 grid with the eighth rank on top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut board = String::with_capacity(136);

        for rank in Rank::iter().rev() {
            for file in File::iter() {
                let occupant = if self.contains(Square::new(file, rank)) {
                    'X'
                } else {
                    '.'
                };

                board.push(occupant);
                board.push(' ');
            }
            board.push('\n');
        }

        write!(f, "{board}")
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{self}", self.to_hex_string())
    }
}

/// An iterator over all set bits in a [`Bitboard`].
///
/// See [`Bitboard::iter`].
pub struct BitboardIter {
    bitboard: Bitboard,
}

impl Iterator for BitboardIter {
    type Item = Square;
    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.bitboard.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.bitboard.count() as usize;
        (size, Some(size))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;
    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        BitboardIter { bitboard: self }
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_first_set_every_single_bit() {
        assert_eq!(Bitboard::EMPTY_BOARD.first_set(), -1);

        for index in 0..64 {
            let board = Bitboard::new(1 << index);
            assert_eq!(board.first_set(), index as i32, "single bit at {index}");
        }
    }

    #[test]
    fn test_exclude_only_clears_members() {
        let mut board = Bitboard::RANK_2;
        board.exclude(Bitboard::FILE_A);
        assert_eq!(board, Bitboard::new(0xFE00));

        let mut board = Bitboard::RANK_2;
        board.exclude(Bitboard::RANK_7);
        assert_eq!(board, Bitboard::RANK_2);
    }

    #[test]
    fn test_combinators_chain() {
        let mut board = Bitboard::RANK_1;
        board
            .combine(Bitboard::FILE_A)
            .intersect(Bitboard::FILE_A | Bitboard::FILE_H);
        assert_eq!(board, Bitboard::FILE_A | Square::H1);

        let mut mixed = Bitboard::new(3);
        mixed.multiply(Bitboard::new(5));
        assert_eq!(mixed.inner(), 15);
    }

    #[test]
    fn test_first_set_from_stops_at_edge() {
        // H4 is followed by A5 in index order, but the ray east of H4 leaves the board.
        let board = Bitboard::from_square(Square::A5);
        assert_eq!(board.first_set_from(Square::H4.index(), Direction::East), -1);

        let board = Bitboard::from_square(Square::B2);
        assert_eq!(
            board.first_set_from(Square::H8.index(), Direction::SouthWest),
            Square::B2.index() as i32
        );
        assert_eq!(board.first_set_from(Square::B2.index(), Direction::SouthWest), -1);
    }

    #[test]
    fn test_clear_from_includes_origin() {
        let mut board = Bitboard::FILE_A;
        board.clear_from(Square::A3.index(), Direction::North);
        assert_eq!(board, Bitboard::from_square(Square::A1) | Square::A2);

        let mut board = Bitboard::A1_H8_DIAG;
        board.clear_from(Square::D4.index(), Direction::SouthWest);
        assert_eq!(board.count(), 4);
        assert_eq!(board.first_set(), Square::E5.index() as i32);
    }

    #[test]
    fn test_bitboard_to_string() {
        let expected = ". . . . . . . X \n\
                        . . . . . . X . \n\
                        . . . . . X . . \n\
                        . . . . X . . . \n\
                        . . . X . . . . \n\
                        . . X . . . . . \n\
                        . X . . . . . . \n\
                        X . . . . . . . \n";
        assert_eq!(Bitboard::A1_H8_DIAG.to_string(), expected);
    }

    #[test]
    fn test_iteration_matches_count() {
        let board = Bitboard::RANK_2 | Bitboard(0x0404040404040404);
        let squares = board.iter().collect::<Vec<_>>();
        assert_eq!(squares.len(), board.count() as usize);
        assert_eq!(squares[0], Square::C1);
        assert_eq!(squares.into_iter().collect::<Bitboard>(), board);
    }

    proptest! {
        #[test]
        fn set_then_test(bits in any::<u64>(), index in 0usize..64) {
            let mut board = Bitboard::new(bits);
            board.set(index);
            prop_assert!(board.is_set(index));
            board.clear(index);
            prop_assert!(board.is_clear(index));
        }

        #[test]
        fn first_set_matches_trailing_zeros(bits in 1u64..) {
            let board = Bitboard::new(bits);
            prop_assert_eq!(board.first_set(), bits.trailing_zeros() as i32);
        }

        #[test]
        fn exclude_is_difference(a in any::<u64>(), b in any::<u64>()) {
            let mut board = Bitboard::new(a);
            board.exclude(Bitboard::new(b));
            prop_assert_eq!(board.inner(), a & !b);
        }

        #[test]
        fn pop_drains_in_order(bits in any::<u64>()) {
            let mut board = Bitboard::new(bits);
            let mut last = -1;
            while let Some(square) = board.pop() {
                prop_assert!(square.index() as i32 > last);
                last = square.index() as i32;
            }
            prop_assert!(board.is_empty());
        }
    }
}
