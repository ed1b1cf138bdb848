/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use anyhow::{bail, Result};

use super::{Bitboard, Color};

/// Represents a single square on an `8x8` chess board.
///
/// Squares are numbered row-major from a1, so `square = file + rank * 8`:
/// ```text
/// 8| 56 57 58 59 60 61 62 63
/// 7| 48 49 50 51 52 53 54 55
/// 6| 40 41 42 43 44 45 46 47
/// 5| 32 33 34 35 36 37 38 39
/// 4| 24 25 26 27 28 29 30 31
/// 3| 16 17 18 19 20 21 22 23
/// 2|  8  9 10 11 12 13 14 15
/// 1|  0  1  2  3  4  5  6  7
///  +------------------------
///    a  b  c  d  e  f  g  h
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Square(pub(crate) u8);

impl Square {
    pub const A1: Self = Self(0);
    pub const B1: Self = Self(1);
    pub const C1: Self = Self(2);
    pub const D1: Self = Self(3);
    pub const E1: Self = Self(4);
    pub const F1: Self = Self(5);
    pub const G1: Self = Self(6);
    pub const H1: Self = Self(7);

    pub const A2: Self = Self(8);
    pub const B2: Self = Self(9);
    pub const C2: Self = Self(10);
    pub const D2: Self = Self(11);
    pub const E2: Self = Self(12);
    pub const F2: Self = Self(13);
    pub const G2: Self = Self(14);
    pub const H2: Self = Self(15);

    pub const A3: Self = Self(16);
    pub const B3: Self = Self(17);
    pub const C3: Self = Self(18);
    pub const D3: Self = Self(19);
    pub const E3: Self = Self(20);
    pub const F3: Self = Self(21);
    pub const G3: Self = Self(22);
    pub const H3: Self = Self(23);

    pub const A4: Self = Self(24);
    pub const B4: Self = Self(25);
    pub const C4: Self = Self(26);
    pub const D4: Self = Self(27);
    pub const E4: Self = Self(28);
    pub const F4: Self = Self(29);
    pub const G4: Self = Self(30);
    pub const H4: Self = Self(31);

    pub const A5: Self = Self(32);
    pub const B5: Self = Self(33);
    pub const C5: Self = Self(34);
    pub const D5: Self = Self(35);
    pub const E5: Self = Self(36);
    pub const F5: Self = Self(37);
    pub const G5: Self = Self(38);
    pub const H5: Self = Self(39);

    pub const A6: Self = Self(40);
    pub const B6: Self = Self(41);
    pub const C6: Self = Self(42);
    pub const D6: Self = Self(43);
    pub const E6: Self = Self(44);
    pub const F6: Self = Self(45);
    pub const G6: Self = Self(46);
    pub const H6: Self = Self(47);

    pub const A7: Self = Self(48);
    pub const B7: Self = Self(49);
    pub const C7: Self = Self(50);
    pub const D7: Self = Self(51);
    pub const E7: Self = Self(52);
    pub const F7: Self = Self(53);
    pub const G7: Self = Self(54);
    pub const H7: Self = Self(55);

    pub const A8: Self = Self(56);
    pub const B8: Self = Self(57);
    pub const C8: Self = Self(58);
    pub const D8: Self = Self(59);
    pub const E8: Self = Self(60);
    pub const F8: Self = Self(61);
    pub const G8: Self = Self(62);
    pub const H8: Self = Self(63);

    pub const MAX: u8 = 63;
    pub const COUNT: usize = 64;

    const FILE_MASK: u8 = 0b0000_0111;
    const RANK_MASK: u8 = 0b0011_1000;

    /// Returns an iterator over all 64 squares, starting at a1.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..=Self::MAX).map(Self)
    }

    /// Creates a new [`Square`] from the provided [`File`] and [`Rank`].
    ///
    /// # Example
    /// ```
    /// # use sable::{Square, File, Rank};
    /// assert_eq!(Square::new(File::C, Rank::FOUR), Square::C4);
    /// ```
    #[inline(always)]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self(file.0 | rank.0 << 3)
    }

    /// Creates a new [`Square`] from an index in `[0, 63]`.
    #[inline(always)]
    pub fn from_index(index: usize) -> Result<Self> {
        if index > Self::MAX as usize {
            bail!("Invalid index for Square: must be in [0, 63]. Got {index}");
        }
        Ok(Self(index as u8))
    }

    /// Creates a new [`Square`] from an index, without bounds checking.
    #[inline(always)]
    pub const fn from_index_unchecked(index: usize) -> Self {
        debug_assert!(index < Self::COUNT, "Index must be between [0,64)");
        Self(index as u8)
    }

    /// The index of this square, in `[0, 63]`.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// The inner `u8` of this square.
    #[inline(always)]
    pub const fn inner(&self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn file(&self) -> File {
        File(self.0 & Self::FILE_MASK)
    }

    #[inline(always)]
    pub const fn rank(&self) -> Rank {
        Rank(self.0 >> 3)
    }

    /// Mirrors this square across the horizontal center line (a1 <-> a8).
    #[inline(always)]
    pub const fn flipped_rank(self) -> Self {
        Self(self.0 ^ Self::RANK_MASK)
    }

    /// If `color` is Black, mirrors this square vertically. White squares are returned as-is.
    ///
    /// # Example
    /// ```
    /// # use sable::{Color, Square};
    /// assert_eq!(Square::E1.relative_to(Color::Black), Square::E8);
    /// assert_eq!(Square::C2.relative_to(Color::White), Square::C2);
    /// ```
    #[inline(always)]
    pub const fn relative_to(self, color: Color) -> Self {
        match color {
            Color::White => self,
            Color::Black => self.flipped_rank(),
        }
    }

    /// Attempt to offset this [`Square`] by the file and rank deltas.
    ///
    /// Returns `None` if the result would fall off the board.
    ///
    /// # Example
    /// ```
    /// # use sable::Square;
    /// assert_eq!(Square::C4.offset(1, 1), Some(Square::D5));
    /// assert_eq!(Square::A1.offset(-1, 0), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file().0 as i8 + file_delta;
        let rank = self.rank().0 as i8 + rank_delta;

        if file < 0 || file > 7 || rank < 0 || rank > 7 {
            None
        } else {
            Some(Self(file as u8 | (rank as u8) << 3))
        }
    }

    /// One square towards `color`'s promotion rank, if there is one.
    #[inline(always)]
    pub const fn forward(&self, color: Color) -> Option<Self> {
        self.offset(0, color.negation_multiplier())
    }

    /// One square towards `color`'s back rank, if there is one.
    #[inline(always)]
    pub const fn backward(&self, color: Color) -> Option<Self> {
        self.offset(0, -color.negation_multiplier())
    }

    /// Number of files between `self` and `other`.
    #[inline(always)]
    pub const fn distance_files(&self, other: Self) -> u8 {
        self.file().0.abs_diff(other.file().0)
    }

    /// Number of ranks between `self` and `other`.
    #[inline(always)]
    pub const fn distance_ranks(&self, other: Self) -> u8 {
        self.rank().0.abs_diff(other.rank().0)
    }

    /// Parses a square from its two-character coordinate form, like `e4`.
    ///
    /// # Example
    /// ```
    /// # use sable::Square;
    /// assert_eq!(Square::from_uci("c4").unwrap(), Square::C4);
    /// assert!(Square::from_uci("z0").is_err());
    /// ```
    pub fn from_uci(square: &str) -> Result<Self> {
        let mut chars = square.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Invalid Square string: must contain exactly 2 characters. Got {square:?}");
        };

        Ok(Self::new(File::from_char(file)?, Rank::from_char(rank)?))
    }

    #[inline(always)]
    pub fn to_uci(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }

    /// Alias for [`Bitboard::from_square`].
    #[inline(always)]
    pub const fn bitboard(&self) -> Bitboard {
        Bitboard::from_square(*self)
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl fmt::Debug for Square {
    /// Displays the coordinate along with the internal index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({})", self.0)
    }
}

/// One of the eight rows of the board, `1` through `8`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Rank(pub(crate) u8);

impl Rank {
    pub const ONE: Self = Self(0);
    pub const TWO: Self = Self(1);
    pub const THREE: Self = Self(2);
    pub const FOUR: Self = Self(3);
    pub const FIVE: Self = Self(4);
    pub const SIX: Self = Self(5);
    pub const SEVEN: Self = Self(6);
    pub const EIGHT: Self = Self(7);

    pub const COUNT: usize = 8;

    /// Returns an iterator over all ranks, from `1` to `8`.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// Parses a rank from a digit in `'1'..='8'`.
    pub fn from_char(rank: char) -> Result<Self> {
        match rank {
            '1'..='8' => Ok(Self(rank as u8 - b'1')),
            _ => bail!("Invalid char for Rank: must be in ['1', '8']. Got {rank:?}"),
        }
    }

    /// This rank as seen from `color`'s side of the board.
    ///
    /// `Rank::TWO.relative_to(Color::Black)` is the seventh rank.
    #[inline(always)]
    pub const fn relative_to(self, color: Color) -> Self {
        match color {
            Color::White => self,
            Color::Black => Self(7 - self.0),
        }
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (self.0 + b'1') as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.char(), self.0)
    }
}

/// One of the eight columns of the board, `a` through `h`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct File(pub(crate) u8);

impl File {
    pub const A: Self = Self(0);
    pub const B: Self = Self(1);
    pub const C: Self = Self(2);
    pub const D: Self = Self(3);
    pub const E: Self = Self(4);
    pub const F: Self = Self(5);
    pub const G: Self = Self(6);
    pub const H: Self = Self(7);

    pub const COUNT: usize = 8;

    /// Returns an iterator over all files, from `a` to `h`.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// Parses a file from a lowercase letter in `'a'..='h'`.
    pub fn from_char(file: char) -> Result<Self> {
        match file {
            'a'..='h' => Ok(Self(file as u8 - b'a')),
            _ => bail!("Invalid char for File: must be in ['a', 'h']. Got {file:?}"),
        }
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (self.0 + b'a') as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.char(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_from_uci() {
        assert_eq!(Square::from_uci("a1").unwrap(), Square::A1);
        assert_eq!(Square::from_uci("h8").unwrap(), Square::H8);
        assert_eq!(Square::from_uci("e4").unwrap(), Square::E4);

        assert!(Square::from_uci("").is_err());
        assert!(Square::from_uci("e").is_err());
        assert!(Square::from_uci("e44").is_err());
        assert!(Square::from_uci("i1").is_err());
        assert!(Square::from_uci("a9").is_err());
    }

    #[test]
    fn test_square_parts_agree_with_index() {
        for square in Square::iter() {
            assert_eq!(Square::new(square.file(), square.rank()), square);
            assert_eq!(square.index(), square.rank().index() * 8 + square.file().index());
            assert_eq!(square.to_uci().parse::<Square>().unwrap(), square);
        }
    }

    #[test]
    fn test_square_offsets() {
        assert_eq!(Square::E2.forward(Color::White), Some(Square::E3));
        assert_eq!(Square::E2.forward(Color::Black), Some(Square::E1));
        assert_eq!(Square::E1.forward(Color::Black), None);
        assert_eq!(Square::E7.backward(Color::Black), Some(Square::E8));
        assert_eq!(Square::H4.offset(1, 0), None);
        assert_eq!(Square::H4.offset(-7, 4), Some(Square::A8));
    }

    #[test]
    fn test_relative_ranks() {
        assert_eq!(Rank::TWO.relative_to(Color::Black), Rank::SEVEN);
        assert_eq!(Rank::EIGHT.relative_to(Color::White), Rank::EIGHT);
        assert_eq!(Square::G1.relative_to(Color::Black), Square::G8);
    }
}
