/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut, Neg},
    str::FromStr,
};

use anyhow::{bail, Result};

/// Represents the color of a player or piece.
///
/// White moves first, and therefore [`Color`] defaults to [`Color::White`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// Number of color variants.
    pub const COUNT: usize = 2;

    /// An array of both colors, starting with White.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::White, Self::Black]
    }

    /// Creates a new [`Color`] from the lowest bit of `bits`.
    #[inline(always)]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 1 {
            0 => Self::White,
            _ => Self::Black,
        }
    }

    /// Returns a multiplier for negating numbers relative to this color.
    ///
    /// # Example
    /// ```
    /// # use sable::Color;
    /// assert_eq!(Color::White.negation_multiplier(), 1);
    /// assert_eq!(Color::Black.negation_multiplier(), -1);
    /// ```
    #[inline(always)]
    pub const fn negation_multiplier(&self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// Returns this [`Color`]'s opposite.
    ///
    /// # Example
    /// ```
    /// # use sable::Color;
    /// assert_eq!(Color::White.opponent(), Color::Black);
    /// assert_eq!(Color::Black.opponent(), Color::White);
    /// ```
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        Self::from_bits(self.bits() ^ 1)
    }

    /// `0` for White, `1` for Black.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    #[inline(always)]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    /// Parses the side-to-move field of a FEN string.
    pub fn from_uci(color: char) -> Result<Self> {
        match color {
            'w' | 'W' => Ok(Self::White),
            'b' | 'B' => Ok(Self::Black),
            _ => bail!("Color must be either 'w' or 'b' (case-insensitive). Found {color}"),
        }
    }

    /// Uppercase is White and lowercase is Black.
    #[inline(always)]
    pub const fn from_case(c: char) -> Self {
        Self::from_bits(c.is_ascii_lowercase() as u8)
    }

    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl Neg for Color {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self::Output {
        self.opponent()
    }
}

/// The kind (or "role") of a chess piece, without a [`Color`].
///
/// Discriminants start at `1` so that a [`Piece`] of `0` can mean "no piece".
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 1,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Number of piece variants.
    pub const COUNT: usize = 6;

    /// In the order: `Pawn`, `Knight`, `Bishop`, `Rook`, `Queen`, `King`.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        use PieceKind::*;
        [Pawn, Knight, Bishop, Rook, Queen, King]
    }

    /// The kinds a pawn may promote to, in the order they are generated.
    #[inline(always)]
    pub const fn promotions() -> [Self; 4] {
        use PieceKind::*;
        [Queen, Rook, Bishop, Knight]
    }

    /// Creates a new [`PieceKind`] from its discriminant.
    ///
    /// # Example
    /// ```
    /// # use sable::PieceKind;
    /// assert_eq!(PieceKind::from_bits(5).unwrap(), PieceKind::Queen);
    /// assert!(PieceKind::from_bits(0).is_err());
    /// ```
    #[inline(always)]
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            1 => Ok(Self::Pawn),
            2 => Ok(Self::Knight),
            3 => Ok(Self::Bishop),
            4 => Ok(Self::Rook),
            5 => Ok(Self::Queen),
            6 => Ok(Self::King),
            _ => bail!("Invalid bits for PieceKind: Bits must be between [1,6]. Got {bits}."),
        }
    }

    #[inline(always)]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    /// Zero-based index, for lists of [`PieceKind::COUNT`] elements.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize - 1
    }

    /// Rough material value in centipawns, used for move ordering.
    #[inline(always)]
    pub const fn value(&self) -> i32 {
        match self {
            Self::Pawn => 100,
            Self::Knight => 300,
            Self::Bishop => 300,
            Self::Rook => 500,
            Self::Queen => 900,
            Self::King => 0,
        }
    }

    pub fn from_uci(kind: char) -> Result<Self> {
        match kind {
            'P' | 'p' => Ok(Self::Pawn),
            'N' | 'n' => Ok(Self::Knight),
            'B' | 'b' => Ok(Self::Bishop),
            'R' | 'r' => Ok(Self::Rook),
            'Q' | 'q' => Ok(Self::Queen),
            'K' | 'k' => Ok(Self::King),
            _ => bail!("Invalid char for PieceKind: Got {kind}."),
        }
    }

    /// Lowercase letter for this kind.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }
}

/// Represents a chess piece, or the absence of one.
///
/// Internally, this is a `u8` with the following bit pattern:
///
/// ```text
///     0000 000 0
///      |    |  |
///      |    |  +- Color. `0` for White, `1` for Black.
///      |    +- PieceKind, `1` through `6`.
///      +- Unused.
/// ```
///
/// The color always lives in the lowest bit, so any four-bit piece field can be
/// asked for its color with `piece & 1`. [`Piece::NONE`] is `0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Piece(pub(crate) u8);

impl Piece {
    pub const NONE: Self = Self(0);

    pub const WHITE_PAWN: Self = Self::new(Color::White, PieceKind::Pawn);
    pub const WHITE_KNIGHT: Self = Self::new(Color::White, PieceKind::Knight);
    pub const WHITE_BISHOP: Self = Self::new(Color::White, PieceKind::Bishop);
    pub const WHITE_ROOK: Self = Self::new(Color::White, PieceKind::Rook);
    pub const WHITE_QUEEN: Self = Self::new(Color::White, PieceKind::Queen);
    pub const WHITE_KING: Self = Self::new(Color::White, PieceKind::King);

    pub const BLACK_PAWN: Self = Self::new(Color::Black, PieceKind::Pawn);
    pub const BLACK_KNIGHT: Self = Self::new(Color::Black, PieceKind::Knight);
    pub const BLACK_BISHOP: Self = Self::new(Color::Black, PieceKind::Bishop);
    pub const BLACK_ROOK: Self = Self::new(Color::Black, PieceKind::Rook);
    pub const BLACK_QUEEN: Self = Self::new(Color::Black, PieceKind::Queen);
    pub const BLACK_KING: Self = Self::new(Color::Black, PieceKind::King);

    /// Number of real (non-empty) piece variants.
    pub const COUNT: usize = Color::COUNT * PieceKind::COUNT;

    /// Creates a new [`Piece`] from the given [`Color`] and [`PieceKind`].
    ///
    /// # Example
    /// ```
    /// # use sable::{Piece, Color, PieceKind};
    /// let black_knight = Piece::new(Color::Black, PieceKind::Knight);
    /// assert_eq!(black_knight.bits(), 0b101);
    /// assert_eq!(black_knight.to_string(), "n");
    /// ```
    #[inline(always)]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self(kind.bits() << 1 | color.bits())
    }

    /// Reinterprets a four-bit field (as stored inside a move) as a piece.
    #[inline(always)]
    pub(crate) const fn from_bits_unchecked(bits: u8) -> Self {
        debug_assert!(bits == 0 || (bits >> 1 >= 1 && bits >> 1 <= 6));
        Self(bits)
    }

    #[inline(always)]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn is_some(&self) -> bool {
        self.0 != 0
    }

    /// The color of this piece, read from the lowest bit.
    #[inline(always)]
    pub const fn color(&self) -> Color {
        Color::from_bits(self.0)
    }

    /// Fetches the [`PieceKind`] of this [`Piece`], or `None` for [`Piece::NONE`].
    #[inline(always)]
    pub fn kind(&self) -> Option<PieceKind> {
        PieceKind::from_bits(self.0 >> 1).ok()
    }

    /// Returns `true` if this is a piece of the given kind, of either color.
    #[inline(always)]
    pub const fn is(&self, kind: PieceKind) -> bool {
        self.0 >> 1 == kind.bits()
    }

    #[inline(always)]
    pub const fn is_pawn(&self) -> bool {
        self.is(PieceKind::Pawn)
    }

    #[inline(always)]
    pub const fn is_king(&self) -> bool {
        self.is(PieceKind::King)
    }

    /// Zero-based index in `[0, 11]`, for lists of [`Piece::COUNT`] elements.
    ///
    /// Must not be called on [`Piece::NONE`].
    #[inline(always)]
    pub const fn index(&self) -> usize {
        debug_assert!(self.0 >= 2, "Piece::NONE has no index");
        self.0 as usize - 2
    }

    /// Material value in centipawns, `0` for an empty square.
    #[inline(always)]
    pub fn value(&self) -> i32 {
        self.kind().map(|kind| kind.value()).unwrap_or(0)
    }

    /// Creates a new [`Piece`] from a FEN character, uppercase for White.
    ///
    /// # Example
    /// ```
    /// # use sable::{Piece, Color, PieceKind};
    /// let white_knight = Piece::from_uci('N').unwrap();
    /// assert_eq!(white_knight.color(), Color::White);
    /// assert!(white_knight.is(PieceKind::Knight));
    /// ```
    pub fn from_uci(piece: char) -> Result<Self> {
        let kind = PieceKind::from_uci(piece)?;
        let color = Color::from_case(piece);
        Ok(Self::new(color, kind))
    }

    /// FEN character of this piece, `'.'` if the square is empty.
    #[inline(always)]
    pub fn char(&self) -> char {
        match self.kind() {
            Some(kind) if self.color() == Color::White => kind.char().to_ascii_uppercase(),
            Some(kind) => kind.char(),
            None => '.',
        }
    }

    /// The same piece, changed into `promotion` and keeping its color.
    #[inline(always)]
    pub const fn promoted(self, promotion: PieceKind) -> Self {
        Self::new(self.color(), promotion)
    }

    /// The same kind of piece, of the opposite color.
    ///
    /// # Example
    /// ```
    /// # use sable::Piece;
    /// assert_eq!(Piece::BLACK_KING.inverted(), Piece::WHITE_KING);
    /// ```
    #[inline(always)]
    pub const fn inverted(self) -> Self {
        Self(self.0 ^ 1)
    }
}

impl FromStr for Piece {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_uci(c),
            _ => bail!("Invalid str for Piece: Must be a str of len 1. Got {s:?}"),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "\"{} {}\" ({})", self.color().name(), kind.name(), self.0),
            None => write!(f, "\"none\" (0)"),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.name(), self.index())
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.name(), self.bits())
    }
}

macro_rules! impl_indexing {
    ($type:ty) => {
        impl<T> Index<$type> for [T; <$type>::COUNT] {
            type Output = T;
            #[inline(always)]
            fn index(&self, index: $type) -> &Self::Output {
                &self[index.index()]
            }
        }

        impl<T> IndexMut<$type> for [T; <$type>::COUNT] {
            #[inline(always)]
            fn index_mut(&mut self, index: $type) -> &mut Self::Output {
                &mut self[index.index()]
            }
        }
    };
}

impl_indexing!(Piece);
impl_indexing!(PieceKind);
impl_indexing!(Color);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_lives_in_low_bit() {
        for kind in PieceKind::all() {
            for color in Color::all() {
                let piece = Piece::new(color, kind);
                assert_eq!(piece.bits() & 1, color.bits());
                assert_eq!(piece.color(), color);
                assert_eq!(piece.kind(), Some(kind));
                assert!(piece.bits() < 16, "{piece:?} must fit in four bits");
            }
        }
    }

    #[test]
    fn test_piece_indices_are_dense() {
        let mut seen = [false; Piece::COUNT];
        for kind in PieceKind::all() {
            for color in Color::all() {
                let index = Piece::new(color, kind).index();
                assert!(!seen[index]);
                seen[index] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_piece_none() {
        assert!(Piece::NONE.is_none());
        assert_eq!(Piece::NONE.kind(), None);
        assert_eq!(Piece::NONE.value(), 0);
        assert_eq!(Piece::NONE.char(), '.');
    }

    #[test]
    fn test_piece_from_uci() {
        assert_eq!(Piece::from_uci('q').unwrap(), Piece::BLACK_QUEEN);
        assert_eq!(Piece::from_uci('R').unwrap(), Piece::WHITE_ROOK);
        assert!(Piece::from_uci('x').is_err());
        assert_eq!("K".parse::<Piece>().unwrap(), Piece::WHITE_KING);
        assert!("KK".parse::<Piece>().is_err());
    }
}
