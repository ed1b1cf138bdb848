/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::{CastlingRights, Color, File, Piece, Position, Square, XoShiRo};

/// Random keys for every feature of a position, drawn at compile time.
///
/// The draw order is fixed, so keys are identical between builds (and therefore between an
/// opening book and the engine reading it).
const KEYS: FeatureKeys = FeatureKeys::draw();

struct FeatureKeys {
    pieces: [[u64; Square::COUNT]; Piece::COUNT],

    /// Short and long castle right of each color.
    castling: [[u64; 2]; Color::COUNT],

    /// En passant is keyed by file; the rank follows from the side to move.
    ep_files: [u64; File::COUNT],

    black_to_move: u64,
}

impl FeatureKeys {
    const fn draw() -> Self {
        let mut keys = Self {
            pieces: [[0; Square::COUNT]; Piece::COUNT],
            castling: [[0; 2]; Color::COUNT],
            ep_files: [0; File::COUNT],
            black_to_move: 0,
        };
        let mut prng = XoShiRo::new();

        let mut piece = 0;
        while piece < Piece::COUNT {
            let mut square = 0;
            while square < Square::COUNT {
                (keys.pieces[piece][square], prng) = prng.get_next_const();
                square += 1;
            }
            piece += 1;
        }

        let mut color = 0;
        while color < Color::COUNT {
            (keys.castling[color][0], prng) = prng.get_next_const();
            (keys.castling[color][1], prng) = prng.get_next_const();
            color += 1;
        }

        let mut file = 0;
        while file < File::COUNT {
            (keys.ep_files[file], prng) = prng.get_next_const();
            file += 1;
        }

        (keys.black_to_move, _) = prng.get_next_const();

        keys
    }
}

/// Identity of a [`Position`], generated from a Zobrist hash.
///
/// Two positions with the same pieces, side to move, castling rights and en passant square have
/// the same key, regardless of the moves that led to them. Every `toggle_*` method is its own
/// inverse.
#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct ZobristKey(pub(crate) u64);

impl ZobristKey {
    /// Computes the key of `position` from scratch.
    ///
    /// [`Position`] keeps its key up to date as moves are applied; this is mostly useful to check that
    /// incremental updates are correct.
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// let pos = Position::default();
    /// assert_eq!(ZobristKey::new(&pos), pos.key());
    /// assert_ne!(pos.key().inner(), 0);
    /// ```
    pub fn new(position: &Position) -> Self {
        let mut key = Self::default();

        for square in position.occupied() {
            key.toggle_piece(position.piece_at(square), square);
        }

        if let Some(square) = position.ep_square() {
            key.toggle_ep_square(square);
        }
        key.toggle_castling(position.castling_rights());

        if position.side_to_move() == Color::Black {
            key.toggle_side();
        }

        key
    }

    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    /// Adds or removes `piece` standing on `square`.
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// let mut black_pawn_d7 = ZobristKey::default();
    /// black_pawn_d7.toggle_piece(Piece::BLACK_PAWN, Square::D7);
    ///
    /// let mut white_pawn_d7 = ZobristKey::default();
    /// white_pawn_d7.toggle_piece(Piece::WHITE_PAWN, Square::D7);
    /// assert_ne!(white_pawn_d7, black_pawn_d7);
    ///
    /// white_pawn_d7.toggle_piece(Piece::WHITE_PAWN, Square::D7);
    /// assert_eq!(white_pawn_d7, ZobristKey::default());
    /// ```
    #[inline(always)]
    pub fn toggle_piece(&mut self, piece: Piece, square: Square) {
        if piece.is_some() {
            self.0 ^= KEYS.pieces[piece][square];
        }
    }

    #[inline(always)]
    pub fn toggle_ep_square(&mut self, ep_square: Square) {
        self.0 ^= KEYS.ep_files[ep_square.file().index()];
    }

    /// Adds or removes every right set in `castling_rights`.
    #[inline(always)]
    pub fn toggle_castling(&mut self, castling_rights: &[CastlingRights; Color::COUNT]) {
        for color in [Color::White, Color::Black] {
            let rights = castling_rights[color];
            if rights.short() {
                self.0 ^= KEYS.castling[color.index()][0];
            }
            if rights.long() {
                self.0 ^= KEYS.castling[color.index()][1];
            }
        }
    }

    /// Flips the side to move. White to move contributes nothing.
    #[inline(always)]
    pub fn toggle_side(&mut self) {
        self.0 ^= KEYS.black_to_move;
    }
}

impl fmt::Display for ZobristKey {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    #[test]
    fn test_castling_rights_are_independent() {
        let mut both = ZobristKey::default();
        both.toggle_castling(&[CastlingRights::new(true, true), CastlingRights::new(false, false)]);

        let mut short = ZobristKey::default();
        short.toggle_castling(&[CastlingRights::new(true, false), CastlingRights::new(false, false)]);
        let mut long = ZobristKey::default();
        long.toggle_castling(&[CastlingRights::new(false, true), CastlingRights::new(false, false)]);

        assert_eq!(both.inner(), short.inner() ^ long.inner());
        assert_ne!(short, long);
    }

    #[test]
    fn test_side_to_move_changes_key() {
        let white: Position = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let black: Position = "4k3/8/8/8/8/8/8/4K3 b - - 0 1".parse().unwrap();
        assert_ne!(white.key(), black.key());

        let mut key = white.key();
        key.toggle_side();
        assert_eq!(key, black.key());
    }
}
