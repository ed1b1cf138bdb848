/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Color, File, Piece, PieceKind, Rank, Score, Square};

// Tables are written from White's perspective with rank 8 on top, the way they read on a board.
// Values are from the Simplified Evaluation Function: <https://www.chessprogramming.org/Simplified_Evaluation_Function>

#[rustfmt::skip]
const PAWN: Psqt = Psqt::new(PieceKind::Pawn, [
     0,   0,   0,   0,   0,   0,   0,   0,
    50,  50,  50,  50,  50,  50,  50,  50,
    10,  10,  20,  30,  30,  20,  10,  10,
     5,   5,  10,  25,  25,  10,   5,   5,
     0,   0,   0,  20,  20,   0,   0,   0,
     5,  -5, -10,   0,   0, -10,  -5,   5,
     5,  10,  10, -20, -20,  10,  10,   5,
     0,   0,   0,   0,   0,   0,   0,   0,
]);

#[rustfmt::skip]
const KNIGHT: Psqt = Psqt::new(PieceKind::Knight, [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
]);

#[rustfmt::skip]
const BISHOP: Psqt = Psqt::new(PieceKind::Bishop, [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
]);

#[rustfmt::skip]
const ROOK: Psqt = Psqt::new(PieceKind::Rook, [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10,  10,  10,  10,  10,   5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      0,   0,   0,   5,   5,   0,   0,   0,
]);

#[rustfmt::skip]
const QUEEN: Psqt = Psqt::new(PieceKind::Queen, [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   5,   5,   5,   5,   0,  -5,
    -10,   5,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
]);

#[rustfmt::skip]
const KING_MG: Psqt = Psqt::new(PieceKind::King, [
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,   0,   0,   0,   0,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
]);

#[rustfmt::skip]
const KING_EG: Psqt = Psqt::new(PieceKind::King, [
    -50, -40, -30, -20, -20, -30, -40, -50,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -50, -30, -30, -30, -30, -30, -30, -50,
]);

/// A [Piece-Square Table](https://www.chessprogramming.org/Piece-Square_Tables) for use in evaluation.
///
/// Stored with `a1` at index 0 and the piece's material value already added in.
#[derive(Debug)]
pub struct Psqt([i32; Square::COUNT]);

impl Psqt {
    /// Middle-game and end-game values of `piece` standing on `square`.
    ///
    /// Only the King changes its preferences as the game goes on.
    #[inline(always)]
    pub fn evals(piece: Piece, square: Square) -> (Score, Score) {
        let Some(kind) = piece.kind() else {
            return (Score::DRAW, Score::DRAW);
        };

        let (mg, eg) = Self::get_tables_for(kind);
        let square = square.relative_to(piece.color());

        (Score(mg.get(square)), Score(eg.get(square)))
    }

    /// Fetch the Piece-Square Tables (middle-game and end-game) for the provided [`PieceKind`].
    #[inline(always)]
    pub fn get_tables_for(kind: PieceKind) -> (&'static Self, &'static Self) {
        match kind {
            PieceKind::Pawn => (&PAWN, &PAWN),
            PieceKind::Knight => (&KNIGHT, &KNIGHT),
            PieceKind::Bishop => (&BISHOP, &BISHOP),
            PieceKind::Rook => (&ROOK, &ROOK),
            PieceKind::Queen => (&QUEEN, &QUEEN),
            PieceKind::King => (&KING_MG, &KING_EG),
        }
    }

    const fn new(kind: PieceKind, psqt: [i32; Square::COUNT]) -> Self {
        let mut flipped = psqt;

        let mut i = 0;
        while i < psqt.len() {
            // Flip the rank so that `a1` is the first entry
            flipped[i] = psqt[i ^ 56] + kind.value();
            i += 1;
        }

        Self(flipped)
    }

    /// Get the value of this PSQT at the provided square, from White's perspective.
    #[inline(always)]
    pub const fn get(&self, square: Square) -> i32 {
        self.0[square.index()]
    }

    /// Get the value of this PSQT at the provided square, relative to `color`.
    #[inline(always)]
    pub const fn get_relative(&self, square: Square, color: Color) -> i32 {
        self.get(square.relative_to(color))
    }
}

impl fmt::Display for Psqt {
    /// Printing a [`Psqt`] will display it in the same way it is written in the code (White's perspective).
    ///
    /// If the alternate formatter is used (`#`), it will print as if from Black's perspective.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = if f.alternate() {
            Color::Black
        } else {
            Color::White
        };

        for rank in Rank::iter().rev() {
            write!(f, "{rank}| ")?;
            for file in File::iter() {
                let value = self.get_relative(Square::new(file, rank), color);
                write!(f, "{value:4} ")?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "-----")?;
        }
        write!(f, "\n   ")?;
        for file in File::iter() {
            write!(f, "   {file} ")?;
        }

        Ok(())
    }
}
