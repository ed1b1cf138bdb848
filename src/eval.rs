/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Color, File, PieceKind, Position, Psqt, Rank, Score, Square};

/// Initial material value of all pieces in a standard setup, Kings excluded.
const INITIAL_MATERIAL_VALUE: i32 = PieceKind::Pawn.value() * 16
    + PieceKind::Knight.value() * 4
    + PieceKind::Bishop.value() * 4
    + PieceKind::Rook.value() * 4
    + PieceKind::Queen.value() * 2;

/// Encapsulates the logic of scoring a chess position.
///
/// Positions are evaluated from the side-to-move's perspective: if it is Black's turn, a "good"
/// evaluation for Black is a positive number. Swapping colors and mirroring the board negates
/// nothing; the side to move sees the same score.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    position: &'a Position,

    /// Percentage of game completion, in the range `[0, 100]`.
    ///
    /// Higher number means fewer pieces are on the board
    pub(crate) endgame_weight: i32,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`], computing any important metadata.
    #[inline(always)]
    pub fn new(position: &'a Position) -> Self {
        Self {
            position,
            endgame_weight: endgame_weight(position),
        }
    }

    /// Evaluate this position from the side-to-move's perspective.
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// assert_eq!(Evaluator::new(&Position::default()).eval(), Score::DRAW);
    ///
    /// let up_a_queen: Position = "3qk3/8/8/8/8/8/8/4K3 b - - 0 1".parse().unwrap();
    /// assert!(Evaluator::new(&up_a_queen).eval() > Score(800));
    /// ```
    #[inline(always)]
    pub fn eval(&self) -> Score {
        self.eval_for(self.position.side_to_move())
    }

    /// Evaluate this position from `color`'s perspective.
    pub fn eval_for(&self, color: Color) -> Score {
        let mut mg = Score::DRAW;
        let mut eg = Score::DRAW;

        for square in self.position.occupied() {
            let piece = self.position.piece_at(square);
            let (mg_psqt_score, eg_psqt_score) = Psqt::evals(piece, square);

            if color == piece.color() {
                mg += mg_psqt_score;
                eg += eg_psqt_score;
            } else {
                mg -= mg_psqt_score;
                eg -= eg_psqt_score;
            }
        }

        mg.lerp(eg, self.endgame_weight)
    }

    /// The tapered value of the piece on `square` from White's point of view, if there is one.
    ///
    /// Only used when printing the evaluator
    fn value_at(&self, square: Square) -> Option<Score> {
        let piece = self.position.piece_at(square);
        piece.is_some().then(|| {
            let (mg, eg) = Psqt::evals(piece, square);
            mg.lerp(eg, self.endgame_weight) * piece.color().negation_multiplier() as i32
        })
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = self.position.side_to_move();

        write!(f, "  +")?;
        for _ in File::iter() {
            write!(f, "-----+")?;
        }
        writeln!(f)?;

        for rank in Rank::iter().rev() {
            write!(f, "{rank} |")?;
            for file in File::iter() {
                let piece = self.position.piece_at(Square::new(file, rank));
                let piece_char = if piece.is_some() { piece.char() } else { ' ' };
                write!(f, "  {piece_char}  |")?;
            }
            writeln!(f)?;

            write!(f, "  |")?;
            for file in File::iter() {
                let score = match self.value_at(Square::new(file, rank)) {
                    Some(val) if val > Score::DRAW => format!("+{}", val.normalize()),
                    Some(val) => format!("{}", val.normalize()),
                    None => String::new(),
                };
                write!(f, "{score:^5}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in File::iter() {
                write!(f, "-----+")?;
            }
            writeln!(f)?;
        }
        for file in File::iter() {
            write!(f, "     {file}")?;
        }

        let score = self.eval_for(color);
        let winning_side = if score > Score::DRAW {
            color.name()
        } else if score < Score::DRAW {
            color.opponent().name()
        } else {
            "N/A"
        };

        writeln!(f, "\n\nEndgame: {}%", self.endgame_weight)?;
        writeln!(f, "Winning side: {winning_side}")?;
        write!(f, "Score: {score}")
    }
}

/// Counts the material value of all pieces on the board, Kings excluded.
fn material_remaining(position: &Position) -> i32 {
    PieceKind::all().into_iter().fold(0, |score, kind| {
        score + position.kind(kind).count() as i32 * kind.value()
    })
}

/// How far the game has progressed, in the range `[0, 100]`.
///
/// Lower numbers are closer to the beginning of the game. Extra material from promotions clamps
/// to the opening.
fn endgame_weight(position: &Position) -> i32 {
    let remaining = INITIAL_MATERIAL_VALUE - material_remaining(position);
    (remaining * 100 / INITIAL_MATERIAL_VALUE).clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    /// Swaps colors and flips ranks, keeping the side to move's situation identical.
    fn mirror(fen: &str) -> Position {
        let mut parts = fen.split_whitespace();
        let placements = parts.next().unwrap();
        let flipped = placements
            .split('/')
            .rev()
            .map(|rank| {
                rank.chars()
                    .map(|c| if c.is_ascii_uppercase() { c.to_ascii_lowercase() } else { c.to_ascii_uppercase() })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("/");
        let stm = if parts.next() == Some("w") { "b" } else { "w" };
        format!("{flipped} {stm} - - 0 1").parse().unwrap()
    }

    #[test]
    fn test_startpos_is_balanced() {
        let position = Position::default();
        assert_eq!(Evaluator::new(&position).eval(), Score::DRAW);
        assert_eq!(Evaluator::new(&position).endgame_weight, 0);
    }

    #[test]
    fn test_mirrored_positions_score_the_same() {
        for fen in [
            FEN_KIWIPETE,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
        ] {
            let position: Position = fen.parse().unwrap();
            let mirrored = mirror(fen);
            assert_eq!(
                Evaluator::new(&position).eval(),
                Evaluator::new(&mirrored).eval(),
                "{fen} vs {mirrored}"
            );
            assert_eq!(
                Evaluator::new(&position).eval_for(Color::White),
                -Evaluator::new(&position).eval_for(Color::Black)
            );
        }
    }

    #[test]
    fn test_endgame_weight() {
        let kings_only: Position = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(Evaluator::new(&kings_only).endgame_weight, 100);

        // Fifteen queens are more than the starting material
        let promoted: Position = "QQQQkQQQ/QQQQQQQQ/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(Evaluator::new(&promoted).endgame_weight, 0);
    }
}
