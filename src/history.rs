/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Deref};

use crate::{Color, File, Move, Piece, PieceKind, Rank, Square};

/// Stores bonuses for moving a piece to a square.
///
/// Every quiet move that causes a cutoff earns `depth * depth` for its `[piece][to]` entry, so
/// moves that keep refuting deep subtrees rise to the top of the ordering.
#[derive(Debug, Clone)]
pub struct HistoryTable([[i32; Square::COUNT]; Piece::COUNT]);

impl HistoryTable {
    /// Clear the history table, removing all scores.
    #[inline(always)]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Rewards `mv` for a cutoff with `depth` plies remaining.
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// let position = Position::default();
    /// let mv = Move::new(&position, Square::G1, Square::F3);
    ///
    /// let mut history = HistoryTable::default();
    /// history.update(mv, 3);
    /// history.update(mv, 2);
    /// assert_eq!(history.get(mv), 13);
    /// ```
    #[inline(always)]
    pub fn update(&mut self, mv: Move, depth: usize) {
        let piece = mv.piece();
        if piece.is_none() {
            return;
        }

        let bonus = (depth * depth) as i32;
        let entry = &mut self.0[piece][mv.to()];
        *entry = entry.saturating_add(bonus);
    }

    /// The accumulated bonus of `mv`.
    #[inline(always)]
    pub fn get(&self, mv: Move) -> i32 {
        let piece = mv.piece();
        if piece.is_none() {
            0
        } else {
            self.0[piece][mv.to()]
        }
    }
}

impl Default for HistoryTable {
    #[inline(always)]
    fn default() -> Self {
        Self([[0; Square::COUNT]; Piece::COUNT])
    }
}

impl Deref for HistoryTable {
    type Target = [[i32; Square::COUNT]; Piece::COUNT];
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for HistoryTable {
    /// Prints one board per piece kind, White's table next to Black's, skipping empty tables.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SPACER: &str = "    ";

        for kind in PieceKind::all() {
            let pieces = [Color::White, Color::Black].map(|color| Piece::new(color, kind));
            if pieces.iter().all(|piece| self[*piece].iter().all(|score| *score == 0)) {
                continue;
            }

            writeln!(
                f,
                "{:<45}{SPACER}{}",
                format!("{} {}", Color::White.name(), kind.name()),
                format!("{} {}", Color::Black.name(), kind.name())
            )?;

            for rank in Rank::iter().rev() {
                for (i, piece) in pieces.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{SPACER}")?;
                    }
                    write!(f, "{rank} |")?;
                    for file in File::iter() {
                        let score = self[*piece][Square::new(file, rank)];
                        if score == 0 {
                            write!(f, "    .")?;
                        } else {
                            write!(f, "{score:>5}")?;
                        }
                    }
                }
                writeln!(f)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    #[test]
    fn test_entries_are_per_piece_and_square() {
        let position: Position = FEN_KIWIPETE.parse().unwrap();
        let knight = Move::new(&position, Square::E5, Square::F7);
        let queen = Move::new(&position, Square::F3, Square::F7);

        let mut history = HistoryTable::default();
        history.update(knight, 4);

        assert_eq!(history.get(knight), 16);
        assert_eq!(history.get(queen), 0);
        assert_eq!(history[Piece::WHITE_KNIGHT][Square::F7], 16);
        assert_eq!(history.get(Move::NONE), 0);

        history.clear();
        assert_eq!(history.get(knight), 0);
    }

    #[test]
    fn test_display_skips_empty_tables() {
        let position = Position::default();
        let mut history = HistoryTable::default();
        history.update(Move::new(&position, Square::B1, Square::C3), 2);

        let shown = history.to_string();
        assert!(shown.contains("white knight"));
        assert!(!shown.contains("pawn"));
    }
}
