/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use crate::{HistoryTable, Move, MoveList, Position, MAX_NUM_MOVES};

/// Base score of captures and promotions, so they always come before quiets.
const CAPTURE_SCORE: i32 = 1 << 20;

/// Base score of killer moves; above any history bonus, below every capture.
const KILLER_SCORE: i32 = 1 << 18;

/// Lazily sorts a list of moves, yielding the best-scored remaining move on every call.
///
/// Uses selection sort: cheap when a cutoff happens after the first few moves, which is the
/// common case.
pub struct MovePicker {
    moves: MoveList,
    scores: ArrayVec<i32, MAX_NUM_MOVES>,
    current: usize,
}

impl MovePicker {
    /// Scores every move with `score_fn`. Higher scores are yielded first.
    pub fn new(moves: MoveList, score_fn: impl Fn(&Move) -> i32) -> Self {
        let scores = moves.iter().map(score_fn).collect();

        Self {
            moves,
            scores,
            current: 0,
        }
    }

    /// Orders moves for the zero-window search.
    ///
    /// Captures and promotions come first by MVV-LVA (see [`Move::value`]), then the killers of
    /// this ply (most recent first), then every other quiet move by its history bonus. Killers are
    /// only trusted if they could have been generated from `position`.
    pub fn with_heuristics(
        position: &Position,
        moves: MoveList,
        killers: &[Move; 2],
        history: &HistoryTable,
    ) -> Self {
        let pins = position.pinned(position.side_to_move());
        let killers = killers.map(|killer| {
            if position.is_move_generable(killer) && position.is_move_valid(killer, pins) {
                killer
            } else {
                Move::NONE
            }
        });

        Self::new(moves, |mv| {
            if !mv.is_quiet() {
                CAPTURE_SCORE + mv.value()
            } else if *mv == killers[0] {
                KILLER_SCORE + 1
            } else if *mv == killers[1] {
                KILLER_SCORE
            } else {
                history.get(*mv).min(KILLER_SCORE - 1)
            }
        })
    }

    /// Number of moves not yet yielded.
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.moves.len() - self.current
    }
}

impl Iterator for MovePicker {
    type Item = (Move, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.moves.len() {
            return None;
        }

        // Find the index of the next highest score
        let mut best_index = self.current;
        for i in (self.current + 1)..self.moves.len() {
            if self.scores[i] > self.scores[best_index] {
                best_index = i;
            }
        }

        if best_index != self.current {
            self.moves.swap(self.current, best_index);
            self.scores.swap(self.current, best_index);
        }

        let item = (self.moves[self.current], self.scores[self.current]);
        self.current += 1;

        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    #[test]
    fn test_picks_highest_first() {
        let position = Position::default();
        let moves = generate_legal_moves(&position).unwrap();
        let picker = MovePicker::new(moves, |mv| mv.to().index() as i32);

        let scores = picker.map(|(_, score)| score).collect::<Vec<_>>();
        assert_eq!(scores.len(), 20);
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn test_captures_then_killers_then_history() {
        let position: Position = FEN_KIWIPETE.parse().unwrap();
        let moves = generate_legal_moves(&position).unwrap();

        let killer = Move::from_notation(&position, "a2a3");
        let older_killer = Move::from_notation(&position, "g2g3");
        let favourite = Move::from_notation(&position, "e1d1");
        // A killer from some other position must not get a bonus
        let stale = Move::new(&Position::default(), Square::G1, Square::F3);

        let mut history = HistoryTable::default();
        history.update(favourite, 10);

        let mut picker =
            MovePicker::with_heuristics(&position, moves, &[killer, older_killer], &history);

        // Kiwipete has 8 captures, best is Bxa6 (bishop takes bishop)
        let captures = picker.by_ref().take(8).collect::<Vec<_>>();
        assert!(captures.iter().all(|(mv, _)| mv.is_capture()));

        assert_eq!(picker.next().map(|(mv, _)| mv), Some(killer));
        assert_eq!(picker.next().map(|(mv, _)| mv), Some(older_killer));
        assert_eq!(picker.next().map(|(mv, _)| mv), Some(favourite));
        assert_eq!(picker.remaining(), 48 - 11);

        let quiet_killer =
            MovePicker::with_heuristics(&position, MoveList::from_iter([killer]), &[stale, killer], &history)
                .next()
                .map(|(_, score)| score);
        assert_eq!(quiet_killer, Some(KILLER_SCORE));
    }

    #[test]
    fn test_killer_breaking_a_pin_gets_no_bonus() {
        // The Knight on e2 is pinned to its King by the Rook on e7
        let position: Position = "4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1".parse().unwrap();
        let pinned_jump = Move::new(&position, Square::E2, Square::C3);
        assert!(position.is_move_generable(pinned_jump));

        let score = MovePicker::with_heuristics(
            &position,
            MoveList::from_iter([pinned_jump]),
            &[pinned_jump, Move::NONE],
            &HistoryTable::default(),
        )
        .next()
        .map(|(_, score)| score);
        assert_eq!(score, Some(0));
    }
}
