/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::{anyhow, Result};

use super::{Bitboard, Move, MoveList, Position, Rank, Square};

/// Generates every legal move for the side to move, in board order.
///
/// Candidates come from [`Position::targets`] of every friendly piece; pawns reaching the last
/// rank yield all four promotions, and available castles follow the King's own moves. Each
/// candidate is applied to a copy of the position and dropped if it leaves the mover in check.
///
/// Fails if the side to move has no King.
///
/// # Example
/// ```
/// # use sable::*;
/// let moves = generate_legal_moves(&Position::default()).unwrap();
/// assert_eq!(moves.len(), 20);
/// ```
pub fn generate_legal_moves(position: &Position) -> Result<MoveList> {
    require_king(position)?;

    let color = position.side_to_move();
    let mut moves = MoveList::new();

    for from in position.color(color) {
        let piece = position.piece_at(from);
        let targets = position.targets(from);

        for to in targets {
            if piece.is_pawn() {
                push_pawn_moves(position, from, to, &mut moves);
            } else {
                push_if_legal(position, Move::new(position, from, to), &mut moves);
            }
        }

        if piece.is_king() {
            let (short, long) = position.can_castle(color);
            if short {
                let castle = Move::castle(position, from, Square::G1.relative_to(color));
                push_if_legal(position, castle, &mut moves);
            }
            if long {
                let castle = Move::castle(position, from, Square::C1.relative_to(color));
                push_if_legal(position, castle, &mut moves);
            }
        }
    }

    tracing::trace!(count = moves.len(), color = %color, "generated legal moves");

    Ok(moves)
}

/// Generates the legal captures for the side to move, used by quiescence search.
///
/// Pawns on their seventh rank contribute a Queen promotion for every target, capturing or not.
/// Under-promotions are never generated here. En passant counts as a capture.
///
/// Fails if the side to move has no King.
///
/// # Example
/// ```
/// # use sable::*;
/// let position = Position::from_fen("4k3/1P6/8/8/8/8/3n4/4K3 w - - 0 1").unwrap();
/// let captures = generate_captures(&position).unwrap();
/// // Kxd2 and b8=Q
/// assert_eq!(captures.len(), 2);
/// ```
pub fn generate_captures(position: &Position) -> Result<MoveList> {
    require_king(position)?;

    let color = position.side_to_move();
    let enemies = position.color(color.opponent());

    // Only pawns capture onto the en passant square
    let mut pawn_victims = enemies;
    if let Some(ep_square) = position.ep_square() {
        pawn_victims |= ep_square;
    }

    let seventh = Bitboard::seventh_rank(color);
    let mut moves = MoveList::new();

    for from in position.color(color) {
        let targets = position.targets(from);
        let is_pawn = position.piece_at(from).is_pawn();

        if is_pawn && seventh.contains(from) {
            for to in targets {
                let [queen, ..] = Move::promotions(position, from, to);
                push_if_legal(position, queen, &mut moves);
            }
            continue;
        }

        let victims = if is_pawn { pawn_victims } else { enemies };
        for to in targets & victims {
            push_if_legal(position, Move::new(position, from, to), &mut moves);
        }
    }

    tracing::trace!(count = moves.len(), color = %color, "generated captures");

    Ok(moves)
}

/// Reorders `moves` so the most promising are searched first.
///
/// Each move lands in the first bucket it fits, tested in the order: gives check, promotes,
/// captures, anything else. The result is captures, then promotions, then checks, then the rest.
/// Moves keep their relative order inside a bucket.
pub fn reorder(position: &Position, moves: &mut MoveList) {
    let mut checks = MoveList::new();
    let mut promotions = MoveList::new();
    let mut captures = MoveList::new();
    let mut remaining = MoveList::new();

    for mv in moves.drain(..) {
        if gives_check(position, mv) {
            checks.push(mv);
        } else if mv.is_promotion() {
            promotions.push(mv);
        } else if mv.is_capture() {
            captures.push(mv);
        } else {
            remaining.push(mv);
        }
    }

    moves.extend(captures);
    moves.extend(promotions);
    moves.extend(checks);
    moves.extend(remaining);
}

/// Returns `true` if playing `mv` leaves the opponent in check.
#[inline(always)]
pub fn gives_check(position: &Position, mv: Move) -> bool {
    position.apply_move(mv).is_in_check()
}

/// Counts the leaf nodes of the legal move tree `depth` plies deep.
///
/// # Example
/// ```
/// # use sable::*;
/// let position = Position::default();
/// assert_eq!(perft(&position, 2).unwrap(), 400);
/// ```
pub fn perft(position: &Position, depth: usize) -> Result<u64> {
    if depth == 0 {
        return Ok(1);
    }

    let moves = generate_legal_moves(position)?;

    // Bulk counting; no need to apply every move just to return 1.
    if depth == 1 {
        return Ok(moves.len() as u64);
    }

    moves.into_iter().try_fold(0, |nodes, mv| {
        Ok(nodes + perft(&position.apply_move(mv), depth - 1)?)
    })
}

/// Like [`perft`], but reports the node count below every root move.
pub fn splitperft(position: &Position, depth: usize) -> Result<Vec<(Move, u64)>> {
    let moves = generate_legal_moves(position)?;

    moves
        .into_iter()
        .map(|mv| Ok((mv, perft(&position.apply_move(mv), depth.saturating_sub(1))?)))
        .collect()
}

fn require_king(position: &Position) -> Result<()> {
    let color = position.side_to_move();
    position
        .king_square(color)
        .map(|_| ())
        .ok_or(anyhow!("{} has no King on the board: {position}", color.name()))
}

fn push_pawn_moves(position: &Position, from: Square, to: Square, moves: &mut MoveList) {
    let color = position.side_to_move();

    if to.rank() == Rank::EIGHT.relative_to(color) {
        for promotion in Move::promotions(position, from, to) {
            push_if_legal(position, promotion, moves);
        }
    } else if from.distance_ranks(to) == 2 {
        push_if_legal(position, Move::pawn_jump(position, from, to), moves);
    } else {
        push_if_legal(position, Move::new(position, from, to), moves);
    }
}

#[inline(always)]
fn push_if_legal(position: &Position, mv: Move, moves: &mut MoveList) {
    let mover = mv.color();
    if !position.apply_move(mv).is_color_in_check(mover) {
        moves.push(mv);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::*;

    #[test]
    fn test_requires_king() {
        let position: Position = "8/8/8/8/8/8/4P3/8 w - - 0 1".parse().unwrap();
        assert!(generate_legal_moves(&position).is_err());
        assert!(generate_captures(&position).is_err());
        assert!(perft(&position, 1).is_err());
    }

    #[test]
    fn test_promotions_yield_four_moves() {
        let position: Position = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let moves = generate_legal_moves(&position).unwrap();
        let promotions = moves.iter().filter(|mv| mv.is_promotion()).count();
        assert_eq!(promotions, 4);
        // 4 promotions and 5 King moves
        assert_eq!(moves.len(), 9);
    }

    #[test]
    fn test_castles_are_appended() {
        let position: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let moves = generate_legal_moves(&position).unwrap();
        assert_eq!(moves.iter().filter(|mv| mv.is_castle()).count(), 2);
        assert_eq!(moves.len(), 26);
    }

    #[test]
    fn test_pinned_piece_cannot_leave_line() {
        let position: Position = "4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1".parse().unwrap();
        let moves = generate_legal_moves(&position).unwrap();
        assert!(moves.iter().all(|mv| mv.piece() != Piece::WHITE_KNIGHT));
    }

    #[test]
    fn test_captures_only() {
        let position: Position = FEN_KIWIPETE.parse().unwrap();
        let captures = generate_captures(&position).unwrap();
        assert_eq!(captures.len(), 8);
        assert!(captures.iter().all(|mv| mv.is_capture()));
    }

    #[test]
    fn test_captures_include_queen_pushes_and_en_passant() {
        let position: Position = "4k3/2P5/8/3pP3/8/8/8/4K3 w - d6 0 1".parse().unwrap();
        let captures = generate_captures(&position).unwrap();

        assert_eq!(captures.len(), 2);
        assert!(captures.iter().any(|mv| mv.is_en_passant()));
        let push = captures.iter().find(|mv| mv.is_promotion()).unwrap();
        assert_eq!(push.promoted(), Piece::WHITE_QUEEN);
        assert!(!push.is_capture());
    }

    #[test]
    fn test_en_passant_square_is_not_a_capture_for_pieces() {
        // The Knight attacks the empty d6 square, but only the pawn may take there
        let position: Position = "4k3/8/8/3pP3/4N3/8/8/4K3 w - d6 0 1".parse().unwrap();
        let captures = generate_captures(&position).unwrap();

        assert!(captures.iter().all(|mv| mv.is_capture() || mv.is_promotion()));
        assert_eq!(captures.len(), 1);
        assert!(captures[0].is_en_passant());
        assert_eq!(captures[0].piece(), Piece::WHITE_PAWN);
    }

    #[test]
    fn test_reorder_bucket_order() {
        // Qxa5 is a capture, b8=Q a promotion, Rh8 gives check, Kc1 is quiet
        let position: Position = "5rk1/1P6/8/p7/8/8/3Q4/3K3R w - - 0 1".parse().unwrap();
        let capture = Move::new(&position, Square::D2, Square::A5);
        let [promotion, ..] = Move::promotions(&position, Square::B7, Square::B8);
        let check = Move::new(&position, Square::H1, Square::H8);
        let quiet = Move::new(&position, Square::D1, Square::C1);

        assert!(gives_check(&position, check));
        assert!(!gives_check(&position, quiet));

        let mut moves = MoveList::from_iter([quiet, check, promotion, capture]);
        reorder(&position, &mut moves);
        assert_eq!(moves.as_slice(), &[capture, promotion, check, quiet]);
    }

    #[test]
    fn test_splitperft_sums_to_perft() {
        let position: Position = FEN_KIWIPETE.parse().unwrap();
        let split = splitperft(&position, 2).unwrap();
        assert_eq!(split.len(), 48);
        assert_eq!(split.iter().map(|(_, nodes)| nodes).sum::<u64>(), perft(&position, 2).unwrap());
    }
}
