/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Bitboard, Color, Direction, Piece, PieceKind, Square};

/// Deltas for the movement of the Knight.
const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (1, -2),
    (2, 1),
    (2, -1),
    (-1, 2),
    (-1, -2),
    (-2, 1),
    (-2, -1),
];

/// Deltas for the movement of the King.
const KING_DELTAS: [(i8, i8); 8] = [
    (1, 0),
    (0, -1),
    (-1, 0),
    (0, 1),
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

const KNIGHT_ATTACKS: [Bitboard; Square::COUNT] = generate_leaper_mobility(&KNIGHT_DELTAS);
const KING_ATTACKS: [Bitboard; Square::COUNT] = generate_leaper_mobility(&KING_DELTAS);
const PAWN_ATTACKS: [[Bitboard; Square::COUNT]; Color::COUNT] = [
    generate_pawn_attacks(Color::White),
    generate_pawn_attacks(Color::Black),
];

/// Unblocked rays, indexed by [`Direction`] and then by origin. The origin itself is not included.
const RAYS: [[Bitboard; Square::COUNT]; Direction::COUNT] = {
    let mut rays = [[Bitboard::EMPTY_BOARD; Square::COUNT]; Direction::COUNT];
    let directions = Direction::all();

    let mut d = 0;
    while d < Direction::COUNT {
        let (df, dr) = directions[d].delta();
        let mut i = 0;
        while i < Square::COUNT {
            let mut ray = Bitboard::EMPTY_BOARD;
            let mut square = Square::from_index_unchecked(i);

            while let Some(shifted) = square.offset(df, dr) {
                ray = ray.or(shifted.bitboard());
                square = shifted;
            }

            rays[d][i] = ray;
            i += 1;
        }
        d += 1;
    }

    rays
};

/// A table indexed by two squares that returns the squares strictly between them, if they share a line.
const RAY_BETWEEN: [[Bitboard; Square::COUNT]; Square::COUNT] = {
    let mut between = [[Bitboard::EMPTY_BOARD; Square::COUNT]; Square::COUNT];
    let directions = Direction::all();

    let mut i = 0;
    while i < Square::COUNT {
        let from = Square::from_index_unchecked(i);
        let mut d = 0;
        while d < Direction::COUNT {
            let (df, dr) = directions[d].delta();
            let mut ray = Bitboard::EMPTY_BOARD;
            let mut to = from;

            while let Some(shifted) = to.offset(df, dr) {
                between[i][shifted.index()] = ray;
                ray = ray.or(shifted.bitboard());
                to = shifted;
            }

            d += 1;
        }
        i += 1;
    }

    between
};

/// A table indexed by two squares that returns the full line (edge to edge) through both, if they share one.
const RAY_CONTAINING: [[Bitboard; Square::COUNT]; Square::COUNT] = {
    let mut lines = [[Bitboard::EMPTY_BOARD; Square::COUNT]; Square::COUNT];
    let directions = Direction::all();

    let mut i = 0;
    while i < Square::COUNT {
        let from = Square::from_index_unchecked(i);
        let mut d = 0;
        while d < Direction::COUNT {
            // Opposite directions are four apart in `Direction::all()`
            let line = RAYS[d][i]
                .or(RAYS[(d + 4) % Direction::COUNT][i])
                .or(from.bitboard());

            let (df, dr) = directions[d].delta();
            let mut to = from;
            while let Some(shifted) = to.offset(df, dr) {
                lines[i][shifted.index()] = line;
                to = shifted;
            }

            d += 1;
        }
        i += 1;
    }

    lines
};

/// Generates the moves from every location for the "Leaper" pieces (King and Knight).
const fn generate_leaper_mobility(deltas: &[(i8, i8)]) -> [Bitboard; Square::COUNT] {
    let mut mobility = [Bitboard::EMPTY_BOARD; Square::COUNT];

    let mut i = 0;
    while i < Square::COUNT {
        let square = Square::from_index_unchecked(i);
        let mut movement = Bitboard::EMPTY_BOARD;

        let mut j = 0;
        while j < deltas.len() {
            let (df, dr) = deltas[j];
            if let Some(shifted) = square.offset(df, dr) {
                movement = movement.or(shifted.bitboard());
            }
            j += 1;
        }

        mobility[i] = movement;
        i += 1;
    }

    mobility
}

/// Pawns capture diagonally forward by one.
const fn generate_pawn_attacks(color: Color) -> [Bitboard; Square::COUNT] {
    let mut boards = [Bitboard::EMPTY_BOARD; Square::COUNT];
    let forward = color.negation_multiplier();

    let mut i = 0;
    while i < Square::COUNT {
        let square = Square::from_index_unchecked(i);
        let mut attacks = Bitboard::EMPTY_BOARD;

        if let Some(east) = square.offset(1, forward) {
            attacks = attacks.or(east.bitboard());
        }
        if let Some(west) = square.offset(-1, forward) {
            attacks = attacks.or(west.bitboard());
        }

        boards[i] = attacks;
        i += 1;
    }

    boards
}

/// Squares strictly between `from` and `to`, empty if they do not share a rank, file, or diagonal.
///
/// # Example
/// ```
/// # use sable::*;
/// assert_eq!(ray_between(Square::A1, Square::A4), Bitboard::from_square(Square::A2) | Square::A3);
/// assert_eq!(ray_between(Square::A1, Square::B3), Bitboard::EMPTY_BOARD);
/// ```
#[inline(always)]
pub const fn ray_between(from: Square, to: Square) -> Bitboard {
    RAY_BETWEEN[from.index()][to.index()]
}

/// The whole line through `from` and `to`, empty if they do not share a rank, file, or diagonal.
#[inline(always)]
pub const fn ray_containing(from: Square, to: Square) -> Bitboard {
    RAY_CONTAINING[from.index()][to.index()]
}

/// The unblocked ray leaving `square` in `direction`.
#[inline(always)]
pub const fn ray(square: Square, direction: Direction) -> Bitboard {
    RAYS[direction.index()][square.index()]
}

/// Squares reached by sliding from `square` in `direction`, up to and including the first blocker.
#[inline(always)]
pub const fn ray_attacks(square: Square, direction: Direction, blockers: Bitboard) -> Bitboard {
    let ray = ray(square, direction);
    match blockers.first_set_from(square.index(), direction) {
        -1 => ray,
        blocker => {
            let beyond = RAYS[direction.index()][blocker as usize];
            ray.xor(beyond)
        }
    }
}

/// Slides along all four rook directions.
#[inline(always)]
pub const fn rook_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    ray_attacks(square, Direction::North, blockers)
        .or(ray_attacks(square, Direction::East, blockers))
        .or(ray_attacks(square, Direction::South, blockers))
        .or(ray_attacks(square, Direction::West, blockers))
}

/// Slides along all four bishop directions.
#[inline(always)]
pub const fn bishop_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    ray_attacks(square, Direction::NorthEast, blockers)
        .or(ray_attacks(square, Direction::SouthEast, blockers))
        .or(ray_attacks(square, Direction::SouthWest, blockers))
        .or(ray_attacks(square, Direction::NorthWest, blockers))
}

#[inline(always)]
pub const fn queen_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    rook_attacks(square, blockers).or(bishop_attacks(square, blockers))
}

#[inline(always)]
pub const fn knight_attacks(square: Square) -> Bitboard {
    KNIGHT_ATTACKS[square.index()]
}

#[inline(always)]
pub const fn king_attacks(square: Square) -> Bitboard {
    KING_ATTACKS[square.index()]
}

/// Squares a `color` pawn on `square` attacks. Pushes are not included.
#[inline(always)]
pub const fn pawn_attacks(square: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][square.index()]
}

/// Every square `piece` on `square` attacks, given `blockers`.
///
/// For pawns, only the diagonal captures are returned; this is the map a king must stay out of.
#[inline(always)]
pub fn attacks_for(piece: Piece, square: Square, blockers: Bitboard) -> Bitboard {
    match piece.kind() {
        Some(PieceKind::Pawn) => pawn_attacks(square, piece.color()),
        Some(PieceKind::Knight) => knight_attacks(square),
        Some(PieceKind::Bishop) => bishop_attacks(square, blockers),
        Some(PieceKind::Rook) => rook_attacks(square, blockers),
        Some(PieceKind::Queen) => queen_attacks(square, blockers),
        Some(PieceKind::King) => king_attacks(square),
        None => Bitboard::EMPTY_BOARD,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Checks if `moves` and `expected` contain all the same elements, ignoring order
    fn lists_match(moves: Bitboard, expected: &[Square]) {
        assert_eq!(
            moves.count() as usize,
            expected.len(),
            "\nMoves: {:?}\nExpected: {:?}",
            moves.iter().collect::<Vec<_>>(),
            expected
        );

        for mv in moves {
            assert!(expected.contains(&mv), "{mv} not found in {expected:?}");
        }
    }

    #[test]
    fn rook_blockers() {
        let blockers = [Square::B4, Square::D2, Square::D6, Square::F4]
            .into_iter()
            .collect::<Bitboard>();

        let expected = [
            Square::D3,
            Square::D2,
            Square::D5,
            Square::D6,
            Square::C4,
            Square::B4,
            Square::E4,
            Square::F4,
        ];

        lists_match(rook_attacks(Square::D4, blockers), &expected);
    }

    #[test]
    fn bishop_blockers() {
        let blockers = [Square::B2, Square::F6, Square::G1]
            .into_iter()
            .collect::<Bitboard>();

        let expected = [
            Square::C3,
            Square::B2,
            Square::E5,
            Square::F6,
            Square::C5,
            Square::B6,
            Square::A7,
            Square::E3,
            Square::F2,
            Square::G1,
        ];

        lists_match(bishop_attacks(Square::D4, blockers), &expected);
    }

    #[test]
    fn leapers_in_corner() {
        lists_match(knight_attacks(Square::A1), &[Square::B3, Square::C2]);
        lists_match(king_attacks(Square::H8), &[Square::G8, Square::G7, Square::H7]);
        lists_match(pawn_attacks(Square::A2, Color::White), &[Square::B3]);
        lists_match(pawn_attacks(Square::E5, Color::Black), &[Square::D4, Square::F4]);
    }

    #[test]
    fn lines_through_squares() {
        assert_eq!(ray_containing(Square::A3, Square::A5), Bitboard::FILE_A);
        assert_eq!(ray_containing(Square::C3, Square::F6), Bitboard::A1_H8_DIAG);
        assert_eq!(ray_containing(Square::C3, Square::D5), Bitboard::EMPTY_BOARD);
        assert_eq!(ray_between(Square::H1, Square::H2), Bitboard::EMPTY_BOARD);
        assert_eq!(ray_between(Square::H8, Square::E5).count(), 2);
    }
}
