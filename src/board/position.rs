/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

use crate::FEN_STARTPOS;

use super::{
    attacks_for, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, ray_between,
    ray_containing, rook_attacks, Bitboard, Color, File, Move, Piece, PieceKind, Rank, Square,
    ZobristKey,
};

/// Represents the castling rights of a single player.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct CastlingRights {
    /// May castle with the Rook on the H file.
    pub(crate) short: bool,
    /// May castle with the Rook on the A file.
    pub(crate) long: bool,
}

impl CastlingRights {
    /// Number of combinations of both players' rights.
    pub const COUNT: usize = 16;

    #[inline(always)]
    pub const fn new(short: bool, long: bool) -> Self {
        Self { short, long }
    }

    #[inline(always)]
    pub const fn short(&self) -> bool {
        self.short
    }

    #[inline(always)]
    pub const fn long(&self) -> bool {
        self.long
    }

    /// Creates a `usize` in `[0, 3]` for indexing Zobrist keys.
    #[inline(always)]
    pub(crate) const fn index(&self) -> usize {
        (self.short as usize) | (self.long as usize) << 1
    }
}

/// The full state of a game at a single moment: piece placement, side to move, castling rights,
/// en passant square, move counters and the Zobrist key.
///
/// Positions are small `Copy` values and moves are applied copy-make: [`Position::apply_move`]
/// returns a new [`Position`] and leaves `self` untouched, so undoing a move is dropping the copy.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Mailbox of the board. [`Piece::NONE`] on empty squares.
    board: [Piece; Square::COUNT],

    /// All squares occupied by a specific color.
    colors: [Bitboard; Color::COUNT],

    /// All squares occupied by a specific piece kind.
    kinds: [Bitboard; PieceKind::COUNT],

    side_to_move: Color,

    castling_rights: [CastlingRights; Color::COUNT],

    /// Set only right after a pawn jump that lands next to an enemy pawn (or when given by a FEN).
    ep_square: Option<Square>,

    /// Used to enforce the fifty-move rule.
    halfmove: usize,

    /// Number of moves since the beginning of the game.
    fullmove: usize,

    key: ZobristKey,
}

impl Position {
    /// Creates a new, empty [`Position`]: no pieces, White to move, no castling rights.
    ///
    /// # Example
    /// ```
    /// # use sable::Position;
    /// let state = Position::new();
    /// assert_eq!(state.to_fen(), "8/8/8/8/8/8/8/8 w - - 0 1");
    /// ```
    pub fn new() -> Self {
        let mut pos = Self {
            board: [Piece::NONE; Square::COUNT],
            colors: [Bitboard::EMPTY_BOARD; Color::COUNT],
            kinds: [Bitboard::EMPTY_BOARD; PieceKind::COUNT],
            side_to_move: Color::White,
            castling_rights: [CastlingRights::default(); Color::COUNT],
            ep_square: None,
            halfmove: 0,
            fullmove: 1,
            key: ZobristKey::default(),
        };
        pos.key = ZobristKey::new(&pos);
        pos
    }

    /// Creates a new [`Position`] from the provided FEN string.
    ///
    /// Missing trailing fields default to `w - - 0 1`.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut pos = Self::new();
        let mut split = fen.split_whitespace();

        let placements = split
            .next()
            .ok_or(anyhow!("FEN string must have piece placements."))?;

        if placements.matches('/').count() != 7 {
            bail!("FEN must have piece placements for all 8 ranks. Got {placements:?}");
        }

        // Reversed, so that White's pieces are placed at the "bottom" of the board
        for (rank, row) in placements.split('/').rev().enumerate() {
            let mut file = 0;

            for piece_char in row.chars() {
                if let Some(empty) = piece_char.to_digit(10) {
                    file += empty as usize;
                } else {
                    let piece = Piece::from_uci(piece_char).map_err(|_| {
                        anyhow!("FEN placements must contain piece chars or digits. Got {piece_char:?}")
                    })?;

                    if file >= File::COUNT {
                        bail!("FEN rank {} has more than 8 squares: {row:?}", rank + 1);
                    }

                    pos.place(piece, Square::from_index_unchecked(rank * 8 + file));
                    file += 1;
                }
            }

            if file != File::COUNT {
                bail!("FEN rank {} must describe exactly 8 squares. Got {row:?}", rank + 1);
            }
        }

        let active_color = split.next().unwrap_or("w");
        let mut chars = active_color.chars();
        pos.side_to_move = match (chars.next(), chars.next()) {
            (Some(c), None) => Color::from_uci(c)?,
            _ => bail!("FEN active color must be 'w' or 'b'. Got {active_color:?}"),
        };

        let castling = split.next().unwrap_or("-");
        if castling != "-" {
            for c in castling.chars() {
                match c {
                    'K' => pos.castling_rights[Color::White].short = true,
                    'Q' => pos.castling_rights[Color::White].long = true,
                    'k' => pos.castling_rights[Color::Black].short = true,
                    'q' => pos.castling_rights[Color::Black].long = true,
                    _ => bail!("FEN castling rights must be a subset of \"KQkq\". Got {castling:?}"),
                }
            }
        }

        let en_passant_target = split.next().unwrap_or("-");
        pos.ep_square = match en_passant_target {
            "-" => None,
            square => Some(Square::from_uci(square)?),
        };

        let halfmove = split.next().unwrap_or("0");
        pos.halfmove = halfmove.parse().or(Err(anyhow!(
            "FEN string must have valid halfmove counter. Got {halfmove:?}"
        )))?;

        let fullmove = split.next().unwrap_or("1");
        pos.fullmove = fullmove.parse().or(Err(anyhow!(
            "FEN string must have valid fullmove counter. Got {fullmove:?}"
        )))?;

        pos.key = ZobristKey::new(&pos);

        Ok(pos)
    }

    /// Generates a FEN string from this [`Position`].
    ///
    /// # Example
    /// ```
    /// # use sable::Position;
    /// let state = Position::default();
    /// assert_eq!(state.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    /// ```
    pub fn to_fen(&self) -> String {
        format!("{self}")
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// If en passant can be performed, returns the square a capturing pawn would land on.
    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline(always)]
    pub const fn castling_rights(&self) -> &[CastlingRights; Color::COUNT] {
        &self.castling_rights
    }

    #[inline(always)]
    pub const fn halfmove(&self) -> usize {
        self.halfmove
    }

    #[inline(always)]
    pub const fn fullmove(&self) -> usize {
        self.fullmove
    }

    /// Zobrist key of this position, kept up to date incrementally.
    #[inline(always)]
    pub const fn key(&self) -> ZobristKey {
        self.key
    }

    /// The piece on `square`, or [`Piece::NONE`].
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Piece {
        self.board[square.index()]
    }

    /// All squares occupied by `color`.
    #[inline(always)]
    pub const fn color(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    /// All squares occupied by pieces of `kind`, of either color.
    #[inline(always)]
    pub const fn kind(&self, kind: PieceKind) -> Bitboard {
        self.kinds[kind.index()]
    }

    #[inline(always)]
    pub const fn piece_parts(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.color(color).and(self.kind(kind))
    }

    #[inline(always)]
    pub const fn occupied(&self) -> Bitboard {
        self.colors[0].or(self.colors[1])
    }

    #[inline(always)]
    pub const fn empty(&self) -> Bitboard {
        self.occupied().not()
    }

    /// Square of `color`'s King, if it has one.
    #[inline(always)]
    pub const fn king_square(&self, color: Color) -> Option<Square> {
        self.piece_parts(color, PieceKind::King).to_square()
    }

    /// Number of `color`'s pieces that are neither pawns nor the King.
    #[inline(always)]
    pub fn non_pawn_pieces(&self, color: Color) -> u32 {
        let pawns_and_king = self.kind(PieceKind::Pawn) | self.kind(PieceKind::King);
        let mut pieces = self.color(color);
        pieces.exclude(pawns_and_king);
        pieces.count()
    }

    /// Every square the piece on `square` may move to, ignoring checks.
    ///
    /// For pawns these are the pushes (single, and double from the starting rank), captures of
    /// enemy pieces and the en passant square. Castles are not included.
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// let position = Position::default();
    /// assert_eq!(position.targets(Square::E2), Bitboard::from_square(Square::E3) | Square::E4);
    /// assert_eq!(position.targets(Square::B1), Bitboard::from_square(Square::A3) | Square::C3);
    /// assert!(position.targets(Square::E4).is_empty());
    /// ```
    pub fn targets(&self, square: Square) -> Bitboard {
        let piece = self.piece_at(square);
        if piece.is_none() {
            return Bitboard::EMPTY_BOARD;
        }

        let color = piece.color();
        let occupied = self.occupied();

        if !piece.is_pawn() {
            let mut targets = attacks_for(piece, square, occupied);
            targets.exclude(self.color(color));
            return targets;
        }

        let attacks = pawn_attacks(square, color);
        let mut targets = attacks & self.color(color.opponent());

        if let Some(ep_square) = self.ep_square {
            if color == self.side_to_move && attacks.contains(ep_square) {
                targets |= ep_square;
            }
        }

        if let Some(one) = square.forward(color).filter(|sq| !occupied.contains(*sq)) {
            targets |= one;

            if square.rank() == Rank::TWO.relative_to(color) {
                if let Some(two) = one.forward(color).filter(|sq| !occupied.contains(*sq)) {
                    targets |= two;
                }
            }
        }

        targets
    }

    /// All pieces of color `by` that attack `square`, with `blockers` standing in for the occupancy.
    pub fn attackers_to(&self, square: Square, by: Color, blockers: Bitboard) -> Bitboard {
        let queens = self.kind(PieceKind::Queen);
        let diagonal = self.kind(PieceKind::Bishop) | queens;
        let orthogonal = self.kind(PieceKind::Rook) | queens;

        let attackers = (pawn_attacks(square, by.opponent()) & self.kind(PieceKind::Pawn))
            | (knight_attacks(square) & self.kind(PieceKind::Knight))
            | (king_attacks(square) & self.kind(PieceKind::King))
            | (bishop_attacks(square, blockers) & diagonal)
            | (rook_attacks(square, blockers) & orthogonal);

        attackers & self.color(by)
    }

    /// Returns `true` if any piece of color `by` attacks `square`.
    #[inline(always)]
    pub fn is_attacked(&self, square: Square, by: Color) -> bool {
        self.attackers_to(square, by, self.occupied()).is_nonempty()
    }

    /// Returns `true` if `color`'s King is attacked. A side without a King is never in check.
    #[inline(always)]
    pub fn is_color_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_attacked(king, color.opponent()))
    }

    /// Returns `true` if the side to move is in check.
    #[inline(always)]
    pub fn is_in_check(&self) -> bool {
        self.is_color_in_check(self.side_to_move)
    }

    /// Pieces of `color` that are the only thing standing between their King and an enemy slider.
    pub fn pinned(&self, color: Color) -> Bitboard {
        let Some(king) = self.king_square(color) else {
            return Bitboard::EMPTY_BOARD;
        };

        let enemy = color.opponent();
        let queens = self.piece_parts(enemy, PieceKind::Queen);
        let snipers = (rook_attacks(king, Bitboard::EMPTY_BOARD)
            & (self.piece_parts(enemy, PieceKind::Rook) | queens))
            | (bishop_attacks(king, Bitboard::EMPTY_BOARD)
                & (self.piece_parts(enemy, PieceKind::Bishop) | queens));

        let occupied = self.occupied();
        let mut pinned = Bitboard::EMPTY_BOARD;
        for sniper in snipers {
            let blockers = ray_between(king, sniper) & occupied;
            if blockers.count() == 1 {
                pinned |= blockers & self.color(color);
            }
        }

        pinned
    }

    /// Whether `color` may castle `(short, long)` right now.
    ///
    /// Requires the right, the King on its home square and out of check, the Rook in its corner,
    /// an empty gap between them, and no attacked square on the King's path.
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    /// assert_eq!(position.can_castle(Color::White), (true, true));
    ///
    /// // A rook on f8 covers f1
    /// let position = Position::from_fen("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1").unwrap();
    /// assert_eq!(position.can_castle(Color::White), (false, true));
    /// ```
    pub fn can_castle(&self, color: Color) -> (bool, bool) {
        let rights = self.castling_rights[color];
        if !rights.short && !rights.long {
            return (false, false);
        }

        let home = Square::E1.relative_to(color);
        let enemy = color.opponent();
        if self.piece_at(home) != Piece::new(color, PieceKind::King) || self.is_attacked(home, enemy)
        {
            return (false, false);
        }

        let rook = Piece::new(color, PieceKind::Rook);
        let occupied = self.occupied();
        let side_is_open = |corner: Square, path: [Square; 2]| {
            self.piece_at(corner) == rook
                && (ray_between(home, corner) & occupied).is_empty()
                && path.iter().all(|square| !self.is_attacked(*square, enemy))
        };

        let short = rights.short
            && side_is_open(
                Square::H1.relative_to(color),
                [Square::F1.relative_to(color), Square::G1.relative_to(color)],
            );
        let long = rights.long
            && side_is_open(
                Square::A1.relative_to(color),
                [Square::D1.relative_to(color), Square::C1.relative_to(color)],
            );

        (short, long)
    }

    /// Copies `self` and returns the [`Position`] after `mv` has been played.
    #[inline(always)]
    pub fn apply_move(&self, mv: Move) -> Self {
        let mut copied = *self;
        copied.make_move(mv);
        copied
    }

    /// Copies `self` and passes the turn to the opponent without moving.
    ///
    /// Positions before a null move can never be repeated by real moves, so the halfmove clock
    /// restarts.
    pub fn null_move(&self) -> Self {
        let mut copied = *self;

        if let Some(ep_square) = copied.ep_square.take() {
            copied.key.toggle_ep_square(ep_square);
        }

        copied.halfmove = 0;
        copied.toggle_side_to_move();

        copied
    }

    /// Applies the move in place. No enforcement of legality.
    pub fn make_move(&mut self, mv: Move) {
        let from = mv.from();
        let to = mv.to();
        let piece = mv.piece();
        let color = piece.color();

        if let Some(ep_square) = self.ep_square.take() {
            self.key.toggle_ep_square(ep_square);
        }

        self.halfmove += 1;
        self.fullmove += self.side_to_move.index();

        self.take(from);

        if mv.is_en_passant() {
            // The victim is right behind the destination, from the mover's point of view
            if let Some(victim) = to.backward(color) {
                self.take(victim);
            }
        } else if mv.is_capture() {
            self.take(to);
        }

        if let Some((rook_from, rook_to)) = mv.castle_rook_squares() {
            let rook = self.take(rook_from);
            self.place(rook, rook_to);
        }

        let landed = if mv.is_promotion() { mv.promoted() } else { piece };
        self.place(landed, to);

        if self.castling_rights[Color::White].index() | self.castling_rights[Color::Black].index()
            != 0
        {
            self.key.toggle_castling(&self.castling_rights);
            self.revoke_castling_rights(from);
            self.revoke_castling_rights(to);
            self.key.toggle_castling(&self.castling_rights);
        }

        if mv.opens_en_passant() {
            self.ep_square = from.forward(color);
            if let Some(ep_square) = self.ep_square {
                self.key.toggle_ep_square(ep_square);
            }
        }

        if piece.is_pawn() || mv.is_capture() {
            self.halfmove = 0;
        }

        self.toggle_side_to_move();
    }

    /// Cheap re-check of a move produced by the generator for this position.
    ///
    /// `pins` are the side to move's pinned pieces (see [`Position::pinned`]). King moves must
    /// land on a square the enemy does not attack (castles re-check their corridor). A pinned
    /// piece must stay on the line through its King and its origin. Anything else is trusted.
    pub fn is_move_valid(&self, mv: Move, pins: Bitboard) -> bool {
        let color = mv.color();
        let piece = mv.piece();

        if piece.is_king() {
            if mv.is_castle() {
                let (short, long) = self.can_castle(color);
                return if mv.is_short_castle() { short } else { long };
            }

            // Remove the King itself, or sliders would "see" through it
            let blockers = self.occupied() ^ mv.from();
            return self
                .attackers_to(mv.to(), color.opponent(), blockers)
                .is_empty();
        }

        if pins.contains(mv.from()) {
            return self
                .king_square(color)
                .is_some_and(|king| ray_containing(king, mv.from()).contains(mv.to()));
        }

        true
    }

    /// Strict check that `mv` could have been generated from this position at all.
    ///
    /// Every field is re-derived from the board: the mover and victim, the piece's attack or push
    /// pattern, en passant availability, promotion rank, and for castles the rights, Rook and
    /// corridor. Checks against the mover's own King are not considered.
    pub fn is_move_generable(&self, mv: Move) -> bool {
        if mv.is_none() {
            return false;
        }

        let (from, to) = (mv.from(), mv.to());
        let piece = mv.piece();
        let color = self.side_to_move;

        if piece.is_none() || self.piece_at(from) != piece || piece.color() != color {
            return false;
        }

        if mv.is_castle() {
            if !piece.is_king() || mv.is_capture() || mv.is_promotion() {
                return false;
            }

            let home = Square::E1.relative_to(color);
            let (short, long) = self.can_castle(color);
            return from == home
                && ((to == Square::G1.relative_to(color) && short)
                    || (to == Square::C1.relative_to(color) && long));
        }

        let occupied = self.occupied();

        if mv.is_en_passant() {
            let victim = Piece::new(color.opponent(), PieceKind::Pawn);
            return piece.is_pawn()
                && self.ep_square == Some(to)
                && mv.captured() == victim
                && self.piece_at(to).is_none()
                && pawn_attacks(from, color).contains(to)
                && to
                    .backward(color)
                    .is_some_and(|behind| self.piece_at(behind) == victim);
        }

        let captured = self.piece_at(to);
        if mv.captured() != captured || (captured.is_some() && captured.color() == color) {
            return false;
        }
        if captured.is_king() {
            return false;
        }

        if !piece.is_pawn() {
            return !mv.is_promotion()
                && !mv.is_pawn_jump()
                && attacks_for(piece, from, occupied).contains(to);
        }

        let reachable = if captured.is_some() {
            pawn_attacks(from, color).contains(to)
        } else if mv.is_pawn_jump() {
            let one = from.forward(color);
            from.rank() == Rank::TWO.relative_to(color)
                && one.and_then(|sq| sq.forward(color)) == Some(to)
                && one.is_some_and(|sq| !occupied.contains(sq))
                && mv == Move::pawn_jump(self, from, to)
        } else {
            from.forward(color) == Some(to)
        };

        if !reachable {
            return false;
        }

        if to.rank() == Rank::EIGHT.relative_to(color) {
            let promoted = mv.promoted();
            promoted.color() == color
                && matches!(
                    promoted.kind(),
                    Some(PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight)
                )
        } else {
            !mv.is_promotion()
        }
    }

    #[inline(always)]
    fn toggle_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
        self.key.toggle_side();
    }

    /// Places `piece` on the (empty) `square`, updating the key.
    fn place(&mut self, piece: Piece, square: Square) {
        let Some(kind) = piece.kind() else {
            return;
        };

        self.board[square] = piece;
        self.colors[piece.color()] |= square;
        self.kinds[kind] |= square;
        self.key.toggle_piece(piece, square);
    }

    /// Removes and returns whatever stands on `square`, updating the key.
    fn take(&mut self, square: Square) -> Piece {
        let piece = self.board[square];
        let Some(kind) = piece.kind() else {
            return Piece::NONE;
        };

        self.board[square] = Piece::NONE;
        self.colors[piece.color()].clear(square.index());
        self.kinds[kind].clear(square.index());
        self.key.toggle_piece(piece, square);

        piece
    }

    /// Drops the castling rights tied to `square`, if it is a King or Rook home square.
    fn revoke_castling_rights(&mut self, square: Square) {
        for color in Color::all() {
            let rights = &mut self.castling_rights[color];
            if square == Square::E1.relative_to(color) {
                *rights = CastlingRights::default();
            } else if square == Square::H1.relative_to(color) {
                rights.short = false;
            } else if square == Square::A1.relative_to(color) {
                rights.long = false;
            }
        }
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Default for Position {
    #[inline(always)]
    fn default() -> Self {
        // Safety: The FEN for startpos is always valid
        unsafe { Self::from_fen(FEN_STARTPOS).unwrap_unchecked() }
    }
}

impl fmt::Display for Position {
    /// Display this position's FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            let mut empty = 0;
            for file in File::iter() {
                let piece = self.piece_at(Square::new(file, rank));
                if piece.is_none() {
                    empty += 1;
                    continue;
                }
                if empty > 0 {
                    write!(f, "{empty}")?;
                    empty = 0;
                }
                write!(f, "{piece}")?;
            }
            if empty > 0 {
                write!(f, "{empty}")?;
            }
            if rank != Rank::ONE {
                write!(f, "/")?;
            }
        }

        let mut castling = String::with_capacity(4);
        let [white, black] = self.castling_rights;
        for (allowed, c) in [
            (white.short, 'K'),
            (white.long, 'Q'),
            (black.short, 'k'),
            (black.long, 'q'),
        ] {
            if allowed {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant_target = self
            .ep_square
            .map(|square| square.to_string())
            .unwrap_or(String::from("-"));

        write!(
            f,
            " {} {castling} {en_passant_target} {} {}",
            self.side_to_move, self.halfmove, self.fullmove
        )
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;
            for file in File::iter() {
                write!(f, " {}", self.piece_at(Square::new(file, rank)).char())?;
            }

            if rank == Rank::SEVEN {
                write!(f, "           FEN: {self}")?;
            } else if rank == Rank::SIX {
                write!(f, "          Side: {}", self.side_to_move.name())?;
            } else if rank == Rank::FIVE {
                write!(f, "           Key: {}", self.key)?;
            }
            writeln!(f)?;
        }
        write!(f, " +----------------\n   a b c d e f g h")
    }
}
