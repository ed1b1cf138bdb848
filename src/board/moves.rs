/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::{Color, File, Piece, PieceKind, Position, Rank, Square};

/// Upper bound on the number of moves stored for a single position.
///
/// The most moves ever found in a legal position is 218, see <https://www.chessprogramming.org/Chess_Position#cite_note-4>
pub const MAX_NUM_MOVES: usize = 256;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_NUM_MOVES`] moves.
pub type MoveList = arrayvec::ArrayVec<Move, MAX_NUM_MOVES>;

/// Piece values used to rank captures. The King is worth nothing as an attacker, so it is tried first.
const VICTIM_ATTACKER_VALUES: [i32; PieceKind::COUNT] = [100, 320, 330, 500, 900, 0];

/// [MVV-LVA](https://www.chessprogramming.org/MVV-LVA) values, indexed by `[victim][attacker]`.
///
/// The following table is produced:
/// ```text
///                     ATTACKER
/// V       P     N     B     R     Q     K
/// I    +---------------------------------+
/// C   P| 900   680   670   500   100   1000
/// T   N| 3100  2880  2870  2700  2300  3200
/// I   B| 3200  2980  2970  2800  2400  3300
/// M   R| 4900  4680  4670  4500  4100  5000
///     Q| 8900  8680  8670  8500  8100  9000
///     K| 0     0     0     0     0     0
/// ```
pub const VICTIM_ATTACKER: [[i32; PieceKind::COUNT]; PieceKind::COUNT] = {
    let mut matrix = [[0; PieceKind::COUNT]; PieceKind::COUNT];

    let mut victim = 0;
    // The King can never be captured, so its row stays empty
    while victim < PieceKind::COUNT - 1 {
        let mut attacker = 0;
        while attacker < PieceKind::COUNT {
            matrix[victim][attacker] =
                10 * VICTIM_ATTACKER_VALUES[victim] - VICTIM_ATTACKER_VALUES[attacker];
            attacker += 1;
        }
        victim += 1;
    }

    matrix
};

/// Represents a single ply, along with everything needed to apply it without consulting the board.
///
/// Internally encoded in a `u32` using the following bit pattern:
/// ```text
///     0000 0000 0000 0000 000000 000000
///       |    |    |    |     |      |
///       |    |    |    |     |      +- Source square.
///       |    |    |    |     +- Destination square.
///       |    |    |    +- Moving piece.
///       |    |    +- Captured piece, or 0.
///       |    +- Promoted piece, or 0.
///       +- Flags: castle, en passant capture, pawn jump, pawn jump that allows en passant.
/// ```
///
/// Pieces are stored with their color in the lowest bit (see [`Piece`]), so the color of the mover is
/// `(self >> 12) & 1`.
///
/// A castle never carries a captured or promoted piece, and its destination is the King's landing
/// square. An en passant capture carries the opposing pawn as its captured piece, even though
/// that pawn does not stand on the destination square.
///
/// The all-zero value is [`Move::NONE`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Move(u32);

impl Move {
    /// The "no move" sentinel.
    pub const NONE: Self = Self(0);

    const SRC_MASK: u32 = 0x3F;
    const DST_BITS: u32 = 6;
    const PIECE_BITS: u32 = 12;
    const CAPTURE_BITS: u32 = 16;
    const PROMO_BITS: u32 = 20;
    const NIBBLE: u32 = 0xF;

    pub(crate) const FLAG_CASTLE: u32 = 1 << 24;
    pub(crate) const FLAG_EN_PASSANT: u32 = 1 << 25;
    pub(crate) const FLAG_PAWN_JUMP: u32 = 1 << 26;
    pub(crate) const FLAG_OPENS_EN_PASSANT: u32 = 1 << 27;

    /// Packs the raw fields of a move.
    #[inline(always)]
    pub(crate) const fn from_parts(
        from: Square,
        to: Square,
        piece: Piece,
        captured: Piece,
        promoted: Piece,
        flags: u32,
    ) -> Self {
        Self(
            from.inner() as u32
                | (to.inner() as u32) << Self::DST_BITS
                | (piece.bits() as u32) << Self::PIECE_BITS
                | (captured.bits() as u32) << Self::CAPTURE_BITS
                | (promoted.bits() as u32) << Self::PROMO_BITS
                | flags,
        )
    }

    /// A plain move of the piece on `from` to `to`.
    ///
    /// The captured piece is whatever stands on `to`, except when a pawn moves onto the en passant
    /// square: then the captured piece is the opposing pawn and the move is flagged as en passant.
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// let position = Position::default();
    /// let mv = Move::new(&position, Square::G1, Square::F3);
    /// assert_eq!(mv.piece(), Piece::WHITE_KNIGHT);
    /// assert!(!mv.is_capture());
    /// assert_eq!(mv.to_string(), "Ng1-f3");
    /// ```
    #[inline(always)]
    pub fn new(position: &Position, from: Square, to: Square) -> Self {
        let piece = position.piece_at(from);

        if piece.is_pawn() && position.ep_square() == Some(to) {
            return Self::en_passant(position, from, to);
        }

        Self::from_parts(from, to, piece, position.piece_at(to), Piece::NONE, 0)
    }

    /// A pawn double step from `from` to `to`.
    ///
    /// If an enemy pawn stands next to `to`, the move is marked as opening en passant.
    pub fn pawn_jump(position: &Position, from: Square, to: Square) -> Self {
        let piece = position.piece_at(from);
        let enemy_pawns = position.piece_parts(piece.color().opponent(), PieceKind::Pawn);

        let neighbours = [to.offset(-1, 0), to.offset(1, 0)];
        let opens = neighbours
            .into_iter()
            .flatten()
            .any(|square| enemy_pawns.contains(square));

        let flags = if opens {
            Self::FLAG_PAWN_JUMP | Self::FLAG_OPENS_EN_PASSANT
        } else {
            Self::FLAG_PAWN_JUMP
        };

        Self::from_parts(from, to, piece, Piece::NONE, Piece::NONE, flags)
    }

    /// The four promotions of the pawn on `from` moving to `to`: Queen, Rook, Bishop, Knight.
    pub fn promotions(position: &Position, from: Square, to: Square) -> [Self; 4] {
        let piece = position.piece_at(from);
        let captured = position.piece_at(to);

        PieceKind::promotions()
            .map(|kind| Self::from_parts(from, to, piece, captured, piece.promoted(kind), 0))
    }

    /// A castle, where `to` is the square the King lands on.
    #[inline(always)]
    pub fn castle(position: &Position, from: Square, to: Square) -> Self {
        let piece = position.piece_at(from);
        Self::from_parts(from, to, piece, Piece::NONE, Piece::NONE, Self::FLAG_CASTLE)
    }

    /// An en passant capture onto the (empty) square `to`.
    #[inline(always)]
    pub fn en_passant(position: &Position, from: Square, to: Square) -> Self {
        let piece = position.piece_at(from);
        let victim = Piece::new(piece.color().opponent(), PieceKind::Pawn);
        Self::from_parts(from, to, piece, victim, Piece::NONE, Self::FLAG_EN_PASSANT)
    }

    /// Raw bits of this move.
    #[inline(always)]
    pub const fn inner(&self) -> u32 {
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

    #[inline(always)]
    pub const fn from(&self) -> Square {
        Square::from_index_unchecked((self.0 & Self::SRC_MASK) as usize)
    }

    #[inline(always)]
    pub const fn to(&self) -> Square {
        Square::from_index_unchecked(((self.0 >> Self::DST_BITS) & Self::SRC_MASK) as usize)
    }

    /// The moving piece.
    #[inline(always)]
    pub const fn piece(&self) -> Piece {
        Piece::from_bits_unchecked(((self.0 >> Self::PIECE_BITS) & Self::NIBBLE) as u8)
    }

    /// The captured piece, or [`Piece::NONE`].
    #[inline(always)]
    pub const fn captured(&self) -> Piece {
        Piece::from_bits_unchecked(((self.0 >> Self::CAPTURE_BITS) & Self::NIBBLE) as u8)
    }

    /// The piece the pawn turns into, or [`Piece::NONE`].
    #[inline(always)]
    pub const fn promoted(&self) -> Piece {
        Piece::from_bits_unchecked(((self.0 >> Self::PROMO_BITS) & Self::NIBBLE) as u8)
    }

    /// Color of the moving side, read straight from the low bit of the piece field.
    #[inline(always)]
    pub const fn color(&self) -> Color {
        Color::from_bits(((self.0 >> Self::PIECE_BITS) & 1) as u8)
    }

    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.captured().is_some()
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        self.promoted().is_some()
    }

    /// Neither a capture nor a promotion.
    #[inline(always)]
    pub const fn is_quiet(&self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        self.0 & Self::FLAG_CASTLE != 0
    }

    #[inline(always)]
    pub const fn is_short_castle(&self) -> bool {
        self.is_castle() && self.to().file().index() == File::G.index()
    }

    #[inline(always)]
    pub const fn is_long_castle(&self) -> bool {
        self.is_castle() && self.to().file().index() == File::C.index()
    }

    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        self.0 & Self::FLAG_EN_PASSANT != 0
    }

    #[inline(always)]
    pub const fn is_pawn_jump(&self) -> bool {
        self.0 & Self::FLAG_PAWN_JUMP != 0
    }

    /// `true` for a pawn jump that lands next to an enemy pawn.
    #[inline(always)]
    pub const fn opens_en_passant(&self) -> bool {
        self.0 & Self::FLAG_OPENS_EN_PASSANT != 0
    }

    /// For castles, the Rook's `(from, to)` squares.
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
    /// let castle = Move::castle(&position, Square::E8, Square::C8);
    /// assert_eq!(castle.castle_rook_squares(), Some((Square::A8, Square::D8)));
    /// ```
    #[inline(always)]
    pub const fn castle_rook_squares(&self) -> Option<(Square, Square)> {
        if !self.is_castle() {
            return None;
        }

        let rank = self.from().rank();
        if self.is_short_castle() {
            Some((Square::new(File::H, rank), Square::new(File::F, rank)))
        } else {
            Some((Square::new(File::A, rank), Square::new(File::D, rank)))
        }
    }

    /// Ordering value of a capture or promotion: most valuable victim, least valuable attacker.
    ///
    /// En passant carries the opposing pawn as its victim, so it is valued as pawn takes pawn.
    /// Promotions add the value of the new piece minus the pawn that is lost.
    pub fn value(&self) -> i32 {
        let Some(attacker) = self.piece().kind() else {
            return 0;
        };

        let mut value = match self.captured().kind() {
            Some(victim) => VICTIM_ATTACKER[victim][attacker],
            None => 0,
        };

        if let Some(promotion) = self.promoted().kind() {
            value += promotion.value() - PieceKind::Pawn.value();
        }

        value
    }

    /// Machine notation: `e2e4`, `e7e8q`, with castles written as the King's hop (`e1g1`).
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// let position = Position::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    /// let [queen, _, _, knight] = Move::promotions(&position, Square::A7, Square::A8);
    /// assert_eq!(queen.notation(), "a7a8q");
    /// assert_eq!(knight.notation(), "a7a8n");
    /// ```
    pub fn notation(&self) -> String {
        match self.promoted().kind() {
            Some(kind) => format!("{}{}{}", self.from(), self.to(), kind.char()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }

    /// Decodes either notation against `position`.
    ///
    /// Accepts `[KQRBN]?[a-h][1-8][-x]?[a-h][1-8][QRBNqrbn]?` as well as `0-0`, `0-0-0`, `O-O` and
    /// `O-O-O`. Returns [`Move::NONE`] if the text does not parse, if a stated piece letter
    /// disagrees with the piece on the origin square, or if the destination is not one of that
    /// piece's targets. Legality against checks is left to the caller.
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// let position = Position::default();
    /// assert_eq!(Move::from_notation(&position, "g1f3"), Move::new(&position, Square::G1, Square::F3));
    /// assert_eq!(Move::from_notation(&position, "Ng1-f3"), Move::new(&position, Square::G1, Square::F3));
    /// assert_eq!(Move::from_notation(&position, "Bg1-f3"), Move::NONE);
    /// assert_eq!(Move::from_notation(&position, "e2e5"), Move::NONE);
    /// ```
    pub fn from_notation(position: &Position, notation: &str) -> Self {
        let notation = notation.trim();
        let color = position.side_to_move();

        match notation {
            "0-0" | "O-O" => return Self::castle_for(position, File::G),
            "0-0-0" | "O-O-O" => return Self::castle_for(position, File::C),
            _ => {}
        }

        let Some(parsed) = ParsedNotation::parse(notation) else {
            return Self::NONE;
        };

        let piece = position.piece_at(parsed.from);
        if piece.is_none() || piece.color() != color {
            return Self::NONE;
        }

        if parsed.kind.is_some_and(|kind| !piece.is(kind)) {
            return Self::NONE;
        }

        // Castles are not part of the King's targets, so they are recognized by the two-file hop
        if piece.is_king() && parsed.from.distance_files(parsed.to) == 2 {
            if parsed.from != Square::E1.relative_to(color) || parsed.from.rank() != parsed.to.rank()
            {
                return Self::NONE;
            }
            return Self::castle_for(position, parsed.to.file());
        }

        if !position.targets(parsed.from).contains(parsed.to) {
            return Self::NONE;
        }

        if piece.is_pawn() {
            if parsed.to.rank() == Rank::EIGHT.relative_to(color) {
                let promotion = parsed.promotion.unwrap_or(PieceKind::Queen);
                return Self::promotions(position, parsed.from, parsed.to)
                    .into_iter()
                    .find(|mv| mv.promoted().is(promotion))
                    .unwrap_or(Self::NONE);
            }

            if parsed.from.distance_ranks(parsed.to) == 2 {
                return Self::pawn_jump(position, parsed.from, parsed.to);
            }
        }

        if parsed.promotion.is_some() {
            return Self::NONE;
        }

        Self::new(position, parsed.from, parsed.to)
    }

    /// A castle towards `file` for the side to move, or [`Move::NONE`] if it is not available.
    fn castle_for(position: &Position, file: File) -> Self {
        let color = position.side_to_move();
        let (short, long) = position.can_castle(color);
        let from = Square::E1.relative_to(color);

        let available = match file {
            File::G => short,
            File::C => long,
            _ => false,
        };

        if available {
            Self::castle(position, from, Square::new(file, from.rank()))
        } else {
            Self::NONE
        }
    }
}

/// The pieces of a move written as `[KQRBN]?[a-h][1-8][-x]?[a-h][1-8][QRBNqrbn]?`.
struct ParsedNotation {
    kind: Option<PieceKind>,
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
}

impl ParsedNotation {
    fn parse(notation: &str) -> Option<Self> {
        let chars = notation.chars().collect::<Vec<_>>();
        let mut rest = &chars[..];

        // A leading piece letter is only a piece letter if a file follows it ("b1c3" is not a Bishop move)
        let kind = match rest {
            [piece @ ('K' | 'Q' | 'R' | 'B' | 'N' | 'k' | 'q' | 'r' | 'b' | 'n'), 'a'..='h', ..] => {
                rest = &rest[1..];
                Some(PieceKind::from_uci(*piece).ok()?)
            }
            _ => None,
        };

        let from = Self::square(rest)?;
        rest = &rest[2..];

        if let ['-' | 'x', ..] = rest {
            rest = &rest[1..];
        }

        let to = Self::square(rest)?;
        rest = &rest[2..];

        let promotion = match rest {
            [] => None,
            [promotion @ ('Q' | 'R' | 'B' | 'N' | 'q' | 'r' | 'b' | 'n')] => {
                Some(PieceKind::from_uci(*promotion).ok()?)
            }
            _ => return None,
        };

        Some(Self {
            kind,
            from,
            to,
            promotion,
        })
    }

    fn square(chars: &[char]) -> Option<Square> {
        match chars {
            [file @ 'a'..='h', rank @ '1'..='8', ..] => Some(Square::new(
                File::from_char(*file).ok()?,
                Rank::from_char(*rank).ok()?,
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    /// Display notation: `Ng1-f3`, `e5xd6`, `e7-e8Q`, `0-0`, `0-0-0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_short_castle() {
            return write!(f, "0-0");
        } else if self.is_long_castle() {
            return write!(f, "0-0-0");
        }

        if let Some(kind) = self.piece().kind().filter(|kind| *kind != PieceKind::Pawn) {
            write!(f, "{}", kind.char().to_ascii_uppercase())?;
        }

        let capture = if self.is_capture() { 'x' } else { '-' };
        write!(f, "{}{capture}{}", self.from(), self.to())?;

        if let Some(kind) = self.promoted().kind() {
            write!(f, "{}", kind.char().to_ascii_uppercase())?;
        }

        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "NONE")
        } else {
            write!(f, "{self} ({:#010x})", self.0)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::*;

    #[test]
    fn test_fields_round_trip() {
        let mv = Move::from_parts(
            Square::B7,
            Square::C8,
            Piece::WHITE_PAWN,
            Piece::BLACK_KNIGHT,
            Piece::WHITE_BISHOP,
            0,
        );

        assert_eq!(mv.from(), Square::B7);
        assert_eq!(mv.to(), Square::C8);
        assert_eq!(mv.piece(), Piece::WHITE_PAWN);
        assert_eq!(mv.captured(), Piece::BLACK_KNIGHT);
        assert_eq!(mv.promoted(), Piece::WHITE_BISHOP);
        assert_eq!(mv.color(), Color::White);
        assert!(mv.is_capture() && mv.is_promotion() && !mv.is_quiet());
        assert!(!mv.is_castle() && !mv.is_en_passant() && !mv.is_pawn_jump());
    }

    #[test]
    fn test_move_none() {
        assert!(Move::NONE.is_none());
        assert_eq!(Move::default(), Move::NONE);
        assert_eq!(Move::NONE.inner(), 0);
    }

    #[test]
    fn test_en_passant_carries_pawn() {
        let position: Position = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1".parse().unwrap();
        let mv = Move::new(&position, Square::E5, Square::D6);

        assert!(mv.is_en_passant());
        assert_eq!(mv.captured(), Piece::BLACK_PAWN);
        assert!(position.piece_at(Square::D6).is_none());
        assert_eq!(mv.to_string(), "e5xd6");
        assert_eq!(mv.value(), VICTIM_ATTACKER[0][0]);
    }

    #[test]
    fn test_pawn_jump_opens_en_passant() {
        let position: Position = "4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1".parse().unwrap();
        let jump = Move::pawn_jump(&position, Square::E2, Square::E4);
        assert!(jump.is_pawn_jump());
        assert!(jump.opens_en_passant());

        let position: Position = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1".parse().unwrap();
        let jump = Move::pawn_jump(&position, Square::E2, Square::E4);
        assert!(jump.is_pawn_jump());
        assert!(!jump.opens_en_passant());
    }

    #[test]
    fn test_promotion_order_and_display() {
        let position: Position = "1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let promotions = Move::promotions(&position, Square::A7, Square::B8);
        let kinds = promotions.map(|mv| mv.promoted().kind());

        assert_eq!(
            kinds,
            [
                Some(PieceKind::Queen),
                Some(PieceKind::Rook),
                Some(PieceKind::Bishop),
                Some(PieceKind::Knight)
            ]
        );
        assert_eq!(promotions[0].to_string(), "a7xb8Q");
        assert_eq!(promotions[3].notation(), "a7b8n");
        assert!(promotions[0].value() > promotions[3].value());
    }

    #[test]
    fn test_castle_fields() {
        let position: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let short = Move::castle(&position, Square::E1, Square::G1);
        let long = Move::castle(&position, Square::E1, Square::C1);

        assert!(short.is_short_castle() && !short.is_long_castle());
        assert!(long.is_long_castle() && !long.is_short_castle());
        assert!(!short.is_capture() && !short.is_promotion());
        assert_eq!(short.to_string(), "0-0");
        assert_eq!(long.to_string(), "0-0-0");
        assert_eq!(short.notation(), "e1g1");
        assert_eq!(short.castle_rook_squares(), Some((Square::H1, Square::F1)));
    }

    #[test]
    fn test_mvv_lva_ordering() {
        let position: Position = "4k3/8/2q1r3/3P4/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let takes_queen = Move::new(&position, Square::D5, Square::C6);
        let takes_rook = Move::new(&position, Square::D5, Square::E6);
        assert!(takes_queen.value() > takes_rook.value());

        let quiet = Move::new(&position, Square::D5, Square::D6);
        assert_eq!(quiet.value(), 0);
    }

    #[test]
    fn test_from_notation() {
        let position: Position = FEN_KIWIPETE.parse().unwrap();

        let castle = Move::from_notation(&position, "0-0");
        assert_eq!(castle, Move::castle(&position, Square::E1, Square::G1));
        assert_eq!(Move::from_notation(&position, "e1c1"), Move::castle(&position, Square::E1, Square::C1));
        assert_eq!(Move::from_notation(&position, "O-O-O"), Move::castle(&position, Square::E1, Square::C1));

        let capture = Move::from_notation(&position, "Be2xa6");
        assert_eq!(capture.captured(), Piece::BLACK_BISHOP);
        assert_eq!(capture, Move::from_notation(&position, "e2a6"));

        // Wrong piece letter, not a target, empty origin, enemy origin, garbage
        assert_eq!(Move::from_notation(&position, "Ne2a6"), Move::NONE);
        assert_eq!(Move::from_notation(&position, "e2e6"), Move::NONE);
        assert_eq!(Move::from_notation(&position, "e3e4"), Move::NONE);
        assert_eq!(Move::from_notation(&position, "a8b8"), Move::NONE);
        assert_eq!(Move::from_notation(&position, "hello"), Move::NONE);
        assert_eq!(Move::from_notation(&position, "e2a6qq"), Move::NONE);
    }

    #[test]
    fn test_from_notation_castle_unavailable() {
        let position: Position = "r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1".parse().unwrap();
        assert_eq!(Move::from_notation(&position, "0-0"), Move::NONE);
        assert_eq!(Move::from_notation(&position, "e1g1"), Move::NONE);
    }

    #[test]
    fn test_display_notation_round_trips() {
        for fen in [
            FEN_STARTPOS,
            FEN_KIWIPETE,
            "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
            "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1",
        ] {
            let position: Position = fen.parse().unwrap();
            for mv in generate_legal_moves(&position).unwrap() {
                let decoded = Move::from_notation(&position, &mv.to_string());
                assert_eq!(decoded, mv, "{fen}: {mv} decoded as {decoded:?}");

                let decoded = Move::from_notation(&position, &mv.notation());
                assert_eq!(decoded, mv, "{fen}: {} decoded as {decoded:?}", mv.notation());
            }
        }
    }
}
