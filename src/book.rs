/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fs::File,
    io::{self, BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use anyhow::{bail, Context, Result};
use rand::Rng;

use crate::{generate_legal_moves, Move, PieceKind, Position, Square, ZobristKey};

/// A single record of an opening book.
///
/// On disk every record takes [`BookEntry::SIZE`] bytes, all fields big-endian, and the records
/// are sorted by `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookEntry {
    /// Zobrist key of the position this entry applies to.
    pub key: u64,

    /// Packed move: to-square in bits 0-5, from-square in bits 6-11, promotion in bits 12-14.
    pub mv: u16,

    /// How good the move is. Higher is better.
    pub score: u16,

    /// Unused by lookups; kept so records can be written back untouched.
    pub learn: u32,
}

impl BookEntry {
    /// Size of one record, in bytes.
    pub const SIZE: usize = 16;

    const PROMOTION_SHIFT: u16 = 12;

    /// Packs `mv` the way book records store moves.
    ///
    /// Castles are stored as the King capturing its own Rook.
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// let position = Position::default();
    /// let mv = Move::from_notation(&position, "e2e4");
    /// assert_eq!(BookEntry::encode_move(mv), (Square::E2.index() << 6 | Square::E4.index()) as u16);
    /// ```
    pub fn encode_move(mv: Move) -> u16 {
        let to = match mv.castle_rook_squares() {
            Some((rook, _)) => rook,
            None => mv.to(),
        };

        let promotion = match mv.promoted().kind() {
            Some(PieceKind::Knight) => 1,
            Some(PieceKind::Bishop) => 2,
            Some(PieceKind::Rook) => 3,
            Some(PieceKind::Queen) => 4,
            _ => 0,
        };

        (promotion << Self::PROMOTION_SHIFT) | (mv.from().index() << 6 | to.index()) as u16
    }

    /// Unpacks the move of this entry in `position`.
    ///
    /// Returns [`Move::NONE`] if the record does not describe a move that can be played there.
    pub fn decode_move(&self, position: &Position) -> Move {
        let to = Square::from_index_unchecked((self.mv & 0x3F) as usize);
        let from = Square::from_index_unchecked(((self.mv >> 6) & 0x3F) as usize);

        let promotion = match (self.mv >> Self::PROMOTION_SHIFT) & 0x7 {
            0 => "",
            1 => "n",
            2 => "b",
            3 => "r",
            4 => "q",
            _ => return Move::NONE,
        };

        // King takes own Rook is how castles are stored
        let piece = position.piece_at(from);
        let to = if piece.is_king() && from == Square::E1.relative_to(piece.color()) {
            if to == Square::H1.relative_to(piece.color()) {
                Square::G1.relative_to(piece.color())
            } else if to == Square::A1.relative_to(piece.color()) {
                Square::C1.relative_to(piece.color())
            } else {
                to
            }
        } else {
            to
        };

        Move::from_notation(position, &format!("{from}{to}{promotion}"))
    }

    /// Serializes this entry into its on-disk form.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.key.to_be_bytes());
        bytes[8..10].copy_from_slice(&self.mv.to_be_bytes());
        bytes[10..12].copy_from_slice(&self.score.to_be_bytes());
        bytes[12..16].copy_from_slice(&self.learn.to_be_bytes());
        bytes
    }

    fn read_from(reader: &mut impl Read) -> io::Result<Self> {
        let mut key = [0; 8];
        let mut mv = [0; 2];
        let mut score = [0; 2];
        let mut learn = [0; 4];

        reader.read_exact(&mut key)?;
        reader.read_exact(&mut mv)?;
        reader.read_exact(&mut score)?;
        reader.read_exact(&mut learn)?;

        Ok(Self {
            key: u64::from_be_bytes(key),
            mv: u16::from_be_bytes(mv),
            score: u16::from_be_bytes(score),
            learn: u32::from_be_bytes(learn),
        })
    }
}

/// An opening book: a sorted file of [`BookEntry`] records, searched on disk.
#[derive(Debug)]
pub struct Book<R> {
    reader: R,

    /// Number of records.
    len: u64,
}

impl Book<BufReader<File>> {
    /// Opens the book file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open book file {}", path.display()))?;

        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> Book<R> {
    /// Reads a book from any seekable source.
    ///
    /// Fails if the source is not a whole number of records long.
    pub fn from_reader(mut reader: R) -> Result<Self> {
        let size = reader.seek(SeekFrom::End(0))?;
        if size % BookEntry::SIZE as u64 != 0 {
            bail!(
                "Book size of {size} bytes is not a multiple of the {} byte record size",
                BookEntry::SIZE
            );
        }

        Ok(Self {
            reader,
            len: size / BookEntry::SIZE as u64,
        })
    }

    /// Number of records in the book.
    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn seek_to(&mut self, index: u64) -> Result<()> {
        self.reader
            .seek(SeekFrom::Start(index * BookEntry::SIZE as u64))?;
        Ok(())
    }

    fn entry_at(&mut self, index: u64) -> Result<BookEntry> {
        self.seek_to(index)?;
        BookEntry::read_from(&mut self.reader)
            .with_context(|| format!("Failed to read book record {index}"))
    }

    /// All records for `key`, in file order.
    pub fn lookup(&mut self, key: ZobristKey) -> Result<Vec<BookEntry>> {
        let key = key.inner();

        // Index of the first record whose key is not less than `key`
        let (mut low, mut high) = (0, self.len);
        while low < high {
            let mid = low + (high - low) / 2;
            if self.entry_at(mid)?.key < key {
                low = mid + 1;
            } else {
                high = mid;
            }
        }

        let mut entries = Vec::new();
        self.seek_to(low)?;
        for index in low..self.len {
            let entry = BookEntry::read_from(&mut self.reader)
                .with_context(|| format!("Failed to read book record {index}"))?;
            if entry.key != key {
                break;
            }
            entries.push(entry);
        }

        Ok(entries)
    }

    /// The legal moves the book knows for `position`, with their entries, in file order.
    pub fn candidates(&mut self, position: &Position) -> Result<Vec<(Move, BookEntry)>> {
        let legal = generate_legal_moves(position)?;

        let candidates = self
            .lookup(position.key())?
            .into_iter()
            .map(|entry| (entry.decode_move(position), entry))
            .filter(|(mv, _)| legal.contains(mv))
            .collect();

        Ok(candidates)
    }

    /// Picks a book move for `position`.
    ///
    /// With several candidates, one of the two best-scored ones is chosen at random.
    pub fn pick_move<G: Rng + ?Sized>(
        &mut self,
        position: &Position,
        rng: &mut G,
    ) -> Result<Option<Move>> {
        let mut candidates = self.candidates(position)?;

        let chosen = match candidates.len() {
            0 => None,
            1 => Some(candidates[0].0),
            _ => {
                candidates.sort_by(|(_, a), (_, b)| b.score.cmp(&a.score));
                Some(candidates[rng.gen_range(0..2)].0)
            }
        };

        if let Some(mv) = chosen {
            tracing::debug!(candidates = candidates.len(), book_move = %mv.notation(), "picked book move");
        }

        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::*;

    fn entry(position: &Position, notation: &str, score: u16) -> BookEntry {
        let mv = Move::from_notation(position, notation);
        assert!(mv.is_some(), "{notation} in {position}");

        BookEntry {
            key: position.key().inner(),
            mv: BookEntry::encode_move(mv),
            score,
            learn: 0,
        }
    }

    fn book_of(mut entries: Vec<BookEntry>) -> Book<Cursor<Vec<u8>>> {
        entries.sort_by_key(|entry| entry.key);
        let bytes = entries.iter().flat_map(BookEntry::to_bytes).collect::<Vec<_>>();
        Book::from_reader(Cursor::new(bytes)).unwrap()
    }

    fn filler(key: u64) -> BookEntry {
        BookEntry {
            key,
            mv: 0,
            score: 1,
            learn: 0,
        }
    }

    #[test]
    fn test_lookup_returns_all_matches_in_order() {
        let start = Position::default();
        let key = start.key().inner();

        let mut entries = vec![filler(0), filler(key - 1), filler(key + 1), filler(u64::MAX)];
        entries.extend([
            entry(&start, "e2e4", 10),
            entry(&start, "d2d4", 8),
            entry(&start, "g1f3", 1),
        ]);
        let mut book = book_of(entries);
        assert_eq!(book.len(), 7);

        let found = book.lookup(start.key()).unwrap();
        let moves = found
            .iter()
            .map(|entry| entry.decode_move(&start).notation())
            .collect::<Vec<_>>();
        assert_eq!(moves, ["e2e4", "d2d4", "g1f3"]);

        let missing: Position = FEN_KIWIPETE.parse().unwrap();
        assert!(book.lookup(missing.key()).unwrap().is_empty());
    }

    #[test]
    fn test_pick_move_prefers_top_two() {
        let start = Position::default();
        let mut book = book_of(vec![
            entry(&start, "g1f3", 1),
            entry(&start, "e2e4", 10),
            entry(&start, "c2c4", 3),
            entry(&start, "d2d4", 8),
        ]);

        let e4 = Move::from_notation(&start, "e2e4");
        let d4 = Move::from_notation(&start, "d2d4");

        let picks = (0..64)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                book.pick_move(&start, &mut rng).unwrap().unwrap()
            })
            .collect::<Vec<_>>();

        assert!(picks.iter().all(|mv| *mv == e4 || *mv == d4));
        assert!(picks.contains(&e4));
        assert!(picks.contains(&d4));
    }

    #[test]
    fn test_pick_move_single_and_empty() {
        let start = Position::default();
        let mut rng = StdRng::seed_from_u64(7);

        let mut book = book_of(vec![entry(&start, "b1c3", 5)]);
        assert_eq!(
            book.pick_move(&start, &mut rng).unwrap(),
            Some(Move::from_notation(&start, "b1c3"))
        );

        let kiwipete: Position = FEN_KIWIPETE.parse().unwrap();
        assert_eq!(book.pick_move(&kiwipete, &mut rng).unwrap(), None);

        let mut empty = book_of(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.pick_move(&start, &mut rng).unwrap(), None);
    }

    #[test]
    fn test_castles_are_stored_as_king_takes_rook() {
        let position: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let short = Move::from_notation(&position, "O-O");
        let long = Move::from_notation(&position, "O-O-O");
        assert!(short.is_short_castle() && long.is_long_castle());

        let short_entry = BookEntry {
            key: position.key().inner(),
            mv: (Square::E1.index() << 6 | Square::H1.index()) as u16,
            score: 0,
            learn: 0,
        };
        assert_eq!(BookEntry::encode_move(short), short_entry.mv);
        assert_eq!(short_entry.decode_move(&position), short);

        let long_entry = BookEntry {
            mv: BookEntry::encode_move(long),
            ..short_entry
        };
        assert_eq!(long_entry.mv, (Square::E1.index() << 6 | Square::A1.index()) as u16);
        assert_eq!(long_entry.decode_move(&position), long);
    }

    #[test]
    fn test_promotions_round_trip() {
        let position: Position = "4k3/1P6/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        for notation in ["b7b8n", "b7b8b", "b7b8r", "b7b8q"] {
            let mv = Move::from_notation(&position, notation);
            let entry = BookEntry {
                key: position.key().inner(),
                mv: BookEntry::encode_move(mv),
                score: 0,
                learn: 0,
            };
            assert_eq!(entry.decode_move(&position), mv, "{notation}");
        }
    }

    #[test]
    fn test_rejects_truncated_books() {
        assert!(Book::from_reader(Cursor::new(vec![0u8; 17])).is_err());
    }

    #[test]
    fn test_records_are_big_endian() {
        let entry = BookEntry {
            key: 0x0102030405060708,
            mv: 0x090A,
            score: 0x0B0C,
            learn: 0x0D0E0F10,
        };
        let bytes = entry.to_bytes();
        assert_eq!(bytes, core::array::from_fn(|i| i as u8 + 1));
        assert_eq!(BookEntry::read_from(&mut Cursor::new(bytes)).unwrap(), entry);
    }
}
