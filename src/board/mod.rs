/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Precomputed attack tables and sliding ray lookups.
mod attacks;

/// Square-sets backed by a `u64`.
mod bitboard;

/// Legal move generation, ordering and perft.
mod movegen;

/// Packed moves and their notations.
mod moves;

/// Colors, piece kinds and colored pieces.
mod piece;

/// Board state: placement, rights, FEN and copy-make.
mod position;

/// Compile-time pseudo-random numbers.
mod prng;

/// Squares, ranks and files.
mod square;

/// Position identity.
mod zobrist;

pub use attacks::*;
pub use bitboard::*;
pub use movegen::*;
pub use moves::*;
pub use piece::*;
pub use position::*;
pub use prng::*;
pub use square::*;
pub use zobrist::*;
