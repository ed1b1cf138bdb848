/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board representation, move encoding and legal move generation.
mod board;

/// Opening book lookups.
mod book;

/// Evaluation of chess positions.
mod eval;

/// Quiet move bonuses learned during search.
mod history;

/// Lazy move ordering for the search.
mod movepicker;

/// Piece-Square Tables.
mod psqt;

/// Centipawn and mate scores.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Tunable search constants.
mod tune;

/// Misc utility functions, constants, and types.
mod utils;

pub use board::*;
pub use book::*;
pub use eval::*;
pub use history::*;
pub use movepicker::*;
pub use psqt::*;
pub use score::*;
pub use search::*;
pub use utils::*;
