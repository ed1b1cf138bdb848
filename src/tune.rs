/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Razoring margins, indexed by remaining depth. Razoring only runs below depth 4.
macro_rules! razoring_margins {
    () => {
        [0, 240, 450, 660]
    };
}
pub(crate) use razoring_margins;

/// Futility margins, indexed by remaining depth. Futility pruning only runs below depth 4.
macro_rules! futility_margins {
    () => {
        [0, 400, 500, 600]
    };
}
pub(crate) use futility_margins;

/// Null move pruning requires strictly more non-pawn, non-King pieces than this.
macro_rules! min_null_move_pieces {
    () => {
        5
    };
}
pub(crate) use min_null_move_pieces;

/// Base depth reduction of the null move search.
macro_rules! null_move_base_reduction {
    () => {
        3
    };
}
pub(crate) use null_move_base_reduction;

/// The null move search is reduced one more ply for every this many plies of depth.
macro_rules! null_move_depth_divisor {
    () => {
        4
    };
}
pub(crate) use null_move_depth_divisor;

/// If the static evaluation beats beta by more than this, the null move search is reduced by one more ply.
macro_rules! null_move_eval_margin {
    () => {
        100
    };
}
pub(crate) use null_move_eval_margin;

/// Minimum remaining depth for Late Move Reductions.
macro_rules! lmr_min_depth {
    () => {
        3
    };
}
pub(crate) use lmr_min_depth;

/// Move counts after which a quiet move is reduced by two, three and four plies.
macro_rules! lmr_move_thresholds {
    () => {
        [8, 16, 32]
    };
}
pub(crate) use lmr_move_thresholds;

/// How many plies quiescence search may extend past the nominal depth.
macro_rules! max_quiescence_depth {
    () => {
        8
    };
}
pub(crate) use max_quiescence_depth;
