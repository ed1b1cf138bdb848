/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Result};
use arrayvec::ArrayVec;

use crate::{
    generate_captures, generate_legal_moves, reorder, tune, Bitboard, Evaluator, HistoryTable,
    Move, MovePicker, PieceKind, Position, Score, ZobristKey, MAX_DEPTH, MAX_PLY,
};

/// Depth used when nothing else is requested.
pub const DEFAULT_DEPTH: usize = 6;

/// A sequence of moves, starting at some ply of the search.
pub type PrincipalVariation = ArrayVec<Move, MAX_PLY>;

/// Toggles and margins of the pruning techniques used by the zero-window search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    /// Drop into quiescence when the static evaluation is far below beta near the horizon.
    pub razoring: bool,

    /// Return early when the static evaluation is far above beta near the horizon.
    pub futility_pruning: bool,

    /// Let the opponent move twice; if we are still above beta, the node is not worth searching.
    pub null_move_pruning: bool,

    /// Search quiet moves late in the ordering at reduced depth.
    pub late_move_reductions: bool,

    /// Razoring margins, indexed by remaining depth.
    pub razoring_margins: [i32; 4],

    /// Futility margins, indexed by remaining depth.
    pub futility_margins: [i32; 4],

    /// Maximum number of plies the quiescence search may go past the horizon.
    pub max_quiescence_depth: usize,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            razoring: true,
            futility_pruning: true,
            null_move_pruning: true,
            late_move_reductions: true,
            razoring_margins: tune::razoring_margins!(),
            futility_margins: tune::futility_margins!(),
            max_quiescence_depth: tune::max_quiescence_depth!(),
        }
    }
}

impl SearchParameters {
    /// Parameters with every pruning technique switched off.
    ///
    /// The search is then a plain principal variation search, which makes it a useful reference.
    pub fn exhaustive() -> Self {
        Self {
            razoring: false,
            futility_pruning: false,
            null_move_pruning: false,
            late_move_reductions: false,
            ..Default::default()
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Depth of [`Search::start`]. Capped at [`MAX_DEPTH`].
    pub depth: usize,

    pub params: SearchParameters,
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            params: SearchParameters::default(),
        }
    }
}

/// Counters collected during a single search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchStats {
    /// Nodes visited by the main search (full-window, zero-window and in-check).
    pub nodes: u64,

    /// Nodes visited by the quiescence search.
    pub qnodes: u64,

    pub null_move_tries: u64,
    pub null_move_cutoffs: u64,
    pub razor_cutoffs: u64,
    pub futility_cutoffs: u64,

    /// Late move reductions that failed high and had to be searched again at full depth.
    pub lmr_researches: u64,

    /// Moves that scored at or above beta.
    pub beta_cutoffs: u64,

    /// Legal moves searched at the root.
    pub root_moves: u64,
}

impl SearchStats {
    /// Every node visited, quiescence included.
    #[inline(always)]
    pub const fn total_nodes(&self) -> u64 {
        self.nodes + self.qnodes
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes:             {}", self.nodes)?;
        writeln!(f, "qnodes:            {}", self.qnodes)?;
        writeln!(f, "null move tries:   {}", self.null_move_tries)?;
        writeln!(f, "null move cutoffs: {}", self.null_move_cutoffs)?;
        writeln!(f, "razor cutoffs:     {}", self.razor_cutoffs)?;
        writeln!(f, "futility cutoffs:  {}", self.futility_cutoffs)?;
        writeln!(f, "lmr re-searches:   {}", self.lmr_researches)?;
        writeln!(f, "beta cutoffs:      {}", self.beta_cutoffs)?;
        write!(f, "root moves:        {}", self.root_moves)
    }
}

/// The result of a search: its score, the line it expects, and how much work it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Evaluation of the root position, from the side-to-move's perspective.
    pub score: Score,

    /// The expected continuation, starting with the move to play.
    ///
    /// Empty if there is nothing to play.
    pub best_line: PrincipalVariation,

    pub stats: SearchStats,
}

impl SearchResult {
    /// Best move found during the search, if there was any legal move.
    #[inline(always)]
    pub fn bestmove(&self) -> Option<Move> {
        self.best_line.first().copied()
    }
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            score: -Score::INF,
            best_line: PrincipalVariation::new(),
            stats: SearchStats::default(),
        }
    }
}

/// Formats a line of moves in coordinate notation, separated by spaces.
pub fn format_line(line: &[Move]) -> String {
    line.iter()
        .map(Move::notation)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Executes fixed-depth searches, keeping its move ordering feedback between them.
///
/// Everything but the history table is reset when a new search starts.
pub struct Search {
    config: SearchConfig,

    /// Quiet moves that caused a cutoff, two per ply, most recent first.
    killers: [[Move; 2]; MAX_PLY],

    /// Triangular table of best lines: `lines[ply]` is the best line found from `ply` onwards.
    lines: Vec<PrincipalVariation>,

    history: HistoryTable,

    /// Keys of the positions played before the root.
    game_keys: Vec<ZobristKey>,

    /// Keys of the positions from the start of the game to the current node.
    keys: Vec<ZobristKey>,

    stats: SearchStats,
}

impl Search {
    /// Construct a new [`Search`] with the provided configuration.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            killers: [[Move::NONE; 2]; MAX_PLY],
            lines: vec![PrincipalVariation::new(); MAX_PLY],
            history: HistoryTable::default(),
            game_keys: Vec::new(),
            keys: Vec::with_capacity(MAX_PLY),
            stats: SearchStats::default(),
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[inline(always)]
    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    /// Forget the history of previous searches, for example when a new game starts.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Sets the keys of the positions that were played before the root, oldest first.
    ///
    /// The search scores repeating any of them as a draw.
    pub fn set_game_history(&mut self, keys: impl IntoIterator<Item = ZobristKey>) {
        self.game_keys = keys.into_iter().collect();
    }

    /// Searches `position` to the configured depth.
    #[inline(always)]
    pub fn start(&mut self, position: &Position) -> Result<SearchResult> {
        self.search_fixed_depth(position, self.config.depth)
    }

    /// Searches `position` exactly `depth` plies deep, plus check extensions and quiescence.
    ///
    /// Fails if the side to move has no King.
    ///
    /// # Example
    /// ```
    /// # use sable::*;
    /// let position: Position = "k7/8/KQ6/8/8/8/8/8 w - - 0 1".parse().unwrap();
    /// let result = Search::default().search_fixed_depth(&position, 2).unwrap();
    /// assert_eq!(result.score, Score::mate_in(1));
    /// ```
    pub fn search_fixed_depth(&mut self, position: &Position, depth: usize) -> Result<SearchResult> {
        let color = position.side_to_move();
        if position.king_square(color).is_none() {
            bail!("{} has no King on the board: {position}", color.name());
        }

        self.reset();
        let depth = depth.min(MAX_DEPTH);

        let score = self.alpha_beta(position, depth, 0, -Score::INF, Score::INF)?;
        let result = SearchResult {
            score,
            best_line: self.lines[0].clone(),
            stats: self.stats,
        };

        tracing::debug!(
            depth,
            score = %result.score,
            nodes = result.stats.nodes,
            qnodes = result.stats.qnodes,
            best_line = %format_line(&result.best_line),
            "search finished"
        );

        Ok(result)
    }

    fn reset(&mut self) {
        self.killers = [[Move::NONE; 2]; MAX_PLY];
        self.lines.iter_mut().for_each(|line| line.clear());
        self.keys.clear();
        self.keys.extend_from_slice(&self.game_keys);
        self.stats = SearchStats::default();
    }

    /// Records `position` as the node at `ply` of the current line, returning `true` if it
    /// repeats a position with the same side to move since the last irreversible move.
    fn visit(&mut self, position: &Position, ply: usize) -> bool {
        self.keys.truncate(self.game_keys.len() + ply);

        let key = position.key();
        let repeated = self
            .keys
            .iter()
            .rev()
            .take(position.halfmove())
            .skip(1)
            .step_by(2)
            .any(|earlier| *earlier == key);

        self.keys.push(key);
        repeated
    }

    /// Sets the best line at `ply` to `mv` followed by the best line of the child.
    fn save_best(&mut self, ply: usize, mv: Move) {
        let (parents, children) = self.lines.split_at_mut(ply + 1);
        let line = &mut parents[ply];

        line.clear();
        line.push(mv);
        // Lines shrink by one ply at every level, so the child's line always fits
        let _ = line.try_extend_from_slice(&children[0]);
    }

    #[inline(always)]
    fn quiescence_depth(&self) -> usize {
        self.config.params.max_quiescence_depth
    }

    /// Full-window search with principal variation search over the moves.
    fn alpha_beta(
        &mut self,
        position: &Position,
        depth: usize,
        ply: usize,
        mut alpha: Score,
        beta: Score,
    ) -> Result<Score> {
        self.lines[ply].clear();

        let in_check = position.is_in_check();
        if depth == 0 && !in_check {
            return self.quiescence(position, self.quiescence_depth(), ply, alpha, beta);
        }

        if ply >= MAX_PLY - 1 {
            return Ok(Evaluator::new(position).eval());
        }

        self.stats.nodes += 1;
        if self.visit(position, ply) && ply > 0 {
            return Ok(Score::DRAW);
        }

        // Mate distance pruning: nothing here can beat a shorter mate already found
        if Score::mate_in(ply) <= alpha {
            return Ok(alpha);
        }
        if Score::mated_in(ply) >= beta {
            return Ok(beta);
        }

        // Being in check at the horizon extends the search by one ply
        let depth = depth.max(1);

        let mut moves = generate_legal_moves(position)?;
        if moves.is_empty() {
            return Ok(if in_check {
                Score::mated_in(ply)
            } else {
                Score::DRAW
            });
        }
        reorder(position, &mut moves);

        for (i, mv) in moves.into_iter().enumerate() {
            if ply == 0 {
                self.stats.root_moves += 1;
            }
            let child = position.apply_move(mv);

            let score = if i == 0 {
                -self.alpha_beta(&child, depth - 1, ply + 1, -beta, -alpha)?
            } else {
                let score = -self.zero_window_child(&child, depth - 1, ply + 1, -alpha)?;
                if score > alpha {
                    -self.alpha_beta(&child, depth - 1, ply + 1, -beta, -alpha)?
                } else {
                    score
                }
            };

            if score >= beta {
                self.stats.beta_cutoffs += 1;
                return Ok(score);
            }

            if score > alpha {
                alpha = score;
                self.save_best(ply, mv);
            }
        }

        Ok(alpha)
    }

    /// Picks the right null-window search for a child node, with bound `beta`.
    fn zero_window_child(
        &mut self,
        position: &Position,
        depth: usize,
        ply: usize,
        beta: Score,
    ) -> Result<Score> {
        if position.is_in_check() {
            self.search_in_check(position, depth, ply, beta)
        } else if depth == 0 {
            self.quiescence(position, self.quiescence_depth(), ply, beta - 1, beta)
        } else {
            self.zero_window(position, depth, ply, beta)
        }
    }

    /// Searches with the window `[beta - 1, beta]`, only proving whether the score reaches `beta`.
    ///
    /// Never called while in check.
    fn zero_window(
        &mut self,
        position: &Position,
        depth: usize,
        ply: usize,
        beta: Score,
    ) -> Result<Score> {
        if ply >= MAX_PLY - 1 {
            return Ok(Evaluator::new(position).eval());
        }

        self.stats.nodes += 1;
        if self.visit(position, ply) {
            return Ok(Score::DRAW);
        }

        let mut best = Score::mated_in(ply);
        if best >= beta {
            return Ok(beta);
        }

        let color = position.side_to_move();
        let params = self.config.params;
        let eval = Evaluator::new(position).eval();

        if depth < params.razoring_margins.len() {
            // Razoring: hopeless unless a capture sequence saves us
            let margin = beta - params.razoring_margins[depth];
            let promotions_pending = (position.piece_parts(color, PieceKind::Pawn)
                & Bitboard::seventh_rank(color))
            .is_nonempty();

            if params.razoring && eval < margin && !beta.is_mate() && !promotions_pending {
                let razored =
                    self.quiescence(position, self.quiescence_depth(), ply, margin - 1, margin)?;
                if razored < margin {
                    self.stats.razor_cutoffs += 1;
                    return Ok(razored);
                }
            }

            // Futility: far enough ahead that nothing short of losing a piece matters
            let margin = eval - params.futility_margins[depth];
            if params.futility_pruning
                && margin >= beta
                && !beta.is_mate()
                && position.non_pawn_pieces(color) > 0
            {
                self.stats.futility_cutoffs += 1;
                return Ok(margin);
            }
        }

        if params.null_move_pruning
            && depth > 1
            && eval >= beta
            && position.non_pawn_pieces(color) > tune::min_null_move_pieces!()
        {
            let mut reduction =
                tune::null_move_base_reduction!() + depth / tune::null_move_depth_divisor!();
            if eval - tune::null_move_eval_margin!() > beta {
                reduction += 1;
            }

            self.stats.null_move_tries += 1;
            let passed = position.null_move();
            let score =
                -self.zero_window_child(&passed, depth.saturating_sub(reduction), ply + 1, -beta + 1)?;

            if score >= beta {
                self.stats.null_move_cutoffs += 1;
                return Ok(score);
            }
        }

        let moves = generate_legal_moves(position)?;
        let picker =
            MovePicker::with_heuristics(position, moves, &self.killers[ply], &self.history);

        let mut move_count = 0;
        for (mv, _) in picker {
            let child = position.apply_move(mv);
            let gives_check = child.is_in_check();

            let reduced_depth = if gives_check {
                depth
            } else if params.late_move_reductions
                && mv.is_quiet()
                && depth >= tune::lmr_min_depth!()
                && move_count >= tune::lmr_move_thresholds!()[0]
            {
                let thresholds = tune::lmr_move_thresholds!();
                let extra = thresholds[1..]
                    .iter()
                    .filter(|&&threshold| move_count >= threshold)
                    .count();
                (depth - 2).saturating_sub(extra)
            } else {
                depth - 1
            };

            let mut score = -self.zero_window_child(&child, reduced_depth, ply + 1, -beta + 1)?;

            // A reduced move that fails high is only trusted after a full-depth search
            if !gives_check && reduced_depth < depth - 1 && score >= beta {
                self.stats.lmr_researches += 1;
                score = -self.zero_window_child(&child, depth - 1, ply + 1, -beta + 1)?;
            }

            move_count += 1;

            if score > best {
                if score >= beta {
                    self.stats.beta_cutoffs += 1;

                    if mv.is_quiet() {
                        let killers = &mut self.killers[ply];
                        if mv != killers[0] {
                            killers[1] = killers[0];
                            killers[0] = mv;
                        }
                        self.history.update(mv, depth);
                    }

                    return Ok(score);
                }

                best = score;
            }
        }

        if move_count == 0 {
            return Ok(Score::DRAW);
        }

        Ok(best)
    }

    /// Zero-window search of a position in check: every evasion is searched, nothing is pruned.
    fn search_in_check(
        &mut self,
        position: &Position,
        depth: usize,
        ply: usize,
        beta: Score,
    ) -> Result<Score> {
        if ply >= MAX_PLY - 1 {
            return Ok(Evaluator::new(position).eval());
        }

        self.stats.nodes += 1;
        if self.visit(position, ply) {
            return Ok(Score::DRAW);
        }

        let mut best = Score::mated_in(ply);
        if best >= beta {
            return Ok(beta);
        }

        let moves = generate_legal_moves(position)?;
        let picker =
            MovePicker::with_heuristics(position, moves, &self.killers[ply], &self.history);

        for (mv, _) in picker {
            let child = position.apply_move(mv);
            let score = -self.zero_window_child(&child, depth.saturating_sub(1), ply + 1, -beta + 1)?;

            if score > best {
                if score >= beta {
                    self.stats.beta_cutoffs += 1;
                    return Ok(score);
                }
                best = score;
            }
        }

        Ok(best)
    }

    /// Searches captures (and queen promotions) until the position is quiet.
    ///
    /// The side to move may always "stand pat" on the static evaluation instead of capturing.
    fn quiescence(
        &mut self,
        position: &Position,
        depth: usize,
        ply: usize,
        mut alpha: Score,
        beta: Score,
    ) -> Result<Score> {
        self.lines[ply].clear();
        self.stats.qnodes += 1;

        let stand_pat = Evaluator::new(position).eval();
        if stand_pat >= beta || depth == 0 || ply >= MAX_PLY - 1 {
            return Ok(stand_pat);
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let captures = generate_captures(position)?;
        let picker = MovePicker::new(captures, Move::value);

        for (mv, _) in picker {
            let child = position.apply_move(mv);
            let score = -self.quiescence(&child, depth - 1, ply + 1, -beta, -alpha)?;

            if score >= beta {
                return Ok(score);
            }

            if score > alpha {
                alpha = score;
                self.save_best(ply, mv);
            }
        }

        Ok(alpha)
    }
}

impl Default for Search {
    #[inline(always)]
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    fn search(fen: &str, depth: usize) -> SearchResult {
        let position: Position = fen.parse().unwrap();
        Search::default().search_fixed_depth(&position, depth).unwrap()
    }

    fn ensure_is_mate_in(fen: &str, depth: usize, moves: i32) {
        let res = search(fen, depth);
        assert!(
            res.score.is_mate(),
            "Search on {fen:?} at depth {depth} produced result that is not mate.\nResult: {res:#?}"
        );
        assert_eq!(
            res.score.moves_to_mate(),
            moves,
            "Search on {fen:?} at depth {depth} produced result not mate in {moves}.\nResult: {res:#?}"
        );
    }

    #[test]
    fn test_white_mate_in_1() {
        let fen = "k7/8/KQ6/8/8/8/8/8 w - - 0 1";
        ensure_is_mate_in(fen, 2, 1);

        let position: Position = fen.parse().unwrap();
        let res = search(fen, 2);
        assert_eq!(res.score, Score::mate_in(1));
        assert_eq!(res.best_line.len(), 1);

        let mated = position.apply_move(res.bestmove().unwrap());
        assert!(mated.is_in_check());
        assert!(generate_legal_moves(&mated).unwrap().is_empty());
    }

    #[test]
    fn test_black_mated_in_1() {
        let fen = "1k6/8/KQ6/2Q5/8/8/8/8 b - - 0 1";
        ensure_is_mate_in(fen, 3, -1);
        assert_eq!(search(fen, 3).score, Score::mated_in(2));
    }

    #[test]
    fn test_stalemate() {
        let res = search("k7/8/KQ6/8/8/8/8/8 b - - 0 1", 3);
        assert!(res.bestmove().is_none());
        assert_eq!(res.score, Score::DRAW);
    }

    #[test]
    fn test_depth_zero_is_quiescence() {
        let position: Position = FEN_KIWIPETE.parse().unwrap();

        let mut search = Search::default();
        let res = search.search_fixed_depth(&position, 0).unwrap();

        let mut reference = Search::default();
        let quiet = reference
            .quiescence(&position, tune::max_quiescence_depth!(), 0, -Score::INF, Score::INF)
            .unwrap();

        assert_eq!(res.score, quiet);
        assert_eq!(res.stats.nodes, 0);
        assert!(res.stats.qnodes > 0);
    }

    #[test]
    fn test_takes_hanging_queen() {
        let res = search("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1", 3);
        let position: Position = "4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1".parse().unwrap();

        assert_eq!(res.bestmove(), Some(Move::from_notation(&position, "d2d5")));
        assert!(res.score > Score(300), "{res:#?}");
    }

    #[test]
    fn test_missing_king_is_an_error() {
        let position: Position = "8/8/8/8/8/8/4P3/8 w - - 0 1".parse().unwrap();
        assert!(Search::default().search_fixed_depth(&position, 2).is_err());
    }

    #[test]
    fn test_no_null_move_with_only_pawns() {
        let res = search("4k3/pppp4/8/8/8/8/PPPP4/4K3 w - - 0 1", 5);
        assert_eq!(res.stats.null_move_tries, 0);
        assert_eq!(res.stats.null_move_cutoffs, 0);
    }

    #[test]
    fn test_disabled_pruning_is_never_counted() {
        let position = Position::default();
        let mut search = Search::new(SearchConfig {
            depth: 4,
            params: SearchParameters::exhaustive(),
        });

        let res = search.start(&position).unwrap();
        assert_eq!(res.stats.null_move_tries, 0);
        assert_eq!(res.stats.razor_cutoffs, 0);
        assert_eq!(res.stats.futility_cutoffs, 0);
        assert_eq!(res.stats.lmr_researches, 0);
        assert!(res.bestmove().is_some());
    }

    #[test]
    fn test_searches_are_deterministic() {
        let a = search(FEN_KIWIPETE, 3);
        let b = search(FEN_KIWIPETE, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_best_line_is_playable() {
        let position: Position = FEN_KIWIPETE.parse().unwrap();
        let res = Search::default().search_fixed_depth(&position, 4).unwrap();
        assert!(!res.best_line.is_empty());

        let mut current = position;
        for mv in &res.best_line {
            let legal = generate_legal_moves(&current)
                .unwrap()
                .into_iter()
                .chain(generate_captures(&current).unwrap())
                .any(|candidate| candidate == *mv);
            assert!(legal, "{mv} is not playable in {current}");
            current = current.apply_move(*mv);
        }
    }

    #[test]
    fn test_repetition_of_game_history() {
        let start = Position::default();
        let mut keys = vec![start.key()];
        let mut current = start;
        for notation in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            current = current.apply_move(Move::from_notation(&current, notation));
            keys.push(current.key());
        }
        // The root is the starting position again
        assert_eq!(current.key(), start.key());
        keys.pop();

        let mut search = Search::default();
        search.set_game_history(keys);
        search.reset();
        assert!(search.visit(&current, 0));

        // Without history the root is fresh
        let mut search = Search::default();
        search.reset();
        assert!(!search.visit(&current, 0));
    }

    #[test]
    fn test_history_survives_searches() {
        let position: Position = FEN_KIWIPETE.parse().unwrap();
        let mut search = Search::default();
        search.search_fixed_depth(&position, 4).unwrap();

        assert!(search.history().iter().flatten().any(|score| *score > 0));

        search.clear_history();
        assert!(search.history().iter().flatten().all(|score| *score == 0));
    }
}
