/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::io::Cursor;

use rand::{rngs::StdRng, SeedableRng};
use sable::*;

fn search_with(fen: &str, depth: usize, params: SearchParameters) -> SearchResult {
    let position: Position = fen.parse().unwrap();
    let mut search = Search::new(SearchConfig { depth, params });
    search.start(&position).unwrap()
}

#[test]
fn test_back_rank_mate_is_found() {
    let fen = "6k1/5ppp/8/8/8/8/5PPP/3Q2K1 w - - 0 1";
    let position: Position = fen.parse().unwrap();
    let res = search_with(fen, 3, SearchParameters::default());

    assert_eq!(res.score, Score::mate_in(1), "{res:#?}");
    assert_eq!(res.bestmove(), Some(Move::from_notation(&position, "d1d8")));
}

#[test]
fn test_pruning_keeps_mates() {
    let fen = "6k1/5ppp/8/8/8/8/5PPP/3Q2K1 w - - 0 1";
    for params in [SearchParameters::default(), SearchParameters::exhaustive()] {
        let res = search_with(fen, 4, params);
        assert_eq!(res.score, Score::mate_in(1), "{params:?}");
    }
}

#[test]
fn test_mirrored_positions_search_alike() {
    let white = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    let black = "rnbqkb1r/pppp1ppp/5n2/4p3/4P3/2N5/PPPP1PPP/R1BQKBNR b KQkq - 2 3";

    // Without pruning the root score is exact, so move order cannot change it
    let a = search_with(white, 3, SearchParameters::exhaustive());
    let b = search_with(black, 3, SearchParameters::exhaustive());

    assert_eq!(a.score, b.score);
}

#[test]
fn test_startpos_depth_one() {
    let position = Position::default();
    let res = Search::default().search_fixed_depth(&position, 1).unwrap();

    assert_eq!(res.stats.root_moves, 20);
    let legal = generate_legal_moves(&position).unwrap();
    assert_eq!(legal.len(), 20);
    assert!(legal.contains(&res.bestmove().unwrap()));
    assert!(!res.score.is_mate());
}

#[test]
fn test_mirrored_positions_at_depth_one() {
    let white = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    let black = "rnbqkb1r/pppp1ppp/5n2/4p3/4P3/2N5/PPPP1PPP/R1BQKBNR b KQkq - 2 3";

    let a = search_with(white, 1, SearchParameters::default());
    let b = search_with(black, 1, SearchParameters::default());

    assert_eq!(a.score, b.score);
    assert_eq!(a.stats.root_moves, b.stats.root_moves);
}

#[test]
fn test_search_counts_work() {
    let res = search_with(FEN_KIWIPETE, 4, SearchParameters::default());

    assert!(res.stats.nodes > 0);
    assert!(res.stats.qnodes > 0);
    assert!(res.stats.beta_cutoffs > 0);
    assert!(res.stats.null_move_cutoffs <= res.stats.null_move_tries);
    assert_eq!(res.stats.total_nodes(), res.stats.nodes + res.stats.qnodes);
}

#[test]
fn test_pruning_saves_nodes() {
    let pruned = search_with(FEN_KIWIPETE, 4, SearchParameters::default());
    let exhaustive = search_with(FEN_KIWIPETE, 4, SearchParameters::exhaustive());

    assert!(pruned.stats.total_nodes() < exhaustive.stats.total_nodes());
}

#[test]
fn test_bare_kings() {
    let res = search_with("8/8/4k3/8/8/4K3/8/8 w - - 0 1", 4, SearchParameters::default());
    assert!(res.bestmove().is_some());
    assert!(!res.score.is_mate());
}

#[test]
fn test_book_then_search() {
    let start = Position::default();
    let e4 = Move::from_notation(&start, "e2e4");

    let record = BookEntry {
        key: start.key().inner(),
        mv: BookEntry::encode_move(e4),
        score: 100,
        learn: 0,
    };
    let mut book = Book::from_reader(Cursor::new(record.to_bytes().to_vec())).unwrap();

    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(book.pick_move(&start, &mut rng).unwrap(), Some(e4));

    // Out of book, the search takes over
    let after = start.apply_move(e4);
    assert_eq!(book.pick_move(&after, &mut rng).unwrap(), None);

    let res = Search::default().search_fixed_depth(&after, 3).unwrap();
    assert!(generate_legal_moves(&after)
        .unwrap()
        .contains(&res.bestmove().unwrap()));
}
