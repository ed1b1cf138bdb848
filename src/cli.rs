/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use sable::{
    format_line, generate_captures, generate_legal_moves, reorder, splitperft, Book, Evaluator,
    Position, Search, SearchConfig, SearchParameters, DEFAULT_DEPTH, FEN_STARTPOS,
};

/// Drive the move generator and search from the command line.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Position to work on.
    #[arg(short, long, default_value = FEN_STARTPOS)]
    pub fen: Position,

    #[command(subcommand)]
    pub command: Command,
}

/// A command to execute on the position.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Search the position to a fixed depth and print the score and best line.
    Search {
        /// Depth of the search, in plies.
        #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
        depth: usize,

        /// Disable razoring.
        #[arg(long, default_value = "false")]
        no_razoring: bool,

        /// Disable futility pruning.
        #[arg(long, default_value = "false")]
        no_futility: bool,

        /// Disable null move pruning.
        #[arg(long, default_value = "false")]
        no_null_move: bool,

        /// Disable late move reductions.
        #[arg(long, default_value = "false")]
        no_lmr: bool,

        /// If set, search counters are printed after the result.
        #[arg(short, long, default_value = "false")]
        stats: bool,
    },

    /// Performs a perft on the position at the supplied depth, printing total node count.
    Perft {
        depth: usize,

        /// If set, the node count below every root move is printed as well.
        #[arg(short, long, default_value = "false")]
        split: bool,
    },

    /// Shows all legal moves in the position.
    Moves {
        /// Only show the captures searched by quiescence.
        #[arg(short, long, default_value = "false")]
        captures: bool,

        /// If set, moves are shown in search order instead of generation order.
        #[arg(short, long, default_value = "false")]
        ordered: bool,

        /// If set, moves will be printed using their debug formatter.
        #[arg(short, long, default_value = "false")]
        debug: bool,
    },

    /// Print an evaluation of the position.
    Eval,

    /// Look the position up in an opening book.
    Book {
        /// Path to the book file.
        path: PathBuf,

        /// Seed for choosing between the best book moves.
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

impl Cli {
    /// Executes the parsed command, printing its results.
    pub fn run(self) -> Result<()> {
        let position = self.fen;

        match self.command {
            Command::Search {
                depth,
                no_razoring,
                no_futility,
                no_null_move,
                no_lmr,
                stats,
            } => {
                let params = SearchParameters {
                    razoring: !no_razoring,
                    futility_pruning: !no_futility,
                    null_move_pruning: !no_null_move,
                    late_move_reductions: !no_lmr,
                    ..Default::default()
                };

                let mut search = Search::new(SearchConfig { depth, params });
                let res = search.start(&position)?;

                println!("score {}", res.score);
                println!("line {}", format_line(&res.best_line));
                match res.bestmove() {
                    Some(mv) => println!("bestmove {mv}"),
                    None => println!("bestmove (none)"),
                }

                if stats {
                    println!("{}", res.stats);
                }
            }

            Command::Perft { depth, split } => {
                let counts = splitperft(&position, depth)?;
                if split {
                    for (mv, nodes) in &counts {
                        println!("{}: {nodes}", mv.notation());
                    }
                    println!();
                }

                let total: u64 = if depth == 0 {
                    1
                } else {
                    counts.iter().map(|(_, nodes)| nodes).sum()
                };
                println!("{total}");
            }

            Command::Moves {
                captures,
                ordered,
                debug,
            } => {
                let mut moves = if captures {
                    generate_captures(&position)?
                } else {
                    generate_legal_moves(&position)?
                };

                if ordered {
                    reorder(&position, &mut moves);
                }

                for mv in &moves {
                    if debug {
                        println!("{mv:?}");
                    } else {
                        println!("{mv}");
                    }
                }
                println!("{} moves", moves.len());
            }

            Command::Eval => {
                println!("{}", Evaluator::new(&position));
            }

            Command::Book { path, seed } => {
                let mut book = Book::open(&path)?;
                let candidates = book.candidates(&position)?;
                for (mv, entry) in &candidates {
                    println!("{mv} score {} learn {}", entry.score, entry.learn);
                }

                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };

                match book.pick_move(&position, &mut rng)? {
                    Some(mv) => println!("bookmove {mv}"),
                    None => println!("bookmove (none)"),
                }
            }
        }

        Ok(())
    }
}
