//! A two-player game of Connect 4 with an optional computer opponent
//!
//! The computer opponent uses a fixed-depth game tree search with a
//! heuristic evaluation to pick its moves.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_game::{board::{Board, Cell}, solver::Solver};
//!
//! let mut board = Board::new();
//! board.drop_piece(3, Cell::Red);
//!
//! // the solver searches a private copy, the live board is untouched
//! let mut solver = Solver::new(board.clone());
//! let column = solver.best_move(Cell::Blue);
//!
//! assert!(column < connect4_game::WIDTH);
//! ```

use static_assertions::*;
pub use anyhow;

pub mod board;

pub mod solver;

pub mod state;


/// The width of the game board in tiles
pub const WIDTH: usize = 7;

/// The height of the game board in tiles
pub const HEIGHT: usize = 6;

// the win and evaluation scans assume a 4-window fits along every axis
const_assert!(WIDTH >= 4);
const_assert!(HEIGHT >= 4);
