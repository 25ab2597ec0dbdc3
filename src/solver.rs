//! An agent to pick moves in a game of Connect 4

use crate::board::{Board, Cell, Position};
use crate::{HEIGHT, WIDTH};

/// The score of a position the moving player has already won
pub const MAX_SCORE: i32 = 10_000;
/// The score of a position the moving player has already lost
pub const MIN_SCORE: i32 = -10_000;

/// How many plies ahead the search looks. Fixed: it sets both the playing
/// strength and the response time.
pub const SEARCH_DEPTH: u32 = 7;

/// An agent to pick a column for the computer player
///
/// # Notes
/// The agent searches every line of play a fixed number of moves ahead and
/// scores the positions it reaches, so it will sometimes pass up an obvious
/// immediate win: if it already knows it can force a win later it considers
/// the lines equally good. The reverse also holds, a lost position can make
/// it play moves that look like giving up.
///
/// # Position Scoring
/// A position where the side to move has connected four scores
/// [`MAX_SCORE`], one where the opponent has scores [`MIN_SCORE`], and a
/// full board with no winner scores 0. Everything else gets a heuristic
/// value from [`evaluate`](Self::evaluate), which stays well inside those
/// bounds so a real win always dominates.
#[derive(Clone)]
pub struct Solver {
    board: Board,

    /// The number of nodes searched by this `Solver` so far (for diagnostics only)
    pub node_count: usize,
}

impl Solver {
    /// Creates a new `Solver` searching its own board.
    ///
    /// Hand it a clone: the solver mutates the board during the search
    /// (restoring it before returning), so it must never share a board with
    /// the live game or with another search.
    pub fn new(board: Board) -> Self {
        Self {
            board,
            node_count: 0,
        }
    }

    /// Picks the column for `player` to drop into.
    ///
    /// The board must have no winner and at least one empty cell; the
    /// choice is unspecified otherwise. Among equally scored columns the
    /// highest-numbered one wins.
    pub fn best_move(&mut self, player: Cell) -> usize {
        let (_, column) = self.negamax(SEARCH_DEPTH, player);
        column
    }

    /// Performs the full search, returning the score of the position for
    /// `player` along with the chosen column.
    pub fn solve(&mut self, player: Cell) -> (i32, usize) {
        self.negamax(SEARCH_DEPTH, player)
    }

    /// Performs game tree search
    ///
    /// Returns the negamax value of the position for `player` and the best
    /// column found at this node. Only the outermost call's column matters
    /// to callers; deeper frames report theirs upward just to share the
    /// return shape.
    fn negamax(&mut self, depth: u32, player: Cell) -> (i32, usize) {
        self.node_count += 1;

        let winner = self.board.winner();
        if winner == player {
            // the current player has already won, the best possible outcome
            return (MAX_SCORE, 0);
        } else if winner == player.opponent() {
            // the current player has already lost, the worst possible outcome
            return (MIN_SCORE, 0);
        }

        // a full board with no winner is a draw
        if self.board.piece_count(Cell::Empty) == 0 {
            return (0, 0);
        }

        // at the depth limit, score the position heuristically
        if depth == 0 {
            return (self.evaluate(player), 0);
        }

        let mut best_value = MIN_SCORE;
        let mut best_column = 0;
        for column in 0..WIDTH {
            // temporary moves skip subscriber notifications
            if self.board.temporary_drop(column, player) {
                let (value, _) = self.negamax(depth - 1, player.opponent());
                // the position's value flips sign for the other player
                let value = -value;
                // greater-or-equal, so later columns win ties
                if value >= best_value {
                    best_value = value;
                    best_column = column;
                }
                self.board.undo_temporary_drop(column);
            }
        }

        (best_value, best_column)
    }

    /// Evaluates the board from `player`'s perspective.
    ///
    /// Every possible connect four is checked for the progress made toward
    /// it: a window holding pieces of both colors is worth nothing, and a
    /// window holding `n` pieces of one color (and otherwise empty cells)
    /// is worth `n` squared, counting for `player` or against them. The
    /// squaring rewards nearly complete runs much more than scattered
    /// pieces.
    pub fn evaluate(&self, player: Cell) -> i32 {
        let mut total = 0;

        // horizontals
        total += self.windows_value(0, WIDTH - 3, HEIGHT, 1, 0, player);

        // verticals
        total += self.windows_value(0, WIDTH, HEIGHT - 3, 0, 1, player);

        // down-right diagonals
        total += self.windows_value(0, WIDTH - 3, HEIGHT - 3, 1, 1, player);

        // down-left diagonals
        total += self.windows_value(3, WIDTH, HEIGHT - 3, -1, 1, player);

        total
    }

    // sums the window scores for every anchor in the region, stepping each
    // window by (dx, dy)
    fn windows_value(
        &self,
        start_x: usize,
        max_x: usize,
        max_y: usize,
        dx: isize,
        dy: isize,
        player: Cell,
    ) -> i32 {
        let mut total = 0;

        for x in start_x..max_x {
            for y in 0..max_y {
                // the first color seen claims the window; a second color
                // spoils it for both players
                let mut window_color = Cell::Empty;
                let mut count = 0;
                let mut contested = false;
                for i in 0..4 {
                    let cx = (x as isize + i * dx) as usize;
                    let cy = (y as isize + i * dy) as usize;
                    let piece = self.board.get(Position::new(cx, cy));
                    if window_color.is_empty() {
                        window_color = piece;
                    }
                    if !piece.is_empty() {
                        if piece == window_color {
                            count += 1;
                        } else {
                            contested = true;
                        }
                    }
                }
                if !contested {
                    if window_color == player {
                        total += count * count;
                    } else {
                        total -= count * count;
                    }
                }
            }
        }

        total
    }
}

impl std::ops::Deref for Solver {
    type Target = Board;

    fn deref(&self) -> &Self::Target {
        &self.board
    }
}
