//! The game board: a 7x6 grid of colored cells

use anyhow::{anyhow, Result};
use byteorder::{ReadBytesExt, WriteBytesExt};
use rand::Rng;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::{HEIGHT, WIDTH};

/// The contents of a single board cell.
///
/// `Empty` also stands in for "no player" in queries that answer with a
/// color: no winner, no leading color, no start player. Each such method
/// documents which meaning applies.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Cell {
    Empty,
    Blue,
    Red,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            _ => false,
        }
    }

    /// The other real color; `Empty` has no opponent and maps to itself.
    pub fn opponent(&self) -> Cell {
        match self {
            Cell::Blue => Cell::Red,
            Cell::Red => Cell::Blue,
            Cell::Empty => Cell::Empty,
        }
    }

    /// The stable one-byte encoding used by the save file formats.
    pub fn to_byte(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Blue => 1,
            Cell::Red => 2,
        }
    }

    /// Decodes a byte written by [`to_byte`](Self::to_byte).
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Cell::Empty),
            1 => Ok(Cell::Blue),
            2 => Ok(Cell::Red),
            _ => Err(anyhow!("invalid cell value in save data: {}", byte)),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Cell::Empty => write!(f, "NONE"),
            Cell::Blue => write!(f, "BLUE"),
            Cell::Red => write!(f, "RED"),
        }
    }
}

/// A cell coordinate: `x` counts columns left to right, `y` counts rows
/// from the top of the board down.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Marker sent to subscribers when the board contents change.
/// Carries no payload; receivers re-read the grid.
#[derive(Copy, Clone, Debug)]
pub struct BoardChanged;

pub struct Board {
    // cells are stored column-major, row 0 at the top
    cells: [[Cell; HEIGHT]; WIDTH],
    listeners: Vec<Sender<BoardChanged>>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; HEIGHT]; WIDTH],
            listeners: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        WIDTH
    }

    pub fn height(&self) -> usize {
        HEIGHT
    }

    /// Returns the cell at `position`.
    ///
    /// Panics if the position is off the board; callers are expected to
    /// stay in bounds.
    pub fn get(&self, position: Position) -> Cell {
        self.cells[position.x][position.y]
    }

    /// Writes `cell` directly at `position` and notifies subscribers.
    ///
    /// This is the edit-mode entry point: it does not apply gravity, so it
    /// can leave pieces floating. Panics if the position is off the board.
    pub fn set(&mut self, position: Position, cell: Cell) {
        self.cells[position.x][position.y] = cell;
        self.notify();
    }

    /// Registers a listener for change notifications. Every mutation on the
    /// notifying path sends one [`BoardChanged`] to each live subscriber.
    pub fn subscribe(&mut self) -> Receiver<BoardChanged> {
        let (sender, receiver) = channel();
        self.listeners.push(sender);
        receiver
    }

    fn notify(&mut self) {
        // drop listeners whose receiving end has gone away
        self.listeners.retain(|sender| sender.send(BoardChanged).is_ok());
    }

    // places a piece in the lowest empty row of the column, bottom-up scan
    fn drop_into(&mut self, column: usize, cell: Cell) -> bool {
        for row in (0..HEIGHT).rev() {
            if self.cells[column][row].is_empty() {
                self.cells[column][row] = cell;
                return true;
            }
        }
        false
    }

    /// Drops a piece into `column` and lets it fall to the lowest empty
    /// row. Returns `false` without mutating if the column is full.
    /// Notifies subscribers on success.
    pub fn drop_piece(&mut self, column: usize, cell: Cell) -> bool {
        let success = self.drop_into(column, cell);
        if success {
            self.notify();
        }
        success
    }

    /// Same placement as [`drop_piece`](Self::drop_piece) but with no
    /// notification, so a search can try moves without paying for
    /// subscriber traffic.
    pub fn temporary_drop(&mut self, column: usize, cell: Cell) -> bool {
        self.drop_into(column, cell)
    }

    /// Removes the topmost piece in `column`, undoing a temporary drop.
    ///
    /// Only correct as the inverse of [`temporary_drop`](Self::temporary_drop)
    /// under strict last-in-first-out pairing: one undo per drop, in reverse
    /// order. Any other usage leaves the board in an unspecified (but
    /// structurally valid) state. Does not notify.
    pub fn undo_temporary_drop(&mut self, column: usize) {
        for row in 0..HEIGHT {
            if !self.cells[column][row].is_empty() {
                self.cells[column][row] = Cell::Empty;
                break;
            }
        }
    }

    /// Counts the cells holding `cell`. Counting all three values always
    /// totals the full grid.
    pub fn piece_count(&self, cell: Cell) -> usize {
        self.cells
            .iter()
            .flat_map(|column| column.iter())
            .filter(|&&c| c == cell)
            .count()
    }

    /// The real color with strictly more pieces on the board, or `Empty`
    /// when the counts are equal.
    pub fn leading_color(&self) -> Cell {
        let red = self.piece_count(Cell::Red);
        let blue = self.piece_count(Cell::Blue);
        if red > blue {
            Cell::Red
        } else if blue > red {
            Cell::Blue
        } else {
            Cell::Empty
        }
    }

    /// The color with too many pieces, or `Empty` when the board is
    /// balanced. Alternating turns can never put the counts more than one
    /// apart, so a larger gap marks an invalid board.
    pub fn error_color(&self) -> Cell {
        let red = self.piece_count(Cell::Red) as isize;
        let blue = self.piece_count(Cell::Blue) as isize;
        if (red - blue).abs() > 1 {
            self.leading_color()
        } else {
            Cell::Empty
        }
    }

    /// Which color should move next: the one with fewer pieces, or a coin
    /// flip when the counts are equal. Returns `Empty` when
    /// [`error_color`](Self::error_color) reports an imbalance, since no
    /// starting player is defined for an invalid board.
    pub fn start_player(&self) -> Cell {
        self.start_player_with(&mut rand::thread_rng())
    }

    /// [`start_player`](Self::start_player) with the coin-flip source
    /// supplied by the caller.
    pub fn start_player_with<R: Rng>(&self, rng: &mut R) -> Cell {
        if !self.error_color().is_empty() {
            return Cell::Empty;
        }
        match self.leading_color() {
            Cell::Red => Cell::Blue,
            Cell::Blue => Cell::Red,
            Cell::Empty => {
                if rng.gen::<bool>() {
                    Cell::Red
                } else {
                    Cell::Blue
                }
            }
        }
    }

    /// Finds all floating pieces: colored cells with an empty cell directly
    /// beneath them. Only direct edits can produce these, a drop never
    /// does. Returns `None` when the board has no floating pieces.
    pub fn floating_pieces(&self) -> Option<Vec<Position>> {
        let mut floating = Vec::new();
        for x in 0..WIDTH {
            for y in 0..HEIGHT - 1 {
                if !self.cells[x][y].is_empty() && self.cells[x][y + 1].is_empty() {
                    floating.push(Position::new(x, y));
                }
            }
        }
        if floating.is_empty() {
            None
        } else {
            Some(floating)
        }
    }

    /// The color holding a connect four, or `Empty` when nobody does.
    pub fn winner(&self) -> Cell {
        match self.winning_pieces() {
            Some(pieces) => self.get(pieces[0]),
            None => Cell::Empty,
        }
    }

    /// Locates the four cells of the winning run, if any.
    ///
    /// Axes are scanned in a fixed order: horizontal (columns left to
    /// right, rows top to bottom), then vertical, then each diagonal. The
    /// first completed run found is the one reported, so a board with
    /// several simultaneous connect fours always highlights the same run.
    /// Positions are listed from the run's anchor outward; horizontal runs
    /// come back in increasing-x order.
    pub fn winning_pieces(&self) -> Option<[Position; 4]> {
        // horizontal
        for x in 0..WIDTH - 3 {
            for y in 0..HEIGHT {
                if let Some(run) = self.run_at(x, y, 1, 0) {
                    return Some(run);
                }
            }
        }
        // vertical
        for x in 0..WIDTH {
            for y in 0..HEIGHT - 3 {
                if let Some(run) = self.run_at(x, y, 0, 1) {
                    return Some(run);
                }
            }
        }
        // diagonal, down-right
        for x in 0..WIDTH - 3 {
            for y in 0..HEIGHT - 3 {
                if let Some(run) = self.run_at(x, y, 1, 1) {
                    return Some(run);
                }
            }
        }
        // diagonal, down-left
        for x in 3..WIDTH {
            for y in 0..HEIGHT - 3 {
                if let Some(run) = self.run_at(x, y, -1, 1) {
                    return Some(run);
                }
            }
        }
        None
    }

    // checks the 4-cell run anchored at (x, y) stepping by (dx, dy)
    fn run_at(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<[Position; 4]> {
        let color = self.cells[x][y];
        if color.is_empty() {
            return None;
        }
        let mut run = [Position::new(x, y); 4];
        for i in 1..4 {
            let cx = (x as isize + i as isize * dx) as usize;
            let cy = (y as isize + i as isize * dy) as usize;
            if self.cells[cx][cy] != color {
                return None;
            }
            run[i] = Position::new(cx, cy);
        }
        Some(run)
    }

    /// Clears every cell and notifies subscribers.
    pub fn reset(&mut self) {
        self.cells = [[Cell::Empty; HEIGHT]; WIDTH];
        self.notify();
    }

    /// Writes the grid to `path` as one byte per cell, column by column.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        for x in 0..WIDTH {
            for y in 0..HEIGHT {
                file.write_u8(self.cells[x][y].to_byte())?;
            }
        }
        Ok(())
    }

    /// Replaces the grid with the contents of a file written by
    /// [`save_to_file`](Self::save_to_file), then notifies subscribers.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut file = BufReader::new(File::open(path)?);
        let mut cells = [[Cell::Empty; HEIGHT]; WIDTH];
        for column in cells.iter_mut() {
            for cell in column.iter_mut() {
                *cell = Cell::from_byte(file.read_u8()?)?;
            }
        }
        self.cells = cells;
        self.notify();
        Ok(())
    }
}

impl Clone for Board {
    /// A deep copy of the grid. Subscriptions stay with the original, so a
    /// clone can be mutated (by a search, say) without alerting anyone.
    fn clone(&self) -> Self {
        Self {
            cells: self.cells,
            listeners: Vec::new(),
        }
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
