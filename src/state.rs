//! The state of a game session: which screen is active, whose turn it is
//! and which player the computer controls

use anyhow::{anyhow, Result};
use byteorder::{ReadBytesExt, WriteBytesExt};

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::board::Cell;

/// The screens the game moves through.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Phase {
    Start,
    Edit,
    Play,
    Win,
    Draw,
}

impl Phase {
    // stable encoding for the save file format
    fn to_byte(self) -> u8 {
        match self {
            Phase::Start => 0,
            Phase::Edit => 1,
            Phase::Play => 2,
            Phase::Win => 3,
            Phase::Draw => 4,
        }
    }

    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Phase::Start),
            1 => Ok(Phase::Edit),
            2 => Ok(Phase::Play),
            3 => Ok(Phase::Win),
            4 => Ok(Phase::Draw),
            _ => Err(anyhow!("invalid phase value in save data: {}", byte)),
        }
    }
}

/// Marker sent to subscribers when the session state changes.
#[derive(Copy, Clone, Debug)]
pub struct StateChanged;

/// The session state around the board: the current [`Phase`], whose turn it
/// is, the color placed while editing, and which player (if any) the
/// computer controls.
pub struct GameState {
    phase: Phase,
    edit_color: Cell,
    current_player: Cell,
    ai_player: Cell,
    listeners: Vec<Sender<StateChanged>>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Start,
            edit_color: Cell::Empty,
            current_player: Cell::Empty,
            ai_player: Cell::Empty,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener for change notifications.
    pub fn subscribe(&mut self) -> Receiver<StateChanged> {
        let (sender, receiver) = channel();
        self.listeners.push(sender);
        receiver
    }

    fn notify(&mut self) {
        self.listeners.retain(|sender| sender.send(StateChanged).is_ok());
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Moves to a new phase and notifies subscribers.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.notify();
    }

    pub fn edit_color(&self) -> Cell {
        self.edit_color
    }

    /// Updates the color placed by edit actions. Only accepted while in
    /// [`Phase::Edit`]; ignored otherwise.
    pub fn set_edit_color(&mut self, color: Cell) {
        if self.phase == Phase::Edit {
            self.edit_color = color;
        }
    }

    /// The player whose turn it is, `Empty` before a game starts.
    pub fn current_player(&self) -> Cell {
        self.current_player
    }

    /// Sets whose turn it is and notifies subscribers. `Empty` is not a
    /// player and is ignored.
    pub fn set_current_player(&mut self, player: Cell) {
        if !player.is_empty() {
            self.current_player = player;
            self.notify();
        }
    }

    /// Hands the turn to the other player.
    pub fn next_turn(&mut self) {
        let next = match self.current_player {
            Cell::Blue => Cell::Red,
            _ => Cell::Blue,
        };
        self.set_current_player(next);
    }

    /// The computer-controlled player, `Empty` when both seats are human.
    pub fn ai_player(&self) -> Cell {
        self.ai_player
    }

    pub fn set_ai_player(&mut self, player: Cell) {
        self.ai_player = player;
        self.notify();
    }

    /// Writes the session state to `path`: one byte each for the phase, the
    /// current player and the computer player. The edit color is transient
    /// and not saved.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        file.write_u8(self.phase.to_byte())?;
        file.write_u8(self.current_player.to_byte())?;
        file.write_u8(self.ai_player.to_byte())?;
        Ok(())
    }

    /// Replaces the session state with the contents of a file written by
    /// [`save_to_file`](Self::save_to_file), then notifies subscribers.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut file = BufReader::new(File::open(path)?);
        let phase = Phase::from_byte(file.read_u8()?)?;
        let current_player = Cell::from_byte(file.read_u8()?)?;
        let ai_player = Cell::from_byte(file.read_u8()?)?;

        self.phase = phase;
        self.current_player = current_player;
        self.ai_player = ai_player;
        self.notify();
        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
