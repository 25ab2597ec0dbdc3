use anyhow::Result;

use std::io::{stdin, stdout, Stdin, Write};
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;

use connect4_game::board::{Board, BoardChanged, Cell, Position};
use connect4_game::solver::Solver;
use connect4_game::state::{GameState, Phase};
use connect4_game::{HEIGHT, WIDTH};

mod display;

const STATE_FILE: &str = "gamestate.bin";
const BOARD_FILE: &str = "board.bin";

fn prompt(stdin: &Stdin, message: &str) -> Result<String> {
    print!("{}", message);
    stdout().flush()?;
    let mut buffer = String::new();
    stdin.read_line(&mut buffer)?;
    Ok(buffer.trim().to_lowercase())
}

// true if any change notifications arrived since the last check
fn drain(events: &Receiver<BoardChanged>) -> bool {
    let mut changed = false;
    while events.try_recv().is_ok() {
        changed = true;
    }
    changed
}

fn choose_ai_player(stdin: &Stdin) -> Result<Cell> {
    loop {
        let input = prompt(stdin, "Should the computer play (r)ed, (b)lue or (n)either? ")?;
        match input.chars().next() {
            Some('r') => return Ok(Cell::Red),
            Some('b') => return Ok(Cell::Blue),
            Some('n') => return Ok(Cell::Empty),
            _ => println!("Unknown answer given"),
        }
    }
}

fn main() -> Result<()> {
    let mut board = Board::new();
    let mut state = GameState::new();
    let board_events = board.subscribe();

    let stdin = stdin();

    println!("Welcome to Connect 4\n");
    display::draw(&board, &[]).expect("Failed to draw board!");

    loop {
        // redraw whenever the board reports a change
        if drain(&board_events) {
            display::draw(&board, &[]).expect("Failed to draw board!");
        }

        match state.phase() {
            Phase::Start => {
                let input = prompt(&stdin, "(n)ew game, (e)dit board, (l)oad game or (q)uit: ")?;
                match input.chars().next() {
                    Some('n') => {
                        state.set_ai_player(choose_ai_player(&stdin)?);
                        state.set_phase(Phase::Play);
                        state.set_current_player(board.start_player());
                    }
                    Some('e') => {
                        println!("Edit mode");
                        state.set_phase(Phase::Edit);
                    }
                    Some('l') => {
                        let loaded = state
                            .load_from_file(STATE_FILE)
                            .and_then(|_| board.load_from_file(BOARD_FILE));
                        match loaded {
                            Ok(()) => println!("Load successful."),
                            Err(_) => println!("An error occurred while loading or no save exists."),
                        }
                    }
                    Some('q') => break,
                    _ => println!("Unknown answer given"),
                }
            }

            Phase::Edit => {
                let input = prompt(
                    &stdin,
                    "edit: (r)ed/(b)lue/(n)one picks a color, 'column row' places it, (d)one: ",
                )?;
                match input.as_str() {
                    "r" => {
                        state.set_edit_color(Cell::Red);
                        println!("RED selected");
                    }
                    "b" => {
                        state.set_edit_color(Cell::Blue);
                        println!("BLUE selected");
                    }
                    "n" => {
                        state.set_edit_color(Cell::Empty);
                        println!("NONE selected");
                    }
                    "d" => {
                        // the edited position must be reachable in a real game
                        // before play can start on it
                        let mut valid = true;
                        let mut error_message = String::new();

                        let error_player = board.error_color();
                        if !error_player.is_empty() {
                            error_message = format!("Too many {}S", error_player);
                            valid = false;
                        }

                        let winner = board.winner();
                        if !winner.is_empty() {
                            error_message = format!("{} already won", winner);
                            valid = false;
                        }

                        if let Some(floating) = board.floating_pieces() {
                            error_message = "There are floating pieces".to_string();
                            display::draw(&board, &floating).expect("Failed to draw board!");
                            valid = false;
                        }

                        if valid {
                            state.set_ai_player(choose_ai_player(&stdin)?);
                            state.set_phase(Phase::Play);
                            state.set_current_player(board.start_player());
                        } else {
                            println!("{}", error_message);
                        }
                    }
                    _ => {
                        let coords: Vec<usize> = input
                            .split_whitespace()
                            .filter_map(|token| token.parse().ok())
                            .collect();
                        match coords.as_slice() {
                            [column, row]
                                if (1..=WIDTH).contains(column) && (1..=HEIGHT).contains(row) =>
                            {
                                board.set(Position::new(column - 1, row - 1), state.edit_color());
                            }
                            _ => println!("Unknown answer given"),
                        }
                    }
                }
            }

            Phase::Play => {
                let player = state.current_player();
                if player.is_empty() {
                    // no starting player could be picked, the board needs
                    // fixing up in edit mode first
                    println!("Invalid board, no player can start");
                    state.set_phase(Phase::Start);
                    continue;
                }

                let column = if player == state.ai_player() {
                    println!("AI is thinking...");
                    stdout().flush().expect("failed to flush to stdout!");

                    // pacing for the human watching, the search itself runs
                    // to completion regardless
                    thread::sleep(Duration::from_millis(500));

                    // the solver gets a private copy, never the live board
                    let mut solver = Solver::new(board.clone());
                    let column = solver.best_move(player);
                    println!("AI drops into column {}", column + 1);
                    column
                } else {
                    let input = prompt(
                        &stdin,
                        &format!("{}'s turn, column 1-{} or (s)ave: ", player, WIDTH),
                    )?;
                    if input == "s" {
                        let saved = state
                            .save_to_file(STATE_FILE)
                            .and_then(|_| board.save_to_file(BOARD_FILE));
                        match saved {
                            Ok(()) => println!("Save successful."),
                            Err(_) => println!("An error occurred while saving."),
                        }
                        continue;
                    }
                    match input.parse::<usize>() {
                        Ok(column @ 1..=WIDTH) => column - 1,
                        _ => {
                            println!("Invalid column: {}", input);
                            continue;
                        }
                    }
                };

                if board.drop_piece(column, player) {
                    let winner = board.winner();
                    if winner.is_empty() {
                        state.next_turn();
                    } else {
                        state.set_phase(Phase::Win);
                    }

                    // no winner and no space left must be a draw
                    if board.piece_count(Cell::Empty) == 0 && state.phase() != Phase::Win {
                        state.set_phase(Phase::Draw);
                    }
                } else {
                    println!("Invalid move, column {} full", column + 1);
                }
            }

            // end states
            Phase::Win => {
                drain(&board_events);
                match board.winning_pieces() {
                    Some(run) => display::draw(&board, &run).expect("Failed to draw board!"),
                    None => display::draw(&board, &[]).expect("Failed to draw board!"),
                }
                println!("{} won!", state.current_player());
                break;
            }
            Phase::Draw => {
                drain(&board_events);
                display::draw(&board, &[]).expect("Failed to draw board!");
                println!("Draw :(");
                break;
            }
        }
    }
    Ok(())
}
