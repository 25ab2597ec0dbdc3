use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use connect4_game::board::{Board, Cell, Position};
use connect4_game::{HEIGHT, WIDTH};

/// Draws the board in place, marking any `highlights` (a winning run,
/// floating pieces) with a white background.
pub fn draw(board: &Board, highlights: &[Position]) -> Result<()> {
    let mut stdout = stdout();

    let cols: String = (1..=WIDTH).map(|x| x.to_string()).collect();
    stdout.queue(PrintStyledContent(style(cols + "\n")))?;
    for _ in 0..HEIGHT {
        stdout.queue(PrintStyledContent(style("\n")))?;
    }
    stdout.flush()?;

    let (origin_x, origin_y) = crossterm::cursor::position()?;

    for x in 0..WIDTH {
        for y in 0..HEIGHT {
            let position = Position::new(x, y);
            let (pos_x, pos_y) = (origin_x + x as u16, origin_y - (HEIGHT - 1 - y) as u16);

            let background = if highlights.contains(&position) {
                Color::White
            } else {
                Color::DarkBlue
            };

            stdout
                .queue(MoveTo(pos_x, pos_y))?
                .queue(PrintStyledContent(
                    style("O")
                        .attribute(Attribute::Bold)
                        .on(background)
                        .with(match board.get(position) {
                            Cell::Red => Color::Red,
                            // cyan reads better on the dark blue board
                            Cell::Blue => Color::Cyan,
                            Cell::Empty => background,
                        }),
                ))?;
        }
    }
    stdout
        .queue(MoveTo(origin_x + WIDTH as u16, origin_y))?
        .queue(PrintStyledContent(style("\n")))?;
    stdout.flush()?;
    Ok(())
}
