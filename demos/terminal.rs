//! Paints a layout through pointer positions like a window would and redraws the grid in the
//! terminal after every expansion and path step.
//!
//! Run with `RUST_LOG=info cargo run --example terminal`.
use grid_dijkstra::{CellGrid, Editor, EditorConfig, SearchObserver};
use grid_util::point::Point;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

const ROWS: usize = 12;
const EXTENT: u32 = 240;

struct TerminalRenderer {
    frame_delay: Duration,
    frames: usize,
}

impl TerminalRenderer {
    fn draw(&mut self, grid: &CellGrid) {
        self.frames += 1;
        let mut out = io::stdout().lock();
        // Clear the screen and move the cursor home before each frame
        let _ = write!(out, "\x1b[2J\x1b[H{grid}");
        let _ = out.flush();
        thread::sleep(self.frame_delay);
    }
}

impl SearchObserver for TerminalRenderer {
    fn on_path_step(&mut self, grid: &CellGrid) {
        self.draw(grid);
    }
    fn on_expand(&mut self, grid: &CellGrid, _point: Point) {
        self.draw(grid);
    }
}

fn main() {
    env_logger::init();
    let config = EditorConfig {
        rows: ROWS,
        extent: EXTENT,
    };
    let cell = config.cell_size();
    let mut editor = Editor::new(config);
    editor.solver.mark_expansion = true;
    let click = |row: usize, col: usize| {
        (
            row as u32 * cell + cell / 2,
            col as u32 * cell + cell / 2,
        )
    };

    editor.paint_at(click(1, 1));
    editor.paint_at(click(10, 10));
    for row in 0..9 {
        editor.paint_at(click(row, 4));
    }
    for row in 3..12 {
        editor.paint_at(click(row, 8));
    }

    let mut renderer = TerminalRenderer {
        frame_delay: Duration::from_millis(15),
        frames: 0,
    };
    match editor.run(&mut renderer) {
        Ok(status) => println!("{status}"),
        Err(e) => eprintln!("search failed: {e}"),
    }
    println!("{} frames drawn", renderer.frames);
}
