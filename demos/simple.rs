use grid_dijkstra::{find_path, CellGrid, CellTag};

// In this example a path is found on a grid with shape
// S..#.
// .#.#.
// .#...
// .##.E
// S marks the start
// E marks the end
fn main() {
    env_logger::init();
    let mut grid: CellGrid = "
        S..#.
        .#.#.
        .#...
        .##.E
    "
    .parse()
    .expect("layout is well-formed");
    let start = grid.find_tag(CellTag::Start).next().expect("layout has a start");
    let end = grid.find_tag(CellTag::End).next().expect("layout has an end");
    match find_path(&mut grid, start, end, &mut || {}) {
        Ok(outcome) => {
            println!("{outcome}");
            print!("{grid}");
        }
        Err(e) => eprintln!("search failed: {e}"),
    }
}
