//! Development aid: loads a board file and drives it with a handful of
//! simulated concurrent players, to exercise the wait queue and watch set
//! under real contention. Not part of the library's public interface.

use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use memory_scramble::common::{Coordinate, PlayerId};
use memory_scramble::engine::Board;

const PLAYER_COUNT: usize = 3;
const MOVES_PER_PLAYER: usize = 8;

#[tokio::main]
async fn main() {
    env_logger::init();

    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("usage: scramble_demo <board-file>");
        std::process::exit(1);
    });
    let contents = fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("failed to read {path}: {e}");
        std::process::exit(1);
    });
    let (rows, columns, labels) = memory_scramble::interop::parse_board_file(&contents)
        .unwrap_or_else(|e| {
            eprintln!("failed to parse {path}: {e}");
            std::process::exit(1);
        });

    let board = Arc::new(Board::new(rows, columns, labels).unwrap_or_else(|e| {
        eprintln!("failed to build board: {e}");
        std::process::exit(1);
    }));

    let mut handles = Vec::with_capacity(PLAYER_COUNT);
    for n in 0..PLAYER_COUNT {
        let board = Arc::clone(&board);
        handles.push(tokio::spawn(simulate_player(board, n)));
    }
    for handle in handles {
        let _ = handle.await;
    }
}

async fn simulate_player(board: Arc<Board>, index: usize) {
    let player = PlayerId::from(format!("player-{index}"));
    let rows = board.rows();
    let columns = board.columns();

    for move_number in 0..MOVES_PER_PLAYER {
        let row = (index + move_number) % rows;
        let column = (index * 2 + move_number) % columns;
        let coord = Coordinate::new(row, column);

        match board.flip(&player, coord).await {
            Ok(render) => log::info!("{player} flipped {coord}\n{render}"),
            Err(e) => log::info!("{player} flip {coord} failed: {e}"),
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
