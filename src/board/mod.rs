mod attacks;
mod bitboard;
#[allow(clippy::module_inception)]
mod board;
mod chessmove;
mod magic;
mod movegen;
mod piece;
mod square;

pub use bitboard::{BitBoard, EMPTY};
pub use board::{BK, BQ, Board, BoardStatus, START_FEN, WK, WQ};
pub use chessmove::ChessMove;
pub use piece::{Color, Piece};
pub use square::{ALL_SQUARES, File, Rank, Square};

/// Warm up the attack tables. Everything also initializes lazily on first
/// use; calling this at startup keeps the cost out of the first search.
pub fn init() {
    attacks::init();
}
