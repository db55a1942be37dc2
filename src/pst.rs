// Tables are written from White's perspective with index 0 = a8 and
// index 63 = h1 (rank 8 first), the orientation the classic
// simplified-evaluation tables use. The board's LERF squares convert with
// `sq ^ 56` for White and pass through unchanged for Black; evaluation.rs
// owns that mapping.

use crate::types::Score;

/// material values indexed by Piece discriminant
pub const PIECE_VALUE: [Score; 6] = [100, 320, 330, 500, 900, 20_000];

/// with this many pieces or fewer on the board (both sides), the endgame
/// tables take over
pub const ENDGAME_PIECE_COUNT: u32 = 18;

pub const PAWN_MG: [Score; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     5,  0,  0, 20, 20,  0,  0,  5,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

pub const PAWN_EG: [Score; 64] = [
      0,  0,  0,  0,  0,  0,  0,  0,
    400,400,400,400,400,400,400,400,
    200,200,200,200,200,200,200,200,
    100,100,100,100,100,100,100,100,
     50, 50, 50, 50, 50, 50, 50, 50,
     10, 10, 10, 10, 10, 10, 10, 10,
      0,  0,  0,  0,  0,  0,  0,  0,
      0,  0,  0,  0,  0,  0,  0,  0,
];

pub const KNIGHT: [Score; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

pub const BISHOP: [Score; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-30,-10,-10,-30,-10,-20,
];

pub const ROOK: [Score; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0, 10, 10,  0,  0,  0,
];

pub const QUEEN: [Score; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

pub const KING_MG: [Score; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 50, 10,  0,  0, 10, 50, 20,
];

pub const KING_EG: [Score; 64] = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

/// middlegame tables indexed by Piece discriminant
pub const MG_TABLE: [[Score; 64]; 6] = [PAWN_MG, KNIGHT, BISHOP, ROOK, QUEEN, KING_MG];

/// endgame tables; only pawn and king change shape
pub const EG_TABLE: [[Score; 64]; 6] = [PAWN_EG, KNIGHT, BISHOP, ROOK, QUEEN, KING_EG];
