use crate::board::{ALL_SQUARES, Board, Color};
use crate::pst::{EG_TABLE, ENDGAME_PIECE_COUNT, MG_TABLE, PIECE_VALUE};
use crate::types::{BLACK_MATE, Score, WHITE_MATE};

/// Table index for a White piece. The tables are stored rank-8-first
/// (a8 = 0); flipping the LERF rank with `^ 56` lands a White piece on its
/// own side of the table.
#[inline]
fn table_index_white(sq: crate::board::Square) -> usize {
    sq.index() ^ 56
}

/// Black pieces read the table through the vertical mirror, which in LERF
/// is the raw square index.
#[inline]
fn table_index_black(sq: crate::board::Square) -> usize {
    sq.index()
}

/// Static evaluation in centipawns from White's perspective (positive
/// means White is better). Material plus piece-square bonuses; with
/// `ENDGAME_PIECE_COUNT` or fewer pieces left the pawn and king read their
/// endgame tables instead.
pub fn evaluate(board: &Board) -> Score {
    // checkmate is normally the search's business, this is the backstop
    if board.is_checkmate() {
        return match board.side_to_move() {
            Color::White => BLACK_MATE,
            Color::Black => WHITE_MATE,
        };
    }

    let endgame = board.occupied().count() <= ENDGAME_PIECE_COUNT;
    let tables = if endgame { &EG_TABLE } else { &MG_TABLE };

    let mut white_score: Score = 0;
    let mut black_score: Score = 0;

    for sq in ALL_SQUARES {
        if let (Some(piece), Some(color)) = (board.piece_on(sq), board.color_on(sq)) {
            let idx = piece.index();
            match color {
                Color::White => {
                    white_score += PIECE_VALUE[idx];
                    white_score += tables[idx][table_index_white(sq)];
                }
                Color::Black => {
                    black_score += PIECE_VALUE[idx];
                    black_score += tables[idx][table_index_black(sq)];
                }
            }
        }
    }

    white_score - black_score
}


// Hard phase switch rather than a tapered blend: count the pieces, at 18 or
// fewer swap in the endgame pawn/king tables. The endgame pawn table is the
// dramatic one (a 7th-rank pawn jumps from 50 to 400), which is what drives
// the engine to actually promote in pawn endings.
