use super::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use super::bitboard::{BitBoard, EMPTY};
use super::board::{BK, BQ, Board, WK, WQ};
use super::chessmove::ChessMove;
use super::piece::{Color, Piece};
use super::square::{File, Rank, Square};

/// All legal moves for the side to move: pseudo-legal generation per piece
/// rules, then a make-and-test filter that drops anything leaving the
/// mover's own king attacked. Callers go through `Board::legal_moves`,
/// which memoizes the result.
pub(crate) fn legal_moves(board: &Board) -> Vec<ChessMove> {
    let us = board.side_to_move();
    let pseudo = pseudo_legal(board);

    let mut legal = Vec::with_capacity(pseudo.len());
    for mv in pseudo {
        let next = board.make_move(mv);
        let safe = match next.king_square(us) {
            Some(king) => !square_attacked(&next, king, !us),
            None => false, // own king gone, never legal
        };
        if safe {
            legal.push(mv);
        }
    }
    legal
}

/// is `sq` attacked by any piece of `by`
pub(crate) fn square_attacked(board: &Board, sq: Square, by: Color) -> bool {
    let attackers = board.color_pieces(by);
    let occupied = board.occupied();

    if !(knight_attacks(sq) & board.pieces(Piece::Knight) & attackers).is_empty() {
        return true;
    }
    // a pawn of `by` attacks sq exactly when a pawn of the other color on
    // sq would attack the pawn's square
    if !(pawn_attacks(!by, sq) & board.pieces(Piece::Pawn) & attackers).is_empty() {
        return true;
    }
    if !(bishop_attacks(sq, occupied)
        & (board.pieces(Piece::Bishop) | board.pieces(Piece::Queen))
        & attackers)
        .is_empty()
    {
        return true;
    }
    if !(rook_attacks(sq, occupied)
        & (board.pieces(Piece::Rook) | board.pieces(Piece::Queen))
        & attackers)
        .is_empty()
    {
        return true;
    }
    !(king_attacks(sq) & board.pieces(Piece::King) & attackers).is_empty()
}

/// moves that obey piece movement only; pins and checks are the filter's
/// problem
fn pseudo_legal(board: &Board) -> Vec<ChessMove> {
    let mut moves = Vec::with_capacity(64);
    let us = board.side_to_move();
    let our_pieces = board.color_pieces(us);
    let their_pieces = board.color_pieces(!us);
    let occupied = board.occupied();

    pawn_moves(board, us, our_pieces, their_pieces, !occupied, &mut moves);

    for sq in (board.pieces(Piece::Knight) & our_pieces).iter() {
        push_all(sq, knight_attacks(sq) & !our_pieces, &mut moves);
    }
    for sq in (board.pieces(Piece::Bishop) & our_pieces).iter() {
        push_all(sq, bishop_attacks(sq, occupied) & !our_pieces, &mut moves);
    }
    for sq in (board.pieces(Piece::Rook) & our_pieces).iter() {
        push_all(sq, rook_attacks(sq, occupied) & !our_pieces, &mut moves);
    }
    for sq in (board.pieces(Piece::Queen) & our_pieces).iter() {
        let rays = bishop_attacks(sq, occupied) | rook_attacks(sq, occupied);
        push_all(sq, rays & !our_pieces, &mut moves);
    }

    if let Some(king_sq) = board.king_square(us) {
        push_all(king_sq, king_attacks(king_sq) & !our_pieces, &mut moves);
        castle_moves(board, king_sq, us, occupied, &mut moves);
    }

    moves
}

#[inline]
fn push_all(src: Square, targets: BitBoard, moves: &mut Vec<ChessMove>) {
    for dst in targets.iter() {
        moves.push(ChessMove::new(src, dst, None));
    }
}

fn pawn_moves(
    board: &Board,
    us: Color,
    our_pieces: BitBoard,
    their_pieces: BitBoard,
    empty: BitBoard,
    moves: &mut Vec<ChessMove>,
) {
    let pawns = board.pieces(Piece::Pawn) & our_pieces;
    let (push_dir, start_rank, promo_rank): (i8, usize, usize) = match us {
        Color::White => (8, 1, 7),
        Color::Black => (-8, 6, 0),
    };

    for sq in pawns.iter() {
        let sq_idx = sq.index() as i8;

        // single push, then double from the home rank when both squares
        // are open
        let push_idx = sq_idx + push_dir;
        if (0..64).contains(&push_idx) {
            let push_sq = Square::new(push_idx as u8);
            if empty.contains(push_sq) {
                if push_sq.rank().index() == promo_rank {
                    push_promotions(sq, push_sq, moves);
                } else {
                    moves.push(ChessMove::new(sq, push_sq, None));

                    if sq.rank().index() == start_rank {
                        let double_sq = Square::new((sq_idx + push_dir * 2) as u8);
                        if empty.contains(double_sq) {
                            moves.push(ChessMove::new(sq, double_sq, None));
                        }
                    }
                }
            }
        }

        // diagonal moves need a victim or the en-passant target
        for dst in (pawn_attacks(us, sq) & their_pieces).iter() {
            if dst.rank().index() == promo_rank {
                push_promotions(sq, dst, moves);
            } else {
                moves.push(ChessMove::new(sq, dst, None));
            }
        }

        if let Some(ep_sq) = board.en_passant() {
            if pawn_attacks(us, sq).contains(ep_sq) {
                moves.push(ChessMove::new(sq, ep_sq, None));
            }
        }
    }
}

#[inline]
fn push_promotions(src: Square, dst: Square, moves: &mut Vec<ChessMove>) {
    for p in [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight] {
        moves.push(ChessMove::new(src, dst, Some(p)));
    }
}

/// Castles for whichever rights survive: the squares strictly between king
/// and rook must be empty, and the king's start, transit and destination
/// squares must not be attacked.
fn castle_moves(
    board: &Board,
    king_sq: Square,
    us: Color,
    occupied: BitBoard,
    moves: &mut Vec<ChessMove>,
) {
    let rights = board.castling_rights();
    let (ks_right, qs_right, rank) = match us {
        Color::White => (WK, WQ, 0usize),
        Color::Black => (BK, BQ, 7usize),
    };
    let them = !us;
    let at = |file: usize| Square::at(Rank::new(rank), File::new(file));
    // a right can outlive its rook in hand-written FENs; the rook has to
    // actually be home
    let our_rooks = board.pieces(Piece::Rook) & board.color_pieces(us);

    if rights & ks_right != 0 && our_rooks.contains(at(7)) {
        let f_sq = at(5);
        let g_sq = at(6);
        let between = BitBoard::from_square(f_sq) | BitBoard::from_square(g_sq);
        if between & occupied == EMPTY
            && !square_attacked(board, king_sq, them)
            && !square_attacked(board, f_sq, them)
            && !square_attacked(board, g_sq, them)
        {
            moves.push(ChessMove::new(king_sq, g_sq, None));
        }
    }

    if rights & qs_right != 0 && our_rooks.contains(at(0)) {
        let d_sq = at(3);
        let c_sq = at(2);
        let b_sq = at(1);
        let between = BitBoard::from_square(d_sq)
            | BitBoard::from_square(c_sq)
            | BitBoard::from_square(b_sq);
        // the b-file square only has to be empty, the king never crosses it
        if between & occupied == EMPTY
            && !square_attacked(board, king_sq, them)
            && !square_attacked(board, d_sq, them)
            && !square_attacked(board, c_sq, them)
        {
            moves.push(ChessMove::new(king_sq, c_sq, None));
        }
    }
}


// Pseudo-legal plus make-and-test: generate moves that obey piece rules,
// apply each to a scratch board, keep the ones that leave the king safe.
// Slower than pin-aware generation but hard to get wrong, and the perft
// numbers (20 / 400 / 8902 / 197281 from the start position, 48 / 2039 for
// Kiwipete) pin the whole thing down.
