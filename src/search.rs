use std::time::Instant;

use arrayvec::ArrayVec;

use crate::board::{Board, ChessMove, Color, Piece};
use crate::evaluation::evaluate;
use crate::pst::PIECE_VALUE;
use crate::types::{
    BLACK_MATE, DEFAULT_DEPTH, DEFAULT_QUIESCE_DEPTH, MATE_NONE, NEG_INF, POS_INF, Score,
    WHITE_MATE,
};

/// What a search hands back: the principal variation, the score from
/// White's perspective, and the mate distance in plies (MATE_NONE when no
/// forced mate was seen).
pub struct SearchResult {
    pub pv: Vec<ChessMove>,
    pub score: Score,
    pub mate_in: u32,
}

impl SearchResult {
    /// forced mate in full moves, when the score is a mate score
    pub fn mate_in_moves(&self) -> Option<u32> {
        if (self.score == WHITE_MATE || self.score == BLACK_MATE) && self.mate_in != MATE_NONE {
            Some(self.mate_in / 2)
        } else {
            None
        }
    }
}

/// Alpha-beta minimax from White's perspective: White maximizes, Black
/// minimizes. State lives for one `search` call.
pub struct Searcher {
    pub max_depth: u8,
    /// replace the static eval at the depth limit with a capture search
    pub quiesce: bool,
    pub max_quiesce_depth: u8,
    /// tests disable the cutoff to compare against plain minimax
    pub cutoff: bool,
    /// suppress info output (benches, tests)
    pub silent: bool,
    nodes: u64,
    start: Instant,
}

impl Searcher {
    pub fn new(max_depth: u8) -> Self {
        Searcher {
            max_depth,
            quiesce: false,
            max_quiesce_depth: DEFAULT_QUIESCE_DEPTH,
            cutoff: true,
            silent: false,
            nodes: 0,
            start: Instant::now(),
        }
    }

    /// nodes visited by the last `search`
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn search(&mut self, board: &Board) -> SearchResult {
        self.nodes = 0;
        self.start = Instant::now();
        self.minimax(board, NEG_INF, POS_INF, 0)
    }

    fn minimax(&mut self, board: &Board, mut alpha: Score, mut beta: Score, depth: u8) -> SearchResult {
        // the root does not count itself, so a depth-1 search of the start
        // position reports exactly its 20 children
        if depth > 0 {
            self.nodes += 1;
        }

        let white = board.side_to_move() == Color::White;

        if board.is_checkmate() {
            return SearchResult {
                pv: Vec::new(),
                score: if white { BLACK_MATE } else { WHITE_MATE },
                mate_in: 1,
            };
        }
        if board.legal_moves().is_empty() {
            return SearchResult { pv: Vec::new(), score: 0, mate_in: MATE_NONE };
        }
        if depth >= self.max_depth {
            if self.quiesce {
                let (score, mate_in) = self.quiesce_search(board, alpha, beta, depth);
                return SearchResult { pv: Vec::new(), score, mate_in };
            }
            return SearchResult { pv: Vec::new(), score: evaluate(board), mate_in: MATE_NONE };
        }

        let mut best_score = if white { alpha } else { beta };
        let mut best_mate_in = MATE_NONE;
        let mut best_pv: Vec<ChessMove> = Vec::new();

        let moves = board.legal_moves().to_vec();
        for (i, &mv) in moves.iter().enumerate() {
            if depth == 0 && !self.silent {
                println!("info currmove {} currmovenumber {}", mv, i + 1);
            }

            let child = board.make_move(mv);
            let reply = self.minimax(&child, alpha, beta, depth + 1);

            // a move improves on the best so far when it beats the window,
            // when it reaches the same forced mate faster, or when it loses
            // to the same forced mate slower
            let improved = if white {
                reply.score > alpha
                    || (reply.score == WHITE_MATE && reply.mate_in < best_mate_in)
                    || (reply.score == BLACK_MATE
                        && best_score == BLACK_MATE
                        && reply.mate_in > best_mate_in)
            } else {
                reply.score < beta
                    || (reply.score == BLACK_MATE && reply.mate_in < best_mate_in)
                    || (reply.score == WHITE_MATE
                        && best_score == WHITE_MATE
                        && reply.mate_in > best_mate_in)
            };

            if improved {
                best_score = reply.score;
                best_mate_in = reply.mate_in;
                best_pv = Vec::with_capacity(reply.pv.len() + 1);
                best_pv.push(mv);
                best_pv.extend(reply.pv);
                if white {
                    alpha = reply.score;
                } else {
                    beta = reply.score;
                }
                if depth == 0 && !self.silent {
                    self.print_info(white, reply.score, reply.mate_in, &best_pv);
                }
            }

            if self.cutoff && alpha > beta {
                break;
            }
        }

        if depth == 0 && !self.silent {
            self.print_info(white, best_score, best_mate_in, &best_pv);
        }

        SearchResult {
            pv: best_pv,
            score: best_score,
            mate_in: best_mate_in.saturating_add(1),
        }
    }

    /// Capture-only extension past the depth limit. Stand-pat first: the
    /// side to move can decline every capture, so the static eval bounds
    /// the node right away.
    fn quiesce_search(
        &mut self,
        board: &Board,
        mut alpha: Score,
        mut beta: Score,
        depth: u8,
    ) -> (Score, u32) {
        self.nodes += 1;

        let stand_pat = evaluate(board);
        if depth >= self.max_quiesce_depth {
            return (stand_pat, MATE_NONE);
        }

        let white = board.side_to_move() == Color::White;
        if white {
            if stand_pat >= beta {
                return (beta, MATE_NONE);
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
        } else {
            if stand_pat <= alpha {
                return (alpha, MATE_NONE);
            }
            if stand_pat < beta {
                beta = stand_pat;
            }
        }

        let mut best_score = if white { alpha } else { beta };
        let mut best_mate_in = MATE_NONE;

        // only captures that do not give up material by the piece-value
        // count (a queen snapping a pawn off is noise worth ignoring)
        let captures: ArrayVec<ChessMove, 256> = board
            .legal_moves()
            .iter()
            .copied()
            .filter(|&mv| capture_gain(board, mv).is_some_and(|gain| gain >= 0))
            .collect();

        for mv in captures {
            let child = board.make_move(mv);
            let (score, mate_in) = self.quiesce_search(&child, alpha, beta, depth + 1);

            if white {
                if score >= beta {
                    return (beta, MATE_NONE);
                }
                if score > alpha || (score == WHITE_MATE && mate_in < best_mate_in) {
                    best_score = score;
                    best_mate_in = mate_in;
                    alpha = score;
                }
            } else {
                if score <= alpha {
                    return (alpha, MATE_NONE);
                }
                if score < beta || (score == BLACK_MATE && mate_in < best_mate_in) {
                    best_score = score;
                    best_mate_in = mate_in;
                    beta = score;
                }
            }

            if alpha > beta {
                break;
            }
        }

        (best_score, best_mate_in.saturating_add(1))
    }

    /// one UCI info line; cp scores flip to the side to move's perspective
    fn print_info(&self, white_to_move: bool, score: Score, mate_in: u32, pv: &[ChessMove]) {
        let elapsed_ms = self.start.elapsed().as_millis();
        let score_info = if (score == WHITE_MATE && white_to_move)
            || (score == BLACK_MATE && !white_to_move)
        {
            format!("mate {}", mate_in.saturating_add(1) / 2)
        } else if score == WHITE_MATE || score == BLACK_MATE {
            format!("mate -{}", mate_in.saturating_add(1) / 2)
        } else {
            format!("cp {}", if white_to_move { score } else { -score })
        };

        let pv_str: Vec<String> = pv.iter().map(|m| m.to_string()).collect();
        println!(
            "info depth {} score {} time {} nodes {} pv {}",
            self.max_depth,
            score_info,
            elapsed_ms,
            self.nodes,
            pv_str.join(" ")
        );
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

/// Material swing of a capture by piece values: victim minus attacker,
/// zero for en passant (pawn takes pawn). None for quiet moves.
fn capture_gain(board: &Board, mv: ChessMove) -> Option<Score> {
    let attacker = board.piece_on(mv.source())?;
    if let Some(victim) = board.piece_on(mv.dest()) {
        return Some(PIECE_VALUE[victim.index()] - PIECE_VALUE[attacker.index()]);
    }
    if attacker == Piece::Pawn && board.en_passant() == Some(mv.dest()) {
        return Some(0);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn quiet_searcher(depth: u8) -> Searcher {
        let mut s = Searcher::new(depth);
        s.silent = true;
        s
    }

    #[test]
    fn test_depth_one_counts_twenty_nodes() {
        let board = Board::default();
        let mut searcher = quiet_searcher(1);
        let result = searcher.search(&board);
        assert_eq!(searcher.nodes(), 20);
        assert_eq!(result.pv.len(), 1);
        assert!(board.legal(result.pv[0]));
        // the tables hand the first mover a small edge, nothing more
        assert!(result.score.abs() < 100, "got {}", result.score);
        assert_eq!(result.mate_in_moves(), None);
    }

    #[test]
    fn test_finds_mate_in_one() {
        let board = Board::from_str(
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        )
        .unwrap();
        let mut searcher = quiet_searcher(2);
        let result = searcher.search(&board);
        assert_eq!(result.pv[0].to_string(), "h5f7");
        assert_eq!(result.score, WHITE_MATE);
        assert_eq!(result.mate_in_moves(), Some(1));
    }

    #[test]
    fn test_rook_ladder_mate_in_one() {
        // rooks on a7 and c7, either lift to the eighth rank mates
        let board = Board::from_str("5k2/R1R5/8/8/8/8/8/6K1 w - - 0 1").unwrap();
        let mut searcher = quiet_searcher(3);
        let result = searcher.search(&board);
        let best = result.pv[0].to_string();
        assert!(best == "a7a8" || best == "c7c8", "got {}", best);
        assert_eq!(result.mate_in_moves(), Some(1));
    }

    #[test]
    fn test_finds_mate_in_two() {
        // 1.Kb6 boxes the king (only Kb8), 2.Qb7 mate
        let board = Board::from_str("k7/8/8/2K5/8/8/8/1Q6 w - - 0 1").unwrap();
        let mut searcher = quiet_searcher(4);
        let result = searcher.search(&board);
        assert_eq!(result.score, WHITE_MATE);
        assert_eq!(result.mate_in_moves(), Some(2));
        assert_eq!(result.pv.len(), 3);
        assert_eq!(result.pv[0].to_string(), "c5b6");
    }

    #[test]
    fn test_prefers_shorter_mate() {
        // Qa1+ (tried first, a1 is the lowest destination) forces mate in
        // two; Qg8 mates on the spot. The distance tie-break has to pull
        // the search off the line it found first.
        let board = Board::from_str("k7/8/1K6/8/8/8/8/6Q1 w - - 0 1").unwrap();
        let mut searcher = quiet_searcher(4);
        let result = searcher.search(&board);
        assert_eq!(result.pv[0].to_string(), "g1g8");
        assert_eq!(result.mate_in_moves(), Some(1));
    }

    #[test]
    fn test_mated_root_reports_immediately() {
        let board = Board::from_str(
            "rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        )
        .unwrap();
        let mut searcher = quiet_searcher(3);
        let result = searcher.search(&board);
        assert!(result.pv.is_empty());
        assert_eq!(result.score, BLACK_MATE);
        assert_eq!(result.mate_in, 1);
    }

    #[test]
    fn test_stalemate_scores_zero() {
        let board = Board::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut searcher = quiet_searcher(3);
        let result = searcher.search(&board);
        assert!(result.pv.is_empty());
        assert_eq!(result.score, 0);
        assert_eq!(result.mate_in, MATE_NONE);
    }

    #[test]
    fn test_pruning_preserves_root_score() {
        let board = Board::from_str("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();

        let mut pruned = quiet_searcher(3);
        let with_cutoff = pruned.search(&board);

        let mut full = quiet_searcher(3);
        full.cutoff = false;
        let without_cutoff = full.search(&board);

        assert_eq!(with_cutoff.score, without_cutoff.score);
        assert!(pruned.nodes() <= full.nodes());
    }

    #[test]
    fn test_black_to_move_minimizes() {
        // black is up a queen and to move; the white-perspective score
        // stays deeply negative
        let board = Board::from_str(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR b KQkq - 0 1",
        )
        .unwrap();
        let mut searcher = quiet_searcher(2);
        let result = searcher.search(&board);
        assert!(result.score < -700, "got {}", result.score);
    }

    #[test]
    fn test_capture_gain() {
        let board = Board::from_str(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
        )
        .unwrap();
        // pawn takes pawn
        assert_eq!(capture_gain(&board, "e4d5".parse().unwrap()), Some(0));
        // quiet push
        assert_eq!(capture_gain(&board, "e4e5".parse().unwrap()), None);

        let ep = Board::from_str(
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1",
        )
        .unwrap();
        assert_eq!(capture_gain(&ep, "e5d6".parse().unwrap()), Some(0));
    }

    #[test]
    fn test_quiescence_resolves_hanging_exchange() {
        // white rook can take a defended pawn; the static eval at the
        // horizon thinks it is up a pawn, the capture search knows better
        let board = Board::from_str("4k3/2p5/3p4/8/3R4/8/8/4K3 w - - 0 1").unwrap();

        let mut flat = quiet_searcher(1);
        let shallow = flat.search(&board);

        let mut deep = quiet_searcher(1);
        deep.quiesce = true;
        let extended = deep.search(&board);

        // the flat search cashes in Rxd6 at face value; quiescence sees
        // the c7 pawn recapture and declines
        assert_eq!(shallow.score, 400);
        assert!(extended.score < shallow.score, "got {}", extended.score);
        assert!(extended.score > 200, "got {}", extended.score);
    }

    #[test]
    fn test_quiescence_stand_pat_cutoffs() {
        let board = Board::default();
        let mut searcher = quiet_searcher(0);
        searcher.quiesce = true;
        // window already above the stand-pat for white: beta comes back
        let (score, mate_in) = searcher.quiesce_search(&board, -10, -5, 0);
        assert_eq!(score, -5);
        assert_eq!(mate_in, MATE_NONE);
    }
}

// Plain fixed-depth alpha-beta, scores always from White's perspective.
// The window update doubles as the best tracker: best_score starts at the
// incoming bound, so a node none of whose moves beat the window returns
// that bound unchanged.
//
// mate_in rides along with every score and gains one per ply on the way
// up. Equal mate scores are ordered by it, which is what makes the engine
// play Qg8 mate instead of the Qa1 mate-in-two it happened to find first.
