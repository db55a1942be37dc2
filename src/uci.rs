use std::io::{self, BufRead};
use std::str::FromStr;

use crate::board::{Board, ChessMove, Color};
use crate::book::{BOOK_MOVE_LIMIT, NodeId, OpeningBook};
use crate::search::Searcher;
use crate::types::{DEFAULT_DEPTH, EngineConfig};

/// The engine: one board, one book cursor, one synchronous search at a
/// time. Every command is handled to completion before the next line is
/// read, so there is no `stop` and nothing to interrupt.
pub struct Engine {
    board: Board,
    config: EngineConfig,
    book: Option<OpeningBook>,
    /// current book node; None once the game left the book
    cursor: Option<NodeId>,
    /// plies played since the start position
    moves_played: u32,
}

impl Engine {
    /// Build an engine, loading the opening book from the configured path
    /// with a `../` fallback. A missing book is reported and played
    /// without.
    pub fn new(config: EngineConfig) -> Engine {
        let book = if config.use_book {
            match OpeningBook::from_file(&config.book_path)
                .or_else(|_| OpeningBook::from_file(format!("../{}", config.book_path)))
            {
                Ok(book) => Some(book),
                Err(err) => {
                    println!("info string no opening book: {:#}", err);
                    None
                }
            }
        } else {
            None
        };

        let cursor = book.as_ref().map(|b| b.root());
        Engine {
            board: Board::default(),
            config,
            book,
            cursor,
            moves_played: 0,
        }
    }

    /// Read UCI commands from stdin until `quit`/`end` or EOF.
    pub fn run(&mut self) {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            if !self.handle_line(line.trim()) {
                break;
            }
        }
    }

    /// dispatch one command line; false means exit
    pub fn handle_line(&mut self, line: &str) -> bool {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = tokens.first() else {
            return true;
        };

        match command {
            "uci" => {
                println!("id name {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                println!("id author {} developers", env!("CARGO_PKG_NAME"));
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => self.new_game(),
            "position" => self.position(&tokens),
            "go" => self.go(&tokens),
            "print" | "d" => {
                println!("{}", self.board);
                for mv in self.board.legal_moves() {
                    print!("{} ", mv);
                }
                println!();
            }
            "quit" | "end" => {
                println!("goodbye");
                return false;
            }
            _ => println!("info string unknown command: {}", line),
        }
        true
    }

    fn new_game(&mut self) {
        self.board = Board::default();
        self.cursor = self.book.as_ref().map(|b| b.root());
        self.moves_played = 0;
    }

    /// `position startpos [moves ...]` or `position fen <fields> [moves ...]`
    fn position(&mut self, tokens: &[&str]) {
        let mut idx = 1;
        match tokens.get(idx) {
            Some(&"startpos") => {
                self.board = Board::default();
                self.cursor = self.book.as_ref().map(|b| b.root());
                self.moves_played = 0;
                idx += 1;
            }
            Some(&"fen") => {
                idx += 1;
                let mut fields: Vec<&str> = Vec::new();
                while idx < tokens.len() && tokens[idx] != "moves" && fields.len() < 6 {
                    fields.push(tokens[idx]);
                    idx += 1;
                }
                match Board::from_str(&fields.join(" ")) {
                    Ok(board) => {
                        self.board = board;
                        // an arbitrary position is outside the book
                        self.cursor = None;
                        self.moves_played = 0;
                    }
                    Err(err) => {
                        // keep the previous board
                        println!("info string bad fen: {}", err);
                        return;
                    }
                }
            }
            _ => {
                println!("info string weird position command: {}", tokens.join(" "));
                return;
            }
        }

        if tokens.get(idx) == Some(&"moves") {
            for token in &tokens[idx + 1..] {
                self.apply_move(token);
            }
        }
    }

    /// Apply one GUI move, keeping the book cursor in step. A move that is
    /// not legal is reported and applied anyway; the GUI is the referee
    /// here.
    fn apply_move(&mut self, token: &str) {
        let mv: ChessMove = match token.parse() {
            Ok(mv) => mv,
            Err(err) => {
                println!("info string unreadable move {}: {}", token, err);
                return;
            }
        };

        if !self.board.legal(mv) {
            println!("info string illegal move {}", mv);
        }

        self.board = self.board.make_move(mv);
        self.moves_played += 1;
        self.cursor = match (self.cursor, &self.book) {
            (Some(node), Some(book)) => book.child(node, mv),
            _ => None,
        };
    }

    /// weighted book continuation, while the game is still in book and
    /// young enough
    fn consult_book(&self) -> Option<ChessMove> {
        if !self.config.use_book || self.moves_played >= BOOK_MOVE_LIMIT {
            return None;
        }
        let book = self.book.as_ref()?;
        let node = self.cursor?;
        book.pick(node, &mut rand::thread_rng())
    }

    /// `go [wtime W btime B ...] | [infinite]`
    fn go(&mut self, tokens: &[&str]) {
        if let Some(book_move) = self.consult_book() {
            println!("bestmove {}", book_move);
            return;
        }

        let mut max_depth = depth_from_clocks(tokens, self.board.side_to_move());
        if self.board.legal_moves().len() < 5 {
            max_depth += 1;
        }

        if self.board.is_checkmate() {
            println!("CHECK MATED SON");
            return;
        }
        if self.board.legal_moves().is_empty() {
            println!("stale mate");
            return;
        }

        println!("info string searching max depth {}", max_depth);

        let mut searcher = Searcher::new(max_depth);
        searcher.quiesce = self.config.quiesce;
        searcher.max_quiesce_depth = self.config.max_quiesce_depth;
        let result = searcher.search(&self.board);

        match result.pv.first() {
            Some(best) => println!("bestmove {}", best),
            None => {
                // nothing beat the open window, which cannot happen with
                // legal moves on the board; fall back to the first one
                if let Some(&mv) = self.board.legal_moves().first() {
                    println!("bestmove {}", mv);
                }
            }
        }
    }
}

/// Depth from the clocks: 4 by default, deeper when the mover has a
/// comfortable lead on time. `infinite` and missing clocks stay at 4.
fn depth_from_clocks(tokens: &[&str], side: Color) -> u8 {
    let mut wtime: Option<u64> = None;
    let mut btime: Option<u64> = None;

    let mut i = 1;
    while i < tokens.len() {
        match tokens[i] {
            "wtime" => {
                i += 1;
                wtime = tokens.get(i).and_then(|t| t.parse().ok());
            }
            "btime" => {
                i += 1;
                btime = tokens.get(i).and_then(|t| t.parse().ok());
            }
            _ => {}
        }
        i += 1;
    }

    let (us, them) = match side {
        Color::White => (wtime, btime),
        Color::Black => (btime, wtime),
    };
    match (us, them) {
        (Some(us), Some(them)) if us >= them * 2 => DEFAULT_DEPTH + 2,
        (Some(us), Some(them)) if us * 2 >= them * 3 => DEFAULT_DEPTH + 1,
        _ => DEFAULT_DEPTH,
    }
}


// One struct owns everything mutable: board, book cursor, move counter.
// `position` rebuilds the cursor by replaying the move list from the root,
// which is also what keeps it honest after the GUI jumps around between
// games.
