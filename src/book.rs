use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use rand::Rng;

use crate::board::ChessMove;

/// Consulting stops once this many moves have been played, book or not.
pub const BOOK_MOVE_LIMIT: u32 = 12;

/// index of a book node within the arena
pub type NodeId = usize;

struct Node {
    children: HashMap<ChessMove, NodeId>,
    /// number of games that traversed this node
    count: u32,
}

/// Opening lines as a prefix tree keyed by long-algebraic moves. Nodes live
/// in one Vec and point at each other by index, so descent is a HashMap hit
/// per ply and the tree needs no parent links.
pub struct OpeningBook {
    nodes: Vec<Node>,
}

impl OpeningBook {
    pub fn new() -> Self {
        OpeningBook {
            nodes: vec![Node { children: HashMap::new(), count: 0 }],
        }
    }

    /// Build from a text file: one game per line, space-separated
    /// long-algebraic moves. Blank lines and lines that do not parse as a
    /// move sequence are skipped.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading opening book {}", path.display()))?;
        Ok(Self::from_text(&text))
    }

    pub fn from_text(text: &str) -> Self {
        let mut book = OpeningBook::new();
        for line in text.lines() {
            let parsed: Result<Vec<ChessMove>, _> =
                line.split_whitespace().map(str::parse).collect();
            match parsed {
                Ok(moves) if !moves.is_empty() => book.add_game(&moves),
                _ => {} // blank or non-game line
            }
        }
        book
    }

    /// record one game: walk from the root, creating children as needed,
    /// counting every node the game passes through
    pub fn add_game(&mut self, moves: &[ChessMove]) {
        let mut node = self.root();
        self.nodes[node].count += 1;
        for &mv in moves {
            let existing = self.nodes[node].children.get(&mv).copied();
            node = match existing {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node { children: HashMap::new(), count: 0 });
                    self.nodes[node].children.insert(mv, child);
                    child
                }
            };
            self.nodes[node].count += 1;
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    /// descend one ply; None permanently ends the walk for this game
    pub fn child(&self, node: NodeId, mv: ChessMove) -> Option<NodeId> {
        self.nodes[node].children.get(&mv).copied()
    }

    /// number of games through `node`
    pub fn count(&self, node: NodeId) -> u32 {
        self.nodes[node].count
    }

    /// continuations out of `node` with their game counts
    pub fn continuations(&self, node: NodeId) -> impl Iterator<Item = (ChessMove, u32)> + '_ {
        self.nodes[node]
            .children
            .iter()
            .map(|(&mv, &child)| (mv, self.nodes[child].count))
    }

    /// Pick a continuation at random, weighted by how many games played
    /// it. None when the node is a leaf.
    pub fn pick(&self, node: NodeId, rng: &mut impl Rng) -> Option<ChessMove> {
        let children = &self.nodes[node].children;
        let total: u32 = children.values().map(|&c| self.nodes[c].count).sum();
        if total == 0 {
            return None;
        }
        let mut ticket = rng.gen_range(0..total);
        for (&mv, &child) in children {
            let weight = self.nodes[child].count;
            if ticket < weight {
                return Some(mv);
            }
            ticket -= weight;
        }
        None // unreachable, ticket < total
    }
}

impl Default for OpeningBook {
    fn default() -> Self {
        Self::new()
    }
}


// The original tree hung child nodes off parent pointers; here the nodes
// sit in a flat Vec and children are HashMap<move, index>, so the cursor
// the engine keeps is just a usize. A game line only has to parse as moves
// to be counted, which is also what filters out PGN headers and prose.
