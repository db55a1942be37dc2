use std::sync::LazyLock;

use super::bitboard::BitBoard;
use super::magic::{MagicEntry, Rng, find_magic, spread_subset};
use super::piece::Color;
use super::square::Square;

/// every attack table the move generator needs, built once on first use
struct AttackTables {
    knight: [BitBoard; 64],
    king: [BitBoard; 64],
    pawn: [[BitBoard; 64]; 2], // [color][square]
    bishop_entries: [MagicEntry; 64],
    rook_entries: [MagicEntry; 64],
    bishop_table: Vec<BitBoard>,
    rook_table: Vec<BitBoard>,
}

static TABLES: LazyLock<AttackTables> = LazyLock::new(build_tables);

/// Force table construction. Tables are also built lazily on first lookup;
/// calling this at startup just moves the cost out of the first search.
pub fn init() {
    LazyLock::force(&TABLES);
}

// --- lookups ---

#[inline]
pub fn knight_attacks(sq: Square) -> BitBoard {
    TABLES.knight[sq.index()]
}

#[inline]
pub fn king_attacks(sq: Square) -> BitBoard {
    TABLES.king[sq.index()]
}

/// squares a pawn of `color` on `sq` attacks (captures only, not pushes)
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> BitBoard {
    TABLES.pawn[color.index()][sq.index()]
}

#[inline]
pub fn bishop_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    let t = &*TABLES;
    t.bishop_table[magic_index(&t.bishop_entries[sq.index()], occupied)]
}

#[inline]
pub fn rook_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    let t = &*TABLES;
    t.rook_table[magic_index(&t.rook_entries[sq.index()], occupied)]
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

#[inline]
fn magic_index(entry: &MagicEntry, occupied: BitBoard) -> usize {
    let blockers = occupied & entry.mask;
    let hash = blockers.0.wrapping_mul(entry.magic);
    entry.offset as usize + (hash >> entry.shift) as usize
}

// --- construction ---

fn build_tables() -> AttackTables {
    let mut knight = [BitBoard(0); 64];
    let mut king = [BitBoard(0); 64];
    let mut pawn = [[BitBoard(0); 64]; 2];

    let knight_offsets: [(i8, i8); 8] = [
        (-2, -1), (-2, 1), (-1, -2), (-1, 2),
        (1, -2), (1, 2), (2, -1), (2, 1),
    ];
    let king_offsets: [(i8, i8); 8] = [
        (-1, -1), (-1, 0), (-1, 1),
        (0, -1),           (0, 1),
        (1, -1),  (1, 0),  (1, 1),
    ];

    for sq in 0..64u8 {
        let r = (sq >> 3) as i8;
        let f = (sq & 7) as i8;

        knight[sq as usize] = BitBoard(leaper_pattern(r, f, &knight_offsets));
        king[sq as usize] = BitBoard(leaper_pattern(r, f, &king_offsets));

        // white attacks toward rank+1, black toward rank-1
        let mut white = 0u64;
        let mut black = 0u64;
        if r + 1 < 8 {
            if f > 0 { white |= 1u64 << ((r + 1) * 8 + (f - 1)); }
            if f + 1 < 8 { white |= 1u64 << ((r + 1) * 8 + (f + 1)); }
        }
        if r > 0 {
            if f > 0 { black |= 1u64 << ((r - 1) * 8 + (f - 1)); }
            if f + 1 < 8 { black |= 1u64 << ((r - 1) * 8 + (f + 1)); }
        }
        pawn[0][sq as usize] = BitBoard(white);
        pawn[1][sq as usize] = BitBoard(black);
    }

    let mut rng = Rng(0x6C07_8A8B_5E0A_9C11); // fixed seed, deterministic init

    let (bishop_entries, bishop_table) = build_slider(bishop_mask, bishop_attacks_slow, &mut rng);
    let (rook_entries, rook_table) = build_slider(rook_mask, rook_attacks_slow, &mut rng);

    AttackTables {
        knight,
        king,
        pawn,
        bishop_entries,
        rook_entries,
        bishop_table,
        rook_table,
    }
}

fn leaper_pattern(r: i8, f: i8, offsets: &[(i8, i8); 8]) -> u64 {
    let mut bb = 0u64;
    for &(dr, df) in offsets {
        let nr = r + dr;
        let nf = f + df;
        if (0..8).contains(&nr) && (0..8).contains(&nf) {
            bb |= 1u64 << (nr * 8 + nf);
        }
    }
    bb
}

/// Find magics and fill the shared attack table for one slider kind. The
/// index width per square is whatever its mask holds, so the table grows
/// square by square and no bit-count table is kept anywhere.
fn build_slider(
    mask_fn: fn(usize) -> u64,
    slow_fn: fn(usize, u64) -> u64,
    rng: &mut Rng,
) -> ([MagicEntry; 64], Vec<BitBoard>) {
    let mut table: Vec<BitBoard> = Vec::new();
    let mut entries = [MagicEntry::default(); 64];

    for sq in 0..64 {
        let mask = mask_fn(sq);
        let bits = mask.count_ones() as u8;
        let shift = 64 - bits;
        let magic = find_magic(mask, bits, &|occ| slow_fn(sq, occ), rng);

        let offset = table.len();
        table.resize(offset + (1usize << bits), BitBoard(0));
        for i in 0..(1usize << bits) {
            let occ = spread_subset(i, mask);
            let idx = offset + ((occ.wrapping_mul(magic)) >> shift) as usize;
            table[idx] = BitBoard(slow_fn(sq, occ));
        }

        entries[sq] = MagicEntry {
            mask: BitBoard(mask),
            magic,
            shift,
            offset: offset as u32,
        };
    }

    (entries, table)
}

// --- relevant-occupancy masks ---
//
// Only squares between the slider and the board rim can change its attack
// set, so the rim (and the slider's own square) is stripped from every
// mask.

const FILE_A: u64 = 0x0101_0101_0101_0101;
const FILE_H: u64 = FILE_A << 7;
const RANK_1: u64 = 0xFF;
const RANK_8: u64 = RANK_1 << 56;

/// rook mask: own rank with the edge files stripped, own file with the
/// edge ranks stripped, minus the square itself
fn rook_mask(sq: usize) -> u64 {
    let rank_span = (RANK_1 << (sq / 8 * 8)) & !(FILE_A | FILE_H);
    let file_span = (FILE_A << (sq % 8)) & !(RANK_1 | RANK_8);
    (rank_span | file_span) & !(1u64 << sq)
}

/// bishop mask: every interior square sharing a diagonal or anti-diagonal
/// with `sq`, minus the square itself
fn bishop_mask(sq: usize) -> u64 {
    let (r, f) = ((sq / 8) as i32, (sq % 8) as i32);
    let mut mask = 0u64;
    for other in 0..64usize {
        if other == sq {
            continue;
        }
        let (or, of) = ((other / 8) as i32, (other % 8) as i32);
        let shared = or - of == r - f || or + of == r + f;
        let interior = (1..7).contains(&or) && (1..7).contains(&of);
        if shared && interior {
            mask |= 1u64 << other;
        }
    }
    mask
}

// --- reference (slow) ray tracers, used during construction only ---

fn bishop_attacks_slow(sq: usize, occupied: u64) -> u64 {
    trace_rays(sq, occupied, &[(1i8, 1i8), (1, -1), (-1, 1), (-1, -1)])
}

fn rook_attacks_slow(sq: usize, occupied: u64) -> u64 {
    trace_rays(sq, occupied, &[(0i8, 1i8), (0, -1), (1, 0), (-1, 0)])
}

/// walk each ray until it leaves the board or hits a blocker (the blocker
/// square itself is included, captures land there)
fn trace_rays(sq: usize, occupied: u64, dirs: &[(i8, i8); 4]) -> u64 {
    let mut attacks = 0u64;
    let r = (sq / 8) as i8;
    let f = (sq % 8) as i8;

    for &(dr, df) in dirs {
        let mut nr = r + dr;
        let mut nf = f + df;
        while (0..8).contains(&nr) && (0..8).contains(&nf) {
            let bit = 1u64 << (nr * 8 + nf);
            attacks |= bit;
            if occupied & bit != 0 {
                break;
            }
            nr += dr;
            nf += df;
        }
    }
    attacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::square::{File, Rank};

    fn sq(r: usize, f: usize) -> Square {
        Square::at(Rank::new(r), File::new(f))
    }

    #[test]
    fn test_knight_attacks_corner() {
        assert_eq!(knight_attacks(sq(0, 0)).count(), 2); // b3, c2
    }

    #[test]
    fn test_knight_attacks_center() {
        assert_eq!(knight_attacks(sq(3, 3)).count(), 8);
    }

    #[test]
    fn test_king_attacks() {
        assert_eq!(king_attacks(sq(0, 0)).count(), 3);
        assert_eq!(king_attacks(sq(3, 3)).count(), 8);
    }

    #[test]
    fn test_pawn_attacks() {
        assert_eq!(pawn_attacks(Color::White, sq(1, 4)).count(), 2); // d3, f3
        assert_eq!(pawn_attacks(Color::White, sq(1, 0)).count(), 1); // b3 only
        assert_eq!(pawn_attacks(Color::Black, sq(6, 4)).count(), 2); // d6, f6
    }

    #[test]
    fn test_rook_attacks_empty_board() {
        for r in 0..8 {
            for f in 0..8 {
                assert_eq!(
                    rook_attacks(sq(r, f), BitBoard(0)).count(),
                    14,
                    "rook on ({},{})",
                    r,
                    f
                );
            }
        }
    }

    #[test]
    fn test_bishop_attacks_empty_board() {
        assert_eq!(bishop_attacks(sq(3, 3), BitBoard(0)).count(), 13);
    }

    #[test]
    fn test_rook_attacks_with_blockers() {
        // rook on a1, blockers on a4 and d1: a2 a3 a4 b1 c1 d1
        let blockers = BitBoard::from_square(sq(3, 0)) | BitBoard::from_square(sq(0, 3));
        assert_eq!(rook_attacks(sq(0, 0), blockers).count(), 6);
    }

    #[test]
    fn test_bishop_attacks_with_blockers() {
        // bishop on d4, blocker on f6: NE 2, NW 3, SE 3, SW 3
        let blockers = BitBoard::from_square(sq(5, 5));
        assert_eq!(bishop_attacks(sq(3, 3), blockers).count(), 11);
    }

    #[test]
    fn test_queen_is_bishop_or_rook() {
        let occ = BitBoard(0x0000_0010_0800_0000);
        let s = sq(4, 4);
        assert_eq!(
            queen_attacks(s, occ),
            bishop_attacks(s, occ) | rook_attacks(s, occ)
        );
    }

    #[test]
    fn test_relevant_occupancy_counts() {
        // the classic per-square mask sizes: rook 12 in the corner, 10 in
        // the interior; bishop 9 in the center, 6 in the corner, 5 on most
        // of the rim
        assert_eq!(rook_mask(0).count_ones(), 12);
        assert_eq!(rook_mask(7).count_ones(), 12);
        assert_eq!(rook_mask(27).count_ones(), 10);
        assert_eq!(rook_mask(8).count_ones(), 11);
        assert_eq!(bishop_mask(27).count_ones(), 9);
        assert_eq!(bishop_mask(0).count_ones(), 6);
        assert_eq!(bishop_mask(1).count_ones(), 5);
        // bishop masks stay strictly interior, and no mask includes its
        // own square
        for sq in 0..64 {
            let rim = FILE_A | FILE_H | RANK_1 | RANK_8;
            assert_eq!(bishop_mask(sq) & rim, 0);
            assert_eq!(rook_mask(sq) & (1u64 << sq), 0);
            assert_eq!(bishop_mask(sq) & (1u64 << sq), 0);
        }
    }

    #[test]
    fn test_magic_matches_slow_tracer() {
        // spot-check the magic tables against the reference tracer
        let occ = BitBoard(0x00FF_0000_0420_8001);
        for sq_idx in [0usize, 7, 27, 36, 63] {
            let s = Square::new(sq_idx as u8);
            assert_eq!(rook_attacks(s, occ).0, rook_attacks_slow(sq_idx, occ.0));
            assert_eq!(bishop_attacks(s, occ).0, bishop_attacks_slow(sq_idx, occ.0));
        }
    }
}

// All attack patterns are precomputed into one LazyLock'd struct. Leapers
// (knight, king, pawn) are plain 64-entry lookups; sliders go through the
// magic tables built in magic.rs. Construction runs once per process and is
// deterministic (fixed PRNG seed).
