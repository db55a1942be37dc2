use std::fmt;
use std::str::FromStr;

use super::piece::Piece;
use super::square::{File, Rank, Square};

/// Chess move encoded compactly in a u16.
///
/// Layout: `src(6) | dst(6) | promo(2) | is_promo(1) | reserved(1)`
///   - bits 0..5:  source square (0-63)
///   - bits 6..11: destination square (0-63)
///   - bits 12..13: promotion piece (0=Knight, 1=Bishop, 2=Rook, 3=Queen)
///   - bit 14: is_promotion flag
///   - bit 15: reserved
///
/// Castles are the king's two-square move (e1g1, e1c1, e8g8, e8c8) and
/// en-passant captures are the pawn's diagonal move, so both fit the same
/// encoding with nothing extra.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove(u16);

impl ChessMove {
    #[inline]
    pub fn new(src: Square, dst: Square, promotion: Option<Piece>) -> Self {
        let mut bits = (src.index() as u16) | ((dst.index() as u16) << 6);
        if let Some(p) = promotion {
            let code = match p {
                Piece::Knight => 0,
                Piece::Bishop => 1,
                Piece::Rook => 2,
                _ => 3, // queen, and queen for anything invalid
            };
            bits |= code << 12;
            bits |= 1 << 14;
        }
        ChessMove(bits)
    }

    #[inline]
    pub fn source(self) -> Square {
        Square::new((self.0 & 0x3F) as u8)
    }

    #[inline]
    pub fn dest(self) -> Square {
        Square::new(((self.0 >> 6) & 0x3F) as u8)
    }

    #[inline]
    pub fn promotion(self) -> Option<Piece> {
        if self.0 & (1 << 14) == 0 {
            None
        } else {
            Some(match (self.0 >> 12) & 3 {
                0 => Piece::Knight,
                1 => Piece::Bishop,
                2 => Piece::Rook,
                _ => Piece::Queen,
            })
        }
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.source(), self.dest())?;
        if let Some(promo) = self.promotion() {
            let c = match promo {
                Piece::Knight => 'n',
                Piece::Bishop => 'b',
                Piece::Rook => 'r',
                _ => 'q',
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChessMove({})", self)
    }
}

/// Parse a long-algebraic move: `<file><rank><file><rank>` plus an optional
/// promotion letter in `qrbn`. Purely syntactic, no board involved; legality
/// is the board's business.
impl FromStr for ChessMove {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err(format!("move must be 4 or 5 chars: {:?}", s));
        }

        let src_file = bytes[0].wrapping_sub(b'a');
        let src_rank = bytes[1].wrapping_sub(b'1');
        let dst_file = bytes[2].wrapping_sub(b'a');
        let dst_rank = bytes[3].wrapping_sub(b'1');
        if src_file >= 8 || src_rank >= 8 || dst_file >= 8 || dst_rank >= 8 {
            return Err(format!("square out of range in move: {:?}", s));
        }

        let promo = if bytes.len() == 5 {
            match bytes[4] {
                b'q' => Some(Piece::Queen),
                b'r' => Some(Piece::Rook),
                b'b' => Some(Piece::Bishop),
                b'n' => Some(Piece::Knight),
                other => return Err(format!("bad promotion letter: {:?}", other as char)),
            }
        } else {
            None
        };

        let src = Square::at(Rank::new(src_rank as usize), File::new(src_file as usize));
        let dst = Square::at(Rank::new(dst_rank as usize), File::new(dst_file as usize));
        Ok(ChessMove::new(src, dst, promo))
    }
}


// 16 bits per move keeps move lists inside cache lines and makes equality a
// single integer comparison. The same encoding round-trips through the
// long-algebraic text form used by UCI and by the opening-book files.
