//! Value types for pieces, squares and moves.
//!
//! These are the types the rest of the crate talks in. The rules themselves
//! live in shakmaty; the `From` impls here translate at that boundary.

use std::fmt;
use std::str::FromStr;

use shakmaty::{CastlingSide, Color as SColor, Role};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceKind {
    /// Lowercase letter used by FEN (black) and coordinate notation
    pub fn letter(self) -> char {
        Role::from(self).char()
    }

    pub fn from_letter(c: char) -> Option<PieceKind> {
        Role::from_char(c).map(PieceKind::from)
    }
}

impl From<Role> for PieceKind {
    fn from(role: Role) -> Self {
        match role {
            Role::Pawn => PieceKind::Pawn,
            Role::Knight => PieceKind::Knight,
            Role::Bishop => PieceKind::Bishop,
            Role::Rook => PieceKind::Rook,
            Role::Queen => PieceKind::Queen,
            Role::King => PieceKind::King,
        }
    }
}

impl From<PieceKind> for Role {
    fn from(kind: PieceKind) -> Self {
        match kind {
            PieceKind::Pawn => Role::Pawn,
            PieceKind::Knight => Role::Knight,
            PieceKind::Bishop => Role::Bishop,
            PieceKind::Rook => Role::Rook,
            PieceKind::Queen => Role::Queen,
            PieceKind::King => Role::King,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn opponent(self) -> PieceColor {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceColor::White => write!(f, "white"),
            PieceColor::Black => write!(f, "black"),
        }
    }
}

impl From<SColor> for PieceColor {
    fn from(color: SColor) -> Self {
        match color {
            SColor::White => PieceColor::White,
            SColor::Black => PieceColor::Black,
        }
    }
}

impl From<PieceColor> for SColor {
    fn from(color: PieceColor) -> Self {
        match color {
            PieceColor::White => SColor::White,
            PieceColor::Black => SColor::Black,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl Piece {
    pub fn new(kind: PieceKind, color: PieceColor) -> Self {
        Self { kind, color }
    }

    /// FEN letter: uppercase for white, lowercase for black
    pub fn fen_char(self) -> char {
        let c = self.kind.letter();
        match self.color {
            PieceColor::White => c.to_ascii_uppercase(),
            PieceColor::Black => c,
        }
    }
}

impl From<shakmaty::Piece> for Piece {
    fn from(piece: shakmaty::Piece) -> Self {
        Piece::new(piece.role.into(), piece.color.into())
    }
}

/// A board coordinate, stored as `rank * 8 + file` (a1 = 0, h8 = 63).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Square> {
        (file < 8 && rank < 8).then(|| Square(rank * 8 + file))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn file(self) -> u8 {
        self.0 % 8
    }

    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file()) as char
    }

    pub fn rank_char(self) -> char {
        (b'1' + self.rank()) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        shakmaty::Square::from_ascii(s.as_bytes())
            .map(Square::from)
            .map_err(|_| format!("invalid square '{s}'"))
    }
}

impl From<shakmaty::Square> for Square {
    fn from(square: shakmaty::Square) -> Self {
        Square(square.to_u32() as u8)
    }
}

impl From<Square> for shakmaty::Square {
    fn from(square: Square) -> Self {
        // always below 64: every constructor checks its range
        shakmaty::Square::new(u32::from(square.0))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CastleSide {
    King,
    Queen,
}

impl From<CastlingSide> for CastleSide {
    fn from(side: CastlingSide) -> Self {
        match side {
            CastlingSide::KingSide => CastleSide::King,
            CastlingSide::QueenSide => CastleSide::Queen,
        }
    }
}

impl From<CastleSide> for CastlingSide {
    fn from(side: CastleSide) -> Self {
        match side {
            CastleSide::King => CastlingSide::KingSide,
            CastleSide::Queen => CastlingSide::QueenSide,
        }
    }
}

/// The four castling flags
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        Self {
            white_king_side: true,
            white_queen_side: true,
            black_king_side: true,
            black_queen_side: true,
        }
    }
}

impl From<&shakmaty::Castles> for CastlingRights {
    fn from(castles: &shakmaty::Castles) -> Self {
        Self {
            white_king_side: castles.has(SColor::White, CastlingSide::KingSide),
            white_queen_side: castles.has(SColor::White, CastlingSide::QueenSide),
            black_king_side: castles.has(SColor::Black, CastlingSide::KingSide),
            black_queen_side: castles.has(SColor::Black, CastlingSide::QueenSide),
        }
    }
}

/// How a move affects the board beyond moving one piece
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum MoveKind {
    #[default]
    Normal,
    /// Pawn advancing two squares from its start rank
    DoublePush,
    EnPassant,
    /// King moves two files, the rook hops over it
    Castle(CastleSide),
}

/// A move relative to some board.
///
/// `kind` is filled in by the move generator; externally supplied candidates
/// are built with [`Move::new`] and matched on from/to/promotion only.
/// Castling is a king move: `to` is the king's destination.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    pub kind: MoveKind,
}

impl Move {
    pub fn new(from: Square, to: Square, promotion: Option<PieceKind>) -> Self {
        Self {
            from,
            to,
            promotion,
            kind: MoveKind::Normal,
        }
    }

    /// Structural identity used to validate candidates
    pub fn same_squares(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to && self.promotion == other.promotion
    }

    /// Coordinate notation, e.g. `e2e4` or `e7e8q`
    pub fn coordinate(&self) -> String {
        let mut s = format!("{}{}", self.from, self.to);
        if let Some(kind) = self.promotion {
            s.push(kind.letter());
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coordinate())
    }
}

/// Standard chess has no drops, so `Put` is the only move without a
/// counterpart here.
impl TryFrom<shakmaty::Move> for Move {
    type Error = ();

    fn try_from(m: shakmaty::Move) -> Result<Self, Self::Error> {
        let mv = match m {
            shakmaty::Move::Normal {
                role,
                from,
                to,
                promotion,
                ..
            } => {
                let double = role == Role::Pawn && from.rank().distance(to.rank()) == 2;
                Move {
                    from: from.into(),
                    to: to.into(),
                    promotion: promotion.map(PieceKind::from),
                    kind: if double {
                        MoveKind::DoublePush
                    } else {
                        MoveKind::Normal
                    },
                }
            }
            shakmaty::Move::EnPassant { from, to } => Move {
                from: from.into(),
                to: to.into(),
                promotion: None,
                kind: MoveKind::EnPassant,
            },
            shakmaty::Move::Castle { king, rook } => {
                let side = CastlingSide::from_king_side(king.file() < rook.file());
                let to = shakmaty::Square::from_coords(side.king_to_file(), king.rank());
                Move {
                    from: king.into(),
                    to: to.into(),
                    promotion: None,
                    kind: MoveKind::Castle(side.into()),
                }
            }
            shakmaty::Move::Put { .. } => return Err(()),
        };
        Ok(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_round_trip() {
        let sq: Square = "e4".parse().unwrap();
        assert_eq!(sq.file(), 4);
        assert_eq!(sq.rank(), 3);
        assert_eq!(sq.to_string(), "e4");
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
    }

    #[test]
    fn test_square_rejects_letters_in_rank() {
        for bad in ["Rx", "ex", "zz", "xd", "é1"] {
            assert!(bad.parse::<Square>().is_err(), "{bad} should be rejected");
        }
        assert_eq!(Square::new(8, 0), None);
        assert_eq!(Square::new(0, 200), None);
        assert_eq!(Square::new(255, 255), None);
    }

    #[test]
    fn test_square_shakmaty_conversion() {
        let e4: Square = "e4".parse().unwrap();
        assert_eq!(shakmaty::Square::from(e4), shakmaty::Square::E4);
        assert_eq!(Square::from(shakmaty::Square::H8).index(), 63);
    }

    #[test]
    fn test_piece_fen_chars() {
        let white_knight = Piece::new(PieceKind::Knight, PieceColor::White);
        assert_eq!(white_knight.fen_char(), 'N');
        assert_eq!(PieceKind::from_letter('q'), Some(PieceKind::Queen));
        assert_eq!(PieceKind::from_letter('x'), None);
    }

    #[test]
    fn test_castle_converts_to_king_destination() {
        let castle = shakmaty::Move::Castle {
            king: shakmaty::Square::E1,
            rook: shakmaty::Square::A1,
        };
        let mv = Move::try_from(castle).unwrap();
        assert_eq!(mv.coordinate(), "e1c1");
        assert_eq!(mv.kind, MoveKind::Castle(CastleSide::Queen));
    }

    #[test]
    fn test_move_coordinate() {
        let mv = Move::new(
            "e7".parse().unwrap(),
            "e8".parse().unwrap(),
            Some(PieceKind::Queen),
        );
        assert_eq!(mv.coordinate(), "e7e8q");
    }
}
