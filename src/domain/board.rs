//! Immutable chess position.
//!
//! A [`Board`] wraps a shakmaty [`Chess`] position and is used as a value:
//! [`Board::apply`] hands back a new board and never touches its receiver,
//! so history snapshots can be shared freely.

use std::fmt;

use shakmaty::{Bitboard, Chess, Color as SColor, EnPassantMode, Position, Setup};

use super::chess::{CastlingRights, Move, Piece, PieceColor, Square};
use crate::error::{ChessError, ChessResult};

#[derive(Clone, Debug, Default)]
pub struct Board {
    position: Chess,
}

/// The part of a board that decides whether two positions repeat
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PositionKey {
    placement: shakmaty::Board,
    side_to_move: SColor,
    castling: Bitboard,
    en_passant: Option<shakmaty::Square>,
}

impl Board {
    /// The standard starting position
    pub fn starting() -> Self {
        Self::default()
    }

    pub(crate) fn from_position(position: Chess) -> Self {
        Self { position }
    }

    /// The underlying shakmaty position
    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square.into()).map(Piece::from)
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.position.turn().into()
    }

    pub fn castling(&self) -> CastlingRights {
        self.position.castles().into()
    }

    /// Set after every double push, whether or not a capture is possible
    pub fn en_passant(&self) -> Option<Square> {
        self.position.maybe_ep_square().map(Square::from)
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.position.halfmoves()
    }

    pub fn fullmove_number(&self) -> u32 {
        self.position.fullmoves().get()
    }

    /// All occupied squares with their pieces, a1 first
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.position
            .board()
            .iter()
            .map(|(square, piece)| (square.into(), piece.into()))
    }

    pub fn king_square(&self, color: PieceColor) -> Option<Square> {
        self.position.board().king_of(color.into()).map(Square::from)
    }

    pub fn position_key(&self) -> PositionKey {
        let setup = self.setup();
        PositionKey {
            placement: setup.board,
            side_to_move: setup.turn,
            castling: setup.castling_rights,
            en_passant: setup.ep_square,
        }
    }

    /// The legal shakmaty move matching `candidate` on from/to/promotion
    pub(crate) fn find_legal(&self, candidate: &Move) -> Option<shakmaty::Move> {
        self.position.legal_moves().into_iter().find(|m| {
            Move::try_from(*m).is_ok_and(|ours| ours.same_squares(candidate))
        })
    }

    /// Play `mv` and return the resulting board.
    ///
    /// Fails with `IllegalMove` when the origin is empty, holds a piece of
    /// the side not to move, or the move is not legal here.
    pub fn apply(&self, mv: &Move) -> ChessResult<Board> {
        let piece = self
            .piece_at(mv.from)
            .ok_or_else(|| ChessError::illegal(mv.coordinate(), format!("no piece on {}", mv.from)))?;
        if piece.color != self.side_to_move() {
            return Err(ChessError::illegal(
                mv.coordinate(),
                format!("{} is not {} to move", piece.color, self.side_to_move()),
            ));
        }

        let legal = self
            .find_legal(mv)
            .ok_or_else(|| ChessError::illegal(mv.coordinate(), "not legal in this position"))?;
        let position = self
            .position
            .clone()
            .play(legal)
            .map_err(|_| ChessError::illegal(mv.coordinate(), "not legal in this position"))?;
        Ok(Board { position })
    }

    fn setup(&self) -> Setup {
        self.position.to_setup(EnPassantMode::Always)
    }
}

/// Structural equality, counters included
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.setup() == other.setup()
    }
}

impl Eq for Board {}

/// Rank 8 at the top, `.` for empty squares
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let c = Square::new(file, rank)
                    .and_then(|s| self.piece_at(s))
                    .map_or('.', Piece::fen_char);
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chess::PieceKind;
    use crate::domain::fen;

    fn mv(s: &str) -> Move {
        let promotion = s.chars().nth(4).and_then(PieceKind::from_letter);
        Move::new(s[0..2].parse().unwrap(), s[2..4].parse().unwrap(), promotion)
    }

    #[test]
    fn test_starting_position() {
        let board = Board::starting();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.king_square(PieceColor::White).unwrap().to_string(), "e1");
        assert_eq!(board.king_square(PieceColor::Black).unwrap().to_string(), "e8");
        assert_eq!(board.side_to_move(), PieceColor::White);
        assert_eq!(board.castling(), CastlingRights::all());
    }

    #[test]
    fn test_e2e4() {
        let start = Board::starting();
        let board = start.apply(&mv("e2e4")).unwrap();

        let e4 = board.piece_at("e4".parse().unwrap()).unwrap();
        assert_eq!(e4, Piece::new(PieceKind::Pawn, PieceColor::White));
        assert_eq!(board.piece_at("e2".parse().unwrap()), None);
        assert_eq!(board.side_to_move(), PieceColor::Black);
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.en_passant().unwrap().to_string(), "e3");
        assert_eq!(board.fullmove_number(), 1);

        // receiver untouched
        assert_eq!(start, Board::starting());
    }

    #[test]
    fn test_counters() {
        let board = Board::starting()
            .apply(&mv("g1f3"))
            .and_then(|b| b.apply(&mv("g8f6")))
            .unwrap();
        assert_eq!(board.halfmove_clock(), 2);
        assert_eq!(board.fullmove_number(), 2);
        assert_eq!(board.en_passant(), None);
    }

    #[test]
    fn test_counters_saturate() {
        let board = fen::decode("4k3/8/8/8/8/8/8/4K2R b - - 4294967295 4294967295").unwrap();
        let after = board.apply(&mv("e8d7")).unwrap();
        assert_eq!(after.halfmove_clock(), u32::MAX);
        assert_eq!(after.fullmove_number(), u32::MAX);
    }

    #[test]
    fn test_rejects_wrong_side_empty_origin_and_illegal() {
        let board = Board::starting();
        assert!(matches!(board.apply(&mv("e7e5")), Err(ChessError::IllegalMove { .. })));
        assert!(matches!(board.apply(&mv("e4e5")), Err(ChessError::IllegalMove { .. })));
        assert!(matches!(board.apply(&mv("e2e5")), Err(ChessError::IllegalMove { .. })));
    }

    #[test]
    fn test_castling_moves_rook() {
        let mut board = Board::starting();
        for m in ["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"] {
            board = board.apply(&mv(m)).unwrap();
        }
        let at = |s: &str| board.piece_at(s.parse().unwrap());
        assert_eq!(at("g1").map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(at("f1").map(|p| p.kind), Some(PieceKind::Rook));
        assert_eq!(at("h1"), None);
        assert!(!board.castling().white_king_side);
        assert!(!board.castling().white_queen_side);
        assert!(board.castling().black_king_side);
    }

    #[test]
    fn test_en_passant_removes_adjacent_pawn() {
        let mut board = Board::starting();
        for m in ["e2e4", "a7a6", "e4e5", "d7d5"] {
            board = board.apply(&mv(m)).unwrap();
        }
        assert_eq!(board.en_passant().unwrap().to_string(), "d6");
        let after = board.apply(&mv("e5d6")).unwrap();
        assert_eq!(after.piece_at("d5".parse().unwrap()), None);
        assert_eq!(
            after.piece_at("d6".parse().unwrap()),
            Some(Piece::new(PieceKind::Pawn, PieceColor::White))
        );
        assert_eq!(after.halfmove_clock(), 0);
    }

    #[test]
    fn test_rook_capture_clears_right() {
        let mut board = Board::starting();
        for m in ["g2g3", "b7b6", "f1g2", "c8b7", "b1c3", "b7g2", "a1b1", "g2h1"] {
            board = board.apply(&mv(m)).unwrap();
        }
        assert!(!board.castling().white_king_side);
        assert!(!board.castling().white_queen_side);
        assert!(board.castling().black_king_side);
    }

    #[test]
    fn test_promotion_places_promoted_piece() {
        let board = fen::decode("7k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let after = board.apply(&mv("a7a8n")).unwrap();
        assert_eq!(
            after.piece_at("a8".parse().unwrap()),
            Some(Piece::new(PieceKind::Knight, PieceColor::White))
        );
    }

    #[test]
    fn test_position_key_ignores_counters() {
        let a = fen::decode("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let b = fen::decode("4k3/8/8/8/8/8/8/R3K3 w - - 12 30").unwrap();
        assert_eq!(a.position_key(), b.position_key());
        assert_ne!(a, b);
    }
}
