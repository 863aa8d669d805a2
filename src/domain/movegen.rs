//! Legal move generation and attack detection on top of shakmaty.

use shakmaty::Position;

use super::board::Board;
use super::chess::{Move, PieceColor, Square};

/// All legal moves for the side to move
pub fn legal_moves(board: &Board) -> Vec<Move> {
    board
        .position()
        .legal_moves()
        .into_iter()
        .filter_map(|m| Move::try_from(m).ok())
        .collect()
}

/// Legal moves starting on one square
pub fn legal_moves_from(board: &Board, from: Square) -> Vec<Move> {
    legal_moves(board)
        .into_iter()
        .filter(|mv| mv.from == from)
        .collect()
}

/// Find the legal move matching a candidate's from/to/promotion.
///
/// The returned move carries the generator's [`MoveKind`](super::MoveKind)
/// tag. A pawn reaching the last rank must name its piece.
pub fn resolve(board: &Board, candidate: &Move) -> Option<Move> {
    board
        .find_legal(candidate)
        .and_then(|m| Move::try_from(m).ok())
}

pub fn is_legal(board: &Board, candidate: &Move) -> bool {
    resolve(board, candidate).is_some()
}

/// Whether any piece of `by` attacks `square`
pub fn is_square_attacked(board: &Board, square: Square, by: PieceColor) -> bool {
    let placement = board.position().board();
    placement
        .attacks_to(square.into(), by.into(), placement.occupied())
        .any()
}

/// Whether `color`'s king is currently attacked
pub fn in_check(board: &Board, color: PieceColor) -> bool {
    board
        .king_square(color)
        .is_some_and(|k| is_square_attacked(board, k, color.opponent()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chess::{CastleSide, MoveKind, PieceKind};
    use crate::domain::fen;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const MIRRORED: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";

    /// Node count through this module's move list and `Board::apply`
    fn perft(board: &Board, depth: u32) -> u64 {
        let moves = legal_moves(board);
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .iter()
            .map(|mv| perft(&board.apply(mv).unwrap(), depth - 1))
            .sum()
    }

    fn board(fen_str: &str) -> Board {
        fen::decode(fen_str).unwrap()
    }

    fn mv(s: &str) -> Move {
        let promotion = s.chars().nth(4).and_then(PieceKind::from_letter);
        Move::new(s[0..2].parse().unwrap(), s[2..4].parse().unwrap(), promotion)
    }

    #[test]
    fn test_perft_through_conversions() {
        assert_eq!(perft(&Board::starting(), 3), 8902);
        assert_eq!(perft(&board(KIWIPETE), 2), 2039);
        assert_eq!(perft(&board(ENDGAME), 3), 2812);
        assert_eq!(perft(&board(MIRRORED), 2), 264);
    }

    #[test]
    fn test_is_legal_uses_structural_identity() {
        let start = Board::starting();
        assert!(is_legal(&start, &mv("e2e4")));
        assert!(is_legal(&start, &mv("g1f3")));
        assert!(!is_legal(&start, &mv("e2e5")));
        assert!(!is_legal(&start, &mv("e7e5")));
        assert_eq!(resolve(&start, &mv("e2e4")).map(|m| m.kind), Some(MoveKind::DoublePush));
        assert_eq!(legal_moves_from(&start, "b1".parse().unwrap()).len(), 2);
    }

    #[test]
    fn test_promotion_must_be_named() {
        let b = board("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        assert!(!is_legal(&b, &mv("a7a8")));
        assert!(is_legal(&b, &mv("a7a8q")));
        assert!(is_legal(&b, &mv("a7a8n")));
        assert!(!is_legal(&b, &mv("a7a8k")));
        // promotion letter on a non-promoting move
        assert!(!is_legal(&Board::starting(), &mv("e2e4q")));
    }

    #[test]
    fn test_castling_blocked_by_attack() {
        // black rook on f8 covers f1: no king-side castling, queen-side is fine
        let b = board("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!is_legal(&b, &mv("e1g1")));
        assert!(is_legal(&b, &mv("e1c1")));
        assert_eq!(
            resolve(&b, &mv("e1c1")).map(|m| m.kind),
            Some(MoveKind::Castle(CastleSide::Queen))
        );

        // b1 may be attacked, only c1/d1 matter for the king
        let b = board("1r2k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(is_legal(&b, &mv("e1c1")));

        // no castling out of check
        let b = board("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
        assert!(!is_legal(&b, &mv("e1c1")));
        assert!(!is_legal(&b, &mv("e1g1")));
    }

    #[test]
    fn test_en_passant_generation() {
        let b = board("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        let ep = resolve(&b, &mv("e5f6")).unwrap();
        assert_eq!(ep.kind, MoveKind::EnPassant);
        assert!(!is_legal(&b, &mv("e5d6")));
    }

    #[test]
    fn test_square_attacks() {
        let start = Board::starting();
        assert!(is_square_attacked(&start, "f3".parse().unwrap(), PieceColor::White));
        assert!(!is_square_attacked(&start, "e4".parse().unwrap(), PieceColor::White));
        assert!(is_square_attacked(&start, "f6".parse().unwrap(), PieceColor::Black));
        assert!(!in_check(&start, PieceColor::White));

        let checked = board("4k3/8/8/8/8/8/4Q3/4K3 b - - 0 1");
        assert!(in_check(&checked, PieceColor::Black));
        assert!(!in_check(&checked, PieceColor::White));
    }
}
