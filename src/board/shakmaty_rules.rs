use crate::board::piece::{Move, Piece, PieceKind, Side};
use crate::board::rules::{IllegalMove, RulesEngine};
use crate::board::square::Square;
use anyhow::{anyhow, Context, Result};
use shakmaty::fen::Fen;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, EnPassantMode, File, Position, Role};

/// [`RulesEngine`] backed by a standard-chess `shakmaty` position.
#[derive(Debug, Clone, Default)]
pub struct ShakmatyRules {
    position: Chess,
    history: Vec<Move>,
}

impl ShakmatyRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .with_context(|| format!("parse FEN {fen:?}"))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|err| anyhow!("FEN {fen:?} is not a legal position: {err}"))?;
        Ok(Self {
            position,
            history: Vec::new(),
        })
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    fn find_legal(&self, mv: Move) -> Option<shakmaty::Move> {
        self.position
            .legal_moves()
            .into_iter()
            .find(|candidate| to_view_move(candidate) == Some(mv))
    }
}

impl RulesEngine for ShakmatyRules {
    fn position_hash(&self) -> u64 {
        self.position
            .zobrist_hash::<Zobrist64>(EnPassantMode::Legal)
            .0
    }

    fn side_to_move(&self) -> Side {
        from_color(self.position.turn())
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position
            .board()
            .piece_at(to_shakmaty_square(square))
            .map(|piece| Piece::new(from_color(piece.color), from_role(piece.role)))
    }

    fn legal_moves(&self) -> Vec<Move> {
        self.position
            .legal_moves()
            .iter()
            .filter_map(to_view_move)
            .collect()
    }

    fn apply_move(&mut self, mv: Move) -> Result<(), IllegalMove> {
        let legal = self
            .find_legal(mv)
            .ok_or(IllegalMove { attempted: mv })?;
        self.position.play_unchecked(&legal);
        self.history.push(mv);
        Ok(())
    }

    fn move_history(&self) -> &[Move] {
        &self.history
    }
}

fn from_color(color: shakmaty::Color) -> Side {
    match color {
        shakmaty::Color::White => Side::White,
        shakmaty::Color::Black => Side::Black,
    }
}

fn from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

fn to_shakmaty_square(square: Square) -> shakmaty::Square {
    shakmaty::Square::new(square.index() as u32)
}

fn from_shakmaty_square(square: shakmaty::Square) -> Option<Square> {
    Square::new(u32::from(square) as u8)
}

/// Castling is expressed the way a user drags it: king to its destination.
fn to_view_move(mv: &shakmaty::Move) -> Option<Move> {
    let (from, to, promotion) = match *mv {
        shakmaty::Move::Normal {
            from,
            to,
            promotion,
            ..
        } => (from, to, promotion),
        shakmaty::Move::EnPassant { from, to } => (from, to, None),
        shakmaty::Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() {
                File::G
            } else {
                File::C
            };
            (
                king,
                shakmaty::Square::from_coords(file, king.rank()),
                None,
            )
        }
        shakmaty::Move::Put { .. } => return None,
    };

    Some(Move {
        from: from_shakmaty_square(from)?,
        to: from_shakmaty_square(to)?,
        promotion: promotion.map(from_role),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn start_position_has_twenty_moves_for_white() {
        let rules = ShakmatyRules::new();
        assert_eq!(rules.legal_moves().len(), 20);
        assert_eq!(rules.side_to_move(), Side::White);
        assert_eq!(
            rules.piece_at(sq("e1")),
            Some(Piece::new(Side::White, PieceKind::King))
        );
    }

    #[test]
    fn castling_is_offered_as_king_to_g1() {
        let rules =
            ShakmatyRules::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("fen");
        let from_king = rules.legal_moves_from(sq("e1"));
        assert!(from_king.contains(&Move::new(sq("e1"), sq("g1"))));
        assert!(from_king.contains(&Move::new(sq("e1"), sq("c1"))));
    }

    #[test]
    fn rejects_garbage_fen() {
        assert!(ShakmatyRules::from_fen("not a fen").is_err());
    }
}
