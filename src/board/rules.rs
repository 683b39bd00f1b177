use crate::board::piece::{Move, Piece, Side};
use crate::board::square::Square;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalMove {
    pub attempted: Move,
}

impl fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal move {}", self.attempted)
    }
}

impl std::error::Error for IllegalMove {}

/// Authoritative owner of the chess position.
///
/// The board view only reads through this interface and only changes the
/// position through [`RulesEngine::apply_move`].
pub trait RulesEngine {
    /// Changes whenever the position changes.
    fn position_hash(&self) -> u64;
    fn side_to_move(&self) -> Side;
    fn piece_at(&self, square: Square) -> Option<Piece>;
    fn legal_moves(&self) -> Vec<Move>;
    fn apply_move(&mut self, mv: Move) -> Result<(), IllegalMove>;
    /// Oldest first; the last element is the most recent move.
    fn move_history(&self) -> &[Move];

    fn legal_moves_from(&self, from: Square) -> Vec<Move> {
        self.legal_moves()
            .into_iter()
            .filter(|mv| mv.from == from)
            .collect()
    }

    fn last_move(&self) -> Option<Move> {
        self.move_history().last().copied()
    }
}

/// What a `(from, to)` pair means in the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropResolution {
    Illegal,
    Move(Move),
    /// Every legal match needs a promotion piece.
    NeedsPromotion,
}

/// Non-promoting interpretations win when a `(from, to)` pair is ambiguous.
pub fn resolve_drop<R: RulesEngine + ?Sized>(rules: &R, from: Square, to: Square) -> DropResolution {
    let matches: Vec<Move> = rules
        .legal_moves_from(from)
        .into_iter()
        .filter(|mv| mv.to == to)
        .collect();

    if let Some(plain) = matches.iter().find(|mv| mv.promotion.is_none()) {
        return DropResolution::Move(*plain);
    }
    if matches.is_empty() {
        DropResolution::Illegal
    } else {
        DropResolution::NeedsPromotion
    }
}

/// In-memory engine whose placement and legal moves are supplied by the
/// caller. It knows nothing about chess: applying a listed move relocates
/// the piece, flips the side to move and clears the move list until the
/// caller scripts the next one.
#[derive(Debug, Clone)]
pub struct ScriptedRules {
    pieces: [Option<Piece>; Square::COUNT],
    side_to_move: Side,
    legal: Vec<Move>,
    history: Vec<Move>,
}

impl Default for ScriptedRules {
    fn default() -> Self {
        Self {
            pieces: [None; Square::COUNT],
            side_to_move: Side::White,
            legal: Vec::new(),
            history: Vec::new(),
        }
    }
}

impl ScriptedRules {
    pub fn new(side_to_move: Side) -> Self {
        Self {
            side_to_move,
            ..Self::default()
        }
    }

    pub fn with_piece(mut self, square: Square, piece: Piece) -> Self {
        self.put(square, Some(piece));
        self
    }

    pub fn with_moves(mut self, moves: impl IntoIterator<Item = Move>) -> Self {
        self.legal = moves.into_iter().collect();
        self
    }

    pub fn put(&mut self, square: Square, piece: Option<Piece>) {
        self.pieces[square.index()] = piece;
    }

    pub fn set_legal_moves(&mut self, moves: impl IntoIterator<Item = Move>) {
        self.legal = moves.into_iter().collect();
    }

    pub fn set_side_to_move(&mut self, side: Side) {
        self.side_to_move = side;
    }
}

impl RulesEngine for ScriptedRules {
    fn position_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.pieces.hash(&mut hasher);
        self.side_to_move.hash(&mut hasher);
        hasher.finish()
    }

    fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.pieces[square.index()]
    }

    fn legal_moves(&self) -> Vec<Move> {
        self.legal.clone()
    }

    fn apply_move(&mut self, mv: Move) -> Result<(), IllegalMove> {
        if !self.legal.contains(&mv) {
            return Err(IllegalMove { attempted: mv });
        }
        let moving = self.pieces[mv.from.index()].take();
        self.pieces[mv.to.index()] = match (moving, mv.promotion) {
            (Some(piece), Some(kind)) => Some(Piece::new(piece.side, kind)),
            (piece, _) => piece,
        };
        self.side_to_move = self.side_to_move.opposite();
        self.legal.clear();
        self.history.push(mv);
        Ok(())
    }

    fn move_history(&self) -> &[Move] {
        &self.history
    }
}
