use crate::board::geometry::BoardGeometry;
use crate::board::piece::Piece;
use crate::board::square::Square;
use crate::board::surface::{DrawOp, Sprite, Surface};
use eframe::egui::{Pos2, Rect, Vec2};
use rayon::prelude::*;

/// Piece placement snapshot taken from the rules engine for one frame.
pub type Placement = [Option<Piece>; Square::COUNT];

/// Everything a cached batch depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheKey {
    pub board_size: f32,
    pub position_hash: u64,
    pub flipped: bool,
}

/// One recorded batch per square plus one for the board background.
///
/// Staleness is decided for the whole cache at once by comparing the
/// [`CacheKey`] of the previous build with the current one.
#[derive(Debug)]
pub struct RenderCache<B> {
    board: Option<B>,
    squares: Vec<Option<B>>,
    key: Option<CacheKey>,
    built: bool,
    rebuilds: u64,
}

impl<B> Default for RenderCache<B> {
    fn default() -> Self {
        Self {
            board: None,
            squares: (0..Square::COUNT).map(|_| None).collect(),
            key: None,
            built: false,
            rebuilds: 0,
        }
    }
}

impl<B: Clone + Send + Sync> RenderCache<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every batch when `key` differs from the last build (or nothing
    /// was built yet). Returns `true` when the cache is now stale.
    pub fn invalidate_if_stale(&mut self, key: CacheKey) -> bool {
        if self.built && self.key == Some(key) {
            return false;
        }
        self.clear();
        self.key = Some(key);
        true
    }

    /// Forces the next frame to rebuild, e.g. after a flip.
    pub fn invalidate(&mut self) {
        self.clear();
    }

    pub fn needs_rebuild(&self) -> bool {
        !self.built
    }

    pub fn get(&self, square: Square) -> Option<&B> {
        self.squares[square.index()].as_ref()
    }

    pub fn set(&mut self, square: Square, batch: B) {
        self.squares[square.index()] = Some(batch);
    }

    pub fn board(&self) -> Option<&B> {
        self.board.as_ref()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Re-records the board background and every occupied square.
    ///
    /// Square batches are recorded in parallel; the call returns only once
    /// all of them are stored, so replay never observes a partial build.
    pub fn rebuild<S>(
        &mut self,
        surface: &S,
        geometry: &BoardGeometry,
        placement: &Placement,
        board_ops: &[DrawOp],
    ) where
        S: Surface<Batch = B> + Sync,
    {
        self.board = Some(surface.record(board_ops));

        let squares: Vec<Option<B>> = (0..Square::COUNT as u8)
            .into_par_iter()
            .map(|index| {
                let square = Square::new(index)?;
                let piece = placement[square.index()]?;
                Some(surface.record(&[piece_op(
                    piece,
                    geometry.origin(square),
                    geometry.square_size(),
                )]))
            })
            .collect();
        self.squares = squares;

        self.built = true;
        self.rebuilds += 1;
        tracing::debug!(
            rebuilds = self.rebuilds,
            board_size = geometry.board_size(),
            pieces = self.squares.iter().filter(|batch| batch.is_some()).count(),
            "render cache rebuilt"
        );
    }

    pub fn replay_board<S: Surface<Batch = B>>(&self, surface: &mut S) {
        if let Some(batch) = &self.board {
            surface.replay(batch);
        }
    }

    /// Replays every piece except the one on `skip`, which the caller draws
    /// itself at the pointer.
    pub fn replay_pieces<S: Surface<Batch = B>>(&self, surface: &mut S, skip: Option<Square>) {
        for square in Square::all() {
            if Some(square) == skip {
                continue;
            }
            if let Some(batch) = self.get(square) {
                surface.replay(batch);
            }
        }
    }

    fn clear(&mut self) {
        self.board = None;
        self.squares.iter_mut().for_each(|batch| *batch = None);
        self.built = false;
    }
}

pub fn piece_op(piece: Piece, origin: Pos2, square_size: f32) -> DrawOp {
    DrawOp::Image {
        sprite: Sprite::Piece(piece),
        rect: Rect::from_min_size(origin, Vec2::splat(square_size)),
    }
}
