//! Pixel <-> square conversions.
//!
//! All positions are board-local: `(0, 0)` is the top-left corner of the
//! board and the board spans `[0, 8 * square_size)` on both axes. A flipped
//! board is rotated by 180 degrees, so both files and ranks reverse.

use crate::board::square::Square;
use eframe::egui::{pos2, vec2, Pos2, Rect, Vec2};

/// Smallest board edge the view will lay out.
pub const MIN_BOARD_SIZE: f32 = 8.0;

/// Pixel-valued state that must follow the board when it is resized.
pub trait Rescale {
    fn rescale(&mut self, factor: f32);
}

impl Rescale for Pos2 {
    fn rescale(&mut self, factor: f32) {
        *self = pos2(self.x * factor, self.y * factor);
    }
}

impl Rescale for f32 {
    fn rescale(&mut self, factor: f32) {
        *self *= factor;
    }
}

pub fn square_at(position: Pos2, square_size: f32, flipped: bool) -> Option<Square> {
    if square_size <= 0.0 {
        return None;
    }
    let board = 0.0..square_size * 8.0;
    if !board.contains(&position.x) || !board.contains(&position.y) {
        return None;
    }

    let column = cell(position.x, square_size);
    let row = cell(position.y, square_size);
    let (file, rank) = if flipped {
        (7 - column, row)
    } else {
        (column, 7 - row)
    };
    Square::from_coords(file, rank)
}

/// Index of the cell holding `offset`, so that `[k * size, (k + 1) * size)`
/// is cell `k` even where the division rounds across a boundary.
fn cell(offset: f32, square_size: f32) -> u8 {
    let mut index = (offset / square_size).floor();
    if index * square_size > offset {
        index -= 1.0;
    } else if (index + 1.0) * square_size <= offset {
        index += 1.0;
    }
    index.clamp(0.0, 7.0) as u8
}

pub fn origin_of(square: Square, square_size: f32, flipped: bool) -> Pos2 {
    let (column, row) = if flipped {
        (7 - square.file(), square.rank())
    } else {
        (square.file(), 7 - square.rank())
    };
    pos2(column as f32 * square_size, row as f32 * square_size)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardGeometry {
    board_size: f32,
    square_size: f32,
    flipped: bool,
    origins: [Pos2; Square::COUNT],
}

impl BoardGeometry {
    pub fn new(board_size: f32, flipped: bool) -> Self {
        let mut geometry = Self {
            board_size,
            square_size: board_size / 8.0,
            flipped,
            origins: [Pos2::ZERO; Square::COUNT],
        };
        geometry.recompute_origins();
        geometry
    }

    pub fn board_size(&self) -> f32 {
        self.board_size
    }

    pub fn square_size(&self) -> f32 {
        self.square_size
    }

    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// Applies a new board edge length and returns the `new / old` ratio,
    /// or `None` when the size did not change.
    pub fn resize(&mut self, board_size: f32) -> Option<f32> {
        if board_size == self.board_size || board_size < MIN_BOARD_SIZE {
            return None;
        }
        let factor = board_size / self.board_size;
        self.board_size = board_size;
        self.square_size = board_size / 8.0;
        self.recompute_origins();
        Some(factor)
    }

    /// Returns `true` when the orientation actually changed.
    pub fn set_flipped(&mut self, flipped: bool) -> bool {
        if self.flipped == flipped {
            return false;
        }
        self.flipped = flipped;
        self.recompute_origins();
        true
    }

    pub fn square_at(&self, position: Pos2) -> Option<Square> {
        square_at(position, self.square_size, self.flipped)
    }

    pub fn origin(&self, square: Square) -> Pos2 {
        self.origins[square.index()]
    }

    pub fn square_rect(&self, square: Square) -> Rect {
        Rect::from_min_size(self.origin(square), Vec2::splat(self.square_size))
    }

    pub fn square_center(&self, square: Square) -> Pos2 {
        self.square_rect(square).center()
    }

    pub fn board_rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::splat(self.board_size))
    }

    /// Offset from the pointer to the top-left corner of a centered piece.
    pub fn half_piece(&self) -> Vec2 {
        vec2(self.square_size / 2.0, self.square_size / 2.0)
    }

    /// Rows counted from the top of the screen; row 0 is the top edge.
    pub fn screen_row(&self, square: Square) -> u8 {
        if self.flipped {
            square.rank()
        } else {
            7 - square.rank()
        }
    }

    fn recompute_origins(&mut self) {
        for square in Square::all() {
            self.origins[square.index()] = origin_of(square, self.square_size, self.flipped);
        }
    }
}

/// Sizes of the legal-move hints, kept in pixels and rescaled with the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HintMetrics {
    pub dot_diameter: f32,
    pub capture_width: f32,
}

impl HintMetrics {
    pub fn for_square(square_size: f32) -> Self {
        Self {
            dot_diameter: square_size / 3.0,
            capture_width: square_size / 5.0,
        }
    }
}

impl Rescale for HintMetrics {
    fn rescale(&mut self, factor: f32) {
        self.dot_diameter.rescale(factor);
        self.capture_width.rescale(factor);
    }
}
