use crate::board::piece::Piece;
use eframe::egui::{Color32, Pos2, Rect, Stroke};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Board,
    Piece(Piece),
}

/// Primitive drawing operations, in board-local pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Panel {
        rect: Rect,
        color: Color32,
    },
    RoundedRect {
        rect: Rect,
        rounding: f32,
        stroke: Stroke,
    },
    /// Ellipse outline inscribed in `rect`.
    Ring {
        rect: Rect,
        stroke: Stroke,
    },
    /// Filled ellipse inscribed in `rect`.
    Disc {
        rect: Rect,
        color: Color32,
    },
    /// Both diagonals of `rect`.
    Cross {
        rect: Rect,
        stroke: Stroke,
    },
    Arrow {
        from: Pos2,
        to: Pos2,
        head_length: f32,
        stroke: Stroke,
    },
    /// Sprite stretched over `rect`.
    Image {
        sprite: Sprite,
        rect: Rect,
    },
    Label {
        pos: Pos2,
        text: String,
        size: f32,
        color: Color32,
    },
}

/// Backend that can record draw operations once and replay them cheaply.
///
/// `record` only needs `&self` so that independent batches can be recorded
/// from several threads at once.
pub trait Surface {
    type Batch: Clone + Send + Sync;

    fn record(&self, ops: &[DrawOp]) -> Self::Batch;
    fn replay(&mut self, batch: &Self::Batch);
}

/// Headless surface: batches are shared op lists and replaying appends them
/// to a per-frame log.
#[derive(Debug, Default)]
pub struct CommandList {
    frame: Vec<DrawOp>,
    replayed_batches: usize,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.frame
    }

    pub fn replayed_batches(&self) -> usize {
        self.replayed_batches
    }

    /// Returns the ops replayed since the last call and starts a new frame.
    pub fn take_frame(&mut self) -> Vec<DrawOp> {
        self.replayed_batches = 0;
        std::mem::take(&mut self.frame)
    }
}

impl Surface for CommandList {
    type Batch = Arc<[DrawOp]>;

    fn record(&self, ops: &[DrawOp]) -> Self::Batch {
        Arc::from(ops)
    }

    fn replay(&mut self, batch: &Self::Batch) {
        self.frame.extend(batch.iter().cloned());
        self.replayed_batches += 1;
    }
}
