use crate::board::cache::piece_op;
use crate::board::geometry::BoardGeometry;
use crate::board::piece::{Piece, PieceKind, Side};
use crate::board::square::Square;
use crate::board::surface::DrawOp;
use eframe::egui::{Color32, Pos2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPromotion {
    pub from: Square,
    pub to: Square,
    pub side: Side,
}

/// Candidate pieces stacked in the destination file, starting on the
/// destination square and running toward the middle of the board.
#[derive(Debug, Clone, Default)]
pub struct PromotionPicker {
    pending: Option<PendingPromotion>,
}

impl PromotionPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, pending: PendingPromotion) {
        tracing::debug!(from = %pending.from, to = %pending.to, "promotion picker opened");
        self.pending = Some(pending);
    }

    pub fn pending(&self) -> Option<&PendingPromotion> {
        self.pending.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn close(&mut self) -> Option<PendingPromotion> {
        self.pending.take()
    }

    pub fn options(&self) -> Vec<(PieceKind, Square)> {
        let Some(pending) = &self.pending else {
            return Vec::new();
        };
        let file = pending.to.file();
        let top = pending.to.rank() == 7;
        PieceKind::PROMOTIONS
            .iter()
            .zip(0u8..)
            .filter_map(|(kind, step)| {
                let rank = if top { 7 - step } else { step };
                Square::from_coords(file, rank).map(|square| (*kind, square))
            })
            .collect()
    }

    pub fn choice_at(&self, geometry: &BoardGeometry, position: Pos2) -> Option<PieceKind> {
        let square = geometry.square_at(position)?;
        self.options()
            .into_iter()
            .find(|(_, option)| *option == square)
            .map(|(kind, _)| kind)
    }

    /// Dims the board and draws the candidates on light tiles.
    pub fn overlay_ops(&self, geometry: &BoardGeometry, backdrop: Color32) -> Vec<DrawOp> {
        let Some(pending) = &self.pending else {
            return Vec::new();
        };
        let mut ops = vec![DrawOp::Panel {
            rect: geometry.board_rect(),
            color: backdrop,
        }];
        for (kind, square) in self.options() {
            let rect = geometry.square_rect(square);
            ops.push(DrawOp::Disc {
                rect: rect.shrink(geometry.square_size() / 20.0),
                color: Color32::from_gray(230),
            });
            ops.push(piece_op(
                Piece::new(pending.side, kind),
                geometry.origin(square),
                geometry.square_size(),
            ));
        }
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn picker(from: &str, to: &str, side: Side) -> PromotionPicker {
        let mut picker = PromotionPicker::new();
        picker.open(PendingPromotion {
            from: sq(from),
            to: sq(to),
            side,
        });
        picker
    }

    #[test]
    fn white_options_run_down_from_the_eighth_rank() {
        let picker = picker("c7", "c8", Side::White);
        assert_eq!(
            picker.options(),
            vec![
                (PieceKind::Queen, sq("c8")),
                (PieceKind::Knight, sq("c7")),
                (PieceKind::Rook, sq("c6")),
                (PieceKind::Bishop, sq("c5")),
            ]
        );
    }

    #[test]
    fn black_options_run_up_from_the_first_rank() {
        let picker = picker("h2", "g1", Side::Black);
        let squares: Vec<Square> = picker.options().into_iter().map(|(_, sq)| sq).collect();
        assert_eq!(squares, vec![sq("g1"), sq("g2"), sq("g3"), sq("g4")]);
    }

    #[test]
    fn choice_follows_board_orientation() {
        let picker = picker("a7", "a8", Side::White);
        let normal = BoardGeometry::new(400.0, false);
        let flipped = BoardGeometry::new(400.0, true);

        assert_eq!(
            picker.choice_at(&normal, normal.square_center(sq("a6"))),
            Some(PieceKind::Rook)
        );
        assert_eq!(
            picker.choice_at(&flipped, flipped.square_center(sq("a7"))),
            Some(PieceKind::Knight)
        );
        assert_eq!(picker.choice_at(&normal, normal.square_center(sq("b8"))), None);
    }

    #[test]
    fn overlay_is_empty_when_closed() {
        let mut picker = picker("a7", "a8", Side::White);
        let geometry = BoardGeometry::new(400.0, false);
        assert_eq!(picker.overlay_ops(&geometry, Color32::BLACK).len(), 9);
        assert!(picker.close().is_some());
        assert!(picker.overlay_ops(&geometry, Color32::BLACK).is_empty());
        assert!(picker.options().is_empty());
    }
}
