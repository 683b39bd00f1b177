use crate::board::piece::{Piece, Side};
use crate::board::surface::{DrawOp, Sprite, Surface};
use crate::gui::assets::SpriteAtlas;
use eframe::egui::{
    pos2, Color32, FontId, Painter, Pos2, Rect, Rounding, Shape, Stroke, Vec2,
};
use std::sync::Arc;

const FULL_UV: Rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));

/// [`Surface`] over an egui painter. Batches hold shapes in board-local
/// coordinates and are moved onto the board's screen rect when replayed.
pub struct EguiSurface {
    painter: Painter,
    offset: Vec2,
    atlas: Arc<SpriteAtlas>,
}

impl EguiSurface {
    pub fn new(painter: Painter, board_origin: Pos2, atlas: Arc<SpriteAtlas>) -> Self {
        Self {
            painter,
            offset: board_origin.to_vec2(),
            atlas,
        }
    }

    fn shapes_for(&self, op: &DrawOp, out: &mut Vec<Shape>) {
        match op {
            DrawOp::Panel { rect, color } => {
                out.push(Shape::rect_filled(*rect, Rounding::ZERO, *color));
            }
            DrawOp::RoundedRect {
                rect,
                rounding,
                stroke,
            } => out.push(Shape::rect_stroke(*rect, Rounding::same(*rounding), *stroke)),
            DrawOp::Ring { rect, stroke } => {
                let radius = rect.width().min(rect.height()) / 2.0;
                out.push(Shape::circle_stroke(rect.center(), radius, *stroke));
            }
            DrawOp::Disc { rect, color } => {
                let radius = rect.width().min(rect.height()) / 2.0;
                out.push(Shape::circle_filled(rect.center(), radius, *color));
            }
            DrawOp::Cross { rect, stroke } => {
                out.push(Shape::line_segment([rect.left_top(), rect.right_bottom()], *stroke));
                out.push(Shape::line_segment([rect.right_top(), rect.left_bottom()], *stroke));
            }
            DrawOp::Arrow {
                from,
                to,
                head_length,
                stroke,
            } => arrow_shapes(*from, *to, *head_length, *stroke, out),
            DrawOp::Image { sprite, rect } => self.sprite_shapes(*sprite, *rect, out),
            DrawOp::Label {
                pos,
                text,
                size,
                color,
            } => {
                let galley =
                    self.painter
                        .layout_no_wrap(text.clone(), FontId::proportional(*size), *color);
                out.push(Shape::galley(*pos, galley, *color));
            }
        }
    }

    fn sprite_shapes(&self, sprite: Sprite, rect: Rect, out: &mut Vec<Shape>) {
        let texture = match sprite {
            Sprite::Board => self.atlas.board(),
            Sprite::Piece(piece) => self.atlas.piece(piece),
        };
        match (texture, sprite) {
            (Some(texture), _) => out.push(Shape::image(texture, rect, FULL_UV, Color32::WHITE)),
            (None, Sprite::Piece(piece)) => self.piece_fallback(piece, rect, out),
            // the checkered panels underneath already stand in for the board
            (None, Sprite::Board) => {}
        }
    }

    /// Token with the piece letter, for piece sets that failed to load.
    fn piece_fallback(&self, piece: Piece, rect: Rect, out: &mut Vec<Shape>) {
        let (fill, ink) = match piece.side {
            Side::White => (Color32::from_gray(245), Color32::from_gray(30)),
            Side::Black => (Color32::from_gray(30), Color32::from_gray(245)),
        };
        let radius = rect.width() * 0.38;
        out.push(Shape::circle_filled(rect.center(), radius, fill));
        out.push(Shape::circle_stroke(
            rect.center(),
            radius,
            Stroke::new(rect.width() / 25.0, ink),
        ));

        let galley = self.painter.layout_no_wrap(
            piece.kind.letter().to_ascii_uppercase().to_string(),
            FontId::proportional(rect.height() * 0.45),
            ink,
        );
        let pos = rect.center() - galley.size() / 2.0;
        out.push(Shape::galley(pos, galley, ink));
    }
}

fn arrow_shapes(from: Pos2, to: Pos2, head_length: f32, stroke: Stroke, out: &mut Vec<Shape>) {
    let shaft = to - from;
    let length = shaft.length();
    if length <= f32::EPSILON {
        return;
    }
    let direction = shaft / length;
    let head = head_length.min(length);
    let base = to - direction * head;
    let normal = direction.rot90() * (head * 0.5).max(stroke.width);

    out.push(Shape::line_segment([from, base], stroke));
    out.push(Shape::convex_polygon(
        vec![to, base + normal, base - normal],
        stroke.color,
        Stroke::NONE,
    ));
}

impl Surface for EguiSurface {
    type Batch = Arc<Vec<Shape>>;

    fn record(&self, ops: &[DrawOp]) -> Self::Batch {
        let mut shapes = Vec::with_capacity(ops.len());
        for op in ops {
            self.shapes_for(op, &mut shapes);
        }
        Arc::new(shapes)
    }

    fn replay(&mut self, batch: &Self::Batch) {
        for shape in batch.iter() {
            let mut shape = shape.clone();
            shape.translate(self.offset);
            self.painter.add(shape);
        }
    }
}
