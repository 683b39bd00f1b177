use crate::board::annotation::{AnnotationAuthor, AnnotationStore, CommitOutcome, Mark};
use crate::board::cache::{piece_op, CacheKey, Placement, RenderCache};
use crate::board::drag::{DragMachine, DragOutcome, DragState};
use crate::board::geometry::{BoardGeometry, HintMetrics, Rescale, MIN_BOARD_SIZE};
use crate::board::input::{
    CursorGlyph, HitRegion, HitTarget, PointerEvent, PointerId, PointerKind, Priority,
};
use crate::board::options::ViewOptions;
use crate::board::piece::{Move, PieceKind};
use crate::board::promotion::{PendingPromotion, PromotionPicker};
use crate::board::rules::RulesEngine;
use crate::board::square::Square;
use crate::board::surface::{DrawOp, Sprite, Surface};
use eframe::egui::{vec2, Color32, Rect, Stroke};
use std::time::Duration;

/// What the host should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOutput {
    pub cursor: CursorGlyph,
    /// `Some(Duration::ZERO)` asks for an immediate repaint.
    pub repaint_after: Option<Duration>,
    /// Pointer the input system should route exclusively to the board.
    pub grab: Option<PointerId>,
}

impl FrameOutput {
    fn repaint(&mut self, after: Duration) {
        self.repaint_after = Some(match self.repaint_after {
            Some(current) => current.min(after),
            None => after,
        });
    }
}

#[derive(Debug)]
struct AnnotationBatch<B> {
    revision: u64,
    board_size: f32,
    flipped: bool,
    batch: B,
}

/// Owns every piece of interactive board state and drives one frame at a
/// time: layout, cache upkeep, replay, then pointer dispatch.
pub struct BoardController<S: Surface> {
    options: ViewOptions,
    geometry: BoardGeometry,
    hints: HintMetrics,
    cache: RenderCache<S::Batch>,
    annotation_batch: Option<AnnotationBatch<S::Batch>>,
    drag: DragMachine,
    annotations: AnnotationStore,
    author: AnnotationAuthor,
    picker: PromotionPicker,
    last_hash: Option<u64>,
    hover: Option<Square>,
}

impl<S> BoardController<S>
where
    S: Surface + Sync,
{
    pub fn new(options: ViewOptions, flipped: bool) -> Self {
        Self {
            author: AnnotationAuthor::new(options.marker_shape),
            options,
            geometry: BoardGeometry::new(0.0, flipped),
            hints: HintMetrics::for_square(0.0),
            cache: RenderCache::new(),
            annotation_batch: None,
            drag: DragMachine::new(),
            annotations: AnnotationStore::new(),
            picker: PromotionPicker::new(),
            last_hash: None,
            hover: None,
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ViewOptions) {
        self.author.set_marker(options.marker_shape);
        if options.coordinates != self.options.coordinates
            || options.palette != self.options.palette
        {
            self.cache.invalidate();
        }
        self.options = options;
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub fn hint_metrics(&self) -> HintMetrics {
        self.hints
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn selected_square(&self) -> Option<Square> {
        self.drag.selected_square()
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn pending_promotion(&self) -> Option<&PendingPromotion> {
        self.picker.pending()
    }

    pub fn promotion_options(&self) -> Vec<(PieceKind, Square)> {
        self.picker.options()
    }

    pub fn is_drawing_annotation(&self) -> bool {
        self.author.is_drawing()
    }

    pub fn cache_rebuilds(&self) -> u64 {
        self.cache.rebuild_count()
    }

    pub fn is_flipped(&self) -> bool {
        self.geometry.flipped()
    }

    pub fn flip(&mut self) {
        let flipped = !self.geometry.flipped();
        self.set_flipped(flipped);
    }

    /// Drops the selection and any pending promotion; annotations are kept
    /// because they are tied to squares, not pixels.
    pub fn set_flipped(&mut self, flipped: bool) {
        if !self.geometry.set_flipped(flipped) {
            return;
        }
        tracing::debug!(flipped, "board orientation changed");
        self.drag.reset();
        self.picker.close();
        self.author.cancel();
        self.cache.invalidate();
        self.annotation_batch = None;
    }

    /// Back to a clean board, e.g. for a new game.
    pub fn reset(&mut self) {
        self.drag.reset();
        self.picker.close();
        self.author.cancel();
        self.annotations.clear();
        self.cache.invalidate();
    }

    pub fn clear_annotations(&mut self) -> bool {
        self.author.cancel();
        self.annotations.clear()
    }

    pub fn toggle_annotation(&mut self, mark: Mark, color: Color32) -> CommitOutcome {
        let square_size = self.geometry.square_size();
        self.annotations.toggle(mark, color, square_size)
    }

    pub fn choose_promotion<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &mut R,
        kind: PieceKind,
    ) -> Option<Move> {
        self.picker.close()?;
        match self.drag.finish_promotion(rules, kind) {
            DragOutcome::Committed(mv) => Some(mv),
            _ => None,
        }
    }

    pub fn cancel_promotion(&mut self) -> bool {
        if self.picker.close().is_none() {
            return false;
        }
        self.drag.abandon_promotion();
        true
    }

    /// The whole board followed by its 64 squares, in board-local pixels.
    pub fn hit_regions(&self) -> Vec<HitRegion> {
        std::iter::once(HitRegion {
            target: HitTarget::Board,
            rect: self.geometry.board_rect(),
        })
        .chain(Square::all().map(|square| HitRegion {
            target: HitTarget::Square(square),
            rect: self.geometry.square_rect(square),
        }))
        .collect()
    }

    pub fn frame<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &mut R,
        surface: &mut S,
        board_size: f32,
        events: &[PointerEvent],
    ) -> FrameOutput {
        let mut output = FrameOutput::default();
        if board_size < MIN_BOARD_SIZE {
            return output;
        }

        self.layout(board_size);
        self.sync_position(rules);
        self.draw(rules, surface);

        for event in events {
            self.dispatch(rules, event, &mut output);
        }

        output.cursor = self.cursor(rules);
        output
    }

    fn layout(&mut self, board_size: f32) {
        if self.geometry.board_size() < MIN_BOARD_SIZE {
            self.geometry = BoardGeometry::new(board_size, self.geometry.flipped());
            self.hints = HintMetrics::for_square(self.geometry.square_size());
            self.annotations.restroke(self.geometry.square_size());
            return;
        }
        if let Some(factor) = self.geometry.resize(board_size) {
            self.hints.rescale(factor);
            self.drag.rescale(factor);
            self.annotations.rescale(factor);
        }
    }

    fn sync_position<R: RulesEngine + ?Sized>(&mut self, rules: &R) {
        let hash = rules.position_hash();
        if self.last_hash.is_some_and(|last| last != hash) && self.drag.revalidate(rules) {
            self.picker.close();
        }
        self.last_hash = Some(hash);

        let key = CacheKey {
            board_size: self.geometry.board_size(),
            position_hash: hash,
            flipped: self.geometry.flipped(),
        };
        self.cache.invalidate_if_stale(key);
    }

    fn draw<R: RulesEngine + ?Sized>(&mut self, rules: &R, surface: &mut S) {
        if self.cache.needs_rebuild() {
            let placement: Placement = std::array::from_fn(|index| {
                Square::new(index as u8).and_then(|square| rules.piece_at(square))
            });
            let board_ops = self.board_ops();
            self.cache
                .rebuild(&*surface, &self.geometry, &placement, &board_ops);
        }

        self.cache.replay_board(surface);

        let highlights = self.highlight_ops(rules);
        if !highlights.is_empty() {
            let batch = surface.record(&highlights);
            surface.replay(&batch);
        }

        let grip = self.drag.grip().copied();
        self.cache
            .replay_pieces(surface, grip.map(|grip| grip.square));
        if let Some(grip) = grip {
            let batch = surface.record(&[piece_op(
                grip.piece,
                grip.draw_pos,
                self.geometry.square_size(),
            )]);
            surface.replay(&batch);
        }

        self.replay_annotations(surface);

        if let Some(preview) = self.author.preview(self.geometry.square_size()) {
            let batch = surface.record(&preview.to_ops(&self.geometry));
            surface.replay(&batch);
        }

        let overlay = self
            .picker
            .overlay_ops(&self.geometry, self.options.palette.promotion_backdrop);
        if !overlay.is_empty() {
            let batch = surface.record(&overlay);
            surface.replay(&batch);
        }
    }

    /// Checkered squares, the board sprite on top and optional coordinates.
    fn board_ops(&self) -> Vec<DrawOp> {
        let palette = &self.options.palette;
        let mut ops: Vec<DrawOp> = Square::all()
            .map(|square| DrawOp::Panel {
                rect: self.geometry.square_rect(square),
                color: if square.is_light() {
                    palette.light_square
                } else {
                    palette.dark_square
                },
            })
            .collect();
        ops.push(DrawOp::Image {
            sprite: Sprite::Board,
            rect: self.geometry.board_rect(),
        });

        if self.options.coordinates {
            let size = self.geometry.square_size() / 5.0;
            for square in Square::all() {
                let color = if square.is_light() {
                    palette.dark_square
                } else {
                    palette.light_square
                };
                let rect = self.geometry.square_rect(square);
                if self.geometry.screen_row(square) == 7 {
                    ops.push(DrawOp::Label {
                        pos: rect.right_bottom() - vec2(size * 0.8, size * 1.3),
                        text: char::from(b'a' + square.file()).to_string(),
                        size,
                        color,
                    });
                }
                let left_file = if self.geometry.flipped() { 7 } else { 0 };
                if square.file() == left_file {
                    ops.push(DrawOp::Label {
                        pos: rect.min + vec2(size * 0.3, size * 0.2),
                        text: (square.rank() + 1).to_string(),
                        size,
                        color,
                    });
                }
            }
        }
        ops
    }

    fn highlight_ops<R: RulesEngine + ?Sized>(&self, rules: &R) -> Vec<DrawOp> {
        let palette = &self.options.palette;
        let mut ops = Vec::new();

        if self.options.show_last_move {
            if let Some(last) = rules.last_move() {
                for square in [last.from, last.to] {
                    ops.push(DrawOp::Panel {
                        rect: self.geometry.square_rect(square),
                        color: palette.last_move,
                    });
                }
            }
        }

        if let Some(pending) = self.picker.pending() {
            ops.push(DrawOp::Panel {
                rect: self.geometry.square_rect(pending.to),
                color: palette.selection,
            });
            return ops;
        }

        let Some(selected) = self.drag.selected_square() else {
            return ops;
        };
        ops.push(DrawOp::Panel {
            rect: self.geometry.square_rect(selected),
            color: palette.selection,
        });
        if !self.options.show_hints {
            return ops;
        }

        let mut targets: Vec<Square> = rules
            .legal_moves_from(selected)
            .into_iter()
            .map(|mv| mv.to)
            .collect();
        targets.sort();
        targets.dedup();
        for target in targets {
            let rect = self.geometry.square_rect(target);
            if rules.piece_at(target).is_some() {
                let width = self.hints.capture_width;
                ops.push(DrawOp::RoundedRect {
                    rect: rect.shrink(width / 2.0),
                    rounding: width,
                    stroke: Stroke::new(width, palette.hint),
                });
            } else {
                ops.push(DrawOp::Disc {
                    rect: Rect::from_center_size(
                        rect.center(),
                        vec2(self.hints.dot_diameter, self.hints.dot_diameter),
                    ),
                    color: palette.hint,
                });
            }
        }
        ops
    }

    fn replay_annotations(&mut self, surface: &mut S) {
        if self.annotations.is_empty() {
            self.annotation_batch = None;
            return;
        }
        let revision = self.annotations.revision();
        let board_size = self.geometry.board_size();
        let flipped = self.geometry.flipped();
        let fresh = self.annotation_batch.as_ref().is_some_and(|cached| {
            cached.revision == revision
                && cached.board_size == board_size
                && cached.flipped == flipped
        });
        if !fresh {
            self.annotation_batch = Some(AnnotationBatch {
                revision,
                board_size,
                flipped,
                batch: surface.record(&self.annotations.to_ops(&self.geometry)),
            });
        }
        if let Some(cached) = &self.annotation_batch {
            surface.replay(&cached.batch);
        }
    }

    fn dispatch<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &mut R,
        event: &PointerEvent,
        output: &mut FrameOutput,
    ) {
        let square = self.geometry.square_at(event.position);
        match event.kind {
            PointerKind::Press => self.on_press(rules, event, square, output),
            PointerKind::Move | PointerKind::Drag => self.on_motion(event, square, output),
            PointerKind::Release => self.on_release(rules, event, square, output),
            PointerKind::Cancel => {
                let dropped = self.drag.cancel(event.pointer);
                if dropped != DragOutcome::Ignored {
                    self.settle(dropped, output);
                }
                if self.author.owner() == Some(event.pointer) && self.author.cancel() {
                    output.repaint(Duration::ZERO);
                }
                self.hover = None;
            }
        }
    }

    fn on_press<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &mut R,
        event: &PointerEvent,
        square: Option<Square>,
        output: &mut FrameOutput,
    ) {
        self.hover = square;
        if event.buttons.primary {
            if self.clear_annotations() {
                output.repaint(Duration::ZERO);
            }

            if self.picker.is_open() {
                let outcome = match self.picker.choice_at(&self.geometry, event.position) {
                    Some(kind) => {
                        self.picker.close();
                        self.drag.finish_promotion(rules, kind)
                    }
                    None => {
                        self.picker.close();
                        self.drag.abandon_promotion()
                    }
                };
                self.settle(outcome, output);
                return;
            }

            let outcome =
                self.drag
                    .press(rules, &self.geometry, square, event.position, event.pointer);
            self.settle(outcome, output);
        } else if event.buttons.secondary {
            if self.picker.is_open() {
                return;
            }
            if let Some(square) = square {
                let color = self
                    .options
                    .palette
                    .annotation_colors()
                    .for_modifiers(event.modifiers);
                self.author.begin(square, color, event.pointer);
                output.repaint(Duration::ZERO);
            }
        }
    }

    fn on_motion(&mut self, event: &PointerEvent, square: Option<Square>, output: &mut FrameOutput) {
        if self.hover != square {
            self.hover = square;
            output.repaint(Duration::ZERO);
        }
        if event.kind != PointerKind::Drag {
            return;
        }

        let moved = self.drag.drag(&self.geometry, event.position, event.pointer);
        let tracked = self.author.track(square, event.pointer);
        if moved != DragOutcome::Ignored || tracked {
            output.repaint(Duration::ZERO);
        }

        let owned = self.drag.owner() == Some(event.pointer)
            || self.author.owner() == Some(event.pointer);
        if owned && event.priority < Priority::Grabbed {
            output.grab = Some(event.pointer);
        }
    }

    fn on_release<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &mut R,
        event: &PointerEvent,
        square: Option<Square>,
        output: &mut FrameOutput,
    ) {
        if event.buttons.primary {
            let outcome = self
                .drag
                .release(rules, &self.geometry, square, event.pointer);
            self.settle(outcome, output);
        }
        if event.buttons.secondary && self.author.owner() == Some(event.pointer) {
            let finished =
                self.author
                    .finish(square, event.pointer, self.geometry.square_size());
            if let Some(annotation) = finished {
                self.annotations.commit(annotation);
            }
            output.repaint(Duration::ZERO);
        }
    }

    fn settle(&mut self, outcome: DragOutcome, output: &mut FrameOutput) {
        match outcome {
            DragOutcome::Ignored => {}
            DragOutcome::PromotionPending { from, to, side } => {
                self.picker.open(PendingPromotion { from, to, side });
                output.repaint(Duration::ZERO);
            }
            DragOutcome::Picked(_) | DragOutcome::Moved => output.repaint(Duration::ZERO),
            settled => {
                debug_assert!(settled.needs_settle_redraw());
                output.repaint(self.options.settle_delay);
            }
        }
    }

    fn cursor<R: RulesEngine + ?Sized>(&self, rules: &R) -> CursorGlyph {
        if self.drag.is_dragging() {
            return CursorGlyph::Grabbing;
        }
        let Some(square) = self.hover else {
            return CursorGlyph::Default;
        };
        if self.picker.is_open() {
            return CursorGlyph::Pointer;
        }
        let grabbable = rules
            .piece_at(square)
            .is_some_and(|piece| piece.side == rules.side_to_move());
        if grabbable {
            CursorGlyph::Grab
        } else {
            CursorGlyph::Pointer
        }
    }
}
