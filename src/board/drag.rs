//! Piece selection and drag-and-drop.
//!
//! ```text
//! Idle --press own piece--> Selected{held} --drag--> Dragging
//! Selected{held} --release on origin--> Selected{released}
//! Selected/Dragging --release or press on target--> Idle (committed or snapped back)
//!                                               \--> AwaitingPromotion
//! AwaitingPromotion --pick--> Idle (committed)
//! AwaitingPromotion --abandon--> Idle (snapped back)
//! ```

use crate::board::geometry::{BoardGeometry, Rescale};
use crate::board::input::PointerId;
use crate::board::piece::{Move, Piece, PieceKind, Side};
use crate::board::rules::{resolve_drop, DropResolution, RulesEngine};
use crate::board::square::Square;
use eframe::egui::Pos2;

/// The piece currently lifted off its square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grip {
    pub square: Square,
    pub piece: Piece,
    pub pointer: PointerId,
    /// Top-left corner of the piece sprite, board-local.
    pub draw_pos: Pos2,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// `held` while the owning pointer is still down and has not moved.
    Selected { grip: Grip, held: bool },
    Dragging(Grip),
    /// Dropped on a promotion square; the piece is parked on `target`.
    AwaitingPromotion { grip: Grip, target: Square },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Ignored,
    Picked(Square),
    /// The dragged piece followed the pointer.
    Moved,
    /// Put down on its own square after a click; still selected.
    Settled,
    Committed(Move),
    PromotionPending { from: Square, to: Square, side: Side },
    /// Snapped back to its origin and deselected.
    Returned,
    Cancelled,
}

impl DragOutcome {
    /// Outcomes after which the piece jumps and a settle frame should render.
    pub fn needs_settle_redraw(self) -> bool {
        matches!(
            self,
            Self::Settled | Self::Committed(_) | Self::Returned | Self::Cancelled
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct DragMachine {
    state: DragState,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn grip(&self) -> Option<&Grip> {
        match &self.state {
            DragState::Idle => None,
            DragState::Selected { grip, .. }
            | DragState::Dragging(grip)
            | DragState::AwaitingPromotion { grip, .. } => Some(grip),
        }
    }

    pub fn selected_square(&self) -> Option<Square> {
        self.grip().map(|grip| grip.square)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Pointer that currently owns a held piece, if any.
    pub fn owner(&self) -> Option<PointerId> {
        match &self.state {
            DragState::Selected { grip, held: true } | DragState::Dragging(grip) => {
                Some(grip.pointer)
            }
            _ => None,
        }
    }

    pub fn press<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &mut R,
        geometry: &BoardGeometry,
        square: Option<Square>,
        position: Pos2,
        pointer: PointerId,
    ) -> DragOutcome {
        let grip = match self.state {
            DragState::Idle => {
                let side = rules.side_to_move();
                return self.try_pick(rules, geometry, square, position, pointer, side);
            }
            DragState::AwaitingPromotion { .. } => return DragOutcome::Ignored,
            DragState::Selected { grip, held: true } | DragState::Dragging(grip)
                if grip.pointer != pointer =>
            {
                return DragOutcome::Ignored;
            }
            DragState::Selected { grip, .. } | DragState::Dragging(grip) => grip,
        };

        let Some(target) = square else {
            return self.snap_back("pressed outside the board");
        };
        if target == grip.square {
            return self.snap_back("pressed the selected square");
        }
        let reselect = rules
            .piece_at(target)
            .is_some_and(|piece| piece.side == grip.piece.side);
        if reselect {
            return self.try_pick(rules, geometry, square, position, pointer, grip.piece.side);
        }
        self.attempt(rules, geometry, grip, target)
    }

    pub fn drag(
        &mut self,
        geometry: &BoardGeometry,
        position: Pos2,
        pointer: PointerId,
    ) -> DragOutcome {
        match self.state {
            DragState::Selected { grip, held: true } | DragState::Dragging(grip)
                if grip.pointer == pointer =>
            {
                self.state = DragState::Dragging(Grip {
                    draw_pos: position - geometry.half_piece(),
                    ..grip
                });
                DragOutcome::Moved
            }
            _ => DragOutcome::Ignored,
        }
    }

    pub fn release<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &mut R,
        geometry: &BoardGeometry,
        square: Option<Square>,
        pointer: PointerId,
    ) -> DragOutcome {
        let (grip, moved) = match self.state {
            DragState::Selected { grip, held: true } if grip.pointer == pointer => (grip, false),
            DragState::Dragging(grip) if grip.pointer == pointer => (grip, true),
            _ => return DragOutcome::Ignored,
        };

        match square {
            None => self.snap_back("dropped outside the board"),
            Some(target) if target == grip.square && moved => {
                self.snap_back("dropped back on its own square")
            }
            Some(target) if target == grip.square => {
                self.state = DragState::Selected {
                    grip: Grip {
                        draw_pos: geometry.origin(grip.square),
                        ..grip
                    },
                    held: false,
                };
                DragOutcome::Settled
            }
            Some(target) => self.attempt(rules, geometry, grip, target),
        }
    }

    /// Pointer loss. Only the owning pointer can cancel a held piece.
    pub fn cancel(&mut self, pointer: PointerId) -> DragOutcome {
        if self.owner() != Some(pointer) {
            return DragOutcome::Ignored;
        }
        tracing::debug!("drag cancelled");
        self.state = DragState::Idle;
        DragOutcome::Cancelled
    }

    /// Drops any selection regardless of ownership (flip, reset).
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn finish_promotion<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &mut R,
        kind: PieceKind,
    ) -> DragOutcome {
        let DragState::AwaitingPromotion { grip, target } = self.state else {
            return DragOutcome::Ignored;
        };
        self.state = DragState::Idle;
        let mv = Move::promoting(grip.square, target, kind);
        match rules.apply_move(mv) {
            Ok(()) => {
                tracing::debug!(%mv, "promotion committed");
                DragOutcome::Committed(mv)
            }
            Err(err) => {
                tracing::warn!(%err, "rules engine rejected a listed promotion");
                DragOutcome::Returned
            }
        }
    }

    pub fn abandon_promotion(&mut self) -> DragOutcome {
        if !matches!(self.state, DragState::AwaitingPromotion { .. }) {
            return DragOutcome::Ignored;
        }
        self.snap_back("promotion abandoned")
    }

    /// Drops the selection when the position changed underneath it.
    /// Returns `true` if it did.
    pub fn revalidate<R: RulesEngine + ?Sized>(&mut self, rules: &R) -> bool {
        let Some(grip) = self.grip() else {
            return false;
        };
        if rules.piece_at(grip.square) == Some(grip.piece) {
            return false;
        }
        tracing::debug!(square = %grip.square, "selection no longer matches the position");
        self.state = DragState::Idle;
        true
    }

    fn try_pick<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &R,
        geometry: &BoardGeometry,
        square: Option<Square>,
        position: Pos2,
        pointer: PointerId,
        side: Side,
    ) -> DragOutcome {
        let Some(square) = square else {
            return DragOutcome::Ignored;
        };
        let Some(piece) = rules.piece_at(square).filter(|piece| piece.side == side) else {
            return DragOutcome::Ignored;
        };
        tracing::debug!(%square, ?piece, "piece selected");
        self.state = DragState::Selected {
            grip: Grip {
                square,
                piece,
                pointer,
                draw_pos: position - geometry.half_piece(),
            },
            held: true,
        };
        DragOutcome::Picked(square)
    }

    fn attempt<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &mut R,
        geometry: &BoardGeometry,
        grip: Grip,
        target: Square,
    ) -> DragOutcome {
        match resolve_drop(rules, grip.square, target) {
            DropResolution::Illegal => {
                tracing::debug!(from = %grip.square, to = %target, "illegal target");
                self.snap_back("illegal target")
            }
            DropResolution::Move(mv) => match rules.apply_move(mv) {
                Ok(()) => {
                    tracing::debug!(%mv, "move committed");
                    self.state = DragState::Idle;
                    DragOutcome::Committed(mv)
                }
                Err(err) => {
                    tracing::warn!(%err, "rules engine rejected a listed move");
                    self.snap_back("move rejected")
                }
            },
            DropResolution::NeedsPromotion => {
                self.state = DragState::AwaitingPromotion {
                    grip: Grip {
                        draw_pos: geometry.origin(target),
                        ..grip
                    },
                    target,
                };
                DragOutcome::PromotionPending {
                    from: grip.square,
                    to: target,
                    side: grip.piece.side,
                }
            }
        }
    }

    fn snap_back(&mut self, reason: &str) -> DragOutcome {
        if let Some(grip) = self.grip() {
            tracing::debug!(square = %grip.square, reason, "piece returned");
        }
        self.state = DragState::Idle;
        DragOutcome::Returned
    }
}

impl Rescale for DragMachine {
    fn rescale(&mut self, factor: f32) {
        match &mut self.state {
            DragState::Idle => {}
            DragState::Selected { grip, .. }
            | DragState::Dragging(grip)
            | DragState::AwaitingPromotion { grip, .. } => grip.draw_pos.rescale(factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::rules::ScriptedRules;
    use eframe::egui::pos2;

    const MOUSE: PointerId = PointerId(0);
    const FINGER: PointerId = PointerId(7);

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn center(geometry: &BoardGeometry, name: &str) -> Pos2 {
        geometry.square_center(sq(name))
    }

    fn knight_game() -> ScriptedRules {
        ScriptedRules::new(Side::White)
            .with_piece(sq("g1"), Piece::new(Side::White, PieceKind::Knight))
            .with_piece(sq("b1"), Piece::new(Side::White, PieceKind::Knight))
            .with_piece(sq("g8"), Piece::new(Side::Black, PieceKind::Knight))
            .with_moves([Move::new(sq("g1"), sq("f3")), Move::new(sq("b1"), sq("c3"))])
    }

    fn press(
        machine: &mut DragMachine,
        rules: &mut ScriptedRules,
        geometry: &BoardGeometry,
        name: &str,
        pointer: PointerId,
    ) -> DragOutcome {
        let at = center(geometry, name);
        machine.press(rules, geometry, geometry.square_at(at), at, pointer)
    }

    fn release(
        machine: &mut DragMachine,
        rules: &mut ScriptedRules,
        geometry: &BoardGeometry,
        name: &str,
        pointer: PointerId,
    ) -> DragOutcome {
        let at = center(geometry, name);
        machine.release(rules, geometry, geometry.square_at(at), pointer)
    }

    #[test]
    fn press_centers_piece_under_pointer() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let mut machine = DragMachine::new();

        assert_eq!(
            press(&mut machine, &mut rules, &geometry, "g1", MOUSE),
            DragOutcome::Picked(sq("g1"))
        );
        let grip = machine.grip().copied().expect("grip");
        assert_eq!(grip.draw_pos, geometry.origin(sq("g1")));
        assert_eq!(machine.owner(), Some(MOUSE));
    }

    #[test]
    fn opponent_piece_does_not_start_a_drag() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let mut machine = DragMachine::new();

        assert_eq!(
            press(&mut machine, &mut rules, &geometry, "g8", MOUSE),
            DragOutcome::Ignored
        );
        assert_eq!(machine.state(), &DragState::Idle);
    }

    #[test]
    fn drag_then_drop_on_legal_square_commits() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let mut machine = DragMachine::new();

        press(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        assert_eq!(
            machine.drag(&geometry, pos2(260.0, 300.0), MOUSE),
            DragOutcome::Moved
        );
        assert!(machine.is_dragging());
        assert_eq!(
            release(&mut machine, &mut rules, &geometry, "f3", MOUSE),
            DragOutcome::Committed(Move::new(sq("g1"), sq("f3")))
        );
        assert_eq!(machine.state(), &DragState::Idle);
        assert_eq!(rules.move_history().len(), 1);
    }

    #[test]
    fn illegal_drop_returns_piece_and_keeps_position() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let before = rules.position_hash();
        let mut machine = DragMachine::new();

        press(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        machine.drag(&geometry, center(&geometry, "g4"), MOUSE);
        assert_eq!(
            release(&mut machine, &mut rules, &geometry, "g4", MOUSE),
            DragOutcome::Returned
        );
        assert_eq!(machine.state(), &DragState::Idle);
        assert_eq!(rules.position_hash(), before);
    }

    #[test]
    fn second_pointer_cannot_steal_a_held_piece() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let mut machine = DragMachine::new();

        press(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        assert_eq!(
            machine.drag(&geometry, pos2(10.0, 10.0), FINGER),
            DragOutcome::Ignored
        );
        assert_eq!(
            press(&mut machine, &mut rules, &geometry, "b1", FINGER),
            DragOutcome::Ignored
        );
        assert_eq!(
            release(&mut machine, &mut rules, &geometry, "f3", FINGER),
            DragOutcome::Ignored
        );
        assert_eq!(machine.cancel(FINGER), DragOutcome::Ignored);
        assert_eq!(machine.selected_square(), Some(sq("g1")));
    }

    #[test]
    fn click_then_click_moves_the_piece() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let mut machine = DragMachine::new();

        press(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        assert_eq!(
            release(&mut machine, &mut rules, &geometry, "g1", MOUSE),
            DragOutcome::Settled
        );
        assert_eq!(machine.owner(), None);
        assert_eq!(machine.selected_square(), Some(sq("g1")));

        assert_eq!(
            press(&mut machine, &mut rules, &geometry, "f3", MOUSE),
            DragOutcome::Committed(Move::new(sq("g1"), sq("f3")))
        );
    }

    #[test]
    fn pressing_selected_square_again_deselects() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let mut machine = DragMachine::new();

        press(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        release(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        assert_eq!(
            press(&mut machine, &mut rules, &geometry, "g1", MOUSE),
            DragOutcome::Returned
        );
        assert_eq!(machine.state(), &DragState::Idle);
    }

    #[test]
    fn pressing_another_own_piece_reselects() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let mut machine = DragMachine::new();

        press(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        release(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        assert_eq!(
            press(&mut machine, &mut rules, &geometry, "b1", MOUSE),
            DragOutcome::Picked(sq("b1"))
        );
    }

    #[test]
    fn dragging_back_to_origin_is_a_plain_deselect() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let mut machine = DragMachine::new();

        press(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        machine.drag(&geometry, center(&geometry, "g2"), MOUSE);
        assert_eq!(
            release(&mut machine, &mut rules, &geometry, "g1", MOUSE),
            DragOutcome::Returned
        );
        assert!(rules.move_history().is_empty());
    }

    #[test]
    fn drop_outside_the_board_is_cancellation() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let mut machine = DragMachine::new();

        press(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        machine.drag(&geometry, pos2(420.0, 10.0), MOUSE);
        assert_eq!(
            machine.release(&mut rules, &geometry, None, MOUSE),
            DragOutcome::Returned
        );
        assert_eq!(machine.state(), &DragState::Idle);
    }

    #[test]
    fn promotion_parks_the_pawn_until_a_piece_is_chosen() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = ScriptedRules::new(Side::White)
            .with_piece(sq("a7"), Piece::new(Side::White, PieceKind::Pawn))
            .with_moves(
                PieceKind::PROMOTIONS
                    .into_iter()
                    .map(|kind| Move::promoting(sq("a7"), sq("a8"), kind)),
            );
        let before = rules.position_hash();
        let mut machine = DragMachine::new();

        press(&mut machine, &mut rules, &geometry, "a7", MOUSE);
        machine.drag(&geometry, center(&geometry, "a8"), MOUSE);
        assert_eq!(
            release(&mut machine, &mut rules, &geometry, "a8", MOUSE),
            DragOutcome::PromotionPending {
                from: sq("a7"),
                to: sq("a8"),
                side: Side::White
            }
        );
        assert_eq!(rules.position_hash(), before);
        assert_eq!(
            machine.grip().map(|grip| grip.draw_pos),
            Some(geometry.origin(sq("a8")))
        );

        assert_eq!(
            machine.finish_promotion(&mut rules, PieceKind::Rook),
            DragOutcome::Committed(Move::promoting(sq("a7"), sq("a8"), PieceKind::Rook))
        );
        assert_eq!(
            rules.piece_at(sq("a8")),
            Some(Piece::new(Side::White, PieceKind::Rook))
        );
    }

    #[test]
    fn rescale_moves_the_floating_piece_with_the_board() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let mut machine = DragMachine::new();

        press(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        machine.drag(&geometry, pos2(123.0, 321.0), MOUSE);
        let before = machine.grip().unwrap().draw_pos;
        machine.rescale(1.5);
        machine.rescale(1.0 / 1.5);
        let after = machine.grip().unwrap().draw_pos;
        assert!((before - after).length() < 1e-3);
    }

    #[test]
    fn revalidate_drops_selection_when_piece_disappears() {
        let geometry = BoardGeometry::new(400.0, false);
        let mut rules = knight_game();
        let mut machine = DragMachine::new();

        press(&mut machine, &mut rules, &geometry, "g1", MOUSE);
        assert!(!machine.revalidate(&rules));
        rules.put(sq("g1"), None);
        assert!(machine.revalidate(&rules));
        assert_eq!(machine.state(), &DragState::Idle);
    }
}
