use crate::board::input::{
    Modifiers, PointerButtons, PointerEvent, PointerId, PointerKind, Priority,
};
use eframe::egui;

/// egui exposes a single mouse pointer.
pub const MOUSE: PointerId = PointerId(0);

/// Turns egui's raw pointer events into board-local [`PointerEvent`]s.
///
/// Presses only count when they land on the board; everything else is
/// forwarded so a gesture that started on the board can finish off it.
#[derive(Debug, Default)]
pub struct PointerTracker {
    held: PointerButtons,
    modifiers: Modifiers,
    grabbed: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The board asked for exclusive routing of the current gesture.
    pub fn grab(&mut self) {
        self.grabbed = true;
    }

    pub fn held(&self) -> PointerButtons {
        self.held
    }

    pub fn translate(&mut self, events: &[egui::Event], board: egui::Rect) -> Vec<PointerEvent> {
        let mut out = Vec::new();
        for event in events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers,
                } => {
                    self.modifiers = from_egui_modifiers(*modifiers);
                    let Some(changed) = button_mask(*button) else {
                        continue;
                    };
                    if *pressed {
                        if !board.contains(*pos) {
                            continue;
                        }
                        self.set_held(changed, true);
                        out.push(self.stamp(PointerKind::Press, *pos, board, changed));
                    } else {
                        if !self.is_held(changed) {
                            continue;
                        }
                        self.set_held(changed, false);
                        out.push(self.stamp(PointerKind::Release, *pos, board, changed));
                        if self.held == PointerButtons::default() {
                            self.grabbed = false;
                        }
                    }
                }
                egui::Event::PointerMoved(pos) => {
                    let kind = if self.held == PointerButtons::default() {
                        PointerKind::Move
                    } else {
                        PointerKind::Drag
                    };
                    out.push(self.stamp(kind, *pos, board, self.held));
                }
                egui::Event::PointerGone => {
                    if self.held != PointerButtons::default() {
                        out.push(PointerEvent::cancel().with_pointer(MOUSE));
                    }
                    self.held = PointerButtons::default();
                    self.grabbed = false;
                }
                _ => {}
            }
        }
        out
    }

    fn stamp(
        &self,
        kind: PointerKind,
        pos: egui::Pos2,
        board: egui::Rect,
        buttons: PointerButtons,
    ) -> PointerEvent {
        let priority = if self.grabbed {
            Priority::Grabbed
        } else {
            Priority::Shared
        };
        PointerEvent::new(kind, (pos - board.min).to_pos2(), buttons)
            .with_pointer(MOUSE)
            .with_modifiers(self.modifiers)
            .with_priority(priority)
    }

    fn is_held(&self, mask: PointerButtons) -> bool {
        (mask.primary && self.held.primary) || (mask.secondary && self.held.secondary)
    }

    fn set_held(&mut self, mask: PointerButtons, down: bool) {
        if mask.primary {
            self.held.primary = down;
        }
        if mask.secondary {
            self.held.secondary = down;
        }
    }
}

fn button_mask(button: egui::PointerButton) -> Option<PointerButtons> {
    match button {
        egui::PointerButton::Primary => Some(PointerButtons::PRIMARY),
        egui::PointerButton::Secondary => Some(PointerButtons::SECONDARY),
        _ => None,
    }
}

fn from_egui_modifiers(modifiers: egui::Modifiers) -> Modifiers {
    Modifiers {
        alt: modifiers.alt,
        shift: modifiers.shift,
        ctrl: modifiers.ctrl || modifiers.mac_cmd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2, Event, PointerButton, Rect};

    fn board() -> Rect {
        Rect::from_min_size(pos2(100.0, 20.0), vec2(400.0, 400.0))
    }

    fn button(pos: egui::Pos2, button: PointerButton, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    #[test]
    fn press_drag_release_become_board_local() {
        let mut tracker = PointerTracker::new();
        let events = tracker.translate(
            &[
                button(pos2(325.0, 345.0), PointerButton::Primary, true),
                Event::PointerMoved(pos2(330.0, 300.0)),
                button(pos2(330.0, 300.0), PointerButton::Primary, false),
                Event::PointerMoved(pos2(340.0, 300.0)),
            ],
            board(),
        );

        let kinds: Vec<PointerKind> = events.iter().map(|event| event.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PointerKind::Press,
                PointerKind::Drag,
                PointerKind::Release,
                PointerKind::Move
            ]
        );
        assert_eq!(events[0].position, pos2(225.0, 325.0));
        assert_eq!(events[0].buttons, PointerButtons::PRIMARY);
        assert_eq!(events[2].buttons, PointerButtons::PRIMARY);
    }

    #[test]
    fn presses_off_the_board_are_not_forwarded() {
        let mut tracker = PointerTracker::new();
        let events = tracker.translate(
            &[
                button(pos2(10.0, 10.0), PointerButton::Primary, true),
                Event::PointerMoved(pos2(150.0, 50.0)),
                button(pos2(150.0, 50.0), PointerButton::Primary, false),
            ],
            board(),
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, PointerKind::Move);
    }

    #[test]
    fn grabbed_gesture_is_stamped_until_release() {
        let mut tracker = PointerTracker::new();
        tracker.translate(
            &[button(pos2(125.0, 45.0), PointerButton::Secondary, true)],
            board(),
        );
        tracker.grab();
        let events = tracker.translate(
            &[
                Event::PointerMoved(pos2(175.0, 45.0)),
                button(pos2(175.0, 45.0), PointerButton::Secondary, false),
                Event::PointerMoved(pos2(180.0, 45.0)),
            ],
            board(),
        );
        assert_eq!(events[0].priority, Priority::Grabbed);
        assert_eq!(events[0].buttons, PointerButtons::SECONDARY);
        assert_eq!(events[1].priority, Priority::Grabbed);
        assert_eq!(events[2].priority, Priority::Shared);
    }

    #[test]
    fn pointer_gone_cancels_a_held_gesture() {
        let mut tracker = PointerTracker::new();
        let events = tracker.translate(
            &[
                button(pos2(125.0, 45.0), PointerButton::Primary, true),
                Event::PointerGone,
                Event::PointerGone,
            ],
            board(),
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, PointerKind::Cancel);
        assert_eq!(tracker.held(), PointerButtons::default());
    }
}
