use crate::board::square::Square;
use eframe::egui::{Pos2, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Release,
    /// Motion with no button held.
    Move,
    /// Motion with at least one button held.
    Drag,
    /// The pointer left or the platform aborted the gesture.
    Cancel,
}

/// For `Press`/`Release` the button that changed; for `Drag` the buttons
/// still held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerButtons {
    pub primary: bool,
    pub secondary: bool,
}

impl PointerButtons {
    pub const PRIMARY: Self = Self {
        primary: true,
        secondary: false,
    };
    pub const SECONDARY: Self = Self {
        primary: false,
        secondary: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Priority {
    #[default]
    Shared,
    Foremost,
    /// The input system routes this pointer to the board exclusively.
    Grabbed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Board-local position.
    pub position: Pos2,
    pub buttons: PointerButtons,
    pub modifiers: Modifiers,
    pub pointer: PointerId,
    pub priority: Priority,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, position: Pos2, buttons: PointerButtons) -> Self {
        Self {
            kind,
            position,
            buttons,
            modifiers: Modifiers::default(),
            pointer: PointerId::default(),
            priority: Priority::default(),
        }
    }

    pub fn press(position: Pos2, buttons: PointerButtons) -> Self {
        Self::new(PointerKind::Press, position, buttons)
    }

    pub fn release(position: Pos2, buttons: PointerButtons) -> Self {
        Self::new(PointerKind::Release, position, buttons)
    }

    pub fn drag(position: Pos2, buttons: PointerButtons) -> Self {
        Self::new(PointerKind::Drag, position, buttons)
    }

    pub fn hover(position: Pos2) -> Self {
        Self::new(PointerKind::Move, position, PointerButtons::default())
    }

    pub fn cancel() -> Self {
        Self::new(PointerKind::Cancel, Pos2::ZERO, PointerButtons::default())
    }

    pub fn with_pointer(mut self, pointer: PointerId) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorGlyph {
    #[default]
    Default,
    Pointer,
    Grab,
    Grabbing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Board,
    Square(Square),
}

/// Region the input system routes pointer events against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    pub target: HitTarget,
    pub rect: Rect,
}
