use crate::board::controller::{BoardController, FrameOutput};
use crate::board::drag::DragState;
use crate::board::input::CursorGlyph;
use crate::board::options::ViewOptions;
use crate::board::rules::RulesEngine;
use crate::gui::assets::SpriteAtlas;
use crate::gui::events::PointerTracker;
use crate::gui::surface::EguiSurface;
use eframe::egui;
use std::sync::Arc;
use std::time::Duration;

/// Square board widget filling the space it is given.
pub struct BoardView {
    controller: BoardController<EguiSurface>,
    atlas: Arc<SpriteAtlas>,
    tracker: PointerTracker,
}

impl BoardView {
    pub fn new(options: ViewOptions, flipped: bool, atlas: SpriteAtlas) -> Self {
        Self {
            controller: BoardController::new(options, flipped),
            atlas: Arc::new(atlas),
            tracker: PointerTracker::new(),
        }
    }

    pub fn controller(&self) -> &BoardController<EguiSurface> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut BoardController<EguiSurface> {
        &mut self.controller
    }

    pub fn show<R: RulesEngine + ?Sized>(&mut self, ui: &mut egui::Ui, rules: &mut R) -> FrameOutput {
        let side = ui.available_size().min_elem().max(0.0).floor();
        let (rect, response) = ui.allocate_exact_size(egui::Vec2::splat(side), egui::Sense::hover());

        let events = ui.input(|input| self.tracker.translate(&input.events, rect));
        let mut surface = EguiSurface::new(ui.painter_at(rect), rect.min, self.atlas.clone());
        let output = self.controller.frame(rules, &mut surface, side, &events);

        if output.grab.is_some() {
            self.tracker.grab();
        }
        if response.hovered() || self.controller.drag_state() != &DragState::Idle {
            if let Some(icon) = cursor_icon(output.cursor) {
                ui.ctx().set_cursor_icon(icon);
            }
        }
        match output.repaint_after {
            Some(delay) if delay == Duration::ZERO => ui.ctx().request_repaint(),
            Some(delay) => ui.ctx().request_repaint_after(delay),
            None => {}
        }
        output
    }
}

fn cursor_icon(glyph: CursorGlyph) -> Option<egui::CursorIcon> {
    match glyph {
        CursorGlyph::Default => None,
        CursorGlyph::Pointer => Some(egui::CursorIcon::PointingHand),
        CursorGlyph::Grab => Some(egui::CursorIcon::Grab),
        CursorGlyph::Grabbing => Some(egui::CursorIcon::Grabbing),
    }
}
