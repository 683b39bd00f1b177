use crate::board::piece::{PieceKind, Side};
use crate::board::rules::RulesEngine;
use crate::board::shakmaty_rules::ShakmatyRules;
use crate::gui::assets::SpriteAtlas;
use crate::gui::widget::BoardView;
use crate::settings::{self, BoardSettings};
use eframe::egui;
use std::path::PathBuf;
use std::time::Instant;

/// Exponentially smoothed frames per second.
#[derive(Debug)]
pub struct FrameCounter {
    last: Option<Instant>,
    fps: f32,
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self { last: None, fps: 0.0 }
    }
}

impl FrameCounter {
    pub fn tick(&mut self, now: Instant) -> f32 {
        if let Some(last) = self.last {
            let dt = now.duration_since(last).as_secs_f32();
            if dt > 0.0 {
                let sample = 1.0 / dt;
                self.fps = if self.fps == 0.0 {
                    sample
                } else {
                    self.fps * 0.9 + sample * 0.1
                };
            }
        }
        self.last = Some(now);
        self.fps
    }
}

/// Height left for the move list once the FPS footer is reserved.
fn move_list_height(available: f32) -> f32 {
    (available - 40.0).max(0.0)
}

pub struct ChessboardApp {
    rules: ShakmatyRules,
    initial: ShakmatyRules,
    board: BoardView,
    settings: BoardSettings,
    settings_path: PathBuf,
    frames: FrameCounter,
    error: Option<String>,
}

impl ChessboardApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: BoardSettings,
        settings_path: PathBuf,
        rules: ShakmatyRules,
    ) -> Self {
        let atlas = SpriteAtlas::load(
            &cc.egui_ctx,
            settings.board_image.as_deref(),
            settings.pieces_dir.as_deref(),
        );
        Self {
            initial: rules.clone(),
            rules,
            board: BoardView::new(settings.view_options(), settings.flipped, atlas),
            settings,
            settings_path,
            frames: FrameCounter::default(),
            error: None,
        }
    }

    fn flip(&mut self) {
        self.board.controller_mut().flip();
        self.settings.flipped = self.board.controller().is_flipped();
        if let Err(err) = settings::save_to_path(&self.settings_path, &self.settings) {
            tracing::warn!("failed to save board settings: {err:#}");
            self.error = Some(format!("Failed to save settings: {err}"));
        }
    }

    fn reset(&mut self) {
        self.rules = self.initial.clone();
        self.board.controller_mut().reset();
        tracing::info!("position reset");
    }

    fn side_panel(&mut self, ui: &mut egui::Ui, fps: f32) {
        ui.heading("Board");
        ui.horizontal(|ui| {
            if ui.button("Flip").clicked() {
                self.flip();
            }
            if ui.button("Reset").clicked() {
                self.reset();
            }
        });
        if ui.button("Clear annotations").clicked() {
            self.board.controller_mut().clear_annotations();
        }

        ui.separator();
        let to_move = match self.rules.side_to_move() {
            Side::White => "White",
            Side::Black => "Black",
        };
        ui.label(format!("{to_move} to move"));

        if self.board.controller().pending_promotion().is_some() {
            ui.label("Promote to:");
            ui.horizontal(|ui| {
                for kind in PieceKind::PROMOTIONS {
                    if ui.button(kind.letter().to_ascii_uppercase().to_string()).clicked() {
                        self.board
                            .controller_mut()
                            .choose_promotion(&mut self.rules, kind);
                    }
                }
            });
        }

        ui.separator();
        ui.label("Moves");
        egui::ScrollArea::vertical()
            .max_height(move_list_height(ui.available_height()))
            .show(ui, |ui| {
                for (number, pair) in self.rules.move_history().chunks(2).enumerate() {
                    let text = match pair {
                        [white, black] => format!("{}. {white} {black}", number + 1),
                        [white] => format!("{}. {white}", number + 1),
                        _ => continue,
                    };
                    ui.monospace(text);
                }
            });

        ui.separator();
        ui.label(format!("{fps:.0} FPS"));
        if let Some(err) = &self.error {
            ui.colored_label(egui::Color32::RED, err);
        }
    }
}

impl eframe::App for ChessboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let fps = self.frames.tick(Instant::now());

        egui::SidePanel::left("board_controls")
            .resizable(false)
            .default_width(180.0)
            .show(ctx, |ui| self.side_panel(ui, fps));

        egui::CentralPanel::default().show(ctx, |ui| {
            self.board.show(ui, &mut self.rules);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn frame_counter_smooths_samples() {
        let mut counter = FrameCounter::default();
        let start = Instant::now();
        assert_eq!(counter.tick(start), 0.0);
        let first = counter.tick(start + Duration::from_millis(20));
        assert!((first - 50.0).abs() < 0.5);
        let second = counter.tick(start + Duration::from_millis(30));
        assert!(second > first && second < 100.0);
    }

    #[test]
    fn move_list_never_gets_a_negative_height() {
        assert_eq!(move_list_height(300.0), 260.0);
        assert_eq!(move_list_height(25.0), 0.0);
    }
}
