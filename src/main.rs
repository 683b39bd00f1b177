use anyhow::{anyhow, Result};
use chessboard_view::board::ShakmatyRules;
use chessboard_view::gui::app::ChessboardApp;
use chessboard_view::{logging, settings};
use eframe::egui;

fn main() -> Result<()> {
    let settings_path = settings::resolve_settings_path()?;
    let settings = settings::load_from_path(&settings_path)?;
    logging::init(settings.debug_logging, settings.log_file.clone());
    tracing::info!(path = %settings_path.display(), "settings loaded");

    let rules = match settings.start_fen.as_deref() {
        Some(fen) => ShakmatyRules::from_fen(fen)?,
        None => ShakmatyRules::new(),
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 560.0])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Chessboard",
        native_options,
        Box::new(move |cc| Box::new(ChessboardApp::new(cc, settings, settings_path, rules))),
    )
    .map_err(|err| anyhow!("run eframe: {err}"))
}
