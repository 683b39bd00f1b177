use crate::board::annotation::MarkerShape;
use crate::board::options::{Palette, ViewOptions};
use anyhow::{anyhow, Context, Result};
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE_NAME: &str = "chessboard_settings.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl BoardColor {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_color32(self) -> Color32 {
        Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }

    pub fn from_color32(color: Color32) -> Self {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        Self::rgba(r, g, b, a)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Coordinates {
    #[default]
    None,
    Inside,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaletteSettings {
    pub light_square: BoardColor,
    pub dark_square: BoardColor,
    pub hint: BoardColor,
    pub last_move: BoardColor,
    pub selection: BoardColor,
    pub primary: BoardColor,
    pub info: BoardColor,
    pub warning: BoardColor,
    pub danger: BoardColor,
    pub promotion_backdrop: BoardColor,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self::from_palette(&Palette::default())
    }
}

impl PaletteSettings {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            light_square: BoardColor::from_color32(palette.light_square),
            dark_square: BoardColor::from_color32(palette.dark_square),
            hint: BoardColor::from_color32(palette.hint),
            last_move: BoardColor::from_color32(palette.last_move),
            selection: BoardColor::from_color32(palette.selection),
            primary: BoardColor::from_color32(palette.primary),
            info: BoardColor::from_color32(palette.info),
            warning: BoardColor::from_color32(palette.warning),
            danger: BoardColor::from_color32(palette.danger),
            promotion_backdrop: BoardColor::from_color32(palette.promotion_backdrop),
        }
    }

    pub fn to_palette(&self) -> Palette {
        Palette {
            light_square: self.light_square.to_color32(),
            dark_square: self.dark_square.to_color32(),
            hint: self.hint.to_color32(),
            last_move: self.last_move.to_color32(),
            selection: self.selection.to_color32(),
            primary: self.primary.to_color32(),
            info: self.info.to_color32(),
            warning: self.warning.to_color32(),
            danger: self.danger.to_color32(),
            promotion_backdrop: self.promotion_backdrop.to_color32(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardSettings {
    pub show_hints: bool,
    pub show_last_move: bool,
    pub flipped: bool,
    pub coordinates: Coordinates,
    pub marker_shape: MarkerShape,
    /// Delay in milliseconds before a dropped piece settles.
    pub snap_redraw_ms: u64,
    pub palette: PaletteSettings,
    /// Board skin. Checkered squares are drawn when absent.
    pub board_image: Option<PathBuf>,
    /// Folder holding `wK.png` .. `bP.png`. A missing sprite is drawn as a
    /// disc token carrying the piece letter.
    pub pieces_dir: Option<PathBuf>,
    pub start_fen: Option<String>,
    pub debug_logging: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            show_hints: true,
            show_last_move: true,
            flipped: false,
            coordinates: Coordinates::default(),
            marker_shape: MarkerShape::default(),
            snap_redraw_ms: 40,
            palette: PaletteSettings::default(),
            board_image: None,
            pieces_dir: None,
            start_fen: None,
            debug_logging: false,
            log_file: None,
        }
    }
}

impl BoardSettings {
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            show_hints: self.show_hints,
            show_last_move: self.show_last_move,
            coordinates: self.coordinates == Coordinates::Inside,
            marker_shape: self.marker_shape,
            settle_delay: Duration::from_millis(self.snap_redraw_ms),
            palette: self.palette.to_palette(),
        }
    }
}

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

pub fn load() -> Result<BoardSettings> {
    load_from_path(&resolve_settings_path()?)
}

pub fn save(settings: &BoardSettings) -> Result<PathBuf> {
    let path = resolve_settings_path()?;
    save_to_path(&path, settings)?;
    Ok(path)
}

pub fn load_from_path(path: &Path) -> Result<BoardSettings> {
    if !path.exists() {
        return Ok(BoardSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read board settings file {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(BoardSettings::default());
    }

    serde_json::from_str(&content)
        .with_context(|| format!("deserialize board settings file {}", path.display()))
}

pub fn save_to_path(path: &Path, settings: &BoardSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create board settings parent folder {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(settings).context("serialize board settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("write board settings file {}", path.display()))
}
