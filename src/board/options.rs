use crate::board::annotation::{AnnotationColors, MarkerShape};
use eframe::egui::Color32;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub light_square: Color32,
    pub dark_square: Color32,
    pub hint: Color32,
    pub last_move: Color32,
    pub selection: Color32,
    pub primary: Color32,
    pub info: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub promotion_backdrop: Color32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            light_square: Color32::from_rgb(240, 217, 181),
            dark_square: Color32::from_rgb(181, 136, 99),
            hint: Color32::from_rgba_unmultiplied(90, 90, 90, 77),
            last_move: Color32::from_rgba_unmultiplied(255, 235, 59, 128),
            selection: Color32::from_rgba_unmultiplied(20, 120, 30, 110),
            primary: Color32::from_rgba_unmultiplied(21, 120, 27, 200),
            info: Color32::from_rgba_unmultiplied(0, 120, 215, 200),
            warning: Color32::from_rgba_unmultiplied(230, 160, 0, 200),
            danger: Color32::from_rgba_unmultiplied(200, 30, 30, 200),
            promotion_backdrop: Color32::from_black_alpha(140),
        }
    }
}

impl Palette {
    pub fn annotation_colors(&self) -> AnnotationColors {
        AnnotationColors {
            primary: self.primary,
            info: self.info,
            warning: self.warning,
            danger: self.danger,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    pub show_hints: bool,
    pub show_last_move: bool,
    pub coordinates: bool,
    pub marker_shape: MarkerShape,
    /// Delay before the frame that shows a piece settling on a square.
    pub settle_delay: Duration,
    pub palette: Palette,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_hints: true,
            show_last_move: true,
            coordinates: false,
            marker_shape: MarkerShape::default(),
            settle_delay: Duration::from_millis(40),
            palette: Palette::default(),
        }
    }
}
