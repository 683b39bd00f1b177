use crate::board::piece::Piece;
use anyhow::{Context, Result};
use eframe::egui;
use std::collections::HashMap;
use std::path::Path;

/// Board and piece textures. Anything that failed to load is simply
/// absent and the surface falls back to plain shapes.
#[derive(Default)]
pub struct SpriteAtlas {
    board: Option<egui::TextureHandle>,
    pieces: HashMap<Piece, egui::TextureHandle>,
}

impl SpriteAtlas {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(ctx: &egui::Context, board_image: Option<&Path>, pieces_dir: Option<&Path>) -> Self {
        let mut atlas = Self::default();

        if let Some(path) = board_image {
            match load_texture(ctx, "board", path) {
                Ok(texture) => atlas.board = Some(texture),
                Err(err) => tracing::warn!("board image unavailable: {err:#}"),
            }
        }

        if let Some(dir) = pieces_dir {
            for piece in Piece::all() {
                let name = piece.asset_name();
                let path = dir.join(format!("{name}.png"));
                match load_texture(ctx, &name, &path) {
                    Ok(texture) => {
                        atlas.pieces.insert(piece, texture);
                    }
                    Err(err) => tracing::warn!("piece image unavailable: {err:#}"),
                }
            }
        }

        tracing::info!(
            board = atlas.board.is_some(),
            pieces = atlas.pieces.len(),
            "sprites loaded"
        );
        atlas
    }

    pub fn board(&self) -> Option<egui::TextureId> {
        self.board.as_ref().map(|texture| texture.id())
    }

    pub fn piece(&self, piece: Piece) -> Option<egui::TextureId> {
        self.pieces.get(&piece).map(|texture| texture.id())
    }
}

pub fn load_color_image(path: &Path) -> Result<egui::ColorImage> {
    let img = image::open(path).with_context(|| format!("open image {}", path.display()))?;
    let size = [img.width() as usize, img.height() as usize];
    let rgba = img.to_rgba8();
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

fn load_texture(ctx: &egui::Context, name: &str, path: &Path) -> Result<egui::TextureHandle> {
    let image = load_color_image(path)?;
    Ok(ctx.load_texture(name, image, egui::TextureOptions::LINEAR))
}
