pub mod annotation;
pub mod cache;
pub mod controller;
pub mod drag;
pub mod geometry;
pub mod input;
pub mod options;
pub mod piece;
pub mod promotion;
pub mod rules;
pub mod shakmaty_rules;
pub mod square;
pub mod surface;

pub use controller::{BoardController, FrameOutput};
pub use options::{Palette, ViewOptions};
pub use piece::{Move, Piece, PieceKind, Side};
pub use rules::{IllegalMove, RulesEngine, ScriptedRules};
pub use shakmaty_rules::ShakmatyRules;
pub use square::Square;
pub use surface::{CommandList, DrawOp, Sprite, Surface};
