pub mod app;
pub mod assets;
pub mod events;
pub mod surface;
pub mod widget;

pub use app::ChessboardApp;
pub use widget::BoardView;
