//! UI layer: app shell and image widgets.

pub mod app;
pub mod widgets;

pub use app::ImageTalesApp;
