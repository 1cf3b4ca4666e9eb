//! The components module contains all shared components for the page.

mod app;
mod audio_manager;
mod icons;
mod loading_screen;

pub use app::*;
pub use audio_manager::*;
pub use icons::*;
pub use loading_screen::*;
