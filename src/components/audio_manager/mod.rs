//! Background music on the page: the floating controller widget and the
//! host that drives [`crate::music::MusicController`] in the browser.

use dioxus::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
mod controller_native;
#[cfg(target_arch = "wasm32")]
mod controller_web;
#[cfg(target_arch = "wasm32")]
mod web_host;
mod widget;

#[cfg(not(target_arch = "wasm32"))]
pub use controller_native::BackgroundMusic;
#[cfg(target_arch = "wasm32")]
pub use controller_web::BackgroundMusic;
pub use widget::MusicWidget;

/// Flipped to `true` by the loading screen once the page is ready for music.
#[derive(Clone, Copy)]
pub struct MusicStartSignal(pub Signal<bool>);
