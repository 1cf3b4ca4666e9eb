//! Background music core.
//!
//! Everything here is platform-neutral. The browser binding lives in
//! `components::audio_manager` and plugs in through the traits in [`media`].
//! Desktop builds only read the config and render snapshots, so the playback
//! half is compiled but not driven there.

#[cfg_attr(not(any(target_arch = "wasm32", test)), allow(dead_code))]
mod config;
#[cfg_attr(not(any(target_arch = "wasm32", test)), allow(dead_code))]
mod controller;
mod error;
#[cfg_attr(not(any(target_arch = "wasm32", test)), allow(dead_code))]
mod fade;
#[cfg_attr(not(any(target_arch = "wasm32", test)), allow(dead_code))]
mod media;
#[cfg_attr(not(any(target_arch = "wasm32", test)), allow(dead_code))]
mod tracks;

#[cfg(test)]
pub mod test_support;

pub use config::{LoadingConfig, MusicConfig, PageConfig};
pub use controller::MusicSnapshot;
pub use error::ControllerError;

#[cfg(target_arch = "wasm32")]
pub use controller::MusicController;
#[cfg(target_arch = "wasm32")]
pub use fade::FadeTicket;
#[cfg(target_arch = "wasm32")]
pub use media::{AudioSession, MediaHost, PlayTicket, SessionId, VideoProbe};
