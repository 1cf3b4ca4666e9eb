use thiserror::Error;

/// Failures surfaced by the background music layer.
///
/// Only construction hands these back to the caller. Once the controller is
/// running, errors are logged and the controller falls back to being muted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    #[error("track list is empty")]
    EmptyTrackList,
    #[error("required page element missing: {0}")]
    MissingDom(&'static str),
    #[error("playback failed: {0}")]
    Playback(String),
    #[error("preference storage failed: {0}")]
    Storage(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}
