//! Seams between the music controller and whatever actually plays sound.
//!
//! The browser build implements these over `HtmlAudioElement`, `HtmlVideoElement`
//! and `gloo-timers`; tests implement them over plain shared state.

use std::time::Duration;

use super::error::ControllerError;
use super::fade::FadeTicket;

/// Generation number of a playback session. Bumped every time the track changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// Identifies one play request. An outcome carrying any other ticket is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayTicket(pub u64);

/// One loaded background track.
pub trait AudioSession {
    /// Requests playback. `Err` means the request was refused outright; otherwise
    /// the host reports the outcome later through `MusicController::play_settled`,
    /// tagged with `ticket`.
    fn begin_play(&mut self, ticket: PlayTicket) -> Result<(), ControllerError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
    fn set_looping(&mut self, looping: bool);
}

/// Read-only view of a foreground video competing for the speakers.
pub trait VideoProbe {
    fn is_paused(&self) -> bool;
    fn is_ended(&self) -> bool;
    fn is_muted(&self) -> bool;

    /// Videos removed from the page stop counting and are dropped.
    fn is_attached(&self) -> bool {
        true
    }

    fn same_element(&self, other: &Self) -> bool;

    fn is_audible(&self) -> bool {
        !self.is_paused() && !self.is_ended() && !self.is_muted()
    }
}

pub trait MediaHost {
    type Session: AudioSession;
    type Video: VideoProbe;

    /// Loads `url` as a new session. The host must report that session's
    /// "ended" notice tagged with `id`.
    fn open_session(&mut self, url: &str, id: SessionId) -> Result<Self::Session, ControllerError>;

    /// Starts a periodic timer that delivers `ticket` every `every`.
    fn start_fade_timer(&mut self, ticket: FadeTicket, every: Duration);

    fn stop_fade_timer(&mut self, ticket: FadeTicket);
}
