//! Background music controller.
//!
//! Owns a single looping background track and keeps it out of the way of
//! foreground videos: whenever any observed video is audibly playing the track
//! fades to silence and pauses, and it fades back in once every video has gone
//! quiet, unless the visitor muted it. Every volume change is a stepped ramp.
//!
//! The controller is driven entirely by the host. Clicks, video events, timer
//! ticks, play outcomes and "ended" notices all arrive as method calls, one at
//! a time, in the order the host delivers them.

use tracing::{debug, info, warn};

use super::config::MusicConfig;
use super::error::ControllerError;
use super::fade::{FadeRamp, FadeSettings, FadeStep, FadeTicket};
use super::media::{AudioSession, MediaHost, PlayTicket, SessionId, VideoProbe};
use super::tracks::TrackList;
use crate::db::PreferenceStore;

/// Coarse playback state, as shown to the rest of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    MutedPaused,
    Playing,
    Ducked,
    FadingIn,
    FadingOut,
}

impl PlaybackPhase {
    pub fn css_class(self) -> &'static str {
        match self {
            PlaybackPhase::MutedPaused => "muted",
            PlaybackPhase::Playing => "playing",
            PlaybackPhase::Ducked => "ducked",
            PlaybackPhase::FadingIn => "fading-in",
            PlaybackPhase::FadingOut => "fading-out",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MusicSnapshot {
    pub phase: PlaybackPhase,
    pub muted: bool,
    pub manual_mute: bool,
    pub playing: bool,
    pub fading: bool,
    pub video_interference: bool,
    pub track_index: usize,
    pub volume: f64,
}

/// What to do once the running fade lands on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterFade {
    Nothing,
    Pause,
    /// Pause only if a video is still audible; otherwise come back in.
    PauseIfDucking,
    Advance { steps: usize },
}

/// What to do once a play request resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterPlay {
    /// Started muted to get past autoplay policy; unmute, then fade in.
    Autoplay,
    FadeIn,
}

struct ActiveFade {
    ticket: FadeTicket,
    session: SessionId,
    ramp: FadeRamp,
    then: AfterFade,
}

#[derive(Debug, Clone, Copy)]
struct PendingPlay {
    ticket: PlayTicket,
    then: AfterPlay,
}

pub struct MusicController<H: MediaHost, P: PreferenceStore> {
    host: H,
    prefs: P,
    tracks: TrackList,
    fade_settings: FadeSettings,
    target_volume: f64,
    index: usize,
    session_id: SessionId,
    audio: H::Session,
    is_muted: bool,
    manual_mute: bool,
    video_interference: bool,
    videos: Vec<H::Video>,
    fade: Option<ActiveFade>,
    pending_play: Option<PendingPlay>,
    next_ticket: u64,
    next_play: u64,
}

impl<H: MediaHost, P: PreferenceStore> MusicController<H, P> {
    /// Starts on a random track.
    pub fn start_random(config: MusicConfig, host: H, prefs: P) -> Result<Self, ControllerError> {
        let tracks = TrackList::new(config.tracks.clone())?;
        let index = tracks.random_index(&mut rand::thread_rng());
        Self::start(config, host, prefs, index)
    }

    /// Loads the track at `start_index` and either stays silent (stored mute)
    /// or attempts autoplay and fades in once it is granted.
    pub fn start(
        config: MusicConfig,
        mut host: H,
        prefs: P,
        start_index: usize,
    ) -> Result<Self, ControllerError> {
        let config = config.validate()?;
        let tracks = TrackList::new(config.tracks.clone())?;
        let index = start_index % tracks.len();
        let session_id = SessionId(0);

        let mut audio = host.open_session(tracks.get(index), session_id)?;
        audio.set_looping(true);
        audio.set_volume(0.0);

        let stored = prefs.load_muted().unwrap_or_else(|e| {
            warn!("could not read music preference: {e}");
            None
        });
        let muted = stored.unwrap_or(config.muted_by_default);

        let mut controller = Self {
            host,
            prefs,
            tracks,
            fade_settings: config.fade_settings(),
            target_volume: config.target_volume,
            index,
            session_id,
            audio,
            is_muted: muted,
            manual_mute: muted,
            video_interference: false,
            videos: Vec::new(),
            fade: None,
            pending_play: None,
            next_ticket: 0,
            next_play: 0,
        };

        info!(track = controller.track_url(), muted, "background music ready");
        if !muted {
            controller.audio.set_muted(true);
            controller.request_play(AfterPlay::Autoplay);
        }
        controller.persist();

        Ok(controller)
    }

    pub fn toggle_mute(&mut self) {
        if self.is_muted {
            self.is_muted = false;
            self.manual_mute = false;
            self.persist();
            info!("background music unmuted");

            if self.refresh_interference() {
                debug!("a video is audible; music resumes once it stops");
                return;
            }
            self.resume();
        } else {
            self.is_muted = true;
            self.manual_mute = true;
            self.persist();
            info!("background music muted");
            self.fade_out(AfterFade::Pause);
        }
    }

    /// Fades out, then moves to the next track. Calls made while that fade is
    /// still running skip one further track each.
    pub fn advance_track(&mut self) {
        let steps = match self.fade.as_ref().map(|f| f.then) {
            Some(AfterFade::Advance { steps }) => steps + 1,
            _ => 1,
        };
        self.fade_out(AfterFade::Advance { steps });
    }

    /// Natural end of a track. Notices from replaced sessions are ignored.
    pub fn track_ended(&mut self, session: SessionId) {
        if session != self.session_id {
            debug!(?session, "ignoring ended notice from a replaced track");
            return;
        }
        self.advance_track();
    }

    /// Called for every play/pause/ended/volumechange on an observed video.
    pub fn video_changed(&mut self) {
        if self.refresh_interference() {
            if self.audio.is_paused() {
                return;
            }
            // Mute and track changes already end in silence.
            if self.fade.as_ref().is_some_and(|f| f.then != AfterFade::Nothing) {
                return;
            }
            debug!("video audible; ducking background music");
            self.fade_out(AfterFade::PauseIfDucking);
        } else if !self.is_muted && !self.manual_mute {
            let ducking = self
                .fade
                .as_ref()
                .is_some_and(|f| f.then == AfterFade::PauseIfDucking);
            if self.audio.is_paused() || ducking {
                debug!("videos quiet; bringing background music back");
                self.resume();
            }
        }
    }

    /// Adds a video to interference tracking. Returns `false` if it was already known.
    pub fn observe_video(&mut self, video: H::Video) -> bool {
        if self.videos.iter().any(|known| known.same_element(&video)) {
            return false;
        }
        self.videos.push(video);
        self.video_changed();
        true
    }

    /// Outcome of the play request tagged `ticket`. Requests that were
    /// superseded, or whose element the controller paused, are stale.
    pub fn play_settled(&mut self, ticket: PlayTicket, result: Result<(), ControllerError>) {
        let Some(pending) = self.pending_play.filter(|p| p.ticket == ticket) else {
            debug!(?ticket, "ignoring stale play outcome");
            return;
        };
        self.pending_play = None;

        if let Err(e) = result {
            self.playback_refused(e);
            return;
        }

        if pending.then == AfterPlay::Autoplay && !self.manual_mute {
            self.audio.set_muted(false);
        }
        // Intent may have changed while the request was in flight.
        if self.is_muted || self.manual_mute {
            self.audio.pause();
            return;
        }
        if self.refresh_interference() {
            self.audio.pause();
            return;
        }
        // A skip or duck requested meanwhile still runs to silence.
        if self.fade.as_ref().is_some_and(|f| f.then != AfterFade::Nothing) {
            return;
        }
        self.fade_in();
    }

    pub fn fade_tick(&mut self, ticket: FadeTicket) {
        let Some(fade) = self.fade.as_mut().filter(|f| f.ticket == ticket) else {
            debug!(?ticket, "ignoring stale fade tick");
            return;
        };
        let step = fade.ramp.advance();
        if fade.session != self.session_id {
            self.cancel_fade();
            return;
        }

        match step {
            FadeStep::Continue(volume) => self.audio.set_volume(volume),
            FadeStep::Done(volume) => {
                self.audio.set_volume(volume);
                if let Some(done) = self.fade.take() {
                    self.host.stop_fade_timer(done.ticket);
                    self.after_fade(done.then);
                }
            }
        }
    }

    pub fn snapshot(&self) -> MusicSnapshot {
        MusicSnapshot {
            phase: self.phase(),
            muted: self.is_muted,
            manual_mute: self.manual_mute,
            playing: !self.audio.is_paused(),
            fading: self.fade.is_some(),
            video_interference: self.video_interference,
            track_index: self.index,
            volume: self.audio.volume(),
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        if let Some(fade) = &self.fade {
            return if fade.then == AfterFade::Nothing {
                PlaybackPhase::FadingIn
            } else {
                PlaybackPhase::FadingOut
            };
        }
        if !self.audio.is_paused() {
            PlaybackPhase::Playing
        } else if self.is_muted || self.manual_mute {
            PlaybackPhase::MutedPaused
        } else {
            PlaybackPhase::Ducked
        }
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn track_index(&self) -> usize {
        self.index
    }

    pub fn track_url(&self) -> &str {
        self.tracks.get(self.index)
    }

    #[cfg(test)]
    pub(crate) fn preferences(&self) -> &P {
        &self.prefs
    }

    #[cfg(test)]
    pub(crate) fn pending_play_ticket(&self) -> Option<PlayTicket> {
        self.pending_play.map(|p| p.ticket)
    }

    fn persist(&mut self) {
        if let Err(e) = self.prefs.store_muted(self.manual_mute) {
            warn!("could not save music preference: {e}");
        }
    }

    fn refresh_interference(&mut self) -> bool {
        self.videos.retain(|video| video.is_attached());
        self.video_interference = self.videos.iter().any(|video| video.is_audible());
        self.video_interference
    }

    /// Brings an unmuted, unducked track back to its target volume.
    fn resume(&mut self) {
        self.audio.set_muted(false);
        if !self.audio.is_paused() {
            // An outstanding request fades in once it resolves.
            if self.pending_play.is_none() {
                self.fade_in();
            }
            return;
        }
        self.cancel_fade();
        self.audio.set_volume(0.0);
        self.request_play(AfterPlay::FadeIn);
    }

    fn request_play(&mut self, then: AfterPlay) {
        self.next_play += 1;
        let ticket = PlayTicket(self.next_play);
        match self.audio.begin_play(ticket) {
            Ok(()) => self.pending_play = Some(PendingPlay { ticket, then }),
            Err(e) => self.playback_refused(e),
        }
    }

    /// Pausing rejects any outstanding play request, so its outcome goes stale.
    fn pause(&mut self) {
        self.pending_play = None;
        self.audio.pause();
    }

    fn playback_refused(&mut self, error: ControllerError) {
        warn!("background music could not start: {error}");
        self.go_silent();
    }

    fn go_silent(&mut self) {
        self.cancel_fade();
        self.pause();
        self.is_muted = true;
        self.manual_mute = true;
        self.persist();
    }

    fn fade_in(&mut self) {
        self.fade_to(self.target_volume, AfterFade::Nothing);
    }

    fn fade_out(&mut self, then: AfterFade) {
        self.fade_to(0.0, then);
    }

    fn fade_to(&mut self, target: f64, then: AfterFade) {
        self.cancel_fade();
        let ramp = FadeRamp::new(self.audio.volume(), target, self.fade_settings);
        if ramp.is_instant() {
            self.audio.set_volume(target);
            self.after_fade(then);
            return;
        }

        self.next_ticket += 1;
        let ticket = FadeTicket(self.next_ticket);
        debug!(to = target, steps = self.fade_settings.steps(), "fading background music");
        self.host.start_fade_timer(ticket, self.fade_settings.tick);
        self.fade = Some(ActiveFade {
            ticket,
            session: self.session_id,
            ramp,
            then,
        });
    }

    fn cancel_fade(&mut self) {
        if let Some(fade) = self.fade.take() {
            self.host.stop_fade_timer(fade.ticket);
        }
    }

    fn after_fade(&mut self, then: AfterFade) {
        match then {
            AfterFade::Nothing => {}
            AfterFade::Pause => self.pause(),
            AfterFade::PauseIfDucking => {
                if self.refresh_interference() || self.is_muted || self.manual_mute {
                    self.pause();
                } else {
                    self.fade_in();
                }
            }
            AfterFade::Advance { steps } => self.switch_track(steps),
        }
    }

    fn switch_track(&mut self, steps: usize) {
        self.pause();
        let index = (0..steps).fold(self.index, |i, _| self.tracks.next(i));
        let id = SessionId(self.session_id.0 + 1);

        match self.host.open_session(self.tracks.get(index), id) {
            Ok(mut audio) => {
                audio.set_looping(true);
                audio.set_volume(0.0);
                self.audio = audio;
                self.session_id = id;
                self.index = index;
                info!(track = self.track_url(), "switched background track");
            }
            Err(e) => {
                warn!("could not load next background track: {e}");
                self.go_silent();
                return;
            }
        }

        if !self.is_muted && !self.manual_mute && !self.refresh_interference() {
            self.request_play(AfterPlay::FadeIn);
        }
    }
}
