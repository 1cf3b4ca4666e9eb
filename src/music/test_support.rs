//! In-memory host used by the controller tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::controller::MusicController;
use super::error::ControllerError;
use super::fade::FadeTicket;
use super::media::{AudioSession, MediaHost, PlayTicket, SessionId, VideoProbe};
use crate::db::PreferenceStore;

#[derive(Debug)]
pub struct FakeAudio {
    pub url: String,
    pub id: SessionId,
    pub paused: bool,
    pub volume: f64,
    pub muted: bool,
    pub looping: bool,
    pub play_requests: usize,
    pub play_tickets: Vec<PlayTicket>,
    refuse_play: bool,
}

pub struct FakeSession {
    state: Rc<RefCell<FakeAudio>>,
}

impl AudioSession for FakeSession {
    fn begin_play(&mut self, ticket: PlayTicket) -> Result<(), ControllerError> {
        let mut state = self.state.borrow_mut();
        state.play_requests += 1;
        state.play_tickets.push(ticket);
        if state.refuse_play {
            return Err(ControllerError::Playback("NotSupportedError".into()));
        }
        // Browsers flip `paused` as soon as play() is called.
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.state.borrow_mut().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }

    fn set_looping(&mut self, looping: bool) {
        self.state.borrow_mut().looping = looping;
    }
}

#[derive(Debug, Default)]
pub struct FakeWorld {
    pub sessions: Vec<Rc<RefCell<FakeAudio>>>,
    pub active_timer: Option<(FadeTicket, Duration)>,
    pub stopped_timers: Vec<FadeTicket>,
    pub refuse_play: bool,
    pub fail_open: bool,
}

#[derive(Clone, Default)]
pub struct FakeHost {
    pub world: Rc<RefCell<FakeWorld>>,
}

impl FakeHost {
    /// The most recently opened session.
    pub fn audio(&self) -> Rc<RefCell<FakeAudio>> {
        self.world
            .borrow()
            .sessions
            .last()
            .cloned()
            .expect("no session opened")
    }

    pub fn session_count(&self) -> usize {
        self.world.borrow().sessions.len()
    }

    pub fn active_ticket(&self) -> Option<FadeTicket> {
        self.world.borrow().active_timer.map(|(ticket, _)| ticket)
    }

    pub fn volume(&self) -> f64 {
        self.audio().borrow().volume
    }

    pub fn paused(&self) -> bool {
        self.audio().borrow().paused
    }

    pub fn play_requests(&self) -> usize {
        self.audio().borrow().play_requests
    }

    /// Ticket of the newest play request on the current session.
    pub fn last_play_ticket(&self) -> Option<PlayTicket> {
        self.audio().borrow().play_tickets.last().copied()
    }
}

impl MediaHost for FakeHost {
    type Session = FakeSession;
    type Video = FakeVideo;

    fn open_session(&mut self, url: &str, id: SessionId) -> Result<FakeSession, ControllerError> {
        let mut world = self.world.borrow_mut();
        if world.fail_open {
            return Err(ControllerError::Playback(format!("cannot load {url}")));
        }
        let state = Rc::new(RefCell::new(FakeAudio {
            url: url.to_string(),
            id,
            paused: true,
            volume: 1.0,
            muted: false,
            looping: false,
            play_requests: 0,
            play_tickets: Vec::new(),
            refuse_play: world.refuse_play,
        }));
        world.sessions.push(state.clone());
        Ok(FakeSession { state })
    }

    fn start_fade_timer(&mut self, ticket: FadeTicket, every: Duration) {
        self.world.borrow_mut().active_timer = Some((ticket, every));
    }

    fn stop_fade_timer(&mut self, ticket: FadeTicket) {
        let mut world = self.world.borrow_mut();
        if world.active_timer.map(|(t, _)| t) == Some(ticket) {
            world.active_timer = None;
        }
        world.stopped_timers.push(ticket);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VideoFlags {
    pub paused: bool,
    pub ended: bool,
    pub muted: bool,
    pub attached: bool,
}

#[derive(Debug, Clone)]
pub struct FakeVideo {
    id: u32,
    pub flags: Rc<RefCell<VideoFlags>>,
}

impl FakeVideo {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            flags: Rc::new(RefCell::new(VideoFlags {
                paused: true,
                ended: false,
                muted: false,
                attached: true,
            })),
        }
    }

    pub fn play(&self) {
        let mut flags = self.flags.borrow_mut();
        flags.paused = false;
        flags.ended = false;
    }

    pub fn pause(&self) {
        self.flags.borrow_mut().paused = true;
    }

    pub fn end(&self) {
        let mut flags = self.flags.borrow_mut();
        flags.paused = true;
        flags.ended = true;
    }

    pub fn set_muted(&self, muted: bool) {
        self.flags.borrow_mut().muted = muted;
    }

    pub fn detach(&self) {
        self.flags.borrow_mut().attached = false;
    }
}

impl VideoProbe for FakeVideo {
    fn is_paused(&self) -> bool {
        self.flags.borrow().paused
    }

    fn is_ended(&self) -> bool {
        self.flags.borrow().ended
    }

    fn is_muted(&self) -> bool {
        self.flags.borrow().muted
    }

    fn is_attached(&self) -> bool {
        self.flags.borrow().attached
    }

    fn same_element(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Ticks the fade that is live right now until it completes. Returns the tick count.
pub fn finish_fade<P: PreferenceStore>(
    controller: &mut MusicController<FakeHost, P>,
    host: &FakeHost,
) -> usize {
    let Some(ticket) = host.active_ticket() else {
        return 0;
    };
    let mut ticks = 0;
    while host.active_ticket() == Some(ticket) {
        controller.fade_tick(ticket);
        ticks += 1;
        assert!(ticks < 1_000, "fade never finished");
    }
    ticks
}

pub fn tick<P: PreferenceStore>(
    controller: &mut MusicController<FakeHost, P>,
    host: &FakeHost,
    times: usize,
) {
    for _ in 0..times {
        if let Some(ticket) = host.active_ticket() {
            controller.fade_tick(ticket);
        }
    }
}

/// Resolves the outstanding play request successfully, if there is one.
pub fn grant_play<P: PreferenceStore>(controller: &mut MusicController<FakeHost, P>) {
    if let Some(ticket) = controller.pending_play_ticket() {
        controller.play_settled(ticket, Ok(()));
    }
}
