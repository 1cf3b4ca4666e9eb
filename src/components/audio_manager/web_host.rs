//! Browser implementation of the music host: `<audio>` sessions, `<video>`
//! probes, interval-driven fades and document-wide video discovery.

use std::rc::Rc;
use std::time::Duration;

use dioxus::core::{Runtime, RuntimeGuard};
use dioxus::prelude::*;
use gloo_timers::callback::Interval;
use tracing::debug;
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    window, Element, HtmlAudioElement, HtmlVideoElement, MutationObserver, MutationObserverInit,
    MutationRecord, Node,
};

use crate::music::{
    AudioSession, ControllerError, FadeTicket, MediaHost, PlayTicket, SessionId, VideoProbe,
};

const OBSERVED_ATTR: &str = "data-music-observed";
const VIDEO_EVENTS: [&str; 4] = ["play", "pause", "ended", "volumechange"];

/// Everything the browser tells the music coroutine.
pub enum MusicEvent {
    Start(EventSink),
    ToggleMute,
    NextTrack,
    VideoAdded(WebVideo),
    VideoChanged,
    PlaySettled {
        ticket: PlayTicket,
        result: Result<(), ControllerError>,
    },
    TrackEnded(SessionId),
    FadeTick(FadeTicket),
}

/// Forwards browser callbacks into the music coroutine, in arrival order.
#[derive(Clone)]
pub struct EventSink {
    coroutine: Coroutine<MusicEvent>,
    runtime: Rc<Runtime>,
}

impl EventSink {
    pub fn new(coroutine: Coroutine<MusicEvent>) -> Self {
        Self {
            coroutine,
            runtime: Runtime::current(),
        }
    }

    pub fn emit(&self, event: MusicEvent) {
        let _guard = RuntimeGuard::new(self.runtime.clone());
        self.coroutine.send(event);
    }
}

fn js_error(value: wasm_bindgen::JsValue) -> ControllerError {
    ControllerError::Playback(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}

pub struct WebAudioSession {
    audio: HtmlAudioElement,
    id: SessionId,
    sink: EventSink,
    _on_ended: Closure<dyn FnMut()>,
}

impl AudioSession for WebAudioSession {
    fn begin_play(&mut self, ticket: PlayTicket) -> Result<(), ControllerError> {
        let promise = self.audio.play().map_err(js_error)?;
        let sink = self.sink.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = JsFuture::from(promise).await.map(|_| ()).map_err(js_error);
            sink.emit(MusicEvent::PlaySettled { ticket, result });
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Err(e) = self.audio.pause() {
            debug!(session = ?self.id, "pause failed: {e:?}");
        }
    }

    fn is_paused(&self) -> bool {
        self.audio.paused()
    }

    fn volume(&self) -> f64 {
        self.audio.volume()
    }

    fn set_volume(&mut self, volume: f64) {
        self.audio.set_volume(volume.clamp(0.0, 1.0));
    }

    fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    fn set_looping(&mut self, looping: bool) {
        self.audio.set_loop(looping);
    }
}

impl Drop for WebAudioSession {
    fn drop(&mut self) {
        self.audio.set_onended(None);
        if let Err(e) = self.audio.pause() {
            debug!(session = ?self.id, "pause on drop failed: {e:?}");
        }
    }
}

#[derive(Clone)]
pub struct WebVideo {
    element: HtmlVideoElement,
}

impl VideoProbe for WebVideo {
    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn is_ended(&self) -> bool {
        self.element.ended()
    }

    fn is_muted(&self) -> bool {
        self.element.muted()
    }

    fn is_attached(&self) -> bool {
        self.element.is_connected()
    }

    fn same_element(&self, other: &Self) -> bool {
        let other: &Node = other.element.as_ref();
        self.element.is_same_node(Some(other))
    }
}

pub struct WebMediaHost {
    sink: EventSink,
    fade_timer: Option<(FadeTicket, Interval)>,
}

impl WebMediaHost {
    pub fn new(sink: EventSink) -> Result<Self, ControllerError> {
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
            .ok_or(ControllerError::MissingDom("document body"))?;
        Ok(Self {
            sink,
            fade_timer: None,
        })
    }
}

impl MediaHost for WebMediaHost {
    type Session = WebAudioSession;
    type Video = WebVideo;

    fn open_session(&mut self, url: &str, id: SessionId) -> Result<WebAudioSession, ControllerError> {
        let audio = HtmlAudioElement::new_with_src(url).map_err(js_error)?;

        let sink = self.sink.clone();
        let on_ended = Closure::wrap(
            Box::new(move || sink.emit(MusicEvent::TrackEnded(id))) as Box<dyn FnMut()>,
        );
        audio.set_onended(Some(on_ended.as_ref().unchecked_ref()));

        Ok(WebAudioSession {
            audio,
            id,
            sink: self.sink.clone(),
            _on_ended: on_ended,
        })
    }

    fn start_fade_timer(&mut self, ticket: FadeTicket, every: Duration) {
        let sink = self.sink.clone();
        let millis = every.as_millis().min(u32::MAX as u128) as u32;
        // Replacing the previous interval drops it, which clears it.
        self.fade_timer = Some((
            ticket,
            Interval::new(millis, move || sink.emit(MusicEvent::FadeTick(ticket))),
        ));
    }

    fn stop_fade_timer(&mut self, ticket: FadeTicket) {
        if self
            .fade_timer
            .as_ref()
            .is_some_and(|(active, _)| *active == ticket)
        {
            self.fade_timer = None;
        }
    }
}

/// Hooks `video` up once and hands it to the controller.
fn attach_video(video: HtmlVideoElement, sink: &EventSink) {
    if video.has_attribute(OBSERVED_ATTR) {
        return;
    }
    let _ = video.set_attribute(OBSERVED_ATTR, "");

    for name in VIDEO_EVENTS {
        let sink = sink.clone();
        let callback =
            Closure::wrap(Box::new(move || sink.emit(MusicEvent::VideoChanged)) as Box<dyn FnMut()>);
        let _ = video.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
        callback.forget();
    }
    sink.emit(MusicEvent::VideoAdded(WebVideo { element: video }));
}

fn attach_videos_in(node: &Node, sink: &EventSink) {
    if let Some(video) = node.dyn_ref::<HtmlVideoElement>() {
        attach_video(video.clone(), sink);
        return;
    }
    let Some(element) = node.dyn_ref::<Element>() else {
        return;
    };
    let Ok(found) = element.query_selector_all("video") else {
        return;
    };
    for i in 0..found.length() {
        if let Some(video) = found
            .item(i)
            .and_then(|n| n.dyn_into::<HtmlVideoElement>().ok())
        {
            attach_video(video, sink);
        }
    }
}

/// Attaches every `<video>` on the page now, and every one inserted later.
pub fn observe_page_videos(sink: EventSink) -> Result<(), ControllerError> {
    let body = window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
        .ok_or(ControllerError::MissingDom("document body"))?;
    attach_videos_in(&body, &sink);

    let callback = Closure::wrap(Box::new(move |records: js_sys::Array, _: MutationObserver| {
        for record in records.iter() {
            let record: MutationRecord = record.unchecked_into();
            let added = record.added_nodes();
            for i in 0..added.length() {
                if let Some(node) = added.item(i) {
                    attach_videos_in(&node, &sink);
                }
            }
        }
    }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
        .map_err(|_| ControllerError::MissingDom("MutationObserver"))?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer
        .observe_with_options(&body, &options)
        .map_err(|_| ControllerError::MissingDom("MutationObserver"))?;
    callback.forget();

    debug!("watching the document for new videos");
    Ok(())
}
