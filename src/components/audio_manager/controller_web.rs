use dioxus::prelude::*;
use futures_util::StreamExt;
use tracing::{error, warn};

use super::web_host::{observe_page_videos, EventSink, MusicEvent, WebMediaHost};
use super::{MusicStartSignal, MusicWidget};
use crate::db::LocalStoragePreferences;
use crate::music::{MusicConfig, MusicController, MusicSnapshot};

type WebMusicController = MusicController<WebMediaHost, LocalStoragePreferences>;

fn start_controller(config: &MusicConfig, sink: EventSink) -> Option<WebMusicController> {
    let host = match WebMediaHost::new(sink.clone()) {
        Ok(host) => host,
        Err(e) => {
            error!("background music disabled: {e}");
            return None;
        }
    };
    let prefs = LocalStoragePreferences::new(config.storage_key.clone());
    let controller = match MusicController::start_random(config.clone(), host, prefs) {
        Ok(controller) => controller,
        Err(e) => {
            error!("background music disabled: {e}");
            return None;
        }
    };

    if let Err(e) = observe_page_videos(sink) {
        warn!("video ducking unavailable: {e}");
    }
    Some(controller)
}

fn dispatch(controller: &mut WebMusicController, event: MusicEvent) {
    match event {
        MusicEvent::Start(_) => {}
        MusicEvent::ToggleMute => controller.toggle_mute(),
        MusicEvent::NextTrack => controller.advance_track(),
        MusicEvent::VideoAdded(video) => {
            controller.observe_video(video);
        }
        MusicEvent::VideoChanged => controller.video_changed(),
        MusicEvent::PlaySettled { ticket, result } => controller.play_settled(ticket, result),
        MusicEvent::TrackEnded(session) => controller.track_ended(session),
        MusicEvent::FadeTick(ticket) => controller.fade_tick(ticket),
    }
}

#[component]
pub fn BackgroundMusic(config: MusicConfig) -> Element {
    let started = use_context::<MusicStartSignal>().0;
    let mut snapshot = use_signal(|| None::<MusicSnapshot>);

    // One task owns the controller; every browser callback is queued into it.
    let music = use_coroutine(move |mut rx: UnboundedReceiver<MusicEvent>| {
        let config = config.clone();
        async move {
            let mut controller: Option<WebMusicController> = None;
            while let Some(event) = rx.next().await {
                match event {
                    MusicEvent::Start(sink) => {
                        if controller.is_none() {
                            controller = start_controller(&config, sink);
                        }
                    }
                    other => {
                        if let Some(controller) = controller.as_mut() {
                            dispatch(controller, other);
                        }
                    }
                }

                if let Some(controller) = controller.as_ref() {
                    let next = Some(controller.snapshot());
                    if *snapshot.peek() != next {
                        snapshot.set(next);
                    }
                }
            }
        }
    });

    use_effect(move || {
        if started() {
            music.send(MusicEvent::Start(EventSink::new(music)));
        }
    });

    let current = snapshot();
    rsx! {
        MusicWidget {
            snapshot: current.unwrap_or_default(),
            visible: current.is_some(),
            on_toggle: move |_| music.send(MusicEvent::ToggleMute),
            on_next: move |_| music.send(MusicEvent::NextTrack),
        }
    }
}
