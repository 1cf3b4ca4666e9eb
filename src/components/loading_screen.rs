//! Full-page loading overlay. When it goes away the background music starts.

use dioxus::prelude::*;

use crate::music::LoadingConfig;

#[cfg(target_arch = "wasm32")]
use crate::loading::LoadingGate;
#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, rc::Rc};
#[cfg(target_arch = "wasm32")]
use tracing::info;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};
#[cfg(target_arch = "wasm32")]
use web_sys::{window, HtmlVideoElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadingStage {
    Showing,
    Hiding,
    Removed,
}

#[cfg(target_arch = "wasm32")]
fn millis(value: u64) -> u32 {
    value.min(u32::MAX as u64) as u32
}

/// Marks `video` ready now if it can already play through, or once it can.
#[cfg(target_arch = "wasm32")]
fn watch_readiness(
    video: &HtmlVideoElement,
    gate: &Rc<RefCell<LoadingGate>>,
    mark: fn(&mut LoadingGate),
) {
    if video.ready_state() >= 3 {
        mark(&mut gate.borrow_mut());
        return;
    }
    let gate = gate.clone();
    let callback =
        Closure::wrap(Box::new(move || mark(&mut gate.borrow_mut())) as Box<dyn FnMut()>);
    let _ = video
        .add_event_listener_with_callback("canplaythrough", callback.as_ref().unchecked_ref());
    callback.forget();
}

#[cfg(target_arch = "wasm32")]
fn find_video(document: &web_sys::Document, selector: &str) -> Option<HtmlVideoElement> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlVideoElement>().ok())
}

#[component]
pub fn LoadingScreen(config: LoadingConfig, on_finished: EventHandler<()>) -> Element {
    let mut stage = use_signal(|| LoadingStage::Showing);

    #[cfg(target_arch = "wasm32")]
    use_effect(move || {
        let Some(document) = window().and_then(|w| w.document()) else {
            stage.set(LoadingStage::Removed);
            on_finished.call(());
            return;
        };

        let hero = find_video(&document, ".hero-video");
        let expanding = find_video(&document, ".expanding-video");
        let gate = Rc::new(RefCell::new(LoadingGate::new(
            hero.is_some(),
            expanding.is_some(),
        )));
        if let Some(video) = hero.as_ref() {
            watch_readiness(video, &gate, LoadingGate::mark_hero_ready);
        }
        if let Some(video) = expanding.as_ref() {
            watch_readiness(video, &gate, LoadingGate::mark_expanding_ready);
        }

        if document.ready_state() == "complete" {
            gate.borrow_mut().mark_page_loaded();
        } else if let Some(win) = window() {
            let gate = gate.clone();
            let load_cb = Closure::wrap(
                Box::new(move || gate.borrow_mut().mark_page_loaded()) as Box<dyn FnMut()>,
            );
            let _ = win.add_event_listener_with_callback("load", load_cb.as_ref().unchecked_ref());
            load_cb.forget();
        }

        spawn(async move {
            let mut waited = 0u64;
            loop {
                gloo_timers::future::TimeoutFuture::new(millis(config.poll_ms)).await;
                waited += config.poll_ms;
                let mut gate = gate.borrow_mut();
                if gate.poll() {
                    break;
                }
                if waited >= config.fallback_ms && gate.fallback() {
                    info!("loading screen timed out waiting for videos");
                    break;
                }
            }

            gloo_timers::future::TimeoutFuture::new(millis(config.hide_delay_ms)).await;
            stage.set(LoadingStage::Hiding);
            gloo_timers::future::TimeoutFuture::new(millis(config.remove_delay_ms)).await;
            stage.set(LoadingStage::Removed);
            on_finished.call(());
        });
    });

    #[cfg(not(target_arch = "wasm32"))]
    use_effect(move || {
        let _ = config;
        stage.set(LoadingStage::Removed);
        on_finished.call(());
    });

    match stage() {
        LoadingStage::Removed => rsx! {},
        current => rsx! {
            div {
                id: "loading-screen",
                class: if current == LoadingStage::Hiding { "loading-screen hide" } else { "loading-screen" },
                div { class: "loading-spinner" }
            }
        },
    }
}
