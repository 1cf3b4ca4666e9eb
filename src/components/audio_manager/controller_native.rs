use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use tracing::{info, warn};

use super::{MusicStartSignal, MusicWidget};
use crate::db::{MemoryPreferences, PreferenceStore, SqlitePreferences};
use crate::music::{MusicConfig, MusicSnapshot};

fn open_preferences(key: &str) -> Box<dyn PreferenceStore> {
    match SqlitePreferences::open(key) {
        Ok(prefs) => Box::new(prefs),
        Err(e) => {
            warn!("music preference will not persist: {e}");
            Box::new(MemoryPreferences::default())
        }
    }
}

/// Desktop shell: the widget keeps the mute preference in sync, but the
/// background track itself only plays in the web build.
#[component]
pub fn BackgroundMusic(config: MusicConfig) -> Element {
    let started = use_context::<MusicStartSignal>().0;
    let mut muted = use_signal(|| None::<bool>);
    let prefs = use_hook(|| Rc::new(RefCell::new(open_preferences(&config.storage_key))));

    {
        let prefs = prefs.clone();
        let muted_by_default = config.muted_by_default;
        use_effect(move || {
            if !started() || muted.peek().is_some() {
                return;
            }
            let stored = prefs.borrow().load_muted().unwrap_or_else(|e| {
                warn!("could not read music preference: {e}");
                None
            });
            muted.set(Some(stored.unwrap_or(muted_by_default)));
            info!("background music playback is only available in the web build");
        });
    }

    let on_toggle = {
        let prefs = prefs.clone();
        move |_| {
            let next = !muted.peek().unwrap_or(true);
            if let Err(e) = prefs.borrow_mut().store_muted(next) {
                warn!("could not save music preference: {e}");
            }
            muted.set(Some(next));
        }
    };

    let current = muted();
    let snapshot = MusicSnapshot {
        muted: current.unwrap_or(true),
        manual_mute: current.unwrap_or(true),
        ..MusicSnapshot::default()
    };

    rsx! {
        MusicWidget {
            snapshot,
            visible: current.is_some(),
            on_toggle,
            on_next: move |_| info!("track skipping needs the web build"),
        }
    }
}
