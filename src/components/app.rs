use dioxus::prelude::*;
use tracing::warn;

use crate::components::{BackgroundMusic, LoadingScreen, MusicStartSignal};
use crate::music::PageConfig;

const PAGE_CONFIG: &str = include_str!("../../assets/page.json");

fn load_page_config() -> PageConfig {
    PageConfig::from_json(PAGE_CONFIG).unwrap_or_else(|e| {
        warn!("falling back to default page config: {e}");
        PageConfig::default()
    })
}

/// Page-level composition point: owns the loading overlay and the single
/// background music controller.
#[component]
pub fn PageShell() -> Element {
    let config = use_hook(load_page_config);
    let mut music_started = use_signal(|| false);
    use_context_provider(|| MusicStartSignal(music_started));

    rsx! {
        LoadingScreen {
            config: config.loading,
            on_finished: move |_| music_started.set(true),
        }
        BackgroundMusic { config: config.music.clone() }
    }
}
