use dioxus::prelude::*;

use crate::components::Icon;
use crate::music::MusicSnapshot;

/// Two-halved pill: left half toggles mute, right half skips the track.
#[component]
pub fn MusicWidget(
    snapshot: MusicSnapshot,
    visible: bool,
    on_toggle: EventHandler<()>,
    on_next: EventHandler<()>,
) -> Element {
    let icon = if snapshot.muted { "volume-mute" } else { "volume" };
    let phase = snapshot.phase.css_class();
    let shown = if visible { " visible" } else { "" };

    rsx! {
        div {
            id: "musicController",
            class: "music-controller {phase}{shown}",
            button {
                class: "volume-half",
                r#type: "button",
                title: if snapshot.muted { "Play music" } else { "Mute music" },
                onclick: move |evt: MouseEvent| {
                    evt.stop_propagation();
                    on_toggle.call(());
                },
                Icon { name: icon.to_string(), class: "w-5 h-5".to_string() }
            }
            button {
                class: "next-half",
                r#type: "button",
                title: "Next track",
                onclick: move |evt: MouseEvent| {
                    evt.stop_propagation();
                    on_next.call(());
                },
                Icon { name: "next".to_string(), class: "w-5 h-5".to_string() }
            }
        }
    }
}
