use dioxus::prelude::*;
use tracing::Level;

mod components;
mod db;
#[cfg_attr(not(any(target_arch = "wasm32", test)), allow(dead_code))]
mod loading;
mod music;

use components::PageShell;

const MUSIC_CSS: Asset = asset!("/assets/styling/music.css");

fn main() {
    if let Err(e) = dioxus::logger::init(Level::INFO) {
        eprintln!("Failed to initialize logger: {e}");
    }
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Stylesheet { href: MUSIC_CSS }

        PageShell {}
    }
}
