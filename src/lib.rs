/// Tab Forge - Chrome Extension that organizes tabs into groups
/// Built with Rust + WASM + Yew

mod background;
mod color;
mod command;
mod debounce;
mod domain;
mod host;
mod operations;
mod policy;
mod rules;
mod settings;
mod tab_data;
#[cfg(test)]
mod testing;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export the group label for JavaScript access
#[wasm_bindgen]
pub fn domain_label(url: &str) -> String {
    domain::group_label(url)
}

// Start the Yew app for the side panel
#[wasm_bindgen]
pub fn start_sidebar() {
    yew::Renderer::<ui::sidebar::Sidebar>::new().render();
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}
