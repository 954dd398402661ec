use log::{error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

mod a11y;
mod analytics;
mod config;
mod controller;
mod error;
mod header;
mod lazy;
mod nav;
mod reveal;
mod styles;

use controller::PageController;

fn start() {
    match PageController::new() {
        Ok(controller) => controller.start(),
        Err(e) => error!("Landing page not enhanced: {}", e),
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting landing page");

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        error!("No document to enhance");
        return;
    };

    if document.ready_state() == "loading" {
        let on_ready = Closure::once_into_js(start);
        let listener = document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref());
        if let Err(e) = listener {
            error!("Could not wait for DOMContentLoaded: {}", error::describe(&e));
        }
    } else {
        start();
    }
}
