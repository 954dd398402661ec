//! Screen-reader announcements for in-page navigation, plus Escape to drop focus.

use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement, KeyboardEvent};

use crate::controller::PageController;
use crate::error::PageError;
use crate::nav::anchor_id;

pub fn announcement_text(prefix: &str, name: &str) -> String {
    format!("{}: {}", prefix, name)
}

/// Heading text when there is one, otherwise the section id.
pub fn section_name(heading: Option<String>, id: &str) -> String {
    heading
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| id.to_string())
}

/// Adds a polite live region with `name` and drops it after the configured delay.
pub fn announce(controller: &PageController, name: &str) -> Result<(), PageError> {
    let document = controller.document();
    let config = controller.config();
    let body = document.body().ok_or(PageError::NoBody)?;

    let announcement = document.create_element("div")?;
    announcement.set_attribute("aria-live", "polite")?;
    announcement.set_attribute("aria-atomic", "true")?;
    announcement.set_class_name(config.sr_only_class);
    announcement.set_text_content(Some(&announcement_text(&config.announce_prefix, name)));
    body.append_child(&announcement)?;

    // remove() is a no-op once the node is gone
    Timeout::new(config.announce_ms, move || announcement.remove()).forget();
    Ok(())
}

pub fn setup(controller: &PageController) -> Result<(), PageError> {
    let config = controller.config();
    for link in controller.query_all(config.nav_link_selector) {
        let controller_c = controller.clone();
        let target = link.clone();
        controller.listen(&link, "click", move |_| {
            let Some(href) = target.get_attribute("href") else {
                return;
            };
            let Some(id) = anchor_id(&href) else {
                return;
            };
            let Some(section) = controller_c.document().get_element_by_id(id) else {
                return;
            };
            let heading = section
                .query_selector(controller_c.config().section_heading_selector)
                .ok()
                .flatten()
                .and_then(|h| h.text_content());
            if let Err(e) = announce(&controller_c, &section_name(heading, id)) {
                debug!("Announcement skipped: {}", e);
            }
        })?;
    }

    let controller_c = controller.clone();
    controller.listen(controller.document(), "keydown", move |event: Event| {
        let is_escape = event
            .dyn_ref::<KeyboardEvent>()
            .map_or(false, |e| e.key() == "Escape");
        if !is_escape {
            return;
        }
        if let Some(active) = controller_c
            .document()
            .active_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = active.blur();
        }
    })
}
