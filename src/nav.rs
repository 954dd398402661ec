//! Smooth scrolling for in-page navigation and the "active" marker that follows
//! the section currently under the header.

use std::cell::Cell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, ScrollBehavior, ScrollToOptions};

use crate::controller::PageController;
use crate::error::PageError;

/// Vertical extent of a `section[id]` in document coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionExtent {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionExtent {
    pub fn contains(&self, position: f64) -> bool {
        position >= self.top && position < self.top + self.height
    }
}

/// First section owning `position`. Top edge inclusive, bottom edge exclusive.
pub fn section_at(sections: &[SectionExtent], position: f64) -> Option<&str> {
    sections
        .iter()
        .find(|s| s.contains(position))
        .map(|s| s.id.as_str())
}

/// Scroll offset that leaves `margin` pixels between the header and the target.
pub fn scroll_target(offset_top: f64, header_height: f64, margin: f64) -> f64 {
    offset_top - header_height - margin
}

/// Id referenced by an in-page `href`, if any.
pub fn anchor_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Scroll offset for a click on `href`, or `None` when it names no element.
/// `offset_top` resolves an id to the target's `offsetTop`.
pub fn scroll_request<F>(
    href: &str,
    header_height: f64,
    margin: f64,
    offset_top: F,
) -> Option<f64>
where
    F: Fn(&str) -> Option<f64>,
{
    let top = anchor_id(href).and_then(offset_top)?;
    Some(scroll_target(top, header_height, margin))
}

/// Lets at most one highlight recomputation wait for the next frame.
#[derive(Debug, Default)]
pub struct FrameThrottle {
    pending: Cell<bool>,
}

impl FrameThrottle {
    /// Returns false when a frame is already pending; the caller drops its event.
    pub fn try_acquire(&self) -> bool {
        !self.pending.replace(true)
    }

    pub fn release(&self) {
        self.pending.set(false);
    }
}

pub trait ClassToggle {
    fn set_class(&self, class: &str, on: bool);
}

impl ClassToggle for Element {
    fn set_class(&self, class: &str, on: bool) {
        let list = self.class_list();
        let _ = if on { list.add_1(class) } else { list.remove_1(class) };
    }
}

/// Clears `class` from every link, then sets it on `index` when given.
pub fn mark_active<T: ClassToggle>(links: &[T], class: &str, index: Option<usize>) {
    for link in links {
        link.set_class(class, false);
    }
    if let Some(link) = index.and_then(|i| links.get(i)) {
        link.set_class(class, true);
    }
}

/// Index of the link pointing at `section`.
pub fn link_for_section<S: AsRef<str>>(hrefs: &[S], section: Option<&str>) -> Option<usize> {
    let section = section?;
    hrefs
        .iter()
        .position(|href| anchor_id(href.as_ref()) == Some(section))
}

pub fn setup(controller: &PageController) -> Result<(), PageError> {
    let links = Rc::new(controller.query_all(controller.config().nav_link_selector));
    debug!("Found {} navigation links", links.len());

    for (index, link) in links.iter().enumerate() {
        let controller_c = controller.clone();
        let links = links.clone();
        let link_c = link.clone();
        controller.listen(link, "click", move |event: Event| {
            event.prevent_default();
            scroll_to_link(&controller_c, &links, &link_c, index);
        })?;
    }

    let controller_c = controller.clone();
    controller.listen(controller.window(), "scroll", move |_| {
        request_tick(&controller_c, &links);
    })?;

    Ok(())
}

fn scroll_to_link(controller: &PageController, links: &[Element], link: &Element, index: usize) {
    let Some(href) = link.get_attribute("href") else {
        return;
    };
    let config = controller.config();
    let document = controller.document();
    let offset_top = |id: &str| {
        let target = document.get_element_by_id(id)?;
        Some(target.dyn_ref::<HtmlElement>()?.offset_top() as f64)
    };
    let header_height = controller.header_height();
    let Some(top) = scroll_request(&href, header_height, config.scroll_margin, offset_top) else {
        debug!("No element for {}", href);
        return;
    };

    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    controller.window().scroll_to_with_scroll_to_options(&options);

    mark_active(links, config.active_class, Some(index));
}

fn request_tick(controller: &PageController, links: &Rc<Vec<Element>>) {
    if !controller.throttle().try_acquire() {
        return;
    }

    let controller_c = controller.clone();
    let links = links.clone();
    let frame = Closure::once_into_js(move || {
        update_active(&controller_c, &links);
        controller_c.throttle().release();
    });

    if controller
        .window()
        .request_animation_frame(frame.unchecked_ref())
        .is_err()
    {
        controller.throttle().release();
    }
}

fn update_active(controller: &PageController, links: &[Element]) {
    let config = controller.config();
    let sections: Vec<SectionExtent> = controller
        .query_all(config.section_selector)
        .into_iter()
        .filter_map(|el| {
            let html = el.dyn_into::<HtmlElement>().ok()?;
            Some(SectionExtent {
                id: html.id(),
                top: html.offset_top() as f64,
                height: html.offset_height() as f64,
            })
        })
        .collect();

    let position = controller.scroll_y() + controller.header_height() + config.lookahead;
    let hrefs: Vec<String> = links
        .iter()
        .map(|l| l.get_attribute("href").unwrap_or_default())
        .collect();

    let index = link_for_section(&hrefs, section_at(&sections, position));
    mark_active(links, config.active_class, index);
}
