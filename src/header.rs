//! Hide-on-scroll header for narrow viewports.

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Function;
use web_sys::{Event, HtmlElement};

use crate::controller::{Listener, PageController};
use crate::error::{describe, PageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    Shown,
    Hidden,
}

impl HeaderState {
    /// Hidden only while moving down past `min_offset`.
    pub fn next(last: f64, current: f64, min_offset: f64) -> Self {
        if current > last && current > min_offset {
            HeaderState::Hidden
        } else {
            HeaderState::Shown
        }
    }

    pub fn transform(self) -> &'static str {
        match self {
            HeaderState::Shown => "translateY(0)",
            HeaderState::Hidden => "translateY(-100%)",
        }
    }
}

pub fn collapser_applies(width: f64, breakpoint: f64) -> bool {
    width <= breakpoint
}

/// What a resize does to the scroll listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    Attach,
    Detach,
    Keep,
}

impl HeaderAction {
    pub fn for_width(applies: bool, attached: bool) -> Self {
        match (applies, attached) {
            (true, false) => HeaderAction::Attach,
            (false, true) => HeaderAction::Detach,
            _ => HeaderAction::Keep,
        }
    }
}

pub fn setup(controller: &PageController) -> Result<(), PageError> {
    if controller.header().is_none() {
        debug!("No header, mobile collapse disabled");
        return Ok(());
    }

    evaluate(controller);

    let controller_c = controller.clone();
    controller.listen(controller.window(), "resize", move |_| evaluate(&controller_c))
}

/// Attaches or detaches the scroll listener for the current viewport width.
fn evaluate(controller: &PageController) {
    let Some(header) = controller.header() else {
        return;
    };
    let breakpoint = controller.config().mobile_breakpoint;
    let applies = controller
        .inner_width()
        .map_or(false, |width| collapser_applies(width, breakpoint));

    let mut slot = controller.header_listener().borrow_mut();
    match HeaderAction::for_width(applies, slot.is_some()) {
        HeaderAction::Attach => {
            controller.last_scroll_y().set(controller.scroll_y());
            let listener = collapse_listener(controller, header);
            match controller
                .window()
                .add_event_listener_with_callback("scroll", listener.as_ref().unchecked_ref())
            {
                Ok(()) => {
                    debug!("Mobile header collapse attached");
                    *slot = Some(listener);
                }
                Err(e) => debug!("Could not attach header collapse: {}", describe(&e)),
            }
        }
        HeaderAction::Detach => {
            if let Some(listener) = slot.take() {
                let callback: &Function = listener.as_ref().unchecked_ref();
                let _ = controller.window().remove_event_listener_with_callback("scroll", callback);
            }
            let _ = header.style().remove_property("transform");
            debug!("Mobile header collapse detached");
        }
        HeaderAction::Keep => {}
    }
}

fn collapse_listener(controller: &PageController, header: HtmlElement) -> Listener {
    let controller = controller.clone();
    Closure::wrap(Box::new(move |_: Event| {
        let current = controller.scroll_y();
        let last = controller.last_scroll_y().replace(current);
        let min_offset = controller.config().collapse_offset;
        let state = HeaderState::next(last, current, min_offset);
        let _ = header.style().set_property("transform", state.transform());
    }) as Box<dyn FnMut(Event)>)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(offsets: &[f64]) -> Vec<HeaderState> {
        let mut last = 0.0;
        offsets
            .iter()
            .map(|&current| {
                let state = HeaderState::next(last, current, 100.0);
                last = current;
                state
            })
            .collect()
    }

    fn hides(states: &[HeaderState]) -> usize {
        states
            .windows(2)
            .filter(|w| w[0] == HeaderState::Shown && w[1] == HeaderState::Hidden)
            .count()
    }

    #[test]
    fn breakpoint_is_inclusive() {
        assert!(collapser_applies(500.0, 768.0));
        assert!(collapser_applies(768.0, 768.0));
        assert!(!collapser_applies(769.0, 768.0));
    }

    #[test]
    fn stays_shown_near_top_even_when_scrolling_down() {
        let states = run(&[10.0, 50.0, 100.0]);
        assert!(states.iter().all(|s| *s == HeaderState::Shown));
    }

    #[test]
    fn hides_once_per_downward_run_and_shows_on_upward_move() {
        let states = run(&[40.0, 80.0, 120.0, 200.0, 350.0, 300.0, 320.0, 500.0]);
        assert_eq!(
            states,
            vec![
                HeaderState::Shown,
                HeaderState::Shown,
                HeaderState::Hidden,
                HeaderState::Hidden,
                HeaderState::Hidden,
                HeaderState::Shown,
                HeaderState::Hidden,
                HeaderState::Hidden,
            ]
        );
        assert_eq!(hides(&states), 2);
    }

    #[test]
    fn same_offset_counts_as_not_scrolling_down() {
        assert_eq!(HeaderState::next(300.0, 300.0, 100.0), HeaderState::Shown);
    }

    #[test]
    fn resizes_keep_at_most_one_listener() {
        let mut attached = false;
        let mut attaches = 0;
        let mut detaches = 0;

        for width in [500.0, 900.0, 500.0, 500.0, 768.0, 320.0] {
            match HeaderAction::for_width(collapser_applies(width, 768.0), attached) {
                HeaderAction::Attach => {
                    attaches += 1;
                    attached = true;
                }
                HeaderAction::Detach => {
                    detaches += 1;
                    attached = false;
                }
                HeaderAction::Keep => {}
            }
        }

        assert_eq!((attaches, detaches), (2, 1));
        assert!(attached);
    }

    #[test]
    fn attach_only_from_detached_state() {
        assert_eq!(HeaderAction::for_width(true, false), HeaderAction::Attach);
        assert_eq!(HeaderAction::for_width(true, true), HeaderAction::Keep);
        assert_eq!(HeaderAction::for_width(false, true), HeaderAction::Detach);
        assert_eq!(HeaderAction::for_width(false, false), HeaderAction::Keep);
    }

    #[test]
    fn transforms() {
        assert_eq!(HeaderState::Shown.transform(), "translateY(0)");
        assert_eq!(HeaderState::Hidden.transform(), "translateY(-100%)");
    }
}
