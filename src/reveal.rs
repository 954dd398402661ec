//! Entrance animations for cards as they scroll into view.

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::controller::PageController;
use crate::error::{describe, PageError};

pub trait Revealable {
    fn is_revealed(&self) -> bool;
    fn mark_revealed(&self);
}

/// A card plus the class that marks it revealed.
pub struct Card<'a> {
    pub element: &'a Element,
    pub class: &'a str,
}

impl Revealable for Card<'_> {
    fn is_revealed(&self) -> bool {
        self.element.class_list().contains(self.class)
    }

    fn mark_revealed(&self) {
        let _ = self.element.class_list().add_1(self.class);
    }
}

/// Reveals `target` the first time it is seen intersecting. Returns true only
/// for that first time; there is no way back.
pub fn reveal_entry<T: Revealable>(target: &T, is_intersecting: bool) -> bool {
    if !is_intersecting || target.is_revealed() {
        return false;
    }
    target.mark_revealed();
    true
}

pub fn setup(controller: &PageController) -> Result<(), PageError> {
    let config = controller.config();
    let class = config.revealed_class;
    let cards = controller.query_all(config.animated_selector);
    if cards.is_empty() {
        return Ok(());
    }

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(config.reveal_threshold));
    init.set_root_margin(config.reveal_root_margin);

    let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let target = entry.target();
            let card = Card { element: &target, class };
            if reveal_entry(&card, entry.is_intersecting()) {
                observer.unobserve(&target);
            }
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init);
    let observer = match observer {
        Ok(observer) => observer,
        Err(e) => {
            // Injected styles start cards hidden; show them all.
            warn!("IntersectionObserver unavailable ({}), revealing cards now", describe(&e));
            for element in &cards {
                reveal_entry(&Card { element, class }, true);
            }
            return Ok(());
        }
    };
    callback.forget();

    for card in &cards {
        observer.observe(card);
    }
    debug!("Observing {} cards", cards.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct FakeCard {
        revealed: Cell<bool>,
        marks: Cell<u32>,
    }

    impl Revealable for FakeCard {
        fn is_revealed(&self) -> bool {
            self.revealed.get()
        }

        fn mark_revealed(&self) {
            self.revealed.set(true);
            self.marks.set(self.marks.get() + 1);
        }
    }

    #[test]
    fn hidden_card_stays_hidden_until_it_intersects() {
        let card = FakeCard::default();
        assert!(!reveal_entry(&card, false));
        assert!(!card.is_revealed());
        assert!(reveal_entry(&card, true));
        assert!(card.is_revealed());
    }

    #[test]
    fn reveal_is_one_way_and_fires_once() {
        let card = FakeCard::default();
        let events = [false, true, false, true, true, false];
        let fired: Vec<bool> = events.iter().map(|&i| reveal_entry(&card, i)).collect();

        assert_eq!(fired, vec![false, true, false, false, false, false]);
        assert!(card.is_revealed());
        assert_eq!(card.marks.get(), 1);
    }
}
