//! Deferred images: the real source goes in when the image nears the viewport.

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Array;
use web_sys::{HtmlImageElement, IntersectionObserver, IntersectionObserverEntry};

use crate::controller::PageController;
use crate::error::{describe, PageError};

const DEFERRED_ATTR: &str = "data-src";

pub trait DeferredImage {
    /// The withheld source, `None` once loaded.
    fn deferred_src(&self) -> Option<String>;
    fn load(&self, src: &str);
}

pub trait ImageWatcher<I> {
    fn unobserve(&self, image: &I);
}

pub struct LazyImage<'a> {
    pub element: &'a HtmlImageElement,
    pub lazy_class: &'a str,
}

impl DeferredImage for LazyImage<'_> {
    fn deferred_src(&self) -> Option<String> {
        self.element
            .get_attribute(DEFERRED_ATTR)
            .filter(|src| has_deferred_src(Some(src)))
    }

    fn load(&self, src: &str) {
        self.element.set_src(src);
        let _ = self.element.class_list().remove_1(self.lazy_class);
        let _ = self.element.remove_attribute(DEFERRED_ATTR);
    }
}

impl<'a> ImageWatcher<LazyImage<'a>> for IntersectionObserver {
    fn unobserve(&self, image: &LazyImage<'a>) {
        IntersectionObserver::unobserve(self, image.element);
    }
}

/// An empty `data-src` has nothing to load, so such images are never watched.
pub fn has_deferred_src(attr: Option<&str>) -> bool {
    attr.map_or(false, |src| !src.trim().is_empty())
}

/// Loads every image that still has a deferred source. Returns how many loaded.
pub fn load_all<I: DeferredImage>(images: &[I]) -> usize {
    images
        .iter()
        .filter_map(|image| image.deferred_src().map(|src| image.load(&src)))
        .count()
}

/// Loads `image` and stops watching it on its first intersection.
pub fn load_entry<I, W>(image: &I, watcher: &W, is_intersecting: bool) -> bool
where
    I: DeferredImage,
    W: ImageWatcher<I>,
{
    if !is_intersecting {
        return false;
    }
    let Some(src) = image.deferred_src() else {
        return false;
    };
    image.load(&src);
    watcher.unobserve(image);
    true
}

pub fn setup(controller: &PageController) -> Result<(), PageError> {
    let config = controller.config();
    let lazy_class = config.lazy_class;
    let images: Vec<HtmlImageElement> = controller
        .query_all(config.deferred_image_selector)
        .into_iter()
        .filter(|el| has_deferred_src(el.get_attribute(DEFERRED_ATTR).as_deref()))
        .filter_map(|el| el.dyn_into::<HtmlImageElement>().ok())
        .collect();
    if images.is_empty() {
        return Ok(());
    }
    let load_now = || {
        let lazy: Vec<LazyImage> = images
            .iter()
            .map(|element| LazyImage { element, lazy_class })
            .collect();
        load_all(&lazy)
    };

    if !controller.supports("IntersectionObserver") {
        let loaded = load_now();
        debug!("IntersectionObserver missing, loaded {} images now", loaded);
        return Ok(());
    }

    let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let Ok(element) = entry.target().dyn_into::<HtmlImageElement>() else {
                continue;
            };
            let image = LazyImage { element: &element, lazy_class };
            load_entry(&image, &observer, entry.is_intersecting());
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let observer = match IntersectionObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => observer,
        Err(e) => {
            let loaded = load_now();
            warn!("IntersectionObserver failed ({}), loaded {} images now", describe(&e), loaded);
            return Ok(());
        }
    };
    callback.forget();

    for image in &images {
        observer.observe(image);
    }
    debug!("Deferring {} images", images.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use std::cell::RefCell;

    struct FakeImage {
        data_src: RefCell<Option<String>>,
        src: RefCell<Option<String>>,
        classes: RefCell<Vec<String>>,
    }

    impl FakeImage {
        fn deferred(src: &str) -> Self {
            Self {
                data_src: RefCell::new(Some(src.to_string())),
                src: RefCell::new(None),
                classes: RefCell::new(vec!["lazy".to_string()]),
            }
        }
    }

    impl DeferredImage for FakeImage {
        fn deferred_src(&self) -> Option<String> {
            self.data_src.borrow().clone()
        }

        fn load(&self, src: &str) {
            *self.src.borrow_mut() = Some(src.to_string());
            self.classes.borrow_mut().retain(|c| c != "lazy");
            self.data_src.borrow_mut().take();
        }
    }

    mock! {
        Watcher {}
        impl ImageWatcher<FakeImage> for Watcher {
            fn unobserve(&self, image: &FakeImage);
        }
    }

    #[test]
    fn intersecting_image_gets_source_and_is_unobserved_once() {
        let image = FakeImage::deferred("/img/team.webp");
        let mut watcher = MockWatcher::new();
        watcher.expect_unobserve().times(1).return_const(());

        assert!(load_entry(&image, &watcher, true));
        // A late duplicate entry for the same image changes nothing.
        assert!(!load_entry(&image, &watcher, true));

        assert_eq!(image.src.borrow().as_deref(), Some("/img/team.webp"));
        assert!(image.classes.borrow().is_empty());
        assert!(image.deferred_src().is_none());
    }

    #[test]
    fn image_outside_viewport_is_left_alone() {
        let image = FakeImage::deferred("/img/hero.jpg");
        let mut watcher = MockWatcher::new();
        watcher.expect_unobserve().times(0);

        assert!(!load_entry(&image, &watcher, false));
        assert!(image.src.borrow().is_none());
        assert_eq!(image.deferred_src().as_deref(), Some("/img/hero.jpg"));
    }

    #[test]
    fn empty_deferred_source_is_not_watched() {
        assert!(has_deferred_src(Some("/img/a.webp")));
        assert!(!has_deferred_src(Some("")));
        assert!(!has_deferred_src(Some("  ")));
        assert!(!has_deferred_src(None));
    }

    #[test]
    fn fallback_loads_every_pending_image() {
        let images = vec![FakeImage::deferred("/a.png"), FakeImage::deferred("/b.png")];
        images[1].load("/b.png");

        assert_eq!(load_all(&images), 1);
        assert!(images.iter().all(|i| i.deferred_src().is_none()));
        assert_eq!(images[0].src.borrow().as_deref(), Some("/a.png"));
    }

    #[test]
    fn each_image_is_unobserved_exactly_once() {
        let images: Vec<FakeImage> = ["/a.png", "/b.png", "/c.png"]
            .iter()
            .map(|src| FakeImage::deferred(src))
            .collect();
        let mut watcher = MockWatcher::new();
        watcher.expect_unobserve().times(3).return_const(());

        for _ in 0..2 {
            for image in &images {
                load_entry(image, &watcher, true);
            }
        }
        assert!(images.iter().all(|i| i.src.borrow().is_some()));
    }
}
