//! Page-wide handle shared by every behavior, and the start-up sequence.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Reflect;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Window};

use crate::config::PageConfig;
use crate::error::{describe, PageError};
use crate::nav::FrameThrottle;
use crate::{a11y, analytics, header, lazy, nav, reveal, styles};

pub type Listener = Closure<dyn FnMut(Event)>;

type Setup = fn(&PageController) -> Result<(), PageError>;

struct Inner {
    window: Window,
    document: Document,
    config: PageConfig,
    throttle: FrameThrottle,
    last_scroll_y: Cell<f64>,
    header_listener: RefCell<Option<Listener>>,
}

/// Shared handle to the page and the little state the behaviors keep between
/// events. Clones point at the same state.
#[derive(Clone)]
pub struct PageController {
    inner: Rc<Inner>,
}

impl PageController {
    pub fn new() -> Result<Self, PageError> {
        let window = web_sys::window().ok_or(PageError::NoWindow)?;
        let document = window.document().ok_or(PageError::NoDocument)?;
        let config = PageConfig::from_root(document.document_element().as_ref());
        debug!("Page config: {:?}", config);

        Ok(Self {
            inner: Rc::new(Inner {
                window,
                document,
                config,
                throttle: FrameThrottle::default(),
                last_scroll_y: Cell::new(0.0),
                header_listener: RefCell::new(None),
            }),
        })
    }

    /// Wires every behavior. A behavior that fails to set up is skipped and the
    /// rest still run.
    pub fn start(&self) {
        let units: [(&str, Setup); 7] = [
            ("styles", styles::setup),
            ("navigation", nav::setup),
            ("click reporter", analytics::setup),
            ("scroll reveal", reveal::setup),
            ("mobile header", header::setup),
            ("announcer", a11y::setup),
            ("lazy images", lazy::setup),
        ];

        for (name, setup) in units {
            match setup(self) {
                Ok(()) => debug!("{} ready", name),
                Err(e) => warn!("Skipping {}: {}", name, e),
            }
        }

        info!("Landing page initialized successfully");
    }

    pub fn window(&self) -> &Window {
        &self.inner.window
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn config(&self) -> &PageConfig {
        &self.inner.config
    }

    pub fn throttle(&self) -> &FrameThrottle {
        &self.inner.throttle
    }

    pub fn last_scroll_y(&self) -> &Cell<f64> {
        &self.inner.last_scroll_y
    }

    pub fn header_listener(&self) -> &RefCell<Option<Listener>> {
        &self.inner.header_listener
    }

    pub fn query(&self, selector: &str) -> Option<Element> {
        self.document().query_selector(selector).ok().flatten()
    }

    pub fn query_all(&self, selector: &str) -> Vec<Element> {
        let list = match self.document().query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                warn!("Bad selector {:?}: {}", selector, describe(&e));
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    pub fn header(&self) -> Option<HtmlElement> {
        self.query(self.config().header_selector)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    /// Height of the fixed header, 0 when the page has none.
    pub fn header_height(&self) -> f64 {
        self.header().map(|h| h.offset_height() as f64).unwrap_or(0.0)
    }

    pub fn scroll_y(&self) -> f64 {
        self.window().scroll_y().unwrap_or(0.0)
    }

    pub fn inner_width(&self) -> Option<f64> {
        self.window().inner_width().ok().and_then(|w| w.as_f64())
    }

    /// Whether the window exposes a global named `name`.
    pub fn supports(&self, name: &str) -> bool {
        Reflect::has(self.window(), &JsValue::from_str(name)).unwrap_or(false)
    }

    /// Attaches `handler` for the lifetime of the page.
    pub fn listen<F>(&self, target: &EventTarget, event: &str, handler: F) -> Result<(), PageError>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        callback.forget();
        Ok(())
    }
}
