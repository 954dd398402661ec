//! Click reporting for call-to-action links that lead to the external form.
//! Navigation is never held back: the handler only observes the click.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, SecondsFormat, Utc};
use gloo_timers::callback::Timeout;
use log::{debug, info, warn};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Function, Reflect};
use web_sys::{HtmlElement, Window};

use crate::config::PageConfig;
use crate::controller::PageController;
use crate::error::{describe, PageError};

pub const EVENT_CATEGORY: &str = "Form CTA";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickRecord {
    pub text: String,
    pub location: String,
    pub timestamp: String,
}

impl ClickRecord {
    pub fn new(text: &str, location: String) -> Self {
        Self::at(text, location, Utc::now())
    }

    pub fn at(text: &str, location: String, time: DateTime<Utc>) -> Self {
        Self {
            text: text.trim().to_string(),
            location,
            timestamp: time.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Parameters of the `gtag("event", "click", ...)` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GtagEvent {
    pub event_category: &'static str,
    pub event_label: String,
    pub custom_parameter_location: String,
}

impl From<&ClickRecord> for GtagEvent {
    fn from(record: &ClickRecord) -> Self {
        Self {
            event_category: EVENT_CATEGORY,
            event_label: record.text.clone(),
            custom_parameter_location: record.location.clone(),
        }
    }
}

pub fn is_call_to_action(href: &str, form_host: &str) -> bool {
    !form_host.is_empty() && href.contains(form_host)
}

/// Class of the enclosing section, or `fallback` outside any classed section.
pub fn location_label(section_class: Option<&str>, fallback: &str) -> String {
    match section_class.map(str::trim) {
        Some(class) if !class.is_empty() => class.to_string(),
        _ => fallback.to_string(),
    }
}

/// A link's real label, held while the redirect message covers it.
#[derive(Debug, Default)]
pub struct FeedbackSlot {
    saved: RefCell<Option<String>>,
}

impl FeedbackSlot {
    /// Label to report for a click on a link currently showing `current`.
    pub fn label(&self, current: String) -> String {
        self.saved.borrow().clone().unwrap_or(current)
    }

    /// Saves `label` unless a revert is already pending. `Some` means the caller
    /// shows the message and schedules the one revert.
    pub fn begin(&self, label: String) -> Option<String> {
        let mut saved = self.saved.borrow_mut();
        if saved.is_some() {
            return None;
        }
        *saved = Some(label.clone());
        Some(label)
    }

    /// Text to restore when the revert fires.
    pub fn finish(&self) -> Option<String> {
        self.saved.borrow_mut().take()
    }
}

/// Record for one click: the link's real label and where on the page it sits.
pub fn click_record(
    slot: &FeedbackSlot,
    current_text: String,
    section_class: Option<&str>,
    config: &PageConfig,
) -> ClickRecord {
    let label = slot.label(current_text);
    ClickRecord::new(&label, location_label(section_class, config.default_location))
}

pub fn setup(controller: &PageController) -> Result<(), PageError> {
    let config = controller.config();
    let buttons: Vec<HtmlElement> = controller
        .query_all("a[href]")
        .into_iter()
        .filter(|a| {
            a.get_attribute("href")
                .map_or(false, |href| is_call_to_action(&href, &config.form_host))
        })
        .filter_map(|a| a.dyn_into::<HtmlElement>().ok())
        .collect();
    debug!("Tracking {} form links", buttons.len());

    for button in buttons {
        let controller_c = controller.clone();
        let target = button.clone();
        let slot = Rc::new(FeedbackSlot::default());
        // Observe only: the event is dropped untouched so the link still navigates.
        controller.listen(&button, "click", move |_| {
            report_click(&controller_c, &target, &slot);
        })?;
    }

    Ok(())
}

fn report_click(controller: &PageController, button: &HtmlElement, slot: &Rc<FeedbackSlot>) {
    let config = controller.config();
    let current = button.text_content().unwrap_or_default();
    let section_class = button.closest("section").ok().flatten().map(|s| s.class_name());
    let record = click_record(slot, current.clone(), section_class.as_deref(), config);

    emit(controller.window(), &record);
    if let Some(original) = slot.begin(current) {
        show_feedback(button, config, original, slot);
    }
}

fn emit(window: &Window, record: &ClickRecord) {
    match serde_json::to_string(record) {
        Ok(json) => info!("Form button clicked: {}", json),
        Err(e) => warn!("Could not serialize click record: {}", e),
    }
    if let Ok(value) = serde_wasm_bindgen::to_value(record) {
        gloo_console::log!("Form button clicked:", value);
    }

    let Ok(gtag) = Reflect::get(window, &JsValue::from_str("gtag")) else {
        return;
    };
    let Some(gtag) = gtag.dyn_ref::<Function>() else {
        return;
    };
    let params = match serde_wasm_bindgen::to_value(&GtagEvent::from(record)) {
        Ok(params) => params,
        Err(e) => {
            warn!("Could not build analytics event: {}", e);
            return;
        }
    };
    if let Err(e) = gtag.call3(
        &JsValue::NULL,
        &JsValue::from_str("event"),
        &JsValue::from_str("click"),
        &params,
    ) {
        warn!("gtag call failed: {}", describe(&e));
    }
}

fn show_feedback(
    button: &HtmlElement,
    config: &PageConfig,
    original: String,
    slot: &Rc<FeedbackSlot>,
) {
    button.set_text_content(Some(&config.redirect_text));
    let _ = button.style().set_property("opacity", "0.8");

    let button = button.clone();
    let slot = slot.clone();
    Timeout::new(config.feedback_ms, move || {
        slot.finish();
        if !button.is_connected() {
            return;
        }
        button.set_text_content(Some(&original));
        let _ = button.style().set_property("opacity", "1");
    })
    .forget();
}
