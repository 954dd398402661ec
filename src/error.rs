//! Setup failures for page behaviors.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Reasons a page behavior could not be wired up.
///
/// None of these are fatal for the page: the controller logs them and moves on
/// to the next behavior.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("no global window")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("document has no body")]
    NoBody,

    #[error("failed to register styles: {0}")]
    Style(#[from] stylist::Error),

    #[error("DOM call failed: {0}")]
    Js(String),
}

impl From<JsValue> for PageError {
    fn from(value: JsValue) -> Self {
        PageError::Js(describe(&value))
    }
}

/// Best-effort text for a thrown JS value.
pub fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
