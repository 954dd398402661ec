//! Page selectors, timings and messages, with per-deployment overrides.

use log::{warn, Level};
use web_sys::Element;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Selectors, class names, timings and messages shared by the page behaviors.
///
/// Defaults match the markup of the landing page. A few values can be overridden
/// per deployment with `data-*` attributes on the `<html>` element, see
/// [`PageConfig::with_overrides`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub header_selector: &'static str,
    pub nav_link_selector: &'static str,
    pub section_selector: &'static str,
    pub section_heading_selector: &'static str,
    pub active_class: &'static str,
    /// Gap kept between the header and a section after a smooth scroll.
    pub scroll_margin: f64,
    /// How far below the header a section must reach to count as current.
    pub lookahead: f64,

    pub form_host: String,
    pub redirect_text: String,
    pub feedback_ms: u32,
    pub default_location: &'static str,

    pub animated_selector: &'static str,
    pub revealed_class: &'static str,
    pub reveal_threshold: f64,
    pub reveal_root_margin: &'static str,

    pub mobile_breakpoint: f64,
    pub collapse_offset: f64,

    pub announce_prefix: String,
    pub announce_ms: u32,
    pub sr_only_class: &'static str,

    pub deferred_image_selector: &'static str,
    pub lazy_class: &'static str,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            header_selector: ".header",
            nav_link_selector: ".nav-link[href^=\"#\"]",
            section_selector: "section[id]",
            section_heading_selector: "h2",
            active_class: "active",
            scroll_margin: 20.0,
            lookahead: 100.0,

            form_host: "forms.yandex.ru".to_string(),
            redirect_text: "Перенаправляем...".to_string(),
            feedback_ms: 500,
            default_location: "header",

            animated_selector: ".problem-card, .benefit-card, .solution-step, .step",
            revealed_class: "animate-in",
            reveal_threshold: 0.1,
            reveal_root_margin: "0px 0px -50px 0px",

            mobile_breakpoint: 768.0,
            collapse_offset: 100.0,

            announce_prefix: "Переход к разделу".to_string(),
            announce_ms: 1000,
            sr_only_class: "sr-only",

            deferred_image_selector: "img[data-src]",
            lazy_class: "lazy",
        }
    }
}

impl PageConfig {
    /// Reads overrides from the document root, falling back to the defaults.
    pub fn from_root(root: Option<&Element>) -> Self {
        match root {
            Some(root) => Self::default().with_overrides(|name| root.get_attribute(name)),
            None => Self::default(),
        }
    }

    /// Applies `data-*` overrides looked up through `attr`.
    pub fn with_overrides<F>(mut self, attr: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = attr("data-form-host").filter(|h| !h.trim().is_empty()) {
            self.form_host = host.trim().to_string();
        }
        if let Some(text) = attr("data-redirect-text").filter(|t| !t.is_empty()) {
            self.redirect_text = text;
        }
        if let Some(prefix) = attr("data-announce-prefix").filter(|p| !p.is_empty()) {
            self.announce_prefix = prefix;
        }
        if let Some(value) = attr("data-mobile-breakpoint") {
            self.mobile_breakpoint =
                parse_length("data-mobile-breakpoint", &value, self.mobile_breakpoint);
        }
        if let Some(value) = attr("data-collapse-offset") {
            self.collapse_offset =
                parse_length("data-collapse-offset", &value, self.collapse_offset);
        }
        self
    }
}

fn parse_length(name: &str, value: &str, fallback: f64) -> f64 {
    match value.trim().trim_end_matches("px").parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => {
            warn!("Ignoring {}={:?}, keeping {}", name, value, fallback);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_match_landing_markup() {
        let config = PageConfig::default();
        assert_eq!(config.mobile_breakpoint, 768.0);
        assert_eq!(config.collapse_offset, 100.0);
        assert_eq!(config.announce_ms, 1000);
        assert_eq!(config.feedback_ms, 500);
        assert_eq!(config.form_host, "forms.yandex.ru");
    }

    #[test]
    fn overrides_replace_selected_values() {
        let map = attrs(&[
            ("data-form-host", " forms.example.org "),
            ("data-mobile-breakpoint", "640px"),
            ("data-collapse-offset", "48"),
        ]);
        let config = PageConfig::default().with_overrides(|name| map.get(name).cloned());
        assert_eq!(config.form_host, "forms.example.org");
        assert_eq!(config.mobile_breakpoint, 640.0);
        assert_eq!(config.collapse_offset, 48.0);
        assert_eq!(config.redirect_text, PageConfig::default().redirect_text);
    }

    #[test]
    fn bad_numbers_keep_defaults() {
        let map = attrs(&[("data-mobile-breakpoint", "wide"), ("data-collapse-offset", "-5")]);
        let config = PageConfig::default().with_overrides(|name| map.get(name).cloned());
        assert_eq!(config.mobile_breakpoint, 768.0);
        assert_eq!(config.collapse_offset, 100.0);
    }

    #[test]
    fn blank_host_is_ignored() {
        let map = attrs(&[("data-form-host", "   ")]);
        let config = PageConfig::default().with_overrides(|name| map.get(name).cloned());
        assert_eq!(config.form_host, "forms.yandex.ru");
    }
}
