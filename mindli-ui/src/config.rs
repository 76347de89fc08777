//! Page-level configuration.
//!
//! Defaults match the markup the server templates render. A page may
//! override any of them with an embedded JSON block:
//!
//! ```html
//! <script type="application/json" id="mindli-config">
//!   {"failure_fallback": "stay", "csrf_placement": "field"}
//! </script>
//! ```

use serde::Deserialize;
use web_sys::Document;

pub const CONFIG_ELEMENT_ID: &str = "mindli-config";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid page config: {0}")]
    Invalid(String),
}

/// What to do with a `success: false` response that carries no errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureFallback {
    /// Navigate to the error view.
    #[default]
    Redirect,
    /// Leave the page as is. Useful while developing views.
    Stay,
}

/// Where the anti-forgery token travels on state-changing requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsrfPlacement {
    #[default]
    Header,
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Container a checkbox/radio annotation goes after.
    pub group_selector: String,
    /// Fields whose annotation is appended inside the field's own element.
    pub append_inside: Vec<String>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            group_selector: ".form-check".to_string(),
            append_inside: vec!["role".to_string()],
        }
    }
}

/// Class names and selectors the server templates use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub invalid_class: String,
    pub annotation_class: String,
    pub annotation_icon_class: String,
    pub label_selector: String,
    pub spinner_selector: String,
    pub flash_selector: String,
    pub flash_container_id: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            invalid_class: "input-error".to_string(),
            annotation_class: "error-message mt-2".to_string(),
            annotation_icon_class: "fa-solid fa-circle-exclamation".to_string(),
            label_selector: ".btn-text".to_string(),
            spinner_selector: ".spinner-border".to_string(),
            flash_selector: ".flashed-message".to_string(),
            flash_container_id: "flashed-messages-container".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub account_endpoint: String,
    pub session_endpoint: String,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            account_endpoint: "/payments/account".to_string(),
            session_endpoint: "/payments/account_session".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Generic error view for transport failures
    pub error_view: String,
    pub failure_fallback: FailureFallback,
    pub csrf_placement: CsrfPlacement,
    pub csrf_header: String,
    pub csrf_field: String,
    /// `name` of the meta tag carrying the token
    pub csrf_meta: String,
    /// Payload field carrying the activated submit control's name
    pub submitter_field: String,
    /// Id substrings marking forms that never talk to the server. Forms
    /// carrying `data-client-only` are skipped as well.
    pub client_only_markers: Vec<String>,
    /// Id substrings of forms whose submit buttons start enabled
    pub ungated_markers: Vec<String>,
    pub prefix_separator: String,
    pub placement: PlacementConfig,
    pub markup: MarkupConfig,
    pub sidebar_collapse_width: f64,
    pub sidebar_reveal_delay_ms: u32,
    pub payments: PaymentsConfig,
    pub log_level: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            error_view: "/error".to_string(),
            failure_fallback: FailureFallback::default(),
            csrf_placement: CsrfPlacement::default(),
            csrf_header: "X-CSRFToken".to_string(),
            csrf_field: "csrf_token".to_string(),
            csrf_meta: "csrf-token".to_string(),
            submitter_field: "submit".to_string(),
            client_only_markers: Vec::new(),
            ungated_markers: vec!["filter".to_string()],
            prefix_separator: "-".to_string(),
            placement: PlacementConfig::default(),
            markup: MarkupConfig::default(),
            sidebar_collapse_width: 1000.0,
            sidebar_reveal_delay_ms: 150,
            payments: PaymentsConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl PageConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Read the embedded config block, falling back to defaults when absent.
    pub fn from_document(document: &Document) -> Result<Self, ConfigError> {
        match document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        {
            Some(raw) => Self::from_json(&raw),
            None => Ok(Self::default()),
        }
    }

    /// Whether a form id marks a client-side-only form.
    pub fn is_client_only(&self, form_id: &str) -> bool {
        matches_marker(&self.client_only_markers, form_id)
    }

    /// Whether a form keeps its submit buttons enabled before any edit.
    pub fn is_ungated(&self, form_id: &str) -> bool {
        matches_marker(&self.ungated_markers, form_id)
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

fn matches_marker(markers: &[String], form_id: &str) -> bool {
    markers
        .iter()
        .any(|marker| !marker.is_empty() && form_id.contains(marker.as_str()))
}

/// Read the anti-forgery token from `<meta name="...">`.
pub fn read_csrf_token(document: &Document, meta_name: &str) -> Option<String> {
    document
        .query_selector(&format!("meta[name=\"{meta_name}\"]"))
        .ok()
        .flatten()
        .and_then(|meta| meta.get_attribute("content"))
        .filter(|token| !token.is_empty())
}
