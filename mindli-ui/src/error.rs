use wasm_bindgen::JsValue;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error("no global `window` exists")]
    NoWindow,
    #[error("no document on window")]
    NoDocument,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for UiError {
    fn from(value: JsValue) -> Self {
        UiError::Js(js_error_message(&value))
    }
}

/// Best-effort readable text for a thrown JS value.
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
