//! Bindings to the page's Bootstrap bundle.

use wasm_bindgen::prelude::*;
use web_sys::Element;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = bootstrap)]
    pub type Tooltip;

    #[wasm_bindgen(constructor, js_namespace = bootstrap, catch)]
    fn new(element: &Element) -> Result<Tooltip, JsValue>;

    #[wasm_bindgen(static_method_of = Tooltip, js_name = getInstance, catch)]
    fn get_instance(element: &Element) -> Result<Option<Tooltip>, JsValue>;

    #[wasm_bindgen(method)]
    pub fn enable(this: &Tooltip);

    #[wasm_bindgen(method)]
    pub fn disable(this: &Tooltip);

    #[wasm_bindgen(js_namespace = bootstrap)]
    pub type Modal;

    #[wasm_bindgen(static_method_of = Modal, js_name = getOrCreateInstance, catch)]
    fn get_or_create_instance(element: &Element) -> Result<Modal, JsValue>;

    #[wasm_bindgen(method)]
    pub fn show(this: &Modal);
}

/// Create a tooltip for `element`. Fails when Bootstrap isn't loaded.
pub fn create_tooltip(element: &Element) -> Result<Tooltip, JsValue> {
    Tooltip::new(element)
}

pub fn existing_tooltip(element: &Element) -> Option<Tooltip> {
    Tooltip::get_instance(element).ok().flatten()
}

pub fn show_modal(element: &Element) -> Result<(), JsValue> {
    Modal::get_or_create_instance(element)?.show();
    Ok(())
}
