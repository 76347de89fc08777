use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event};

use crate::dom;
use crate::error::UiError;

/// Input type after one press of the visibility toggle.
pub fn toggled_type(current: Option<&str>) -> &'static str {
    match current {
        Some("password") => "text",
        _ => "password",
    }
}

pub fn install(document: &Document) -> Result<(), UiError> {
    let Some(toggle) = document.get_element_by_id("togglePassword") else {
        return Ok(());
    };

    let doc = document.clone();
    let icon_root = toggle.clone();
    let click_closure = Closure::wrap(Box::new(move |_e: Event| {
        let Some(field) = doc.get_element_by_id("password") else {
            return;
        };
        let next = toggled_type(field.get_attribute("type").as_deref());
        let _ = field.set_attribute("type", next);

        for icon in dom::select_within(&icon_root, "i") {
            let hidden = next == "password";
            dom::toggle_class(&icon, "fa-eye", hidden);
            dom::toggle_class(&icon, "fa-eye-slash", !hidden);
        }
    }) as Box<dyn FnMut(Event)>);
    toggle.add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())?;
    click_closure.forget();

    Ok(())
}
