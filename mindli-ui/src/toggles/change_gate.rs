//! Keep submit buttons disabled until a visible field changes.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event};

use crate::config::PageConfig;
use crate::dom;
use crate::error::UiError;

const VISIBLE_FIELDS: &str = "input:not([type=hidden]), textarea, select";

/// Forms without visible fields, filter forms and client-only forms stay
/// enabled.
pub fn is_gated(config: &PageConfig, form_id: &str, visible_fields: usize) -> bool {
    !config.is_ungated(form_id) && !config.is_client_only(form_id) && visible_fields > 0
}

fn set_controls_disabled(form: &Element, disabled: bool) {
    for control in dom::submit_controls(form) {
        let _ = control.toggle_attribute_with_force("disabled", disabled);
    }
}

pub fn install(document: &Document, config: &PageConfig) -> Result<(), UiError> {
    for form in dom::select_all(document, "form") {
        if form.has_attribute("data-client-only")
            || !is_gated(config, &form.id(), dom::visible_fields(&form).len())
        {
            continue;
        }
        set_controls_disabled(&form, true);

        let gated = form.clone();
        let change_closure = Closure::wrap(Box::new(move |e: Event| {
            let is_field = e
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .map_or(false, |el| el.matches(VISIBLE_FIELDS).unwrap_or(false));
            if is_field {
                set_controls_disabled(&gated, false);
            }
        }) as Box<dyn FnMut(Event)>);
        for event in ["change", "input"] {
            form.add_event_listener_with_callback(event, change_closure.as_ref().unchecked_ref())?;
        }
        change_closure.forget();
    }

    Ok(())
}
