//! Small page-specific behaviours: appointment actions, inline row editing,
//! the treatment plan preview, and the delete-confirmation modal.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlInputElement, HtmlSelectElement};

use crate::dom;
use crate::error::UiError;
use crate::toggles::sections::scroll_to_bottom;

const HIDDEN: &str = "hidden";
const DELETE_MODAL: &str = "deleteAppointmentTypeModal";
const RESCHEDULED: &str = "RESCHEDULED";

const PREVIEW_LABEL: &str = r#"<i class="fa-solid fa-magnifying-glass"></i><span>Preview</span>"#;
const EDIT_LABEL: &str = r#"<i class="fa-solid fa-pen-to-square"></i><span>Edit</span>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionState {
    pub submit_enabled: bool,
    pub show_datetime: bool,
}

impl ActionState {
    /// What the appointment form shows for the selected action.
    pub fn for_action(action: &str) -> Self {
        Self {
            submit_enabled: !action.is_empty(),
            show_datetime: action == RESCHEDULED,
        }
    }
}

/// Appointment type id carried by a row's `form` attribute
/// (`appointment_type_<id>`).
pub fn appointment_type_id(form_attr: &str) -> String {
    form_attr.replacen("appointment_type_", "", 1)
}

fn install_action_select(document: &Document) -> Result<(), UiError> {
    let Some(select) = document
        .get_element_by_id("action")
        .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
    else {
        return Ok(());
    };

    let doc = document.clone();
    let changed = select.clone();
    let change_closure = Closure::wrap(Box::new(move |_e: Event| {
        let state = ActionState::for_action(&changed.value());
        if let Some(submit) = doc.get_element_by_id("submit-btn") {
            let _ = submit.toggle_attribute_with_force("disabled", !state.submit_enabled);
        }
        for field in dom::select_all(&doc, ".datetime-field") {
            dom::toggle_class(&field, HIDDEN, !state.show_datetime);
        }
    }) as Box<dyn FnMut(Event)>);
    select.add_event_listener_with_callback("change", change_closure.as_ref().unchecked_ref())?;
    change_closure.forget();

    Ok(())
}

fn unhide_parent(element: &Element) {
    if let Some(parent) = element.parent_element() {
        dom::remove_classes(&parent, HIDDEN);
    }
}

fn install_row_editing(document: &Document) -> Result<(), UiError> {
    for button in dom::select_all(document, ".enable-form-btn") {
        let doc = document.clone();
        let clicked = button.clone();
        let click_closure = Closure::wrap(Box::new(move |_e: Event| {
            let Some(form_id) = clicked.get_attribute("form") else {
                return;
            };
            let bound = format!("[form=\"{form_id}\"]");

            for field in dom::select_all(
                &doc,
                &format!("input{bound}, select{bound}, textarea{bound}, button{bound}"),
            ) {
                let _ = field.remove_attribute("disabled");
            }
            for trigger in dom::select_all(
                &doc,
                &format!("span[data-bs-target=\"#{DELETE_MODAL}\"]{bound}"),
            ) {
                dom::remove_classes(&trigger, HIDDEN);
            }
            for action in dom::select_all(&doc, &format!("button{bound}")) {
                unhide_parent(&action);
            }
            if let Some(parent) = clicked.parent_element() {
                dom::add_classes(&parent, HIDDEN);
            }
        }) as Box<dyn FnMut(Event)>);
        button.add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())?;
        click_closure.forget();
    }

    Ok(())
}

fn install_treatment_plan_toggle(document: &Document) -> Result<(), UiError> {
    let Some(toggle) = document.get_element_by_id("toggle-treatment-plan") else {
        return Ok(());
    };

    let doc = document.clone();
    let clicked = toggle.clone();
    let click_closure = Closure::wrap(Box::new(move |_e: Event| {
        let (Some(form), Some(preview)) = (
            doc.get_element_by_id("treatment-plan-form"),
            doc.get_element_by_id("treatment-plan-preview"),
        ) else {
            return;
        };
        let editing = dom::has_class(&form, HIDDEN);
        dom::toggle_class(&form, HIDDEN, !editing);
        dom::toggle_class(&preview, HIDDEN, editing);
        clicked.set_inner_html(if editing { PREVIEW_LABEL } else { EDIT_LABEL });
    }) as Box<dyn FnMut(Event)>);
    toggle.add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())?;
    click_closure.forget();

    Ok(())
}

fn install_delete_modal(document: &Document) -> Result<(), UiError> {
    let Some(modal) = document.get_element_by_id(DELETE_MODAL) else {
        return Ok(());
    };

    let shown = modal.clone();
    let show_closure = Closure::wrap(Box::new(move |e: Event| {
        // Bootstrap puts the triggering element on the event.
        let Some(form_attr) = js_sys::Reflect::get(&e, &JsValue::from_str("relatedTarget"))
            .ok()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|t| t.get_attribute("form"))
        else {
            return;
        };
        if let Some(input) = shown
            .query_selector("input[name=\"appointment_type_id\"]")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&appointment_type_id(&form_attr));
        }
    }) as Box<dyn FnMut(Event)>);
    modal.add_event_listener_with_callback("show.bs.modal", show_closure.as_ref().unchecked_ref())?;
    show_closure.forget();

    Ok(())
}

/// Things the page does once everything has loaded.
pub fn on_load(document: &Document) {
    if let Some(onboarding) = document.get_element_by_id("onboardingModal") {
        if let Err(e) = crate::toggles::bootstrap::show_modal(&onboarding) {
            log::warn!("onboarding modal unavailable: {e:?}");
        }
    }
    for messages in dom::select_all(document, ".messages-container") {
        scroll_to_bottom(&messages);
    }
}

pub fn install(document: &Document) -> Result<(), UiError> {
    install_action_select(document)?;
    install_row_editing(document)?;
    install_treatment_plan_toggle(document)?;
    install_delete_modal(document)?;
    Ok(())
}
