//! Wiring live `<form>` elements to a [`FormController`].

use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event};

use crate::dom::{self, DomPage};
use crate::error::UiError;
use crate::forms::FormController;
use crate::page::FormId;
use crate::request::{FormDescriptor, Method, Submitter};
use crate::transport::Transport;

/// Make sure a form has an id to key its state by.
fn ensure_form_id(form: &Element, index: usize) -> String {
    let id = form.id();
    if !id.is_empty() {
        return id;
    }
    let generated = format!("mindli-form-{index}");
    form.set_id(&generated);
    generated
}

/// Where a form posts: its `action` attribute, or the page itself when the
/// attribute is missing or empty, as a native submission would.
///
/// The attribute is read rather than `form.action`, which a control named
/// `action` shadows.
pub fn resolve_endpoint(action_attr: Option<String>, page_url: &str) -> String {
    action_attr
        .map(|action| action.trim().to_string())
        .filter(|action| !action.is_empty())
        .unwrap_or_else(|| page_url.to_string())
}

fn endpoint_for(form: &Element, document: &Document) -> String {
    let page_url = document.url().unwrap_or_default();
    resolve_endpoint(form.get_attribute("action"), &page_url)
}

/// The control's name and current value, read when it is activated.
pub fn submitter_of(control: &Element) -> Submitter {
    let value = js_sys::Reflect::get(control, &JsValue::from_str("value"))
        .ok()
        .and_then(|v| v.as_string())
        .or_else(|| control.get_attribute("value"))
        .unwrap_or_default();
    Submitter {
        name: control.get_attribute("name").unwrap_or_default(),
        value,
    }
}

/// Intercept submission of every eligible form in `document`.
///
/// Returns the number of forms bound.
pub fn bind_forms<T>(
    controller: Rc<FormController<DomPage, T>>,
    document: &Document,
) -> Result<usize, UiError>
where
    T: Transport + 'static,
{
    let mut bound = 0;

    for (index, form) in dom::select_all(document, "form").into_iter().enumerate() {
        if form.has_attribute("data-client-only") {
            continue;
        }
        let id = ensure_form_id(&form, index);
        let form_id = FormId::new(id);

        let descriptor = FormDescriptor {
            id: form_id.clone(),
            endpoint: endpoint_for(&form, document),
            method: Method::from_attribute(form.get_attribute("method").as_deref()),
        };
        if !controller.register(descriptor) {
            continue;
        }

        let controls = dom::submit_controls(&form);
        if controls.len() > 1 {
            for control in controls {
                let controller = controller.clone();
                let form_id = form_id.clone();
                let click_closure = Closure::wrap(Box::new(move |e: Event| {
                    let Some(clicked) = e
                        .current_target()
                        .and_then(|t| t.dyn_into::<Element>().ok())
                    else {
                        return;
                    };
                    controller.record_submitter(&form_id, submitter_of(&clicked));
                }) as Box<dyn FnMut(Event)>);
                control.add_event_listener_with_callback(
                    "click",
                    click_closure.as_ref().unchecked_ref(),
                )?;
                click_closure.forget();
            }
        }

        let submit_controller = controller.clone();
        let submit_form_id = form_id.clone();
        let submit_closure = Closure::wrap(Box::new(move |e: Event| {
            e.prevent_default();
            let controller = submit_controller.clone();
            let form_id = submit_form_id.clone();
            wasm_bindgen_futures::spawn_local(async move {
                controller.submit(&form_id).await;
            });
        }) as Box<dyn FnMut(Event)>);
        form.add_event_listener_with_callback("submit", submit_closure.as_ref().unchecked_ref())?;
        // Lives as long as the page; navigation tears it down.
        submit_closure.forget();

        bound += 1;
    }

    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_attribute_is_the_endpoint() {
        assert_eq!(
            resolve_endpoint(
                Some("/appointment/3".to_string()),
                "https://mindli.app/appointment/3/edit"
            ),
            "/appointment/3"
        );
    }

    #[test]
    fn missing_or_empty_action_posts_to_the_page() {
        let page = "https://mindli.app/therapists?section=filters";
        assert_eq!(resolve_endpoint(None, page), page);
        assert_eq!(resolve_endpoint(Some("  ".to_string()), page), page);
    }
}
