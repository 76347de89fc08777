//! Section tabs kept in sync with the `?section=` query parameter.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, UrlSearchParams, Window};

use crate::dom;
use crate::error::UiError;

const ITEMS: &str = "#section-selector .list-group-item";
const SECTIONS: &str = ".section";

/// Pick the section to show: the one requested if it exists on the page,
/// otherwise the first selector item's target.
pub fn resolve_section(
    requested: &str,
    exists: impl Fn(&str) -> bool,
    first_target: Option<&str>,
) -> Option<String> {
    let selector = format!("#{}", requested.trim_start_matches('#'));
    if exists(&selector) {
        Some(selector)
    } else {
        first_target.map(ToString::to_string)
    }
}

/// URL for `pathname` with the section query set to `target` (`#id`).
pub fn section_url(pathname: &str, target: &str) -> String {
    format!("{pathname}?section={}", target.trim_start_matches('#'))
}

fn show_only(document: &Document, target: &str) {
    for section in dom::select_all(document, SECTIONS) {
        dom::set_visible(&section, false);
    }
    if let Some(section) = dom::select_one(document, target) {
        dom::set_visible(&section, true);
    }
}

fn activate(document: &Document, item: Option<&Element>) {
    for other in dom::select_all(document, ITEMS) {
        dom::remove_classes(&other, "active");
    }
    if let Some(item) = item {
        dom::add_classes(item, "active");
    }
}

pub fn scroll_to_bottom(container: &Element) {
    container.set_scroll_top(container.scroll_height());
}

fn requested_section(window: &Window, document: &Document) -> Option<String> {
    let search = window.location().search().unwrap_or_default();
    UrlSearchParams::new_with_str(&search)
        .ok()
        .and_then(|params| params.get("section"))
        .filter(|s| !s.is_empty())
        .or_else(|| {
            dom::select_one(document, "#section-selector")
                .and_then(|selector| selector.get_attribute("data-default-section"))
        })
}

fn show_initial(window: &Window, document: &Document) {
    let Some(requested) = requested_section(window, document) else {
        return;
    };
    let first_target = dom::select_one(document, ITEMS).and_then(|i| i.get_attribute("data-target"));
    let Some(target) = resolve_section(
        &requested,
        |selector| dom::select_one(document, selector).is_some(),
        first_target.as_deref(),
    ) else {
        return;
    };

    show_only(document, &target);
    let item = dom::select_one(document, &format!("{ITEMS}[data-target=\"{target}\"]"));
    activate(document, item.as_ref());
}

pub fn install(window: &Window, document: &Document) -> Result<(), UiError> {
    show_initial(window, document);

    for item in dom::select_all(document, ITEMS) {
        let window = window.clone();
        let document = document.clone();
        let clicked = item.clone();
        let click_closure = Closure::wrap(Box::new(move |_e: Event| {
            activate(&document, Some(&clicked));
            let Some(target) = clicked.get_attribute("data-target") else {
                return;
            };
            show_only(&document, &target);

            if let Some(messages) = dom::select_one(&document, &format!("{target} .messages-container")) {
                scroll_to_bottom(&messages);
            }

            let pathname = window.location().pathname().unwrap_or_default();
            let url = section_url(&pathname, &target);
            if let Ok(history) = window.history() {
                let _ = history.push_state_with_url(&JsValue::NULL, "", Some(&url));
            }
        }) as Box<dyn FnMut(Event)>);
        item.add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())?;
        click_closure.forget();
    }

    Ok(())
}
