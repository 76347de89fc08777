//! Sidebar collapse, its tooltips, and the active navigation link.

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, Window};

use dioxus_logger::tracing::warn;

use crate::config::PageConfig;
use crate::dom;
use crate::error::{js_error_message, UiError};
use crate::toggles::bootstrap;

const SIDEBAR: &str = ".sidebar";
const COLLAPSED: &str = "collapsed";
const SIDEBAR_LABELS: &str = ".sidebar .navbar-brand, .sidebar .nav-link span";

pub fn should_collapse(viewport_width: f64, collapse_width: f64) -> bool {
    viewport_width < collapse_width
}

fn sidebar_collapsed(document: &Document) -> bool {
    dom::select_one(document, SIDEBAR).map_or(false, |s| dom::has_class(&s, COLLAPSED))
}

fn hide_labels(document: &Document) {
    for label in dom::select_all(document, SIDEBAR_LABELS) {
        dom::set_visible(&label, false);
    }
}

/// Reveal labels once the expand transition has had time to run.
fn reveal_labels_later(document: &Document, delay_ms: u32) {
    let document = document.clone();
    wasm_bindgen_futures::spawn_local(async move {
        TimeoutFuture::new(delay_ms).await;
        for label in dom::select_all(&document, SIDEBAR_LABELS) {
            dom::set_visible(&label, true);
        }
    });
}

/// Tooltips only make sense while the labels are hidden.
fn sync_tooltips(document: &Document) {
    let collapsed = sidebar_collapsed(document);
    for trigger in dom::select_all(document, ".sidebar [data-bs-toggle=\"tooltip\"]") {
        match bootstrap::existing_tooltip(&trigger) {
            Some(tooltip) if collapsed => tooltip.enable(),
            Some(tooltip) => tooltip.disable(),
            None => warn!("no tooltip instance for sidebar item `{}`", trigger.id()),
        }
    }
}

fn viewport_width(window: &Window) -> f64 {
    window
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or(0.0)
}

fn fit_to_viewport(window: &Window, document: &Document, config: &PageConfig) {
    let Some(sidebar) = dom::select_one(document, SIDEBAR) else {
        return;
    };
    if should_collapse(viewport_width(window), config.sidebar_collapse_width) {
        hide_labels(document);
        dom::add_classes(&sidebar, COLLAPSED);
    } else if !dom::has_class(&sidebar, COLLAPSED) {
        reveal_labels_later(document, config.sidebar_reveal_delay_ms);
    }
    sync_tooltips(document);
}

fn mark_active_link(document: &Document) {
    let Some(active) = document
        .body()
        .and_then(|body| body.get_attribute("data-active-page"))
    else {
        return;
    };
    for link in dom::select_all(document, ".nav-link") {
        if link.get_attribute("data-page").as_deref() == Some(active.as_str()) {
            dom::add_classes(&link, "active");
        }
    }
}

pub fn install(window: &Window, document: &Document, config: &PageConfig) -> Result<(), UiError> {
    for trigger in dom::select_all(document, "[data-bs-toggle=\"tooltip\"]") {
        if let Err(e) = bootstrap::create_tooltip(&trigger) {
            warn!("tooltip unavailable: {}", js_error_message(&e));
            break;
        }
    }
    sync_tooltips(document);
    mark_active_link(document);

    let delay = config.sidebar_reveal_delay_ms;
    for toggler in dom::select_all(document, ".sidebar .navbar-toggler") {
        let document = document.clone();
        let click_closure = Closure::wrap(Box::new(move |_e: Event| {
            let Some(sidebar) = dom::select_one(&document, SIDEBAR) else {
                return;
            };
            hide_labels(&document);
            let collapsed = !dom::has_class(&sidebar, COLLAPSED);
            dom::toggle_class(&sidebar, COLLAPSED, collapsed);
            sync_tooltips(&document);
            if !collapsed {
                reveal_labels_later(&document, delay);
            }
        }) as Box<dyn FnMut(Event)>);
        toggler.add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())?;
        click_closure.forget();
    }

    fit_to_viewport(window, document, config);

    let resize_window = window.clone();
    let resize_document = document.clone();
    let resize_config = config.clone();
    let resize_closure = Closure::wrap(Box::new(move |_e: Event| {
        fit_to_viewport(&resize_window, &resize_document, &resize_config);
    }) as Box<dyn FnMut(Event)>);
    window.add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref())?;
    resize_closure.forget();

    Ok(())
}
