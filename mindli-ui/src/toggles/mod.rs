//! Independent page behaviours with no shared state: each `install` binds
//! its own listeners and is a no-op when its elements are absent.

pub mod actions;
pub mod bootstrap;
pub mod change_gate;
pub mod image_preview;
pub mod password;
pub mod sections;
pub mod sidebar;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event};

use crate::config::PageConfig;
use crate::error::UiError;

pub fn install(document: &Document, config: &PageConfig) -> Result<(), UiError> {
    let window = document.default_view().ok_or(UiError::NoWindow)?;

    sidebar::install(&window, document, config)?;
    sections::install(&window, document)?;
    change_gate::install(document, config)?;
    password::install(document)?;
    image_preview::install(document)?;
    actions::install(document)?;

    if document.ready_state() == "complete" {
        actions::on_load(document);
    } else {
        let doc = document.clone();
        let load_closure = Closure::wrap(Box::new(move |_e: Event| {
            actions::on_load(&doc);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("load", load_closure.as_ref().unchecked_ref())?;
        load_closure.forget();
    }

    Ok(())
}
