use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, FileReader, HtmlImageElement, HtmlInputElement};

use dioxus_logger::tracing::warn;

use crate::error::UiError;

const UPLOAD_INPUT: &str = "profile_picture";
const PREVIEW_IMAGE: &str = "profile-picture-preview";

fn preview_selected_file(document: &Document, input: &HtmlInputElement) -> Result<(), UiError> {
    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return Ok(());
    };

    let reader = FileReader::new()?;
    let loaded = reader.clone();
    let doc = document.clone();
    let load_closure = Closure::wrap(Box::new(move |_e: Event| {
        let Some(src) = loaded.result().ok().and_then(|r| r.as_string()) else {
            return;
        };
        if let Some(img) = doc
            .get_element_by_id(PREVIEW_IMAGE)
            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
        {
            img.set_src(&src);
        }
    }) as Box<dyn FnMut(Event)>);
    reader.set_onload(Some(load_closure.as_ref().unchecked_ref()));
    load_closure.forget();

    reader.read_as_data_url(&file)?;
    Ok(())
}

pub fn install(document: &Document) -> Result<(), UiError> {
    let Some(input) = document
        .get_element_by_id(UPLOAD_INPUT)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    else {
        return Ok(());
    };

    let doc = document.clone();
    let changed = input.clone();
    let change_closure = Closure::wrap(Box::new(move |_e: Event| {
        if let Err(e) = preview_selected_file(&doc, &changed) {
            warn!("profile picture preview failed: {e}");
        }
    }) as Box<dyn FnMut(Event)>);
    input.add_event_listener_with_callback("change", change_closure.as_ref().unchecked_ref())?;
    change_closure.forget();

    Ok(())
}
