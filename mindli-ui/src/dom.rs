//! web-sys helpers and the browser [`Page`].

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, NodeList};

use crate::config::MarkupConfig;
use crate::page::{FieldKind, FormId, Page};

pub fn node_list_elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn select_all(document: &Document, selector: &str) -> Vec<Element> {
    document
        .query_selector_all(selector)
        .map(node_list_elements)
        .unwrap_or_default()
}

pub fn select_within(root: &Element, selector: &str) -> Vec<Element> {
    root.query_selector_all(selector)
        .map(node_list_elements)
        .unwrap_or_default()
}

pub fn select_one(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

pub fn set_visible(element: &Element, visible: bool) {
    if let Some(el) = element.dyn_ref::<HtmlElement>() {
        let style = el.style();
        if visible {
            let _ = style.remove_property("display");
        } else {
            let _ = style.set_property("display", "none");
        }
    }
}

/// Add each whitespace-separated class in `classes`.
pub fn add_classes(element: &Element, classes: &str) {
    let list = element.class_list();
    for class in classes.split_whitespace() {
        let _ = list.add_1(class);
    }
}

pub fn remove_classes(element: &Element, classes: &str) {
    let list = element.class_list();
    for class in classes.split_whitespace() {
        let _ = list.remove_1(class);
    }
}

pub fn toggle_class(element: &Element, class: &str, on: bool) {
    if on {
        add_classes(element, class);
    } else {
        remove_classes(element, class);
    }
}

pub fn has_class(element: &Element, class: &str) -> bool {
    element.class_list().contains(class)
}

pub fn is_submit_control(element: &Element) -> bool {
    let input_type = element
        .get_attribute("type")
        .map(|t| t.to_ascii_lowercase());
    match element.tag_name().to_ascii_lowercase().as_str() {
        // A button without a type submits.
        "button" => input_type.map_or(true, |t| t == "submit"),
        "input" => matches!(input_type.as_deref(), Some("submit" | "image")),
        _ => false,
    }
}

/// Submit controls owned by `form`, including ones outside it that point
/// at it through their `form` attribute.
pub fn submit_controls(form: &Element) -> Vec<Element> {
    let Some(form) = form.dyn_ref::<HtmlFormElement>() else {
        return Vec::new();
    };
    let elements = form.elements();
    (0..elements.length())
        .filter_map(|i| elements.item(i))
        .filter(is_submit_control)
        .collect()
}

/// Visible, user-editable fields of `form`.
pub fn visible_fields(form: &Element) -> Vec<Element> {
    select_within(form, "input:not([type=hidden]), textarea, select")
}

// ── Browser page ─────────────────────────────────────────────────────────────

pub struct DomPage {
    document: Document,
    markup: MarkupConfig,
}

impl DomPage {
    pub fn new(document: Document, markup: MarkupConfig) -> Self {
        Self { document, markup }
    }

    fn flash_container(&self) -> Option<Element> {
        self.document
            .get_element_by_id(&self.markup.flash_container_id)
    }
}

impl Page for DomPage {
    type Node = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn field_kind(&self, node: &Element) -> FieldKind {
        FieldKind::from_input_type(node.get_attribute("type").as_deref())
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).ok().flatten()
    }

    fn set_invalid(&self, node: &Element, form: &FormId, invalid: bool) {
        if invalid {
            add_classes(node, &self.markup.invalid_class);
            let _ = node.set_attribute("data-form-id", form.as_str());
        } else {
            remove_classes(node, &self.markup.invalid_class);
        }
    }

    fn create_annotation(&self, form: &FormId, field_key: &str, text: &str) -> Option<Element> {
        let annotation = self.document.create_element("div").ok()?;
        annotation.set_class_name(&self.markup.annotation_class);
        annotation.set_attribute("data-form-id", form.as_str()).ok()?;
        annotation.set_attribute("data-for", field_key).ok()?;

        let icon = self.document.create_element("i").ok()?;
        icon.set_class_name(&self.markup.annotation_icon_class);
        annotation.append_child(&icon).ok()?;
        annotation
            .append_child(&self.document.create_text_node(" "))
            .ok()?;

        let message = self.document.create_element("span").ok()?;
        message.set_text_content(Some(text));
        annotation.append_child(&message).ok()?;

        Some(annotation)
    }

    fn set_annotation_text(&self, node: &Element, text: &str) {
        match node.query_selector("span").ok().flatten() {
            Some(span) => span.set_text_content(Some(text)),
            None => node.set_text_content(Some(text)),
        }
    }

    fn insert_after(&self, anchor: &Element, node: &Element) {
        let _ = anchor.after_with_node_1(node);
    }

    fn append_child(&self, parent: &Element, node: &Element) {
        let _ = parent.append_child(node);
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn set_submitting(&self, form: &FormId, busy: bool) {
        // The form may be gone already, e.g. replaced by a partial update.
        let Some(form) = self.document.get_element_by_id(form.as_str()) else {
            return;
        };

        for control in submit_controls(&form) {
            let _ = control.toggle_attribute_with_force("disabled", busy);
            for label in select_within(&control, &self.markup.label_selector) {
                set_visible(&label, !busy);
            }
            for spinner in select_within(&control, &self.markup.spinner_selector) {
                set_visible(&spinner, busy);
            }
        }
    }

    fn clear_flash(&self) {
        for message in select_all(&self.document, &self.markup.flash_selector) {
            message.remove();
        }
        if let Some(container) = self.flash_container() {
            container.set_inner_html("");
        }
    }

    fn show_flash(&self, html: &str) {
        if let Some(container) = self.flash_container() {
            container.set_inner_html(html);
        }
    }

    fn replace_inner_html(&self, region: &str, html: &str) -> bool {
        match self.document.get_element_by_id(region) {
            Some(element) => {
                element.set_inner_html(html);
                true
            }
            None => false,
        }
    }

    fn navigate(&self, url: &str) {
        if let Some(window) = self.document.default_view() {
            if let Err(e) = window.location().set_href(url) {
                log::error!("navigation to {url} failed: {e:?}");
            }
        }
    }
}
