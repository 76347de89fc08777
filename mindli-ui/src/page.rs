//! The slice of the document the form controller reads and writes.
//!
//! The browser implementation lives in [`crate::dom::DomPage`]. Every
//! operation is infallible from the caller's side: a node that has already
//! left the document is simply not touched.

use std::fmt;

/// Stable key scoping submit state and annotations to one form on a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormId(String);

impl FormId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    Checkbox,
    Radio,
    #[default]
    Other,
}

impl FieldKind {
    pub fn from_input_type(input_type: Option<&str>) -> Self {
        match input_type.map(str::to_ascii_lowercase).as_deref() {
            Some("checkbox") => FieldKind::Checkbox,
            Some("radio") => FieldKind::Radio,
            _ => FieldKind::Other,
        }
    }

    pub fn is_choice(self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Radio)
    }
}

pub trait Page {
    type Node: Clone;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn field_kind(&self, node: &Self::Node) -> FieldKind;

    /// Nearest ancestor-or-self matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// Toggle the invalid visual state and tag the field with its owning form.
    fn set_invalid(&self, node: &Self::Node, form: &FormId, invalid: bool);

    /// Build a detached annotation node for `field_key` of `form`.
    fn create_annotation(&self, form: &FormId, field_key: &str, text: &str)
        -> Option<Self::Node>;

    fn set_annotation_text(&self, node: &Self::Node, text: &str);

    fn insert_after(&self, anchor: &Self::Node, node: &Self::Node);

    fn append_child(&self, parent: &Self::Node, node: &Self::Node);

    fn remove(&self, node: &Self::Node);

    /// Busy state of one form's submit controls: disabled, label hidden,
    /// spinner shown.
    fn set_submitting(&self, form: &FormId, busy: bool);

    fn clear_flash(&self);

    fn show_flash(&self, html: &str);

    /// Replace the inner markup of the element with id `region`. Returns
    /// `false` when no such element exists.
    fn replace_inner_html(&self, region: &str, html: &str) -> bool;

    fn navigate(&self, url: &str);
}
