//! Inline error annotations, tracked by (form, field) rather than found
//! again by selector. DOM nodes are a projection of this book.

use std::collections::BTreeMap;

use crate::config::PlacementConfig;
use crate::page::{FieldKind, FormId};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AnnotationKey {
    pub form: FormId,
    /// Effective field key, prefix included.
    pub field: String,
}

impl AnnotationKey {
    pub fn new(form: &FormId, field: &str) -> Self {
        Self {
            form: form.clone(),
            field: field.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<N> {
    scope: Option<String>,
    text: String,
    node: N,
}

/// One annotation an error response asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredAnnotation {
    /// Effective key: element id of the field and join key with the book.
    pub key: String,
    /// Field name as the server reported it.
    pub field: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationChange {
    Create {
        key: String,
        field: String,
        text: String,
    },
    Update {
        key: String,
        text: String,
    },
    Remove {
        key: String,
    },
}

/// Where a new annotation goes relative to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    AfterElement,
    /// After the enclosing option group (checkbox/radio).
    AfterGroup,
    /// Appended inside the field's own container.
    AppendInside,
}

pub fn placement_for(rules: &PlacementConfig, field: &str, kind: FieldKind) -> Placement {
    if rules.append_inside.iter().any(|f| f == field) {
        Placement::AppendInside
    } else if kind.is_choice() {
        Placement::AfterGroup
    } else {
        Placement::AfterElement
    }
}

/// `prefix + separator + field`, or the bare field without a prefix.
pub fn effective_key(prefix: Option<&str>, separator: &str, field: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}{separator}{field}"),
        _ => field.to_string(),
    }
}

#[derive(Debug)]
pub struct AnnotationBook<N> {
    entries: BTreeMap<AnnotationKey, Entry<N>>,
}

impl<N> Default for AnnotationBook<N> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<N: Clone> AnnotationBook<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff the annotations `form` shows under `scope` against `desired`.
    ///
    /// Entries under another scope of the same form are left alone, so one
    /// prefixed instance never touches a sibling instance's annotations.
    pub fn plan(
        &self,
        form: &FormId,
        scope: Option<&str>,
        desired: &[DesiredAnnotation],
    ) -> Vec<AnnotationChange> {
        let mut changes = Vec::new();

        for (key, entry) in self.entries.iter().filter(|(k, _)| &k.form == form) {
            if entry.scope.as_deref() != scope {
                continue;
            }
            if !desired.iter().any(|d| d.key == key.field) {
                changes.push(AnnotationChange::Remove {
                    key: key.field.clone(),
                });
            }
        }

        for wanted in desired {
            match self.entries.get(&AnnotationKey::new(form, &wanted.key)) {
                Some(entry) if entry.text == wanted.text => {}
                Some(_) => changes.push(AnnotationChange::Update {
                    key: wanted.key.clone(),
                    text: wanted.text.clone(),
                }),
                None => changes.push(AnnotationChange::Create {
                    key: wanted.key.clone(),
                    field: wanted.field.clone(),
                    text: wanted.text.clone(),
                }),
            }
        }

        changes
    }

    /// Record a rendered annotation, returning the node it replaced.
    pub fn insert(
        &mut self,
        form: &FormId,
        key: &str,
        scope: Option<&str>,
        text: &str,
        node: N,
    ) -> Option<N> {
        self.entries
            .insert(
                AnnotationKey::new(form, key),
                Entry {
                    scope: scope.map(ToString::to_string),
                    text: text.to_string(),
                    node,
                },
            )
            .map(|old| old.node)
    }

    /// Change the recorded text and adopt `scope`; returns the node to patch.
    pub fn set_text(
        &mut self,
        form: &FormId,
        key: &str,
        scope: Option<&str>,
        text: &str,
    ) -> Option<N> {
        let entry = self.entries.get_mut(&AnnotationKey::new(form, key))?;
        entry.text = text.to_string();
        entry.scope = scope.map(ToString::to_string);
        Some(entry.node.clone())
    }

    pub fn remove(&mut self, form: &FormId, key: &str) -> Option<N> {
        self.entries
            .remove(&AnnotationKey::new(form, key))
            .map(|entry| entry.node)
    }

    /// Forget every annotation of `form`, returning their nodes.
    pub fn drain_form(&mut self, form: &FormId) -> Vec<N> {
        let keys: Vec<AnnotationKey> = self
            .entries
            .keys()
            .filter(|k| &k.form == form)
            .cloned()
            .collect();
        keys.into_iter()
            .filter_map(|k| self.entries.remove(&k).map(|entry| entry.node))
            .collect()
    }

    pub fn text(&self, form: &FormId, key: &str) -> Option<&str> {
        self.entries
            .get(&AnnotationKey::new(form, key))
            .map(|entry| entry.text.as_str())
    }

    pub fn node(&self, form: &FormId, key: &str) -> Option<&N> {
        self.entries
            .get(&AnnotationKey::new(form, key))
            .map(|entry| &entry.node)
    }

    pub fn len_for(&self, form: &FormId) -> usize {
        self.entries.keys().filter(|k| &k.form == form).count()
    }
}
