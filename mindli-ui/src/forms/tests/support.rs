use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use shared_types::ServerResponse;

use crate::config::PageConfig;
use crate::forms::FormController;
use crate::page::{FieldKind, FormId, Page};
use crate::request::{FormDescriptor, Method, SubmissionRequest};
use crate::transport::{Transport, TransportError};

pub(crate) type Node = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Position {
    Detached,
    After(Node),
    Inside(Node),
}

#[derive(Debug, Clone)]
pub(crate) struct MemElement {
    pub dom_id: Option<String>,
    pub kind: FieldKind,
    pub classes: BTreeSet<String>,
    pub parent: Option<Node>,
    pub position: Position,
    pub text: String,
    pub removed: bool,
    pub annotation_of: Option<(FormId, String)>,
}

impl MemElement {
    fn new(dom_id: Option<&str>, kind: FieldKind) -> Self {
        Self {
            dom_id: dom_id.map(ToString::to_string),
            kind,
            classes: BTreeSet::new(),
            parent: None,
            position: Position::Detached,
            text: String::new(),
            removed: false,
            annotation_of: None,
        }
    }
}

/// In-memory page recording everything the controller does to it.
#[derive(Default)]
pub(crate) struct MemoryPage {
    elements: RefCell<Vec<MemElement>>,
    regions: RefCell<BTreeMap<String, String>>,
    busy: RefCell<BTreeMap<FormId, bool>>,
    flash: RefCell<Option<String>>,
    events: RefCell<Vec<String>>,
    created: RefCell<usize>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, element: MemElement) -> Node {
        let mut elements = self.elements.borrow_mut();
        elements.push(element);
        elements.len() - 1
    }

    pub fn add_field(&self, id: &str, kind: FieldKind) -> Node {
        self.push(MemElement::new(Some(id), kind))
    }

    /// Field nested in a container carrying `class`.
    pub fn add_grouped_field(&self, id: &str, kind: FieldKind, class: &str) -> (Node, Node) {
        let mut group = MemElement::new(None, FieldKind::Other);
        group.classes.insert(class.to_string());
        let group = self.push(group);

        let mut field = MemElement::new(Some(id), kind);
        field.parent = Some(group);
        (self.push(field), group)
    }

    pub fn add_region(&self, id: &str, html: &str) {
        self.regions
            .borrow_mut()
            .insert(id.to_string(), html.to_string());
    }

    pub fn region(&self, id: &str) -> Option<String> {
        self.regions.borrow().get(id).cloned()
    }

    pub fn element(&self, node: Node) -> MemElement {
        self.elements.borrow()[node].clone()
    }

    /// Live annotations of `form` as (key, text).
    pub fn annotations(&self, form: &str) -> Vec<(String, String)> {
        self.elements
            .borrow()
            .iter()
            .filter(|el| !el.removed)
            .filter_map(|el| el.annotation_of.as_ref().map(|a| (a, &el.text)))
            .filter(|((f, _), _)| f.as_str() == form)
            .map(|((_, key), text)| (key.clone(), text.clone()))
            .collect()
    }

    pub fn annotation_node(&self, form: &str, key: &str) -> Option<Node> {
        self.elements.borrow().iter().position(|el| {
            !el.removed
                && el
                    .annotation_of
                    .as_ref()
                    .map_or(false, |(f, k)| f.as_str() == form && k == key)
        })
    }

    pub fn created(&self) -> usize {
        *self.created.borrow()
    }

    pub fn is_invalid(&self, id: &str) -> bool {
        self.elements
            .borrow()
            .iter()
            .any(|el| el.dom_id.as_deref() == Some(id) && el.classes.contains("input-error"))
    }

    pub fn is_busy(&self, form: &str) -> bool {
        self.busy
            .borrow()
            .get(&FormId::new(form))
            .copied()
            .unwrap_or(false)
    }

    pub fn flash(&self) -> Option<String> {
        self.flash.borrow().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| e.strip_prefix("navigate:").map(ToString::to_string))
            .collect()
    }

    fn event(&self, event: String) {
        self.events.borrow_mut().push(event);
    }
}

impl Page for MemoryPage {
    type Node = Node;

    fn element_by_id(&self, id: &str) -> Option<Node> {
        self.elements
            .borrow()
            .iter()
            .position(|el| !el.removed && el.dom_id.as_deref() == Some(id))
    }

    fn field_kind(&self, node: &Node) -> FieldKind {
        self.elements.borrow()[*node].kind
    }

    fn closest(&self, node: &Node, selector: &str) -> Option<Node> {
        let class = selector.trim_start_matches('.');
        let elements = self.elements.borrow();
        let mut current = Some(*node);
        while let Some(idx) = current {
            if elements[idx].classes.contains(class) {
                return Some(idx);
            }
            current = elements[idx].parent;
        }
        None
    }

    fn set_invalid(&self, node: &Node, form: &FormId, invalid: bool) {
        let mut elements = self.elements.borrow_mut();
        if invalid {
            elements[*node].classes.insert("input-error".to_string());
        } else {
            elements[*node].classes.remove("input-error");
        }
        drop(elements);
        self.event(format!("invalid:{form}:{node}:{invalid}"));
    }

    fn create_annotation(&self, form: &FormId, field_key: &str, text: &str) -> Option<Node> {
        *self.created.borrow_mut() += 1;
        let mut element = MemElement::new(None, FieldKind::Other);
        element.text = text.to_string();
        element.annotation_of = Some((form.clone(), field_key.to_string()));
        Some(self.push(element))
    }

    fn set_annotation_text(&self, node: &Node, text: &str) {
        self.elements.borrow_mut()[*node].text = text.to_string();
    }

    fn insert_after(&self, anchor: &Node, node: &Node) {
        self.elements.borrow_mut()[*node].position = Position::After(*anchor);
    }

    fn append_child(&self, parent: &Node, node: &Node) {
        self.elements.borrow_mut()[*node].position = Position::Inside(*parent);
    }

    fn remove(&self, node: &Node) {
        self.elements.borrow_mut()[*node].removed = true;
    }

    fn set_submitting(&self, form: &FormId, busy: bool) {
        self.busy.borrow_mut().insert(form.clone(), busy);
        self.event(format!("busy:{form}:{busy}"));
    }

    fn clear_flash(&self) {
        *self.flash.borrow_mut() = None;
        self.event("clear_flash".to_string());
    }

    fn show_flash(&self, html: &str) {
        *self.flash.borrow_mut() = Some(html.to_string());
    }

    fn replace_inner_html(&self, region: &str, html: &str) -> bool {
        let mut regions = self.regions.borrow_mut();
        match regions.get_mut(region) {
            Some(existing) => {
                *existing = html.to_string();
                true
            }
            None => false,
        }
    }

    fn navigate(&self, url: &str) {
        self.event(format!("navigate:{url}"));
    }
}

enum Reply {
    Ready(Result<ServerResponse, TransportError>),
    Gated(oneshot::Receiver<Result<ServerResponse, TransportError>>),
}

/// Transport answering from a script, in order.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: RefCell<VecDeque<Reply>>,
    sent: RefCell<Vec<SubmissionRequest>>,
}

impl ScriptedTransport {
    pub fn reply(&self, response: ServerResponse) {
        self.replies
            .borrow_mut()
            .push_back(Reply::Ready(Ok(response)));
    }

    pub fn reply_json(&self, body: serde_json::Value) {
        self.reply(serde_json::from_value(body).unwrap());
    }

    pub fn fail(&self, error: TransportError) {
        self.replies.borrow_mut().push_back(Reply::Ready(Err(error)));
    }

    /// Next reply is held until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<Result<ServerResponse, TransportError>> {
        let (tx, rx) = oneshot::channel();
        self.replies.borrow_mut().push_back(Reply::Gated(rx));
        tx
    }

    pub fn sent(&self) -> Vec<SubmissionRequest> {
        self.sent.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &SubmissionRequest) -> Result<ServerResponse, TransportError> {
        self.sent.borrow_mut().push(request.clone());
        let reply = self.replies.borrow_mut().pop_front();
        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(TransportError::Network("gate dropped".to_string()))),
            None => Err(TransportError::Network("no scripted reply".to_string())),
        }
    }
}

pub(crate) type TestController = FormController<MemoryPage, ScriptedTransport>;

pub(crate) fn descriptor(id: &str) -> FormDescriptor {
    FormDescriptor {
        id: FormId::new(id),
        endpoint: format!("/{id}"),
        method: Method::Post,
    }
}

pub(crate) fn controller_with(config: PageConfig, forms: &[&str]) -> Rc<TestController> {
    let controller = Rc::new(FormController::new(
        MemoryPage::new(),
        ScriptedTransport::default(),
        Rc::new(config),
        Some("csrf-token-value".to_string()),
    ));
    for form in forms {
        assert!(controller.register(descriptor(form)));
    }
    controller
}

pub(crate) fn controller(forms: &[&str]) -> Rc<TestController> {
    controller_with(PageConfig::default(), forms)
}

pub(crate) fn form(id: &str) -> FormId {
    FormId::new(id)
}
