use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use shared_types::{FieldError, FormOutcome, RegionUpdate, ServerResponse};

use crate::config::{FailureFallback, PageConfig};
use crate::forms::annotations::{
    effective_key, placement_for, AnnotationBook, AnnotationChange, DesiredAnnotation, Placement,
};
use crate::page::{FormId, Page};
use crate::request::{FormDescriptor, SubmissionRequest, Submitter};
use crate::transport::{Transport, TransportError};

/// Where one form is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    /// A request is in flight; further submits of this form are ignored.
    Submitting,
    /// The last response has been reconciled.
    Done,
}

#[derive(Debug)]
struct FormSlot<N> {
    descriptor: FormDescriptor,
    phase: SubmitPhase,
    submitter: Option<Submitter>,
    /// Fields currently showing the invalid state.
    invalid: Vec<N>,
}

/// Drives submit-and-reconcile for every bound form on a page.
///
/// All per-form state lives here, keyed by [`FormId`], so two forms with
/// requests in flight at once never see each other's controls or errors.
pub struct FormController<P: Page, T: Transport> {
    page: P,
    transport: T,
    config: Rc<PageConfig>,
    csrf_token: Option<String>,
    forms: RefCell<BTreeMap<FormId, FormSlot<P::Node>>>,
    annotations: RefCell<AnnotationBook<P::Node>>,
}

impl<P: Page, T: Transport> FormController<P, T> {
    pub fn new(page: P, transport: T, config: Rc<PageConfig>, csrf_token: Option<String>) -> Self {
        Self {
            page,
            transport,
            config,
            csrf_token,
            forms: RefCell::new(BTreeMap::new()),
            annotations: RefCell::new(AnnotationBook::new()),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Bind a form. Returns `false` for client-only forms and duplicates.
    pub fn register(&self, descriptor: FormDescriptor) -> bool {
        if self.config.is_client_only(descriptor.id.as_str()) {
            log::debug!("skipping client-only form {}", descriptor.id);
            return false;
        }

        let mut forms = self.forms.borrow_mut();
        if forms.contains_key(&descriptor.id) {
            return false;
        }
        forms.insert(
            descriptor.id.clone(),
            FormSlot {
                descriptor,
                phase: SubmitPhase::Idle,
                submitter: None,
                invalid: Vec::new(),
            },
        );
        true
    }

    /// Forget a form, e.g. when its markup was replaced.
    pub fn unregister(&self, form: &FormId) {
        self.forms.borrow_mut().remove(form);
        for node in self.annotations.borrow_mut().drain_form(form) {
            self.page.remove(&node);
        }
    }

    pub fn phase(&self, form: &FormId) -> Option<SubmitPhase> {
        self.forms.borrow().get(form).map(|slot| slot.phase)
    }

    pub fn annotation_text(&self, form: &FormId, key: &str) -> Option<String> {
        self.annotations
            .borrow()
            .text(form, key)
            .map(ToString::to_string)
    }

    pub fn annotation_count(&self, form: &FormId) -> usize {
        self.annotations.borrow().len_for(form)
    }

    /// Remember which submit control was activated ahead of the submit event.
    pub fn record_submitter(&self, form: &FormId, submitter: Submitter) {
        if let Some(slot) = self.forms.borrow_mut().get_mut(form) {
            slot.submitter = Some(submitter);
        }
    }

    /// Submit `form` and reconcile the page with the answer.
    pub async fn submit(&self, form: &FormId) {
        let Some(request) = self.begin(form) else {
            return;
        };

        log::debug!(
            "submitting {} to {} {} (submitter: {:?})",
            request.form,
            request.method.as_str(),
            request.endpoint,
            request.submitter.as_ref().map(|s| s.name.as_str())
        );

        let result = self.transport.send(&request).await;
        self.finish(form, result);
    }

    /// Pre-send side effects. `None` when the form is unknown or already
    /// has a request in flight.
    pub fn begin(&self, form: &FormId) -> Option<SubmissionRequest> {
        let (request, invalid) = {
            let mut forms = self.forms.borrow_mut();
            let Some(slot) = forms.get_mut(form) else {
                log::warn!("submit for unbound form {form}");
                return None;
            };

            if slot.phase == SubmitPhase::Submitting {
                log::debug!("ignoring submit for {form}: request already in flight");
                return None;
            }

            slot.phase = SubmitPhase::Submitting;
            let request = SubmissionRequest::build(
                &slot.descriptor,
                slot.submitter.take(),
                self.csrf_token.as_deref(),
                &self.config,
            );
            (request, std::mem::take(&mut slot.invalid))
        };

        self.page.set_submitting(form, true);
        self.page.clear_flash();
        for node in &invalid {
            self.page.set_invalid(node, form, false);
        }

        Some(request)
    }

    /// Post-response side effects, then reconciliation.
    ///
    /// The form is restored before anything else happens, including the
    /// navigation a transport failure triggers.
    pub fn finish(&self, form: &FormId, result: Result<ServerResponse, TransportError>) {
        self.restore(form);

        match result {
            Ok(response) => self.apply_outcome(form, response.into_outcome()),
            Err(err) => {
                dioxus_logger::tracing::warn!("submit of {} failed: {}", form, err);
                self.page.navigate(&self.config.error_view);
            }
        }
    }

    fn restore(&self, form: &FormId) {
        if let Some(slot) = self.forms.borrow_mut().get_mut(form) {
            slot.phase = SubmitPhase::Done;
        }
        self.page.set_submitting(form, false);
    }

    pub fn apply_outcome(&self, form: &FormId, outcome: FormOutcome) {
        match outcome {
            FormOutcome::Redirect { url } => self.page.navigate(&url),
            FormOutcome::PartialUpdate {
                regions,
                flash_html,
            } => self.apply_partial_update(form, &regions, flash_html.as_deref()),
            FormOutcome::ValidationErrors { prefix, fields } => {
                self.reconcile_errors(form, prefix.as_deref(), &fields)
            }
            FormOutcome::Failure => match self.config.failure_fallback {
                FailureFallback::Redirect => {
                    log::warn!("{form}: failure without errors, showing error view");
                    self.page.navigate(&self.config.error_view);
                }
                FailureFallback::Stay => {
                    log::warn!("{form}: failure without errors, staying on page");
                }
            },
        }
    }

    fn apply_partial_update(&self, form: &FormId, regions: &[RegionUpdate], flash: Option<&str>) {
        // Annotations go first: a replaced region may have held them.
        for node in self.annotations.borrow_mut().drain_form(form) {
            self.page.remove(&node);
        }

        for region in regions {
            if !self.page.replace_inner_html(&region.target, &region.html) {
                log::debug!("{form}: update target #{} not on page", region.target);
            }
        }

        if let Some(html) = flash {
            self.page.show_flash(html);
        }
    }

    fn reconcile_errors(&self, form: &FormId, prefix: Option<&str>, fields: &[FieldError]) {
        let desired: Vec<DesiredAnnotation> = fields
            .iter()
            .map(|error| DesiredAnnotation {
                key: effective_key(prefix, &self.config.prefix_separator, &error.field),
                field: error.field.clone(),
                text: error.message.clone(),
            })
            .collect();

        let mut marked = Vec::new();
        for wanted in &desired {
            if let Some(node) = self.page.element_by_id(&wanted.key) {
                self.page.set_invalid(&node, form, true);
                marked.push(node);
            }
        }
        if let Some(slot) = self.forms.borrow_mut().get_mut(form) {
            slot.invalid.extend(marked);
        }

        let changes = self.annotations.borrow().plan(form, prefix, &desired);
        let mut book = self.annotations.borrow_mut();

        for change in changes {
            match change {
                AnnotationChange::Create { key, field, text } => {
                    let Some(element) = self.page.element_by_id(&key) else {
                        log::debug!("{form}: no element #{key} to annotate");
                        continue;
                    };
                    let Some(node) = self.page.create_annotation(form, &key, &text) else {
                        continue;
                    };

                    let kind = self.page.field_kind(&element);
                    match placement_for(&self.config.placement, &field, kind) {
                        Placement::AfterElement => self.page.insert_after(&element, &node),
                        Placement::AfterGroup => {
                            let group = self
                                .page
                                .closest(&element, &self.config.placement.group_selector)
                                .unwrap_or(element);
                            self.page.insert_after(&group, &node);
                        }
                        Placement::AppendInside => self.page.append_child(&element, &node),
                    }

                    if let Some(previous) = book.insert(form, &key, prefix, &text, node) {
                        self.page.remove(&previous);
                    }
                }
                AnnotationChange::Update { key, text } => {
                    if let Some(node) = book.set_text(form, &key, prefix, &text) {
                        self.page.set_annotation_text(&node, &text);
                    }
                }
                AnnotationChange::Remove { key } => {
                    if let Some(node) = book.remove(form, &key) {
                        self.page.remove(&node);
                    }
                }
            }
        }
    }
}
