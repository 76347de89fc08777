//! Submission requests: what gets sent for one submit event.

use crate::config::{CsrfPlacement, PageConfig};
use crate::page::FormId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    Get,
    Head,
    Options,
    Trace,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Parse a form's `method` attribute. Absent or unknown means POST.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_uppercase()).as_deref() {
            Some("GET") => Method::Get,
            Some("HEAD") => Method::Head,
            Some("OPTIONS") => Method::Options,
            Some("TRACE") => Method::Trace,
            Some("PUT") => Method::Put,
            Some("PATCH") => Method::Patch,
            Some("DELETE") => Method::Delete,
            _ => Method::Post,
        }
    }

    /// Read-only methods never carry the anti-forgery token.
    pub fn is_safe(self) -> bool {
        matches!(
            self,
            Method::Get | Method::Head | Method::Options | Method::Trace
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// A submittable form, bound once at page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDescriptor {
    pub id: FormId,
    pub endpoint: String,
    pub method: Method,
}

/// The submit control that triggered a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Submitter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsrfAttachment {
    Header { name: String, token: String },
    Field { name: String, token: String },
}

/// Everything the transport needs besides the live form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub form: FormId,
    pub endpoint: String,
    pub method: Method,
    pub submitter: Option<Submitter>,
    pub csrf: Option<CsrfAttachment>,
    submitter_field: String,
}

impl SubmissionRequest {
    pub fn build(
        descriptor: &FormDescriptor,
        submitter: Option<Submitter>,
        csrf_token: Option<&str>,
        config: &PageConfig,
    ) -> Self {
        let csrf = csrf_token
            .filter(|_| !descriptor.method.is_safe())
            .map(|token| match config.csrf_placement {
                CsrfPlacement::Header => CsrfAttachment::Header {
                    name: config.csrf_header.clone(),
                    token: token.to_string(),
                },
                CsrfPlacement::Field => CsrfAttachment::Field {
                    name: config.csrf_field.clone(),
                    token: token.to_string(),
                },
            });

        Self {
            form: descriptor.id.clone(),
            endpoint: descriptor.endpoint.clone(),
            method: descriptor.method,
            submitter: submitter.filter(|s| !s.name.is_empty()),
            csrf,
            submitter_field: config.submitter_field.clone(),
        }
    }

    /// Fields appended after the form's own fields.
    ///
    /// The activated control travels twice: under the submitter field (the
    /// server dispatches on it) and as its own `name=value` pair, which is
    /// what a native submission would have sent.
    pub fn extra_fields(&self) -> Vec<(&str, &str)> {
        let mut fields = Vec::new();
        if let Some(submitter) = &self.submitter {
            fields.push((self.submitter_field.as_str(), submitter.name.as_str()));
            if submitter.name != self.submitter_field {
                fields.push((submitter.name.as_str(), submitter.value.as_str()));
            }
        }
        if let Some(CsrfAttachment::Field { name, token }) = &self.csrf {
            fields.push((name.as_str(), token.as_str()));
        }
        fields
    }

    pub fn headers(&self) -> Vec<(&str, &str)> {
        match &self.csrf {
            Some(CsrfAttachment::Header { name, token }) => vec![(name.as_str(), token.as_str())],
            _ => Vec::new(),
        }
    }
}
