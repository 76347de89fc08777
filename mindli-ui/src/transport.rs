//! Sending a submission and reading the server's answer.

use async_trait::async_trait;
use gloo_net::http::{Method as HttpMethod, RequestBuilder};
use shared_types::ServerResponse;
use wasm_bindgen::JsCast;
use web_sys::{Document, FormData, HtmlFormElement, UrlSearchParams};

use crate::error::js_error_message;
use crate::request::{Method, SubmissionRequest};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("failed to parse JSON: {0}")]
    Malformed(String),
    #[error("form `{0}` is no longer on the page")]
    MissingForm(String),
    #[error("could not build request body: {0}")]
    Body(String),
}

#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: &SubmissionRequest) -> Result<ServerResponse, TransportError>;
}

/// `fetch`-backed transport reading fields straight from the live form.
pub struct FetchTransport {
    document: Document,
}

impl FetchTransport {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn form_data(&self, request: &SubmissionRequest) -> Result<FormData, TransportError> {
        let form = self
            .document
            .get_element_by_id(request.form.as_str())
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
            .ok_or_else(|| TransportError::MissingForm(request.form.to_string()))?;

        let data =
            FormData::new_with_form(&form).map_err(|e| TransportError::Body(js_error_message(&e)))?;
        for (name, value) in request.extra_fields() {
            data.append_with_str(name, value)
                .map_err(|e| TransportError::Body(js_error_message(&e)))?;
        }
        Ok(data)
    }
}

fn http_method(method: Method) -> HttpMethod {
    match method {
        Method::Get => HttpMethod::GET,
        Method::Head => HttpMethod::HEAD,
        Method::Options => HttpMethod::OPTIONS,
        Method::Trace => HttpMethod::TRACE,
        Method::Post => HttpMethod::POST,
        Method::Put => HttpMethod::PUT,
        Method::Patch => HttpMethod::PATCH,
        Method::Delete => HttpMethod::DELETE,
    }
}

/// Append an encoded query string to `endpoint`.
pub fn with_query(endpoint: &str, query: &str) -> String {
    if query.is_empty() {
        return endpoint.to_string();
    }
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}{query}")
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: &SubmissionRequest) -> Result<ServerResponse, TransportError> {
        // Fields are captured before the first await so later edits don't leak in.
        let data = self.form_data(request)?;

        let built = if request.method.is_safe() {
            let params = UrlSearchParams::new_with_str_sequence_sequence(&data)
                .map_err(|e| TransportError::Body(js_error_message(&e)))?;
            let url = with_query(&request.endpoint, &String::from(params.to_string()));
            let mut builder = RequestBuilder::new(&url)
                .method(http_method(request.method))
                .header("X-Requested-With", "XMLHttpRequest");
            for (name, value) in request.headers() {
                builder = builder.header(name, value);
            }
            builder.build()
        } else {
            let mut builder = RequestBuilder::new(&request.endpoint)
                .method(http_method(request.method))
                .header("X-Requested-With", "XMLHttpRequest");
            for (name, value) in request.headers() {
                builder = builder.header(name, value);
            }
            builder.body(data)
        };
        let pending = built.map_err(|e| TransportError::Body(e.to_string()))?;

        let response = pending
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(TransportError::Status(response.status()));
        }

        response
            .json::<ServerResponse>()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))
    }
}
