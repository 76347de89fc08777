//! Connected-account onboarding for therapists.
//!
//! The onboarding widget itself is mounted by page script through
//! `window.mindliMountOnboarding(accountId)`; it asks this module for a
//! session secret via the exported `fetchClientSecret`.

use std::rc::Rc;

use gloo_net::http::{Request, RequestBuilder};
use serde::de::DeserializeOwned;
use shared_types::{AccountResponse, AccountSessionRequest, AccountSessionResponse};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event};

use dioxus_logger::tracing::{info, warn};

use crate::config::{read_csrf_token, PageConfig};
use crate::dom;
use crate::error::{js_error_message, UiError};

const HIDDEN: &str = "hidden";

#[wasm_bindgen(js_namespace = window)]
extern "C" {
    #[wasm_bindgen(js_name = mindliMountOnboarding, catch)]
    fn mount_onboarding(account: &str) -> Result<(), JsValue>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentsError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("failed to parse JSON: {0}")]
    Malformed(String),
    #[error("payments server error: {0}")]
    Server(String),
    #[error("response carried no account id")]
    MissingAccount,
    #[error("response carried no client secret")]
    MissingSecret,
}

fn server_error(error: Option<String>) -> Option<PaymentsError> {
    error
        .filter(|e| !e.is_empty())
        .map(PaymentsError::Server)
}

pub fn interpret_account_response(response: AccountResponse) -> Result<String, PaymentsError> {
    if let Some(e) = server_error(response.error) {
        return Err(e);
    }
    response
        .account
        .filter(|a| !a.is_empty())
        .ok_or(PaymentsError::MissingAccount)
}

pub fn interpret_session_response(
    response: AccountSessionResponse,
) -> Result<String, PaymentsError> {
    if let Some(e) = server_error(response.error) {
        return Err(e);
    }
    response
        .client_secret
        .filter(|s| !s.is_empty())
        .ok_or(PaymentsError::MissingSecret)
}

pub fn connected_account_message(account: &str) -> String {
    format!("Your connected account ID is: {account}")
}

struct Endpoints {
    config: Rc<PageConfig>,
    csrf_token: Option<String>,
}

impl Endpoints {
    /// Anti-forgery header, omitted when the page carries no token.
    fn csrf_header(&self) -> Option<(&str, &str)> {
        self.csrf_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(|token| (self.config.csrf_header.as_str(), token))
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        let builder = Request::post(endpoint);
        match self.csrf_header() {
            Some((name, token)) => builder.header(name, token),
            None => builder,
        }
    }

    async fn create_account(&self) -> Result<String, PaymentsError> {
        let response = self
            .post(&self.config.payments.account_endpoint)
            .send()
            .await
            .map_err(|e| PaymentsError::Network(e.to_string()))?;
        // The account endpoint reports failures in the body.
        interpret_account_response(read_json(response).await?)
    }

    async fn client_secret(&self, account: String) -> Result<String, PaymentsError> {
        let response = self
            .post(&self.config.payments.session_endpoint)
            .json(&AccountSessionRequest { account })
            .map_err(|e| PaymentsError::Malformed(e.to_string()))?
            .send()
            .await
            .map_err(|e| PaymentsError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(PaymentsError::Status(response.status()));
        }
        interpret_session_response(read_json(response).await?)
    }
}

async fn read_json<T: DeserializeOwned>(
    response: gloo_net::http::Response,
) -> Result<T, PaymentsError> {
    response
        .json()
        .await
        .map_err(|e| PaymentsError::Malformed(e.to_string()))
}

fn set_hidden(document: &Document, id: &str, hidden: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        dom::toggle_class(&el, HIDDEN, hidden);
    }
}

async fn sign_up(document: Document, endpoints: Rc<Endpoints>) {
    set_hidden(&document, "dev-callout", false);
    set_hidden(&document, "creating-connected-account", false);
    set_hidden(&document, "error", true);
    set_hidden(&document, "sign-up-button", true);

    let account = match endpoints.create_account().await {
        Ok(account) => account,
        Err(e) => {
            warn!("connected account creation failed: {e}");
            set_hidden(&document, "error", false);
            set_hidden(&document, "sign-up-button", false);
            set_hidden(&document, "creating-connected-account", true);
            set_hidden(&document, "dev-callout", true);
            return;
        }
    };
    info!("created connected account {account}");

    if let Some(el) = document.get_element_by_id("connected-account-id") {
        el.set_text_content(Some(&connected_account_message(&account)));
        dom::remove_classes(&el, HIDDEN);
    }
    for id in ["creating-connected-account", "title", "subtitle"] {
        set_hidden(&document, id, true);
    }

    if let Err(e) = mount_onboarding(&account) {
        warn!("onboarding embed unavailable: {}", js_error_message(&e));
    }
}

pub fn install(
    document: &Document,
    config: &Rc<PageConfig>,
    csrf_token: Option<String>,
) -> Result<(), UiError> {
    let Some(button) = document.get_element_by_id("sign-up-button") else {
        return Ok(());
    };

    let endpoints = Rc::new(Endpoints {
        config: config.clone(),
        csrf_token,
    });
    let doc = document.clone();
    let click_closure = Closure::wrap(Box::new(move |_e: Event| {
        wasm_bindgen_futures::spawn_local(sign_up(doc.clone(), endpoints.clone()));
    }) as Box<dyn FnMut(Event)>);
    button.add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())?;
    click_closure.forget();

    Ok(())
}

/// Session secret for the onboarding embed, or `undefined` on failure.
#[wasm_bindgen(js_name = fetchClientSecret)]
pub async fn fetch_client_secret(account: String) -> JsValue {
    let Ok(document) = crate::document() else {
        return JsValue::UNDEFINED;
    };
    let config = PageConfig::from_document(&document).unwrap_or_default();
    let csrf_token = read_csrf_token(&document, &config.csrf_meta);
    let endpoints = Endpoints {
        config: Rc::new(config),
        csrf_token,
    };

    match endpoints.client_secret(account).await {
        Ok(secret) => JsValue::from_str(&secret),
        Err(e) => {
            warn!("account session failed: {e}");
            set_hidden(&document, "error", false);
            JsValue::UNDEFINED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_response_yields_id() {
        let response = AccountResponse {
            account: Some("acct_1Nv0FGQ9RKHgCVdK".to_string()),
            error: None,
        };
        assert_eq!(
            interpret_account_response(response).as_deref(),
            Ok("acct_1Nv0FGQ9RKHgCVdK")
        );
    }

    #[test]
    fn server_error_wins_over_account() {
        let response = AccountResponse {
            account: Some("acct_1".to_string()),
            error: Some("An error occurred when calling the Stripe API".to_string()),
        };
        assert!(matches!(
            interpret_account_response(response),
            Err(PaymentsError::Server(_))
        ));
    }

    #[test]
    fn empty_account_is_missing() {
        let response = AccountResponse {
            account: Some(String::new()),
            error: Some(String::new()),
        };
        assert_eq!(
            interpret_account_response(response),
            Err(PaymentsError::MissingAccount)
        );
    }

    #[test]
    fn session_without_secret_is_an_error() {
        assert_eq!(
            interpret_session_response(AccountSessionResponse::default()),
            Err(PaymentsError::MissingSecret)
        );
        let ok = AccountSessionResponse {
            client_secret: Some("accs_secret".to_string()),
            error: None,
        };
        assert_eq!(interpret_session_response(ok).as_deref(), Ok("accs_secret"));
    }

    fn endpoints(token: Option<&str>) -> Endpoints {
        Endpoints {
            config: Rc::new(PageConfig::default()),
            csrf_token: token.map(ToString::to_string),
        }
    }

    #[test]
    fn csrf_header_is_omitted_without_a_token() {
        assert_eq!(endpoints(None).csrf_header(), None);
        assert_eq!(endpoints(Some("")).csrf_header(), None);
        assert_eq!(
            endpoints(Some("tok")).csrf_header(),
            Some(("X-CSRFToken", "tok"))
        );
    }

    #[test]
    fn account_message_is_plain_text() {
        assert_eq!(
            connected_account_message("acct_9"),
            "Your connected account ID is: acct_9"
        );
    }
}
