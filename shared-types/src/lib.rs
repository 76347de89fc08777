//! Shared types between the page controller and the server
//!
//! These types describe:
//! - The JSON body every AJAX form endpoint answers with
//! - The payments onboarding endpoints used by the Connect embed
//!
//! The server is free to send the loose legacy shape; the controller only
//! ever looks at the resolved [`FormOutcome`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Form Responses
// ============================================================================

/// Field key -> ordered messages. Index 0 is the primary message.
pub type FieldErrorMap = BTreeMap<String, Vec<String>>;

/// Raw body returned by a form endpoint.
///
/// Every field is optional on the wire. Auth views, for example, answer with
/// only `{"url": ...}` or only `{"errors": ...}`, so a missing `success` reads
/// as `false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerResponse {
    #[serde(default)]
    pub success: bool,

    /// Redirect target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Older views send the redirect target under this key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrorMap>,

    /// DOM id -> replacement markup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_targets: Option<BTreeMap<String, String>>,

    /// Single-region form of `update_targets`, paired with `updated_html`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flashed_message_html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flashed_message: Option<String>,
}

/// One region of the page whose inner markup gets replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionUpdate {
    pub target: String,
    pub html: String,
}

/// Primary message for one field, after the server's list was collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// What the page should do with a response. Resolved once, at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Leave the page. Nothing else in the response is looked at.
    Redirect { url: String },

    /// Stay on the page and patch the named regions.
    PartialUpdate {
        regions: Vec<RegionUpdate>,
        flash_html: Option<String>,
    },

    /// Stay on the page and annotate the invalid fields.
    ValidationErrors {
        prefix: Option<String>,
        fields: Vec<FieldError>,
    },

    /// `success: false` with nothing to show for it.
    Failure,
}

impl FormOutcome {
    pub fn is_redirect(&self) -> bool {
        matches!(self, FormOutcome::Redirect { .. })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ServerResponse {
    /// Redirect target, preferring `url` over the legacy `redirect` key.
    pub fn redirect_target(&self) -> Option<&str> {
        self.url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.redirect.as_deref().filter(|u| !u.is_empty()))
    }

    /// Resolve into a single outcome.
    ///
    /// Precedence: redirect, then success, then errors, then failure.
    pub fn into_outcome(self) -> FormOutcome {
        if let Some(url) = self.redirect_target() {
            return FormOutcome::Redirect {
                url: url.to_string(),
            };
        }

        if self.success {
            let mut regions: Vec<RegionUpdate> = self
                .update_targets
                .unwrap_or_default()
                .into_iter()
                .map(|(target, html)| RegionUpdate { target, html })
                .collect();

            if let (Some(target), Some(html)) = (non_empty(self.update_target), self.updated_html)
            {
                if !regions.iter().any(|r| r.target == target) {
                    regions.push(RegionUpdate { target, html });
                }
            }

            let flash_html =
                non_empty(self.flashed_message_html).or_else(|| non_empty(self.flashed_message));

            return FormOutcome::PartialUpdate {
                regions,
                flash_html,
            };
        }

        if let Some(errors) = self.errors {
            let fields = errors
                .into_iter()
                .filter_map(|(field, messages)| {
                    messages
                        .into_iter()
                        .next()
                        .map(|message| FieldError { field, message })
                })
                .collect();

            return FormOutcome::ValidationErrors {
                prefix: non_empty(self.form_prefix),
                fields,
            };
        }

        FormOutcome::Failure
    }
}

// ============================================================================
// Payments Onboarding
// ============================================================================

/// Answer from the connected-account endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountResponse {
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body sent to the account-session endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSessionRequest {
    pub account: String,
}

/// Answer from the account-session endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSessionResponse {
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
