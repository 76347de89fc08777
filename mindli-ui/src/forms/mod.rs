//! AJAX form submission and error reconciliation.
//!
//! Every bound form goes through the same cycle:
//!
//! 1. `begin` - mark the form busy, clear flash messages and its own
//!    invalid marks, build the request
//! 2. the transport sends the live fields
//! 3. `finish` - restore the form, then apply the resolved outcome
//!    (redirect, partial update, validation errors or failure)

pub mod annotations;
pub mod binding;
pub mod controller;

#[cfg(test)]
mod tests;

pub use annotations::{AnnotationBook, AnnotationChange, Placement};
pub use binding::bind_forms;
pub use controller::{FormController, SubmitPhase};
