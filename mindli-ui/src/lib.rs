pub mod config;
pub mod dom;
pub mod error;
pub mod forms;
pub mod page;
pub mod payments;
pub mod request;
pub mod toggles;
pub mod transport;

use std::rc::Rc;

use dioxus_logger::tracing::{info, Level};
use web_sys::Document;

pub use config::PageConfig;
pub use error::UiError;
pub use forms::{FormController, SubmitPhase};
pub use page::{FormId, Page};
pub use transport::{FetchTransport, Transport, TransportError};

pub fn document() -> Result<Document, UiError> {
    web_sys::window()
        .ok_or(UiError::NoWindow)?
        .document()
        .ok_or(UiError::NoDocument)
}

/// Map the configured `log` level onto the `tracing` level dioxus-logger takes.
pub fn tracing_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::ERROR,
        log::Level::Warn => Level::WARN,
        log::Level::Info => Level::INFO,
        log::Level::Debug => Level::DEBUG,
        log::Level::Trace => Level::TRACE,
    }
}

/// Wire the whole page: forms, toggles and payments onboarding.
pub fn boot(document: &Document, config: PageConfig) -> Result<(), UiError> {
    let config = Rc::new(config);
    let csrf_token = config::read_csrf_token(document, &config.csrf_meta);

    let page = dom::DomPage::new(document.clone(), config.markup.clone());
    let transport = FetchTransport::new(document.clone());
    let controller = Rc::new(FormController::new(
        page,
        transport,
        config.clone(),
        csrf_token.clone(),
    ));

    let bound = forms::bind_forms(controller, document)?;
    info!("bound {bound} form(s)");

    toggles::install(document, &config)?;
    payments::install(document, &config, csrf_token)?;

    Ok(())
}
