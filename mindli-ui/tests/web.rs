//! Browser tests for the web-sys page. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use mindli_ui::config::{MarkupConfig, PageConfig};
use mindli_ui::dom::DomPage;
use mindli_ui::forms::{bind_forms, FormController};
use mindli_ui::page::{FieldKind, FormId, Page};
use mindli_ui::toggles::bootstrap;
use mindli_ui::transport::FetchTransport;
use wasm_bindgen_test::*;
use web_sys::Document;

wasm_bindgen_test_configure!(run_in_browser);

fn fixture(html: &str) -> Document {
    let document = mindli_ui::document().unwrap();
    document.body().unwrap().set_inner_html(html);
    document
}

#[wasm_bindgen_test]
fn annotation_text_is_not_parsed_as_html() {
    let document = fixture(r#"<form id="login-form"><input id="email" type="email"></form>"#);
    let page = DomPage::new(document.clone(), MarkupConfig::default());
    let form = FormId::new("login-form");

    let field = page.element_by_id("email").unwrap();
    let node = page
        .create_annotation(&form, "email", "<b>Invalid</b> email")
        .unwrap();
    page.insert_after(&field, &node);

    let annotation = document
        .query_selector(".error-message[data-for=\"email\"]")
        .unwrap()
        .unwrap();
    assert_eq!(annotation.get_attribute("data-form-id").as_deref(), Some("login-form"));
    assert!(annotation.query_selector("b").unwrap().is_none());
    assert_eq!(
        annotation.query_selector("span").unwrap().unwrap().text_content().as_deref(),
        Some("<b>Invalid</b> email")
    );
}

#[wasm_bindgen_test]
fn invalid_mark_is_tagged_with_form() {
    let document = fixture(r#"<form id="register-form"><input id="password" type="password"></form>"#);
    let page = DomPage::new(document, MarkupConfig::default());
    let form = FormId::new("register-form");

    let field = page.element_by_id("password").unwrap();
    page.set_invalid(&field, &form, true);
    assert!(field.class_list().contains("input-error"));
    assert_eq!(field.get_attribute("data-form-id").as_deref(), Some("register-form"));

    page.set_invalid(&field, &form, false);
    assert!(!field.class_list().contains("input-error"));
}

#[wasm_bindgen_test]
fn checkbox_kind_and_group_lookup() {
    let document = fixture(
        r#"<form id="register-form"><div class="form-check"><input id="accept_terms" type="checkbox"></div></form>"#,
    );
    let page = DomPage::new(document, MarkupConfig::default());

    let field = page.element_by_id("accept_terms").unwrap();
    assert_eq!(page.field_kind(&field), FieldKind::Checkbox);
    let group = page.closest(&field, ".form-check").unwrap();
    assert_eq!(group.tag_name().to_lowercase(), "div");
}

#[wasm_bindgen_test]
fn busy_state_only_touches_its_own_form() {
    let document = fixture(
        r#"
        <form id="login-form"><button type="submit"><span class="btn-text">Log in</span><span class="spinner-border" style="display: none"></span></button></form>
        <form id="initiate-password-reset-form"><button type="submit"><span class="btn-text">Send</span></button></form>
        "#,
    );
    let page = DomPage::new(document.clone(), MarkupConfig::default());

    page.set_submitting(&FormId::new("login-form"), true);

    let login = document.query_selector("#login-form button").unwrap().unwrap();
    let reset = document
        .query_selector("#initiate-password-reset-form button")
        .unwrap()
        .unwrap();
    assert!(login.has_attribute("disabled"));
    assert!(!reset.has_attribute("disabled"));

    page.set_submitting(&FormId::new("login-form"), false);
    assert!(!login.has_attribute("disabled"));

    // A form that has left the page is ignored.
    page.set_submitting(&FormId::new("gone"), false);
}

#[wasm_bindgen_test]
fn partial_update_replaces_region_markup() {
    let document = fixture(r#"<div id="panel-a"><p>old</p></div>"#);
    let page = DomPage::new(document.clone(), MarkupConfig::default());

    assert!(page.replace_inner_html("panel-a", "<p>X</p>"));
    assert!(!page.replace_inner_html("panel-b", "<p>Y</p>"));
    assert_eq!(
        document.get_element_by_id("panel-a").unwrap().inner_html(),
        "<p>X</p>"
    );
}

#[wasm_bindgen_test]
fn flash_is_cleared_and_shown() {
    let document = fixture(
        r#"<div class="flashed-message">old</div><div id="flashed-messages-container"><div class="flashed-message">stale</div></div>"#,
    );
    let page = DomPage::new(document.clone(), MarkupConfig::default());

    page.clear_flash();
    assert!(document.query_selector(".flashed-message").unwrap().is_none());

    page.show_flash(r#"<div class="flashed-message">Saved</div>"#);
    assert_eq!(
        document
            .query_selector("#flashed-messages-container .flashed-message")
            .unwrap()
            .unwrap()
            .text_content()
            .as_deref(),
        Some("Saved")
    );
}

fn bound_controller(document: &Document) -> Rc<FormController<DomPage, FetchTransport>> {
    let controller = Rc::new(FormController::new(
        DomPage::new(document.clone(), MarkupConfig::default()),
        FetchTransport::new(document.clone()),
        Rc::new(PageConfig::default()),
        Some("csrf-token-value".to_string()),
    ));
    bind_forms(controller.clone(), document).unwrap();
    controller
}

#[wasm_bindgen_test]
fn control_named_action_does_not_shadow_the_endpoint() {
    let document = fixture(
        r#"<form id="update-appointment" action="/appointment/3" method="post">
             <select name="action" id="action"><option value="">-</option></select>
             <button type="submit">Save</button>
           </form>
           <form id="login-form" action="/login"><button type="submit">Log in</button></form>"#,
    );
    let controller = bound_controller(&document);

    let request = controller.begin(&FormId::new("update-appointment")).unwrap();
    assert_eq!(request.endpoint, "/appointment/3");
    // Binding carried on past the appointment form.
    assert!(controller.phase(&FormId::new("login-form")).is_some());
}

#[wasm_bindgen_test]
fn form_without_action_posts_to_the_page() {
    let document = fixture(r#"<form id="filter-clients"><button type="submit">Go</button></form>"#);
    let controller = bound_controller(&document);

    let request = controller.begin(&FormId::new("filter-clients")).unwrap();
    assert_eq!(request.endpoint, document.url().unwrap());
}

#[wasm_bindgen_test]
fn submitter_value_is_read_when_clicked() {
    let document = fixture(
        r#"<form id="filter-therapists" action="/therapists/filter">
             <button type="submit" name="filter" value="Filter">Filter</button>
             <button type="submit" name="reset_filters" value="Reset">Reset</button>
           </form>"#,
    );
    let controller = bound_controller(&document);

    let reset = document
        .query_selector("button[name=\"reset_filters\"]")
        .unwrap()
        .unwrap();
    reset.set_attribute("value", "Reset all").unwrap();
    reset
        .dispatch_event(&web_sys::Event::new("click").unwrap())
        .unwrap();

    let request = controller.begin(&FormId::new("filter-therapists")).unwrap();
    let submitter = request.submitter.unwrap();
    assert_eq!(submitter.name, "reset_filters");
    assert_eq!(submitter.value, "Reset all");
}

#[wasm_bindgen_test]
fn bootstrap_helpers_tolerate_a_missing_bundle() {
    let document = fixture(r#"<span id="tip" data-bs-toggle="tooltip"></span><div id="onboardingModal"></div>"#);
    let tip = document.get_element_by_id("tip").unwrap();
    let modal = document.get_element_by_id("onboardingModal").unwrap();

    assert!(bootstrap::existing_tooltip(&tip).is_none());
    assert!(bootstrap::show_modal(&modal).is_err());
}
