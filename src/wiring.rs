//! The page's interaction layer: what the inline script of the storefront
//! page does, expressed as native handlers over the [`Page`] runtime.
//!
//! [`ready`] plays the role of the page-ready hook: it wires tooltips, form
//! validation, product selection, smooth scrolling, and loading states.
//! Everything afterwards is reactive to dispatched events and timer expiry.

use crate::Result;
use crate::dom::NodeId;
use crate::events::{EventState, Handler, TimerTask};
use crate::format::format_grouped;
use crate::page::{Page, ScrollBlock};
use crate::validate::{
    MSG_EMAIL_INVALID, MSG_PHONE_INVALID, MSG_PHONE_LETTERS, contains_letters, email_is_valid,
    phone_is_valid, validate_field,
};

pub(crate) const MSG_SELECT_PAYMENT: &str = "Por favor seleccione un medio de pago";
pub(crate) const MSG_SELECT_PRODUCT: &str = "Por favor seleccione al menos un producto";

const SUBMIT_LOADING_LABEL: &str = "Enviando...";
const LINK_LOADING_REVERT_MS: i64 = 2_000;
const ALERT_DISMISS_MS: i64 = 5_000;

const PRODUCT_BOX_SELECTOR: &str = r#"input[name="productos[]"]"#;
const CHECKED_PRODUCT_SELECTOR: &str = r#"input[name="productos[]"]:checked"#;
const ENABLED_PRODUCT_SELECTOR: &str = r#"input[name="productos[]"]:not(:disabled)"#;

/// Runs the five page initializers, the equivalent of the original
/// ready-event wiring. Absent page features are silently skipped.
pub fn ready(page: &mut Page) -> Result<()> {
    initialize_tooltips(page)?;
    initialize_form_validation(page)?;
    initialize_product_selection(page)?;
    initialize_smooth_scrolling(page)?;
    initialize_loading_states(page)?;
    Ok(())
}

pub fn initialize_tooltips(page: &mut Page) -> Result<()> {
    for node in page.query_all(r#"[data-bs-toggle="tooltip"]"#)? {
        page.tooltips.push(node);
    }
    Ok(())
}

pub fn initialize_form_validation(page: &mut Page) -> Result<()> {
    for form in page.query_all("form[novalidate]")? {
        page.listeners
            .add(form, "submit", Handler::FormSubmit { form });

        for field in scoped_all(page, form, "input, select, textarea")? {
            page.listeners
                .add(field, "blur", Handler::FieldBlur { form, field });
            if page.dom.attr(field, "name") == Some("telefono") {
                page.listeners
                    .add(field, "input", Handler::PhoneInput { field });
            }
        }
    }
    Ok(())
}

pub fn initialize_product_selection(page: &mut Page) -> Result<()> {
    let boxes = page.query_all(PRODUCT_BOX_SELECTOR)?;
    if boxes.is_empty() {
        return Ok(());
    }
    for checkbox in boxes {
        page.listeners.add(checkbox, "change", Handler::ProductChange);
    }
    if let Some(button) = page.dom.query_selector("#select-all-products")? {
        page.listeners.add(button, "click", Handler::SelectAllProducts);
    }
    if let Some(button) = page.dom.query_selector("#clear-all-products")? {
        page.listeners.add(button, "click", Handler::ClearAllProducts);
    }
    Ok(())
}

pub fn initialize_smooth_scrolling(page: &mut Page) -> Result<()> {
    for link in page.query_all(r##"a[href^="#"]"##)? {
        page.listeners.add(link, "click", Handler::AnchorClick { link });
    }
    Ok(())
}

pub fn initialize_loading_states(page: &mut Page) -> Result<()> {
    for link in page.query_all(".navbar-nav .nav-link")? {
        page.listeners
            .add(link, "click", Handler::NavLinkClick { link });
    }
    Ok(())
}

/// Product search box wiring. Present for pages that add `#product-search`;
/// not part of [`ready`].
pub fn initialize_search(page: &mut Page) -> Result<()> {
    if let Some(input) = page.dom.query_selector("#product-search")? {
        page.listeners.add(input, "input", Handler::SearchInput { input });
    }
    Ok(())
}

/// Price range filter wiring over `#min-price` / `#max-price`; not part of
/// [`ready`].
pub fn initialize_price_filter(page: &mut Page) -> Result<()> {
    let min = page.dom.query_selector("#min-price")?;
    let max = page.dom.query_selector("#max-price")?;
    if let (Some(min), Some(max)) = (min, max) {
        page.listeners.add(min, "input", Handler::PriceFilterInput);
        page.listeners.add(max, "input", Handler::PriceFilterInput);
    }
    Ok(())
}

pub(crate) fn run_handler(page: &mut Page, handler: Handler, event: &mut EventState) -> Result<()> {
    match handler {
        Handler::FormSubmit { form } => on_form_submit(page, form, event),
        Handler::FieldBlur { form, field } => on_field_blur(page, form, field),
        Handler::PhoneInput { field } => on_phone_input(page, field),
        Handler::ProductChange => recompute_product_selection(page),
        Handler::SelectAllProducts => on_select_all(page),
        Handler::ClearAllProducts => on_clear_all(page),
        Handler::AnchorClick { link } => on_anchor_click(page, link, event),
        Handler::NavLinkClick { link } => on_nav_link_click(page, link),
        Handler::AlertDismiss { alert } => {
            page.dom.remove_node(alert);
            Ok(())
        }
        Handler::SearchInput { input } => apply_search_filter(page, input),
        Handler::PriceFilterInput => apply_price_filter(page),
    }
}

pub(crate) fn run_timer_task(page: &mut Page, task: TimerTask) -> Result<()> {
    match task {
        TimerTask::RevertLinkLoading { link, stash } => {
            // The link may be gone by now; reverting nothing is fine.
            if !page.dom.is_attached(link) {
                return Ok(());
            }
            page.dom.set_text_content(link, "");
            for child in page.dom.children(stash).to_vec() {
                page.dom.append_child(link, child);
            }
            page.dom.style_set(link, "pointer-events", "");
            Ok(())
        }
        TimerTask::DismissAlert { alert } => {
            if page.dom.is_attached(alert) {
                page.dom.remove_node(alert);
            }
            Ok(())
        }
    }
}

// ---- form validation --------------------------------------------------

fn on_form_submit(page: &mut Page, form: NodeId, event: &mut EventState) -> Result<()> {
    if !page.dom.form_check_validity(form) {
        event.prevent_default();
        event.stop_propagation();
        if let Some(first) = page.dom.first_invalid_control(form) {
            page.focus_node(first)?;
            page.scrolled_to = Some((first, ScrollBlock::Center));
        }
    } else {
        // A custom-check failure bails out before the form is flagged as
        // validated, so blur feedback stays off until built-in validity
        // itself has failed or the purchase went through.
        if !check_custom_requirements(page, form)? {
            event.prevent_default();
            event.stop_propagation();
            return Ok(());
        }
        show_form_loading(page, form)?;
    }

    page.dom.add_class(form, "was-validated");
    Ok(())
}

/// The four page-specific requirements, all evaluated so every failing one
/// produces its own signal.
fn check_custom_requirements(page: &mut Page, form: NodeId) -> Result<bool> {
    let mut all_ok = true;

    let payment_radios = scoped_all(page, form, r#"input[name="medio_pago"]"#)?;
    let payment_selected = payment_radios.iter().any(|radio| page.dom.checked(*radio));
    if !payment_selected {
        show_alert(page, MSG_SELECT_PAYMENT, "error")?;
        all_ok = false;
    }

    let products = scoped_all(page, form, PRODUCT_BOX_SELECTOR)?;
    let product_selected = products.iter().any(|checkbox| page.dom.checked(*checkbox));
    if !products.is_empty() && !product_selected {
        show_alert(page, MSG_SELECT_PRODUCT, "error")?;
        all_ok = false;
    }

    if let Some(email) = scoped_all(page, form, r#"input[name="email"]"#)?.first().copied() {
        let value = page.dom.value(email);
        if !value.is_empty() {
            if !email_is_valid(&value) {
                page.dom.set_custom_validity(email, MSG_EMAIL_INVALID);
                page.dom.add_class(email, "is-invalid");
                all_ok = false;
            } else {
                page.dom.set_custom_validity(email, "");
                page.dom.remove_class(email, "is-invalid");
            }
        }
    }

    if let Some(phone) = scoped_all(page, form, r#"input[name="telefono"]"#)?.first().copied() {
        let value = page.dom.value(phone);
        if !value.is_empty() {
            if !phone_is_valid(&value) {
                page.dom.set_custom_validity(phone, MSG_PHONE_INVALID);
                page.dom.add_class(phone, "is-invalid");
                all_ok = false;
            } else {
                page.dom.set_custom_validity(phone, "");
                page.dom.remove_class(phone, "is-invalid");
            }
        }
    }

    Ok(all_ok)
}

fn on_field_blur(page: &mut Page, form: NodeId, field: NodeId) -> Result<()> {
    let field_ok = validate_field(&mut page.dom, field);
    if page.dom.has_class(form, "was-validated") {
        let ok = field_ok && page.dom.control_validity_ok(field);
        page.dom.toggle_class(field, "is-valid", ok);
        page.dom.toggle_class(field, "is-invalid", !ok);
    }
    Ok(())
}

fn on_phone_input(page: &mut Page, field: NodeId) -> Result<()> {
    let is_valid = validate_field(&mut page.dom, field);
    let value = page.dom.value(field);

    if !value.is_empty() {
        page.dom.toggle_class(field, "is-valid", is_valid);
        page.dom.toggle_class(field, "is-invalid", !is_valid);
        if !is_valid && contains_letters(&value) {
            page.dom.set_custom_validity(field, MSG_PHONE_LETTERS);
        }
    } else {
        page.dom.remove_class(field, "is-valid");
        page.dom.remove_class(field, "is-invalid");
    }
    Ok(())
}

// ---- product selection ------------------------------------------------

fn recompute_product_selection(page: &mut Page) -> Result<()> {
    update_product_selection(page)?;
    calculate_total(page)
}

fn update_product_selection(page: &mut Page) -> Result<()> {
    let selected = page.query_all(CHECKED_PRODUCT_SELECTOR)?.len();

    if let Some(counter) = page.dom.query_selector("#selected-count")? {
        page.dom.set_text_content(counter, &selected.to_string());
    }
    if let Some(button) = page.dom.query_selector(r#"button[type="submit"]"#)? {
        page.dom.set_disabled(button, selected == 0);
    }
    Ok(())
}

/// Recomputes the running total from scratch: the sum of `data-price` over
/// the enclosing card of every checked product box.
fn calculate_total(page: &mut Page) -> Result<()> {
    let mut total = 0.0f64;
    for checkbox in page.query_all(CHECKED_PRODUCT_SELECTOR)? {
        let Some(card) = page.dom.closest(checkbox, ".card")? else {
            continue;
        };
        let price = page
            .dom
            .descendant_elements(card)
            .into_iter()
            .find_map(|node| page.dom.attr(node, "data-price"))
            .and_then(|raw| raw.parse::<f64>().ok());
        if let Some(price) = price {
            total += price;
        }
    }

    if let Some(target) = page.dom.query_selector("#total-amount")? {
        page.dom
            .set_text_content(target, &format!("${}", format_grouped(total)));
    }
    Ok(())
}

fn on_select_all(page: &mut Page) -> Result<()> {
    for checkbox in page.query_all(ENABLED_PRODUCT_SELECTOR)? {
        page.dom.set_checked(checkbox, true);
    }
    recompute_product_selection(page)
}

fn on_clear_all(page: &mut Page) -> Result<()> {
    for checkbox in page.query_all(PRODUCT_BOX_SELECTOR)? {
        page.dom.set_checked(checkbox, false);
    }
    recompute_product_selection(page)
}

// ---- navigation and loading states ------------------------------------

fn on_anchor_click(page: &mut Page, link: NodeId, event: &mut EventState) -> Result<()> {
    let Some(href) = page.dom.attr(link, "href").map(ToOwned::to_owned) else {
        return Ok(());
    };
    // A bare "#" is not a resolvable selector; leave the default no-op.
    let Some(target) = page.dom.query_selector(&href).unwrap_or(None) else {
        return Ok(());
    };
    event.prevent_default();
    page.scrolled_to = Some((target, ScrollBlock::Start));
    Ok(())
}

fn on_nav_link_click(page: &mut Page, link: NodeId) -> Result<()> {
    let href = page.dom.attr(link, "href").unwrap_or("").to_string();
    if !href.contains('#') {
        show_link_loading(page, link)?;
    }
    Ok(())
}

fn show_form_loading(page: &mut Page, form: NodeId) -> Result<()> {
    let Some(button) = scoped_all(page, form, r#"button[type="submit"]"#)?.first().copied() else {
        return Ok(());
    };
    let original = page.dom.text_content(button);
    page.dom.set_attr(button, "data-original-text", &original);
    apply_loading_presentation(page, button, SUBMIT_LOADING_LABEL);
    page.dom.set_disabled(button, true);
    Ok(())
}

/// Puts a link into its busy presentation and schedules the self-revert.
/// The original child nodes are parked on a detached holder so the revert
/// can restore markup, not just text.
pub fn show_link_loading(page: &mut Page, link: NodeId) -> Result<()> {
    let original = page.dom.text_content(link);
    page.dom.set_attr(link, "data-original-text", &original);

    let stash = page.dom.create_detached_element("template");
    for child in page.dom.children(link).to_vec() {
        page.dom.append_child(stash, child);
    }

    apply_loading_presentation(page, link, &original);
    page.dom.style_set(link, "pointer-events", "none");
    page.set_timeout(
        TimerTask::RevertLinkLoading { link, stash },
        LINK_LOADING_REVERT_MS,
    );
    Ok(())
}

fn apply_loading_presentation(page: &mut Page, node: NodeId, label: &str) {
    page.dom.set_text_content(node, label);
    let spinner = page.dom.create_detached_element("span");
    page.dom.set_attr(spinner, "class", "loading me-2");
    page.dom.insert_first_child(node, spinner);
}

// ---- alerts ------------------------------------------------------------

pub(crate) fn show_alert(page: &mut Page, message: &str, level: &str) -> Result<NodeId> {
    let category = match level {
        "error" => "danger",
        "" => "info",
        other => other,
    };

    let container = match page.dom.query_selector(".container")? {
        Some(node) => node,
        None => match page.dom.query_selector("body")? {
            Some(node) => node,
            None => page.dom.root(),
        },
    };

    let alert = page.dom.create_detached_element("div");
    page.dom.set_attr(
        alert,
        "class",
        &format!("alert alert-{category} alert-dismissible fade show"),
    );
    page.dom.set_attr(alert, "role", "alert");
    page.dom.set_text_content(alert, message);

    let close = page.dom.create_detached_element("button");
    page.dom.set_attr(close, "type", "button");
    page.dom.set_attr(close, "class", "btn-close");
    page.dom.set_attr(close, "data-bs-dismiss", "alert");
    page.dom.append_child(alert, close);
    page.listeners.add(close, "click", Handler::AlertDismiss { alert });

    page.dom.insert_first_child(container, alert);
    page.set_timeout(TimerTask::DismissAlert { alert }, ALERT_DISMISS_MS);
    Ok(alert)
}

// ---- deferred filters ---------------------------------------------------

fn apply_search_filter(page: &mut Page, input: NodeId) -> Result<()> {
    let term = page.dom.value(input).to_lowercase();
    for card in page.query_all(".product-card, tr")? {
        let text = page.dom.text_content(card).to_lowercase();
        let show = text.contains(&term);
        page.dom
            .style_set(card, "display", if show { "" } else { "none" });
    }
    Ok(())
}

fn apply_price_filter(page: &mut Page) -> Result<()> {
    let min = page
        .dom
        .query_selector("#min-price")?
        .map(|node| page.dom.value(node))
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or(0.0);
    let max = page
        .dom
        .query_selector("#max-price")?
        .map(|node| page.dom.value(node))
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or(f64::INFINITY);

    for tagged in page.query_all("[data-price]")? {
        let price = page
            .dom
            .attr(tagged, "data-price")
            .and_then(|raw| raw.parse::<f64>().ok());
        // Unparseable prices never pass the range test.
        let show = price
            .map(|price| price >= min && price <= max)
            .unwrap_or(false);
        if let Some(row) = page.dom.closest(tagged, ".col-lg-4, tr")? {
            page.dom
                .style_set(row, "display", if show { "" } else { "none" });
        }
    }
    Ok(())
}

// ---- helpers ------------------------------------------------------------

fn scoped_all(page: &Page, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
    let mut out = Vec::new();
    for node in page.dom.descendant_elements(scope) {
        if page.dom.matches(node, selector)? {
            out.push(node);
        }
    }
    Ok(out)
}
