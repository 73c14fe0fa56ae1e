use super::*;

use crate::validate::{MSG_EMAIL_INVALID, MSG_PHONE_INVALID, MSG_PHONE_LETTERS};
use crate::wiring::{MSG_SELECT_PAYMENT, MSG_SELECT_PRODUCT};

const PURCHASE_HTML: &str = r#"
<div class="container">
    <form action="/comprar" method="post" novalidate>
        <input type="text" name="nombre" id="nombre" required>
        <input type="text" name="direccion" id="direccion" required>
        <input type="tel" name="telefono" id="telefono">
        <input type="email" name="email" id="email">
        <input type="radio" name="medio_pago" value="efectivo" id="pago-efectivo">
        <input type="radio" name="medio_pago" value="tarjeta" id="pago-tarjeta">
        <div class="card">
            <input type="checkbox" name="productos[]" value="1" id="p1">
            <span data-price="1500.00">Aceite 10W40</span>
        </div>
        <div class="card">
            <input type="checkbox" name="productos[]" value="2" id="p2">
            <span data-price="2300.50">Filtro de aire</span>
        </div>
        <span id="selected-count">0</span>
        <span id="total-amount">$0,00</span>
        <button type="submit" id="enviar">Comprar</button>
    </form>
</div>
"#;

fn purchase_page() -> Result<Page> {
    let mut page = Page::from_html(PURCHASE_HTML)?;
    wiring::ready(&mut page)?;
    Ok(page)
}

fn fill_valid_fields(page: &mut Page) -> Result<()> {
    page.type_text("#nombre", "Juan Pérez")?;
    page.type_text("#direccion", "Av. Siempreviva 742")?;
    page.type_text("#telefono", "011 4321-0987")?;
    page.type_text("#email", "juan@example.com")?;
    Ok(())
}

#[test]
fn built_in_failure_blocks_and_focuses_the_first_invalid_field() -> Result<()> {
    let mut page = purchase_page()?;
    page.click("#enviar")?;

    assert!(page.submission().is_none());
    assert!(page.navigation().is_none());
    assert!(page.has_class("form", "was-validated")?);

    let nombre = page.query("#nombre")?;
    assert_eq!(page.active_element(), Some(nombre));
    assert_eq!(page.scrolled_to(), Some((nombre, ScrollBlock::Center)));
    Ok(())
}

#[test]
fn missing_payment_method_raises_an_alert_and_cancels() -> Result<()> {
    let mut page = purchase_page()?;
    fill_valid_fields(&mut page)?;
    page.set_checked("#p1", true)?;

    page.click("#enviar")?;

    assert!(page.submission().is_none());
    page.assert_text(".alert-danger", MSG_SELECT_PAYMENT)?;
    // The submit control keeps its idle presentation.
    assert!(!page.is_disabled("#enviar")?);
    page.assert_text("#enviar", "Comprar")?;
    Ok(())
}

#[test]
fn a_custom_only_failure_does_not_mark_the_form_validated() -> Result<()> {
    let mut page = purchase_page()?;
    fill_valid_fields(&mut page)?;
    page.set_checked("#p1", true)?;

    // Built-in validity passes; only the payment-method check fails.
    page.click("#enviar")?;

    assert!(page.submission().is_none());
    assert!(!page.has_class("form", "was-validated")?);

    // So blur feedback stays off.
    page.focus("#email")?;
    page.blur("#email")?;
    assert!(!page.has_class("#email", "is-valid")?);
    assert!(!page.has_class("#email", "is-invalid")?);
    Ok(())
}

#[test]
fn every_failing_custom_check_fires_its_own_alert() -> Result<()> {
    let mut page = purchase_page()?;
    fill_valid_fields(&mut page)?;
    // Neither a payment method nor a product: two distinct banners.
    page.click("#enviar")?;

    let alerts = page.query_all(".alert-danger")?;
    assert_eq!(alerts.len(), 2);
    let texts = alerts
        .iter()
        .map(|alert| page.dom().text_content(*alert))
        .collect::<Vec<_>>();
    assert!(texts.iter().any(|text| text == MSG_SELECT_PAYMENT));
    assert!(texts.iter().any(|text| text == MSG_SELECT_PRODUCT));
    assert!(page.submission().is_none());
    Ok(())
}

#[test]
fn malformed_email_is_marked_invalid_by_the_custom_pass() -> Result<()> {
    let mut page = purchase_page()?;
    fill_valid_fields(&mut page)?;
    page.type_text("#email", "juan@example")?;
    page.set_checked("#p1", true)?;
    page.click("#pago-efectivo")?;

    page.click("#enviar")?;

    assert!(page.submission().is_none());
    assert!(page.has_class("#email", "is-invalid")?);
    assert_eq!(page.custom_validity("#email")?, MSG_EMAIL_INVALID);
    Ok(())
}

#[test]
fn short_phone_is_marked_invalid_by_the_custom_pass() -> Result<()> {
    let mut page = purchase_page()?;
    fill_valid_fields(&mut page)?;
    page.set_checked("#p1", true)?;
    page.click("#pago-efectivo")?;

    // Writing the value directly skips the keystroke handler, so the custom
    // submit-time check is what flags it.
    let phone = page.query("#telefono")?;
    page.dom_mut().set_value(phone, "1234");
    page.dom_mut().set_custom_validity(phone, "");

    page.click("#enviar")?;

    assert!(page.submission().is_none());
    assert!(page.has_class("#telefono", "is-invalid")?);
    assert_eq!(page.custom_validity("#telefono")?, MSG_PHONE_INVALID);
    Ok(())
}

#[test]
fn valid_purchase_submits_natively_and_locks_the_button() -> Result<()> {
    let mut page = purchase_page()?;
    fill_valid_fields(&mut page)?;
    page.set_checked("#p1", true)?;
    page.set_checked("#p2", true)?;
    page.click("#pago-efectivo")?;

    page.click("#enviar")?;

    let submission = page.submission().expect("native submission");
    assert_eq!(submission.action, "/comprar");
    assert!(submission
        .fields
        .contains(&("nombre".to_string(), "Juan Pérez".to_string())));
    assert!(submission
        .fields
        .contains(&("medio_pago".to_string(), "efectivo".to_string())));
    assert!(submission
        .fields
        .contains(&("productos[]".to_string(), "1".to_string())));
    assert!(submission
        .fields
        .contains(&("productos[]".to_string(), "2".to_string())));
    assert_eq!(page.navigation(), Some("/comprar"));

    // The submit control went into its loading presentation.
    assert!(page.is_disabled("#enviar")?);
    page.assert_text("#enviar", "Enviando...")?;
    page.assert_exists("#enviar .loading")?;
    assert_eq!(
        page.attr("#enviar", "data-original-text")?.as_deref(),
        Some("Comprar")
    );
    assert!(page.has_class("form", "was-validated")?);
    Ok(())
}

#[test]
fn radio_clicks_are_group_exclusive() -> Result<()> {
    let mut page = purchase_page()?;
    page.click("#pago-efectivo")?;
    page.assert_checked("#pago-efectivo", true)?;
    page.click("#pago-tarjeta")?;
    page.assert_checked("#pago-tarjeta", true)?;
    page.assert_checked("#pago-efectivo", false)?;
    Ok(())
}

#[test]
fn blur_feedback_only_starts_after_the_first_submit_attempt() -> Result<()> {
    let mut page = purchase_page()?;

    page.focus("#email")?;
    page.type_text("#email", "juan@example.com")?;
    page.blur("#email")?;
    assert!(!page.has_class("#email", "is-valid")?);
    assert!(!page.has_class("#email", "is-invalid")?);

    // A failed attempt flips the form into its validated state.
    page.click("#enviar")?;
    assert!(page.has_class("form", "was-validated")?);

    page.focus("#email")?;
    page.blur("#email")?;
    assert!(page.has_class("#email", "is-valid")?);

    page.type_text("#email", "juan@example")?;
    page.focus("#email")?;
    page.blur("#email")?;
    assert!(page.has_class("#email", "is-invalid")?);
    assert!(!page.has_class("#email", "is-valid")?);
    Ok(())
}

#[test]
fn phone_field_validates_on_every_keystroke() -> Result<()> {
    let mut page = purchase_page()?;

    page.type_text("#telefono", "abc12345")?;
    assert!(page.has_class("#telefono", "is-invalid")?);
    assert_eq!(page.custom_validity("#telefono")?, MSG_PHONE_LETTERS);

    page.type_text("#telefono", "011 4321-0987")?;
    assert!(page.has_class("#telefono", "is-valid")?);
    assert!(!page.has_class("#telefono", "is-invalid")?);
    assert_eq!(page.custom_validity("#telefono")?, "");

    // Emptying the field clears the visual state entirely.
    page.type_text("#telefono", "")?;
    assert!(!page.has_class("#telefono", "is-valid")?);
    assert!(!page.has_class("#telefono", "is-invalid")?);
    Ok(())
}

#[test]
fn phone_digit_count_failure_uses_the_generic_message() -> Result<()> {
    let mut page = purchase_page()?;
    page.type_text("#telefono", "12-34")?;
    assert!(page.has_class("#telefono", "is-invalid")?);
    assert_eq!(page.custom_validity("#telefono")?, MSG_PHONE_INVALID);
    Ok(())
}

#[test]
fn forms_without_the_novalidate_marker_are_left_alone() -> Result<()> {
    let mut page = Page::from_html(
        r#"
        <div class="container">
            <form action="/otro">
                <input type="text" name="q" id="q" value="bujías">
            </form>
        </div>
        "#,
    )?;
    wiring::ready(&mut page)?;
    page.submit("form")?;
    // No listener was wired, so submission proceeds natively.
    assert!(page.submission().is_some());
    assert!(!page.has_class("form", "was-validated")?);
    Ok(())
}
