use super::*;

mod alerts_timers;
mod dom_queries;
mod form_validation;

#[test]
fn ready_is_a_no_op_on_an_empty_page() -> Result<()> {
    let mut page = Page::from_html("<div class='container'></div>")?;
    wiring::ready(&mut page)?;
    assert_eq!(page.tooltip_count(), 0);
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn tooltips_are_activated_per_flagged_element() -> Result<()> {
    let mut page = Page::from_html(
        r#"
        <button data-bs-toggle="tooltip" title="uno">A</button>
        <span data-bs-toggle="tooltip" title="dos">B</span>
        <span title="sin tooltip">C</span>
        "#,
    )?;
    wiring::ready(&mut page)?;
    assert_eq!(page.tooltip_count(), 2);
    Ok(())
}

#[test]
fn utility_surface_is_reachable_without_wiring() -> Result<()> {
    let mut page = Page::from_html("<div class='container'><input type='email' id='e'></div>")?;

    assert_eq!(format_currency(1234.5), "$ 1.234,50");

    let field = page.query("#e")?;
    assert!(!validate_field(page.dom_mut(), field));

    page.show_alert("hola", "info")?;
    page.assert_exists(".alert.alert-info")?;
    Ok(())
}
