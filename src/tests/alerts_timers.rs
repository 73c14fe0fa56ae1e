use super::*;

use crate::Error;

#[test]
fn error_alerts_render_as_danger_banners() -> Result<()> {
    let mut page = Page::from_html("<div class='container'><p>contenido</p></div>")?;
    page.show_alert("algo falló", "error")?;

    page.assert_exists(".alert.alert-danger.alert-dismissible.fade.show")?;
    page.assert_text(".alert-danger", "algo falló")?;
    assert_eq!(page.attr(".alert-danger", "role")?.as_deref(), Some("alert"));
    Ok(())
}

#[test]
fn other_levels_pass_through_and_empty_defaults_to_info() -> Result<()> {
    let mut page = Page::from_html("<div class='container'></div>")?;
    page.show_alert("ojo", "warning")?;
    page.show_alert("hola", "")?;
    page.assert_exists(".alert-warning")?;
    page.assert_exists(".alert-info")?;
    Ok(())
}

#[test]
fn alerts_are_prepended_to_the_container() -> Result<()> {
    let mut page = Page::from_html("<div class='container'><p id='primero'>hola</p></div>")?;
    let alert = page.show_alert("aviso", "info")?;

    let container = page.query(".container")?;
    assert_eq!(page.dom().children(container).first(), Some(&alert));
    Ok(())
}

#[test]
fn alerts_fall_back_to_the_body_without_a_container() -> Result<()> {
    let mut page = Page::from_html("<body><p>suelto</p></body>")?;
    let alert = page.show_alert("aviso", "info")?;
    let body = page.query("body")?;
    assert_eq!(page.dom().children(body).first(), Some(&alert));
    Ok(())
}

#[test]
fn alerts_auto_dismiss_at_exactly_five_seconds() -> Result<()> {
    let mut page = Page::from_html("<div class='container'></div>")?;
    page.show_alert("fugaz", "info")?;

    page.advance_time(4_999)?;
    page.assert_exists(".alert-info")?;

    page.advance_time(1)?;
    assert!(!page.exists(".alert-info")?);
    assert_eq!(page.now_ms(), 5_000);
    Ok(())
}

#[test]
fn the_close_button_dismisses_immediately() -> Result<()> {
    let mut page = Page::from_html("<div class='container'></div>")?;
    page.show_alert("cerrame", "info")?;

    page.assert_exists(".alert .btn-close[data-bs-dismiss=\"alert\"]")?;
    page.click(".alert .btn-close")?;
    assert!(!page.exists(".alert")?);

    // The expiry timer still fires later and finds nothing to remove.
    page.advance_time(5_000)?;
    Ok(())
}

#[test]
fn each_alert_gets_its_own_expiry() -> Result<()> {
    let mut page = Page::from_html("<div class='container'></div>")?;
    page.show_alert("primero", "info")?;
    page.advance_time(3_000)?;
    page.show_alert("segundo", "info")?;

    page.advance_time(2_000)?;
    assert_eq!(page.query_all(".alert")?.len(), 1);
    page.assert_text(".alert", "segundo")?;

    page.advance_time(3_000)?;
    assert!(page.query_all(".alert")?.is_empty());
    Ok(())
}

#[test]
fn flush_runs_every_queued_timer_and_advances_the_clock() -> Result<()> {
    let mut page = Page::from_html("<div class='container'></div>")?;
    page.show_alert("uno", "info")?;
    page.show_alert("dos", "info")?;

    let ran = page.flush()?;
    assert_eq!(ran, 2);
    assert!(page.query_all(".alert")?.is_empty());
    assert_eq!(page.now_ms(), 5_000);
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn time_only_moves_forward() -> Result<()> {
    let mut page = Page::from_html("<div></div>")?;
    assert!(matches!(page.advance_time(-1), Err(Error::PageRuntime(_))));

    page.advance_time(100)?;
    assert!(matches!(page.advance_time_to(99), Err(Error::PageRuntime(_))));
    page.advance_time_to(100)?;
    assert_eq!(page.now_ms(), 100);
    Ok(())
}

#[test]
fn timers_expire_in_due_order_then_scheduling_order() -> Result<()> {
    let mut page = Page::from_html("<div class='container'></div>")?;
    let first = page.show_alert("uno", "info")?;
    let second = page.show_alert("dos", "info")?;

    let timers = page.pending_timers();
    assert_eq!(timers.len(), 2);
    assert_eq!(timers[0].due_at, timers[1].due_at);
    assert!(timers[0].order < timers[1].order);
    assert!(timers[0].id < timers[1].id);

    // Both due at the same instant: the earlier-scheduled one runs first,
    // removing the earlier alert while the later one is still attached.
    page.advance_time(5_000)?;
    assert!(!page.dom().is_attached(first));
    assert!(!page.dom().is_attached(second));
    Ok(())
}

#[test]
fn trace_captures_timer_activity() -> Result<()> {
    let mut page = Page::from_html("<div class='container'></div>")?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.show_alert("rastro", "info")?;
    page.advance_time(5_000)?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().any(|line| line.contains("[timer] schedule")));
    assert!(logs.iter().any(|line| line.contains("[timer] run")));
    Ok(())
}

#[test]
fn the_trace_log_keeps_only_the_newest_entries() -> Result<()> {
    let mut page = Page::from_html("<div class='container'></div>")?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    assert!(matches!(
        page.set_trace_log_limit(0),
        Err(Error::PageRuntime(_))
    ));
    page.set_trace_log_limit(1)?;

    page.show_alert("uno", "info")?;
    page.advance_time(5_000)?;

    let logs = page.take_trace_logs();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].contains("[timer] run"));
    Ok(())
}
