/// Renders `amount` with es-AR digit conventions: `.` thousands grouping,
/// `,` decimal separator, exactly two fraction digits. `3800.5` → `3.800,50`.
pub(crate) fn format_grouped(amount: f64) -> String {
    let rendered = format!("{:.2}", amount.abs());
    let (integer, fraction) = rendered
        .split_once('.')
        .unwrap_or((rendered.as_str(), "00"));

    let mut grouped = String::new();
    for (idx, ch) in integer.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let mut out = grouped.chars().rev().collect::<String>();
    if out.is_empty() {
        out.push('0');
    }
    out.push(',');
    out.push_str(fraction);

    if amount.is_sign_negative() && out != "0,00" {
        format!("-{out}")
    } else {
        out
    }
}

/// Argentine peso rendering, the shape `Intl.NumberFormat('es-AR', ARS)`
/// produces: `$ 1.234,56`, sign ahead of the symbol.
pub fn format_currency(amount: f64) -> String {
    let grouped = format_grouped(amount);
    if let Some(positive) = grouped.strip_prefix('-') {
        format!("-$ {positive}")
    } else {
        format!("$ {grouped}")
    }
}
