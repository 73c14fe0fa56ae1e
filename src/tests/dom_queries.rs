use super::*;

use crate::Error;

#[test]
fn id_class_tag_and_attr_queries_work() -> Result<()> {
    let page = Page::from_html(
        r##"
        <div id="box" class="card shadow">
            <input type="checkbox" name="productos[]" value="1" checked>
            <input type="checkbox" name="productos[]" value="2" disabled>
            <a href="#detalle">ver</a>
        </div>
        "##,
    )?;

    page.assert_exists("#box")?;
    page.assert_exists(".card")?;
    page.assert_exists("div.card.shadow")?;
    page.assert_exists("input[name=\"productos[]\"]")?;
    page.assert_exists("a[href^=\"#\"]")?;
    assert_eq!(page.query_all("input[name=\"productos[]\"]")?.len(), 2);
    assert_eq!(page.query_all("input[name=\"productos[]\"]:checked")?.len(), 1);
    assert_eq!(
        page.query_all("input[name=\"productos[]\"]:not(:disabled)")?.len(),
        1
    );
    assert!(!page.exists("#missing")?);
    Ok(())
}

#[test]
fn comma_groups_match_in_document_order() -> Result<()> {
    let page = Page::from_html(
        r#"
        <table><tr id="row1"><td>uno</td></tr></table>
        <div class="product-card" id="card1">dos</div>
        <table><tr id="row2"><td>tres</td></tr></table>
        "#,
    )?;
    let hits = page.query_all(".product-card, tr")?;
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0], page.query("#row1")?);
    assert_eq!(hits[1], page.query("#card1")?);
    assert_eq!(hits[2], page.query("#row2")?);
    Ok(())
}

#[test]
fn descendant_and_child_combinators_work() -> Result<()> {
    let page = Page::from_html(
        r#"
        <nav class="navbar-nav">
            <div><a class="nav-link" id="deep">A</a></div>
            <a class="nav-link" id="shallow">B</a>
        </nav>
        <a class="nav-link" id="outside">C</a>
        "#,
    )?;
    assert_eq!(page.query_all(".navbar-nav .nav-link")?.len(), 2);
    let direct = page.query_all(".navbar-nav > .nav-link")?;
    assert_eq!(direct, vec![page.query("#shallow")?]);
    Ok(())
}

#[test]
fn closest_walks_up_and_can_match_self() -> Result<()> {
    let page = Page::from_html(
        r#"
        <div class="col-lg-4"><div class="card"><span id="price" data-price="9.99"></span></div></div>
        "#,
    )?;
    let price = page.query("#price")?;
    assert_eq!(page.dom().closest(price, ".card")?, Some(page.query(".card")?));
    assert_eq!(
        page.dom().closest(price, ".col-lg-4, tr")?,
        Some(page.query(".col-lg-4")?)
    );
    assert_eq!(page.dom().closest(price, "#price")?, Some(price));
    assert_eq!(page.dom().closest(price, "table")?, None);
    Ok(())
}

#[test]
fn invalid_pseudo_class_tracks_constraint_state() -> Result<()> {
    let mut page = Page::from_html(
        r#"
        <form novalidate>
            <input type="text" name="nombre" id="nombre" required>
            <input type="text" name="apodo" id="apodo">
        </form>
        "#,
    )?;
    assert_eq!(page.query_all(":invalid")?, vec![page.query("#nombre")?]);

    page.type_text("#nombre", "Ana")?;
    assert!(page.query_all(":invalid")?.is_empty());

    let apodo = page.query("#apodo")?;
    page.dom_mut().set_custom_validity(apodo, "no");
    assert_eq!(page.query_all(":invalid")?, vec![apodo]);
    Ok(())
}

#[test]
fn unsupported_selectors_are_rejected() -> Result<()> {
    let page = Page::from_html("<div></div>")?;
    assert!(matches!(
        page.query_all("div:nth-child(2)"),
        Err(Error::UnsupportedSelector(_))
    ));
    assert!(matches!(
        page.query_all("div + p"),
        Err(Error::UnsupportedSelector(_))
    ));
    assert!(matches!(page.query_all(""), Err(Error::UnsupportedSelector(_))));
    Ok(())
}

#[test]
fn text_content_concatenates_descendants() -> Result<()> {
    let mut page = Page::from_html("<p id='p'>Total: <b>$<span>100</span></b></p>")?;
    assert_eq!(page.text("#p")?, "Total: $100");

    let p = page.query("#p")?;
    page.dom_mut().set_text_content(p, "vacío");
    assert_eq!(page.text("#p")?, "vacío");
    assert!(page.query_all("#p b")?.is_empty());
    Ok(())
}

#[test]
fn character_references_and_void_tags_parse() -> Result<()> {
    let page = Page::from_html(
        r#"
        <p id="msg">caf&eacute;s &amp; t&#233;</p>
        <input name="a"><br><input name="b">
        "#,
    )?;
    // Unknown named entities pass through untouched.
    assert_eq!(page.text("#msg")?, "caf&eacute;s & té");
    assert_eq!(page.query_all("input")?.len(), 2);
    Ok(())
}

#[test]
fn unquoted_and_boolean_attributes_parse() -> Result<()> {
    let page = Page::from_html("<input type=tel name=telefono required disabled>")?;
    let input = page.query("input[type=tel]")?;
    assert_eq!(page.dom().attr(input, "name"), Some("telefono"));
    assert!(page.dom().required(input));
    assert!(page.dom().disabled(input));
    Ok(())
}

#[test]
fn style_properties_round_trip_through_the_style_attribute() -> Result<()> {
    let mut page = Page::from_html("<a id='lnk' style='color: red'>x</a>")?;
    let link = page.query("#lnk")?;

    page.dom_mut().style_set(link, "pointer-events", "none");
    assert_eq!(
        page.dom().style_get(link, "pointer-events").as_deref(),
        Some("none")
    );
    assert_eq!(page.dom().style_get(link, "color").as_deref(), Some("red"));

    page.dom_mut().style_set(link, "display", "none");
    assert!(page.dom().is_display_hidden(link));
    page.dom_mut().style_set(link, "display", "");
    assert!(!page.dom().is_display_hidden(link));

    page.dom_mut().style_set(link, "pointer-events", "");
    assert_eq!(page.dom().style_get(link, "pointer-events"), None);
    Ok(())
}

#[test]
fn assert_text_failure_carries_a_dom_snippet() -> Result<()> {
    let page = Page::from_html("<p id='p' class='lead'>hola</p>")?;
    let err = page.assert_text("#p", "chau").unwrap_err();
    match err {
        Error::AssertionFailed {
            selector,
            expected,
            actual,
            dom_snippet,
        } => {
            assert_eq!(selector, "#p");
            assert_eq!(expected, "chau");
            assert_eq!(actual, "hola");
            assert!(dom_snippet.contains("<p"));
            assert!(dom_snippet.contains("lead"));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn submission_pairs_follow_control_state() -> Result<()> {
    let mut page = Page::from_html(
        r#"
        <form id="f" action="/go" novalidate>
            <input type="text" name="nombre" value="Ana">
            <input type="checkbox" name="productos[]" value="7">
            <input type="checkbox" name="productos[]" value="8" checked>
            <input type="radio" name="medio_pago" value="efectivo" checked>
            <input type="text" name="oculto" value="x" disabled>
            <input type="text" value="anon">
        </form>
        "#,
    )?;
    page.submit("#f")?;
    let submission = page.submission().expect("submission recorded");
    assert_eq!(submission.action, "/go");
    assert_eq!(
        submission.fields,
        vec![
            ("nombre".to_string(), "Ana".to_string()),
            ("productos[]".to_string(), "8".to_string()),
            ("medio_pago".to_string(), "efectivo".to_string()),
        ]
    );
    assert_eq!(page.navigation(), Some("/go"));
    Ok(())
}
