//! Deterministic headless runtime for a small storefront page.
//!
//! The crate models the page's live DOM as an explicit arena, drives it with
//! synthesized user events and a virtual clock, and wires the page's
//! interaction layer (purchase-form validation, product selection with a
//! running total, smooth scrolling, transient loading/alert UI) as native
//! handlers on that runtime. Everything is observable and repeatable from
//! plain `cargo test`.
//!
//! ```
//! use storefront_page::{wiring, Page};
//!
//! # fn main() -> storefront_page::Result<()> {
//! let mut page = Page::from_html(
//!     r#"
//!     <form action='/comprar' novalidate>
//!       <div class='card'>
//!         <input type='checkbox' name='productos[]' value='1'>
//!         <span data-price='1500.00'></span>
//!       </div>
//!       <span id='total-amount'></span>
//!       <button type='submit'>Comprar</button>
//!     </form>
//!     "#,
//! )?;
//! wiring::ready(&mut page)?;
//! page.set_checked("input[name=\"productos[]\"]", true)?;
//! page.assert_text("#total-amount", "$1.500,00")?;
//! # Ok(())
//! # }
//! ```

use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    UnsupportedSelector(String),
    SelectorNotFound(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
    PageRuntime(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
            Self::PageRuntime(msg) => write!(f, "page runtime error: {msg}"),
        }
    }
}

impl StdError for Error {}

mod dom;
mod events;
mod format;
mod html;
mod page;
mod selector;
mod validate;
pub mod wiring;

pub use dom::{Dom, NodeId};
pub use events::PendingTimer;
pub use format::format_currency;
pub use page::{FormSubmission, Page, ScrollBlock};
pub use validate::{FieldKind, email_is_valid, phone_is_valid, validate_field};

#[cfg(test)]
mod tests;
