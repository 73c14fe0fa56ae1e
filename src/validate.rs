use std::sync::LazyLock;

use fancy_regex::Regex;

use crate::dom::{Dom, NodeId};

pub(crate) const MSG_EMAIL_INVALID: &str = "Por favor ingrese un email válido";
pub(crate) const MSG_PHONE_INVALID: &str = "Ingrese un teléfono válido (8-15 números)";
pub(crate) const MSG_PHONE_LETTERS: &str = "No se permiten letras en el teléfono";
pub(crate) const MSG_FIELD_REQUIRED: &str = "Este campo es requerido";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s\-+()]{8,15}$").expect("phone pattern compiles"));
static LETTERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z]").expect("letters pattern compiles"));

pub fn email_is_valid(value: &str) -> bool {
    EMAIL_RE.is_match(value).unwrap_or(false)
}

/// A phone is valid when the raw string sticks to digits, whitespace, and
/// `-+()`, is 8-15 characters, and carries 8-15 actual digits.
pub fn phone_is_valid(value: &str) -> bool {
    let digits = value.chars().filter(|ch| ch.is_ascii_digit()).count();
    PHONE_RE.is_match(value).unwrap_or(false) && (8..=15).contains(&digits)
}

pub(crate) fn contains_letters(value: &str) -> bool {
    LETTERS_RE.is_match(value).unwrap_or(false)
}

/// The validation rule a field falls under, decided by its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Telephone,
    RequiredText,
    Unconstrained,
}

impl FieldKind {
    pub fn classify(dom: &Dom, field: NodeId) -> Self {
        match dom.input_type(field).as_str() {
            "email" => Self::Email,
            "tel" => Self::Telephone,
            "text" if dom.required(field) => Self::RequiredText,
            _ => Self::Unconstrained,
        }
    }
}

/// Classifies `field`, applies its rule to the trimmed value, records the
/// outcome as the control's custom validity message (empty when valid), and
/// returns the verdict.
pub fn validate_field(dom: &mut Dom, field: NodeId) -> bool {
    let value = dom.value(field).trim().to_string();
    let (valid, message) = match FieldKind::classify(dom, field) {
        FieldKind::Email => (email_is_valid(&value), MSG_EMAIL_INVALID),
        FieldKind::Telephone => (phone_is_valid(&value), MSG_PHONE_INVALID),
        FieldKind::RequiredText => (!value.is_empty(), MSG_FIELD_REQUIRED),
        FieldKind::Unconstrained => (true, ""),
    };
    dom.set_custom_validity(field, if valid { "" } else { message });
    valid
}
