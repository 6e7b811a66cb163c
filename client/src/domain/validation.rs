//! Local form validation shared by the auth and order forms.
//!
//! These checks run before any network call; a failing form never reaches
//! the HTTP client.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::slug::is_valid_slug;

/// Field-level validation failure shown inline on a form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormValidationError {
    /// A required field was blank once trimmed.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    /// The email address is not syntactically valid.
    #[error("'{value}' is not a valid email address")]
    InvalidEmail { value: String },
    /// The phone number has unexpected characters or length.
    #[error("'{value}' is not a valid phone number")]
    InvalidPhone { value: String },
    /// A quantity was zero.
    #[error("{field} must be at least 1")]
    ZeroQuantity { field: &'static str },
    /// A quantity so large its total price cannot be represented.
    #[error("{field} is too large to price")]
    QuantityTooLarge { field: &'static str },
    /// A password was shorter than the backend accepts.
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    /// A slug contained characters outside `[a-z0-9-]`.
    #[error("{field} must be a lowercase slug")]
    InvalidSlug { field: &'static str },
    /// A price was negative or not a finite number.
    #[error("{field} must be a non-negative amount")]
    InvalidAmount { field: &'static str },
    /// A choice field received a value outside its closed set.
    #[error("'{value}' is not a valid {field}")]
    UnknownOption { field: &'static str, value: String },
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

pub(crate) fn validate_non_empty(
    value: &str,
    field: &'static str,
) -> Result<String, FormValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn validate_email(value: &str) -> Result<String, FormValidationError> {
    let trimmed = validate_non_empty(value, "email")?;
    if !email_regex().is_match(&trimmed) {
        return Err(FormValidationError::InvalidEmail { value: trimmed });
    }
    Ok(trimmed)
}

pub(crate) fn validate_phone(value: &str) -> Result<String, FormValidationError> {
    let trimmed = validate_non_empty(value, "phone")?;
    let allowed = trimmed
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, ' ' | '+' | '-' | '(' | ')'));
    let digits = trimmed.chars().filter(char::is_ascii_digit).count();
    if !allowed || !(7..=20).contains(&digits) {
        return Err(FormValidationError::InvalidPhone { value: trimmed });
    }
    Ok(trimmed)
}

pub(crate) fn validate_slug(value: &str, field: &'static str) -> Result<String, FormValidationError> {
    if !is_valid_slug(value) {
        return Err(FormValidationError::InvalidSlug { field });
    }
    Ok(value.to_owned())
}

pub(crate) fn ensure_amount(value: f64, field: &'static str) -> Result<(), FormValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(FormValidationError::InvalidAmount { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("admin@test.com", true)]
    #[case("  guest@ego.house ", true)]
    #[case("no-at-sign.com", false)]
    #[case("two@@signs.com", false)]
    #[case("spaces in@mail.com", false)]
    #[case("", false)]
    fn email_shapes(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(validate_email(raw).is_ok(), ok, "email: {raw:?}");
    }

    #[rstest]
    #[case("+34 600 123 456", true)]
    #[case("(91) 555-0100", true)]
    #[case("12345", false)]
    #[case("600-ABC-123", false)]
    fn phone_shapes(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(validate_phone(raw).is_ok(), ok, "phone: {raw:?}");
    }

    #[rstest]
    fn non_empty_trims() {
        assert_eq!(validate_non_empty("  Ana ", "name").expect("valid"), "Ana");
        assert_eq!(
            validate_non_empty(" ", "name"),
            Err(FormValidationError::EmptyField { field: "name" })
        );
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(12.5, true)]
    #[case(-1.0, false)]
    #[case(f64::NAN, false)]
    fn amounts(#[case] value: f64, #[case] ok: bool) {
        assert_eq!(ensure_amount(value, "price").is_ok(), ok);
    }
}
