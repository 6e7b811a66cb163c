//! Authentication primitives: login credentials, registration payloads, and
//! the token/user pair the backend returns.
//!
//! Constructors validate raw form input so malformed emails or blank
//! passwords are rejected before a request is built.

use serde::{Deserialize, Deserializer, Serialize};
use zeroize::Zeroizing;

use super::User;
use super::validation::{FormValidationError, validate_email, validate_non_empty};

/// Minimum password length accepted by the registration form.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed and syntactically valid.
/// - `password` is non-empty and retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use ego_house::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin@test.com ", "admin123").unwrap();
/// assert_eq!(creds.email(), "admin@test.com");
/// assert_eq!(creds.password(), "admin123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw form inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, FormValidationError> {
        let email = validate_email(email)?;
        if password.is_empty() {
            return Err(FormValidationError::EmptyField { field: "password" });
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used as the login identifier.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub(crate) fn body(&self) -> CredentialsBody<'_> {
        CredentialsBody {
            email: self.email(),
            password: self.password(),
            name: None,
        }
    }
}

/// Validated registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    credentials: LoginCredentials,
    name: Option<String>,
}

impl Registration {
    /// Construct a registration from raw form inputs. Blank names are
    /// treated as absent.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Self, FormValidationError> {
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(FormValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        let name = name.and_then(|raw| validate_non_empty(raw, "name").ok());
        Ok(Self { credentials, name })
    }

    /// Email the account will log in with.
    pub fn email(&self) -> &str {
        self.credentials.email()
    }

    /// Optional display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn body(&self) -> CredentialsBody<'_> {
        CredentialsBody {
            name: self.name(),
            ..self.credentials.body()
        }
    }
}

/// Wire body for `/auth/login` and `/auth/register`.
#[derive(Serialize)]
pub(crate) struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// Token and identity returned by login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent calls. Never blank.
    #[serde(deserialize_with = "non_blank_token")]
    pub access_token: String,
    /// Authenticated identity.
    pub user: User,
}

fn non_blank_token<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let token = String::deserialize(deserializer)?;
    if token.trim().is_empty() {
        return Err(serde::de::Error::custom("access_token must not be blank"));
    }
    Ok(token)
}
