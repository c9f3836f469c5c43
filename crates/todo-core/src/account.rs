//! Register, login and logout flows.

use std::fmt;

use crate::api::{ApiClient, ApiError, SignupOutcome};
use crate::forms::{FieldErrors, LoginForm, RegisterForm};
use crate::notice::{Notice, Notifier};
use crate::routes::Route;
use crate::session::SessionStore;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const SIGNUP_FAILED: &str = "Registration failed. Please try again.";

#[derive(Debug)]
pub enum AccountError {
    Invalid(FieldErrors),
    Api(ApiError),
    /// A successful login reply that carried no token.
    MissingToken,
    Storage(anyhow::Error),
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountError::Invalid(errors) => write!(f, "{errors}"),
            AccountError::Api(err) => write!(f, "{err}"),
            AccountError::MissingToken => f.write_str("Login response carried no token"),
            AccountError::Storage(err) => write!(f, "{err:#}"),
        }
    }
}

impl std::error::Error for AccountError {}

impl From<FieldErrors> for AccountError {
    fn from(errors: FieldErrors) -> Self {
        AccountError::Invalid(errors)
    }
}

/// Validates and submits a registration.
///
/// Both a new account and the duplicate-account reply lead to the login
/// route; the notice tells them apart.
///
/// # Errors
/// Invalid input fails before any request. Transport or status failures are
/// reported with a notice and returned.
pub async fn register(
    api: &ApiClient,
    form: &RegisterForm,
    notifier: &mut impl Notifier,
) -> Result<(SignupOutcome, Route), AccountError> {
    form.validate()?;

    match api.signup(&form.to_request()).await {
        Ok(outcome) => {
            match &outcome {
                SignupOutcome::Created(message) => {
                    tracing::info!(email = %form.email, "account created");
                    notifier.notify(Notice::success(message.clone()));
                }
                SignupOutcome::AlreadyExists(message) => {
                    tracing::info!(email = %form.email, "account already exists");
                    notifier.notify(Notice::error(message.clone()));
                }
            }
            Ok((outcome, Route::Login))
        }
        Err(err) => {
            tracing::warn!(error = %err, "signup failed");
            notifier.notify(Notice::error(SIGNUP_FAILED));
            Err(AccountError::Api(err))
        }
    }
}

/// Validates credentials, logs in, and stores the session.
///
/// # Errors
/// On failure the session is left unchanged.
pub async fn login(
    api: &ApiClient,
    store: &mut SessionStore,
    form: &LoginForm,
    notifier: &mut impl Notifier,
) -> Result<Route, AccountError> {
    form.validate()?;

    let response = match api.login(&form.to_request()).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "login failed");
            notifier.notify(Notice::error(INVALID_CREDENTIALS));
            return Err(AccountError::Api(err));
        }
    };

    if response.token.trim().is_empty() {
        tracing::warn!("login response without a token");
        notifier.notify(Notice::error(INVALID_CREDENTIALS));
        return Err(AccountError::MissingToken);
    }

    store
        .set_session(&response.token, response.user)
        .map_err(AccountError::Storage)?;
    if !response.message.is_empty() {
        notifier.notify(Notice::success(response.message));
    }
    Ok(Route::Home)
}

/// Clears the session. Returns whether one was present.
///
/// # Errors
/// Returns an error if storage cannot be written.
pub fn logout(store: &mut SessionStore) -> Result<bool, AccountError> {
    store.clear_session().map_err(AccountError::Storage)
}
