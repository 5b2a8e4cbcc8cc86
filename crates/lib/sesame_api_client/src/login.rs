//! Login-page actions: password form submission and following a login button.
//!
//! Both re-query the server's sign-in options first and refuse to act on a
//! mechanism that is no longer offered.

use sesame_core::models::auth::LoginResponse;
use sesame_core::models::sign_in::SignInOption;
use sesame_core::signin::LoginElement;
use thiserror::Error;
use tracing::{error, warn};

use crate::client::SesameClient;

/// Shown for every failed login attempt.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginFormError {
    #[error("Username is required")]
    UsernameRequired,

    #[error("Password is required")]
    PasswordRequired,

    /// The chosen mechanism is gone (or the options could not be fetched);
    /// the login page must be reloaded.
    #[error("Sign-in options changed; reload the login page")]
    ReloadRequired,

    #[error("{}", LOGIN_FAILED_MESSAGE)]
    LoginFailed,

    /// The element is the password form, which is submitted, not followed.
    #[error("Password login has no link to follow")]
    NotALink,
}

async fn ensure_offered(
    client: &SesameClient,
    option: &SignInOption,
) -> Result<(), LoginFormError> {
    match client.revalidate(option).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            warn!(%option, "sign-in option no longer offered");
            Err(LoginFormError::ReloadRequired)
        }
        Err(e) => {
            warn!(%option, "unable to revalidate sign-in option: {e}");
            Err(LoginFormError::ReloadRequired)
        }
    }
}

/// Username/password form state.
#[derive(Clone)]
pub struct LoginForm<'a> {
    client: &'a SesameClient,
    pub username: String,
    pub password: String,
}

impl<'a> LoginForm<'a> {
    pub fn new(client: &'a SesameClient) -> Self {
        Self {
            client,
            username: String::new(),
            password: String::new(),
        }
    }

    /// Validate the fields, revalidate password login, then log in.
    pub async fn submit(&self) -> Result<LoginResponse, LoginFormError> {
        if self.username.is_empty() {
            return Err(LoginFormError::UsernameRequired);
        }
        if self.password.is_empty() {
            return Err(LoginFormError::PasswordRequired);
        }

        ensure_offered(self.client, &SignInOption::Basic).await?;

        self.client
            .login(&self.username, &self.password)
            .await
            .map_err(|e| {
                error!(username = %self.username, "login failed: {e}");
                LoginFormError::LoginFailed
            })
    }
}

/// Revalidate a button's mechanism and return the link to follow.
pub async fn follow(
    client: &SesameClient,
    element: &LoginElement,
) -> Result<String, LoginFormError> {
    let LoginElement::Button { option, href, .. } = element else {
        return Err(LoginFormError::NotALink);
    };
    ensure_offered(client, option).await?;
    Ok(href.clone())
}
