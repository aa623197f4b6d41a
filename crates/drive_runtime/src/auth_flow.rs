//! Account flows layered over the auth API and the session.

use std::rc::Rc;

use drive_host::{
    save_pref_with, AuthApi, AuthMessage, AuthSession, DriveError, LoginRequest, PrefsStore,
    RegisterRequest, ResetPasswordRequest,
};
use leptos::logging;

/// Prefs key flagging a registration that still awaits email activation.
pub const ACTIVATION_PENDING_KEY: &str = "activationPending";
/// Prefs key remembering the email address awaiting activation.
pub const ACTIVATION_EMAIL_KEY: &str = "activationEmail";

const REGISTERED_MESSAGE: &str =
    "Registration successful. Please check your email to activate your account.";
const ACTIVATED_MESSAGE: &str = "Your account has been activated. You can now sign in.";
const RESET_SENT_MESSAGE: &str = "If that address is registered, a reset link is on its way.";
const PASSWORD_RESET_MESSAGE: &str = "Your password has been reset. You can now sign in.";

#[derive(Clone)]
/// Sign-in, registration, activation, and password reset.
pub struct AuthFlow {
    api: Rc<dyn AuthApi>,
    session: Rc<dyn AuthSession>,
    prefs: Rc<dyn PrefsStore>,
}

fn required(value: &str, message: &str) -> Result<String, DriveError> {
    let value = value.trim();
    if value.is_empty() {
        Err(DriveError::Validation(message.to_string()))
    } else {
        Ok(value.to_string())
    }
}

fn message_or(reply: AuthMessage, fallback: &str) -> String {
    reply
        .message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl AuthFlow {
    /// Wires the flow to its collaborators.
    pub fn new(
        api: Rc<dyn AuthApi>,
        session: Rc<dyn AuthSession>,
        prefs: Rc<dyn PrefsStore>,
    ) -> Self {
        Self {
            api,
            session,
            prefs,
        }
    }

    /// Whether a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Exchanges credentials for a token and stores it.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Validation`] for a blank email or password (no network call), or
    /// the remote failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), DriveError> {
        let email = required(email, "Email is required.")?;
        if password.is_empty() {
            return Err(DriveError::Validation("Password is required.".to_string()));
        }
        let request = LoginRequest {
            email,
            password: password.to_string(),
        };
        let reply = self.api.login(&request).await?;
        if reply.token.trim().is_empty() {
            return Err(DriveError::Auth("Login failed".to_string()));
        }
        if let Err(err) = self.session.login(&reply.token) {
            logging::warn!("session token persist failed: {err}");
        }
        Ok(())
    }

    /// Clears the session.
    pub fn sign_out(&self) {
        if let Err(err) = self.session.logout() {
            logging::warn!("session token clear failed: {err}");
        }
    }

    /// Registers an account and remembers that activation is pending.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Validation`] when a field is blank, or the remote failure.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<String, DriveError> {
        let request = RegisterRequest {
            first_name: required(first_name, "First name is required.")?,
            last_name: required(last_name, "Last name is required.")?,
            email: required(email, "Email is required.")?,
            password: required(password, "Password is required.").map(|_| password.to_string())?,
        };
        let reply = self.api.register(&request).await?;
        for (key, value) in [
            (ACTIVATION_PENDING_KEY, "true"),
            (ACTIVATION_EMAIL_KEY, request.email.as_str()),
        ] {
            if let Err(err) = save_pref_with(self.prefs.as_ref(), key, &value) {
                logging::warn!("activation marker `{key}` persist failed: {err}");
            }
        }
        Ok(message_or(reply, REGISTERED_MESSAGE))
    }

    /// Activates an account with the emailed token.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Validation`] for a blank token, or the remote failure.
    pub async fn activate(&self, token: &str) -> Result<String, DriveError> {
        let token = required(token, "Activation token is missing.")?;
        let reply = self.api.activate(&token).await?;
        for key in [ACTIVATION_PENDING_KEY, ACTIVATION_EMAIL_KEY] {
            if let Err(err) = self.prefs.delete_pref(key) {
                logging::warn!("activation marker `{key}` clear failed: {err}");
            }
        }
        Ok(message_or(reply, ACTIVATED_MESSAGE))
    }

    /// Requests a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Validation`] for a blank email, or the remote failure.
    pub async fn forgot_password(&self, email: &str) -> Result<String, DriveError> {
        let email = required(email, "Email is required.")?;
        let reply = self.api.forgot_password(&email).await?;
        Ok(message_or(reply, RESET_SENT_MESSAGE))
    }

    /// Sets a new password with a reset token.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Validation`] for a blank token or password, or the remote failure.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<String, DriveError> {
        let request = ResetPasswordRequest {
            token: required(token, "Reset token is missing.")?,
            password: required(password, "Password is required.").map(|_| password.to_string())?,
        };
        let reply = self.api.reset_password(&request).await?;
        Ok(message_or(reply, PASSWORD_RESET_MESSAGE))
    }
}
