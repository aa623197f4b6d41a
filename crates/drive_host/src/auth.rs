//! Auth session contract and acting-identity resolution.

use std::{cell::RefCell, rc::Rc};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::Value;

use crate::{
    error::DriveError,
    ids::normalize_id,
    storage::prefs::{load_pref_with, save_pref_with, PrefsStore},
};

/// Prefs key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Claim names probed, in order, for the acting user's id.
const USER_ID_CLAIMS: [&str; 4] = ["id", "userId", "_id", "sub"];

/// Auth/session collaborator holding the bearer token.
pub trait AuthSession {
    /// Returns the current bearer token, if signed in.
    fn current_token(&self) -> Option<String>;

    /// Stores a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns an error when the token could not be persisted; the in-memory session is still
    /// updated.
    fn login(&self, token: &str) -> Result<(), String>;

    /// Clears the token.
    ///
    /// # Errors
    ///
    /// Returns an error when the persisted token could not be removed.
    fn logout(&self) -> Result<(), String>;

    /// Returns `true` while a token is present.
    fn is_authenticated(&self) -> bool {
        self.current_token().is_some()
    }
}

/// Narrow capability resolving who is acting.
pub trait IdentityProvider {
    /// Returns the acting user's id.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Auth`] when no usable identity exists.
    fn acting_user_id(&self) -> Result<String, DriveError>;
}

/// [`IdentityProvider`] reading the id from an [`AuthSession`]'s token claims.
#[derive(Clone)]
pub struct SessionIdentity {
    session: Rc<dyn AuthSession>,
}

impl SessionIdentity {
    /// Wraps a session.
    pub fn new(session: Rc<dyn AuthSession>) -> Self {
        Self { session }
    }
}

impl IdentityProvider for SessionIdentity {
    fn acting_user_id(&self) -> Result<String, DriveError> {
        let token = self.session.current_token().ok_or_else(|| {
            DriveError::Auth("Unable to determine user. Please log in again.".to_string())
        })?;
        user_id_from_token(&token).ok_or_else(|| {
            DriveError::Auth("Unable to determine user. Please log in again.".to_string())
        })
    }
}

/// Decodes the payload segment of a JWT without verifying it.
pub fn decode_token_claims(token: &str) -> Option<Value> {
    let payload = token.split('.').nth(1)?;
    let payload: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(payload.as_bytes()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Returns the first id-like claim of a token's payload.
pub fn user_id_from_token(token: &str) -> Option<String> {
    let claims = decode_token_claims(token)?;
    USER_ID_CLAIMS
        .iter()
        .filter_map(|claim| claims.get(*claim))
        .find_map(normalize_id)
}

fn usable_token(token: Option<String>) -> Option<String> {
    token.filter(|token| !token.trim().is_empty())
}

/// Session persisted through a [`PrefsStore`] under [`TOKEN_KEY`].
#[derive(Clone)]
pub struct PrefsAuthSession {
    store: Rc<dyn PrefsStore>,
    token: Rc<RefCell<Option<String>>>,
}

impl PrefsAuthSession {
    /// Restores any token already persisted in `store`.
    ///
    /// Unreadable stored data starts a signed-out session.
    pub fn restore(store: Rc<dyn PrefsStore>) -> Self {
        let stored = load_pref_with::<_, String>(store.as_ref(), TOKEN_KEY)
            .ok()
            .flatten();
        let token = usable_token(stored);
        Self {
            store,
            token: Rc::new(RefCell::new(token)),
        }
    }
}

impl AuthSession for PrefsAuthSession {
    fn current_token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn login(&self, token: &str) -> Result<(), String> {
        *self.token.borrow_mut() = usable_token(Some(token.to_string()));
        save_pref_with(self.store.as_ref(), TOKEN_KEY, &token)
    }

    fn logout(&self) -> Result<(), String> {
        self.token.borrow_mut().take();
        self.store.delete_pref(TOKEN_KEY)
    }
}

/// In-memory session for tests and non-browser targets.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthSession {
    token: Rc<RefCell<Option<String>>>,
}

impl MemoryAuthSession {
    /// Starts signed in with `token`.
    pub fn signed_in(token: impl Into<String>) -> Self {
        Self {
            token: Rc::new(RefCell::new(usable_token(Some(token.into())))),
        }
    }
}

impl AuthSession for MemoryAuthSession {
    fn current_token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn login(&self, token: &str) -> Result<(), String> {
        *self.token.borrow_mut() = usable_token(Some(token.to_string()));
        Ok(())
    }

    fn logout(&self) -> Result<(), String> {
        self.token.borrow_mut().take();
        Ok(())
    }
}
