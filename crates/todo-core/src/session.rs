//! Session store: who, if anyone, is logged in.
//!
//! The session is read from [`LocalStorage`] once at startup, replaced
//! wholesale on login and cleared wholesale on logout. Readers subscribe to
//! a `tokio::sync::watch` channel and see every change.

use anyhow::{Result, bail};
use tokio::sync::watch;
use todo_types::User;

use crate::storage::LocalStorage;

/// Storage key holding the raw auth token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the serialized user record.
pub const USER_KEY: &str = "user";

/// Logged-in or logged-out. A token without a user (or the reverse) cannot
/// be represented.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    LoggedOut,
    LoggedIn { token: String, user: User },
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        match self {
            Session::LoggedIn { token, .. } => Some(token),
            Session::LoggedOut => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::LoggedIn { user, .. } => Some(user),
            Session::LoggedOut => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Session::LoggedIn { .. })
    }
}

/// Single writer of the session, many readers via [`SessionStore::subscribe`].
#[derive(Debug)]
pub struct SessionStore {
    storage: LocalStorage,
    tx: watch::Sender<Session>,
}

impl SessionStore {
    /// Builds the store from whatever is persisted in `storage`.
    ///
    /// Anything short of a non-empty token plus a well-formed user record is
    /// treated as logged out.
    pub fn initialize(storage: LocalStorage) -> Self {
        let session = read_session(&storage);
        tracing::debug!(logged_in = session.is_logged_in(), "session initialized");
        let (tx, _rx) = watch::channel(session);
        Self { storage, tx }
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.tx.borrow().is_logged_in()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token().map(str::to_string)
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Replaces the session and persists both fields in one write.
    ///
    /// # Errors
    /// Returns an error if the token is empty or storage cannot be written;
    /// the previous session stays in effect.
    pub fn set_session(&mut self, token: &str, user: User) -> Result<()> {
        if token.trim().is_empty() {
            bail!("Refusing to store a session with an empty token");
        }
        let user_json = serde_json::to_string(&user)?;
        self.storage
            .set_many(&[(TOKEN_KEY, token), (USER_KEY, &user_json)])?;

        tracing::info!(user = %user.name, "session stored");
        self.tx.send_replace(Session::LoggedIn {
            token: token.to_string(),
            user,
        });
        Ok(())
    }

    /// Removes both fields from storage and memory. Returns whether a session
    /// was present.
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn clear_session(&mut self) -> Result<bool> {
        let removed = self.storage.remove_many(&[TOKEN_KEY, USER_KEY])?;
        let previous = self.tx.send_replace(Session::LoggedOut);
        tracing::info!("session cleared");
        Ok(removed || previous.is_logged_in())
    }
}

fn read_session(storage: &LocalStorage) -> Session {
    let token = storage.get(TOKEN_KEY).map(str::trim).unwrap_or_default();
    let Some(raw_user) = storage.get(USER_KEY) else {
        if !token.is_empty() {
            tracing::warn!("token stored without a user record; treating as logged out");
        }
        return Session::LoggedOut;
    };
    if token.is_empty() {
        tracing::warn!("user record stored without a token; treating as logged out");
        return Session::LoggedOut;
    }

    match serde_json::from_str::<User>(raw_user) {
        Ok(user) => Session::LoggedIn {
            token: token.to_string(),
            user,
        },
        Err(err) => {
            tracing::warn!(error = %err, "stored user record is malformed; treating as logged out");
            Session::LoggedOut
        }
    }
}
