//! Session store.
//!
//! All auth state lives in durable storage under the shared keys; this type
//! is the only code that reads or writes them. Nothing is cached in memory,
//! so two handles over the same store always agree.

use secrecy::SecretString;
use thiserror::Error;
use tracing::info;

use record_shop_core::{CategoryId, UserRole};

use crate::api::LoginResponse;
use crate::storage::{SharedStore, StorageError, keys};

/// Errors raised by session checks.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No one is logged in.
    #[error("not logged in")]
    NotAuthenticated,

    /// The logged-in user lacks the required role.
    #[error("this action requires the {required} role")]
    Forbidden {
        /// Role the action needs.
        required: UserRole,
    },

    /// Session state could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: UserRole,
    /// Avatar URL.
    pub avatar: Option<String>,
}

/// Reads and writes the session keys of a [`SharedStore`].
#[derive(Clone)]
pub struct SessionStore {
    store: SharedStore,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a session over `store`.
    #[must_use]
    pub const fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Bearer token of the logged-in user.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.store
            .get(keys::AUTH_TOKEN)
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The logged-in user, if any.
    ///
    /// An unrecognised stored role is treated as a customer.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.token()?;
        Some(CurrentUser {
            name: self.store.get(keys::USER_NAME).unwrap_or_default(),
            role: self
                .store
                .get(keys::USER_ROLE)
                .and_then(|r| r.parse().ok())
                .unwrap_or_default(),
            avatar: self.store.get(keys::USER_AVATAR).filter(|a| !a.is_empty()),
        })
    }

    /// Token of an admin user, for POS operations.
    ///
    /// # Errors
    ///
    /// - `NotAuthenticated` if no one is logged in
    /// - `Forbidden` if the user is not an admin
    pub fn require_admin(&self) -> Result<SecretString, SessionError> {
        let user = self.current_user().ok_or(SessionError::NotAuthenticated)?;
        if !user.role.is_admin() {
            return Err(SessionError::Forbidden {
                required: UserRole::Admin,
            });
        }
        self.token().ok_or(SessionError::NotAuthenticated)
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session could not be persisted.
    pub fn sign_in(&self, login: &LoginResponse) -> Result<CurrentUser, StorageError> {
        self.store.set(keys::AUTH_TOKEN, login.token.clone())?;
        self.store.set(keys::USER_ROLE, login.role.to_string())?;
        self.store.set(keys::USER_NAME, login.name.clone())?;
        match &login.avatar {
            Some(avatar) => self.store.set(keys::USER_AVATAR, avatar.clone())?,
            None => self.store.remove(keys::USER_AVATAR)?,
        }
        info!(user = %login.name, role = %login.role, "Signed in");

        Ok(CurrentUser {
            name: login.name.clone(),
            role: login.role,
            avatar: login.avatar.clone(),
        })
    }

    /// Forget the logged-in user. The cart is kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session could not be persisted.
    pub fn sign_out(&self) -> Result<(), StorageError> {
        for key in [
            keys::AUTH_TOKEN,
            keys::USER_ROLE,
            keys::USER_NAME,
            keys::USER_AVATAR,
        ] {
            self.store.remove(key)?;
        }
        info!("Signed out");
        Ok(())
    }

    /// Category last chosen in the catalog.
    #[must_use]
    pub fn selected_category(&self) -> Option<CategoryId> {
        self.store
            .get(keys::SELECTED_CATEGORY)
            .filter(|c| !c.is_empty())
            .map(CategoryId::from)
    }

    /// Remember (or clear) the catalog category filter.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the choice could not be persisted.
    pub fn set_selected_category(&self, category: Option<&CategoryId>) -> Result<(), StorageError> {
        match category {
            Some(category) => self
                .store
                .set(keys::SELECTED_CATEGORY, category.to_string()),
            None => self.store.remove(keys::SELECTED_CATEGORY),
        }
    }
}
