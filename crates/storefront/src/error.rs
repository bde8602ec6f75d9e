//! Unified error handling with Sentry integration.
//!
//! Every fallible shop operation ends in a [`ClientError`]. Front ends show
//! [`ClientError::user_message`] to the user and call
//! [`ClientError::report`], which sends unexpected failures to Sentry.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::reservation::ReservationError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The shop API failed or refused a request.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session check failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A stock reservation was refused.
    #[error("Reservation error: {0}")]
    Reservation(#[from] ReservationError),

    /// Checkout or POS submission failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Invalid input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ClientError {
    /// Whether this is a bug or infrastructure failure rather than a
    /// validation or business-rule refusal.
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) => true,
            Self::Api(err) | Self::Checkout(CheckoutError::Api(err)) => {
                !matches!(err, ApiError::Rejected { status, .. } if *status < 500)
            }
            Self::Session(SessionError::Storage(_)) => true,
            _ => false,
        }
    }

    /// Text suitable for showing to the user.
    ///
    /// Internal details (file paths, HTTP errors) are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Storage(_) | Self::Session(SessionError::Storage(_)) => {
                "Could not save your session on this device".to_string()
            }
            Self::Api(err) => err.user_message().to_string(),
            Self::Session(err) => match err {
                SessionError::NotAuthenticated => "Please log in to continue".to_string(),
                _ => err.to_string(),
            },
            Self::Reservation(ReservationError::InsufficientStock { available, .. }) => {
                if *available == 0 {
                    "This product is out of stock".to_string()
                } else {
                    format!("Only {available} more in stock")
                }
            }
            Self::Reservation(err) => err.to_string(),
            Self::Checkout(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Log the error and capture it to Sentry if it is unexpected.
    pub fn report(&self) {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::warn!(error = %self, "Operation refused");
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Set the Sentry user context from the logged-in user's name.
///
/// Call this after a successful login to associate errors with users.
pub fn set_sentry_user(name: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(name.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "P1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
