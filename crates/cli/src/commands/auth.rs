//! Login, registration and session inspection.

use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use record_shop_storefront::error::{self, ClientError};
use record_shop_storefront::state::ShopState;

/// Minimum password length accepted by the registration form.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Log in and store the session.
///
/// # Errors
///
/// Returns an error if the credentials are refused or the session cannot be saved.
pub async fn login(state: &ShopState, email: &str, password: String) -> Result<(), ClientError> {
    let password = SecretString::from(password);
    let response = state.api().login(email.trim(), &password).await?;
    let user = state.session().sign_in(&response)?;
    error::set_sentry_user(&user.name);

    info!("Welcome, {} ({})", user.name, user.role);
    Ok(())
}

/// Create a customer account.
///
/// # Errors
///
/// Returns `BadRequest` if the passwords do not match or are too short, or
/// the server's refusal.
pub async fn register(
    state: &ShopState,
    name: String,
    email: String,
    password: String,
    confirm_password: &str,
) -> Result<(), ClientError> {
    let password = SecretString::from(password);
    validate_registration(&name, &email, &password, confirm_password)?;

    let ack = state
        .api()
        .register(name.trim(), email.trim(), &password)
        .await?;

    info!(
        "{}",
        ack.message
            .as_deref()
            .unwrap_or("Account created, you can log in now")
    );
    Ok(())
}

/// Forget the logged-in user.
///
/// # Errors
///
/// Returns an error if the session cannot be saved.
pub fn logout(state: &ShopState) -> Result<(), ClientError> {
    state.session().sign_out()?;
    error::clear_sentry_user();
    info!("Logged out");
    Ok(())
}

/// Show the logged-in user.
pub fn whoami(state: &ShopState) {
    match state.session().current_user() {
        Some(user) => info!("{} ({})", user.name, user.role),
        None => info!("Not logged in"),
    }
}

/// Check the registration form before any network call.
fn validate_registration(
    name: &str,
    email: &str,
    password: &SecretString,
    confirm_password: &str,
) -> Result<(), ClientError> {
    let password = password.expose_secret();
    if name.trim().is_empty() {
        return Err(ClientError::BadRequest("Name is required".to_string()));
    }
    if !email.contains('@') {
        return Err(ClientError::BadRequest("Invalid email address".to_string()));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ClientError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password != confirm_password {
        return Err(ClientError::BadRequest("Passwords do not match".to_string()));
    }
    Ok(())
}
