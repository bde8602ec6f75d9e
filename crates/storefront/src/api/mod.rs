//! Shop REST API client.
//!
//! # Architecture
//!
//! - `reqwest` for HTTP, JSON bodies both ways
//! - Bearer token auth, supplied per call from the session store
//! - One shot: no retries, no caching, a fixed per-request timeout
//!
//! # Response envelope
//!
//! Every response is a JSON object with a `status` boolean and an optional
//! `message`. A non-2xx status or `status: false` becomes
//! [`ApiError::Rejected`] carrying the server's message, or a generic
//! fallback when the server gave none.

mod types;

pub use reqwest::StatusCode;
pub use types::*;

use std::sync::Arc;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use record_shop_core::ProductId;

use crate::catalog::{CatalogProduct, CatalogQuery, CatalogSnapshot};
use crate::checkout::OrderGateway;
use crate::config::ClientConfig;
use crate::pos::SaleGateway;

/// Message shown when the server rejects a request without explaining why.
pub const FALLBACK_MESSAGE: &str = "Something went wrong, please try again";

/// Errors that can occur when talking to the shop API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The server accepted the request but its payload did not have the
    /// expected shape.
    #[error("Unexpected payload in accepted response: {0}")]
    UnexpectedPayload(#[source] serde_json::Error),

    /// The server answered with an error status or `status: false`.
    #[error("Rejected by server ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or [`FALLBACK_MESSAGE`].
        message: String,
    },
}

impl ApiError {
    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Rejected { message, .. } => message,
            _ => FALLBACK_MESSAGE,
        }
    }

    /// Whether the server accepted the request even though the reply could
    /// not be read.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::UnexpectedPayload(_))
    }

    /// Whether the server refused the credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the shop REST API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
        })
    }

    /// Build the absolute URL for an API path plus query parameters.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if `path` cannot be joined onto the base URL.
    pub fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Send one request and decode the envelope.
    async fn send<B, T>(
        &self,
        method: Method,
        url: Url,
        token: Option<&SecretString>,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.inner.client.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(status = %status, bytes = text.len(), "API response");

        decode_envelope(status, &text)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the server message on bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let url = self.endpoint("usuario/login", &[])?;
        self.send(Method::POST, url, None, Some(&body)).await
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the server refuses the registration.
    #[instrument(skip(self, name, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Acknowledgement, ApiError> {
        let body = RegisterRequest {
            name,
            email,
            password: password.expose_secret(),
        };
        let url = self.endpoint("usuario/registrar", &[])?;
        self.send(Method::POST, url, None, Some(&body)).await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch one catalog page.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &CatalogQuery) -> Result<CatalogSnapshot, ApiError> {
        let url = self.endpoint("producto/listar", &query.to_query_pairs())?;
        let page: ProductPage = self.send::<(), _>(Method::GET, url, None, None).await?;
        Ok(CatalogSnapshot::new(
            query.clone(),
            page.products,
            page.total_pages,
        ))
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn product(&self, id: &ProductId) -> Result<CatalogProduct, ApiError> {
        let url = self.endpoint(&format!("producto/{id}"), &[])?;
        let detail: ProductDetail = self.send::<(), _>(Method::GET, url, None, None).await?;
        Ok(detail.product)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List the logged-in customer's orders.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the token is refused.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: &SecretString) -> Result<Vec<OrderSummary>, ApiError> {
        let url = self.endpoint("orden/mis-ordenes", &[])?;
        let history: OrderHistory = self
            .send::<(), _>(Method::GET, url, Some(token), None)
            .await?;
        Ok(history.orders)
    }
}

impl OrderGateway for ApiClient {
    #[instrument(skip(self, token, order), fields(lines = order.lines.len()))]
    async fn place_order(
        &self,
        token: &SecretString,
        order: &OrderRequest,
    ) -> Result<OrderConfirmation, ApiError> {
        let url = self.endpoint("venta/ordenar", &[])?;
        self.send(Method::POST, url, Some(token), Some(order)).await
    }
}

impl SaleGateway for ApiClient {
    #[instrument(skip(self, token, sale), fields(lines = sale.lines.len()))]
    async fn record_sale(
        &self,
        token: &SecretString,
        sale: &SaleRequest,
    ) -> Result<SaleReceipt, ApiError> {
        let url = self.endpoint("venta/crear", &[])?;
        self.send(Method::POST, url, Some(token), Some(sale)).await
    }
}

/// Decode a response body according to the `status`/`message` envelope.
///
/// # Errors
///
/// - `ApiError::Rejected` for non-2xx responses or `status: false`
/// - `ApiError::Parse` if a successful response is not JSON
/// - `ApiError::UnexpectedPayload` if an accepted body does not match `T`
pub fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    let rejected = |message: Option<String>| ApiError::Rejected {
        status: status.as_u16(),
        message: message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_owned()),
    };

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => return Err(rejected(None)),
        Err(e) => return Err(ApiError::Parse(e)),
    };

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let accepted = value
        .get("status")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    if !status.is_success() || !accepted {
        return Err(rejected(message));
    }

    serde_json::from_value(value).map_err(ApiError::UnexpectedPayload)
}
