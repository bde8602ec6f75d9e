//! Request and response bodies for the shop REST API.
//!
//! Field names follow the API's JSON (Spanish, mixed casing); Rust names
//! are mapped with `serde(rename)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use record_shop_core::{DeliveryType, OrderNumber, PaymentMethod, Price, UserRole};

use crate::cart::CartLineItem;
use crate::catalog::CatalogProduct;

// =============================================================================
// Auth
// =============================================================================

/// Body of `POST /usuario/login`. Built per call from a `SecretString`.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent calls.
    pub token: String,
    /// Role of the account.
    #[serde(rename = "rol", default)]
    pub role: UserRole,
    /// Display name.
    #[serde(rename = "nombre", default)]
    pub name: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Body of `POST /usuario/registrar`. Built per call from a `SecretString`.
#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    #[serde(rename = "nombre")]
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Generic acknowledgement carrying only a message.
#[derive(Debug, Clone, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// Payload of `GET /producto/listar`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    #[serde(rename = "productos", default)]
    pub products: Vec<CatalogProduct>,
    #[serde(rename = "totalPaginas", default = "one")]
    pub total_pages: u32,
}

/// Payload of `GET /producto/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDetail {
    #[serde(rename = "producto")]
    pub product: CatalogProduct,
}

const fn one() -> u32 {
    1
}

// =============================================================================
// Orders
// =============================================================================

/// Body of `POST /venta/ordenar`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Every cart line, as stored.
    #[serde(rename = "productos")]
    pub lines: Vec<CartLineItem>,
    #[serde(rename = "tipoEntrega")]
    pub delivery: DeliveryType,
    #[serde(rename = "aceptaTerminos")]
    pub accepted_terms: bool,
    pub total: Price,
}

/// Successful order creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderConfirmation {
    /// Number the customer quotes when collecting or tracking the order.
    #[serde(rename = "numero_orden", default)]
    pub order_number: Option<OrderNumber>,
    /// Server message to show the customer.
    #[serde(default)]
    pub message: Option<String>,
}

/// One entry in `GET /orden/mis-ordenes`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    #[serde(rename = "numero_orden")]
    pub order_number: OrderNumber,
    #[serde(rename = "estado")]
    pub status: String,
    pub total: Price,
    #[serde(rename = "fecha")]
    pub placed_at: DateTime<Utc>,
    #[serde(rename = "tipoEntrega", default)]
    pub delivery: Option<DeliveryType>,
}

/// Payload of `GET /orden/mis-ordenes`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderHistory {
    #[serde(rename = "ordenes", default)]
    pub orders: Vec<OrderSummary>,
}

// =============================================================================
// Point of sale
// =============================================================================

/// Body of `POST /venta/crear`.
#[derive(Debug, Clone, Serialize)]
pub struct SaleRequest {
    #[serde(rename = "productos")]
    pub lines: Vec<CartLineItem>,
    #[serde(rename = "metodoPago")]
    pub payment: PaymentMethod,
    pub total: Price,
}

/// Successful POS sale payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SaleReceipt {
    #[serde(rename = "numero_venta", default)]
    pub sale_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
