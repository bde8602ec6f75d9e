//! Integration tests for the record shop client.
//!
//! The tests exercise the storefront crate end to end without a live
//! server: orders and sales go through in-process gateways, and storage is
//! a real file in a temporary directory.
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart and session state across restarts
//! - `checkout_flow` - Customer checkout validation and outcomes
//! - `pos_reservation` - Counter reservations against a catalog page
//!
//! Shared fixtures live here.

use record_shop_core::{CategoryId, Price, ProductId};
use record_shop_storefront::catalog::{CatalogProduct, CatalogQuery, CatalogSnapshot};

/// A catalog product with a whole-dollar price.
#[must_use]
pub fn product(id: &str, price: u32, available: u32) -> CatalogProduct {
    CatalogProduct {
        id: ProductId::new(id),
        name: format!("Record {id}"),
        price: Price::whole(price),
        quantity_available: available,
        category: CategoryId::new("vinyl"),
        image: None,
    }
}

/// A single-page snapshot holding `products`.
#[must_use]
pub fn page(products: Vec<CatalogProduct>) -> CatalogSnapshot {
    CatalogSnapshot::new(CatalogQuery::default(), products, 1)
}
