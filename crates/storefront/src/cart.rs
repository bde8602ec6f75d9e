//! Shopping cart.
//!
//! [`Cart`] is the in-memory aggregate: an ordered list of line items keyed
//! by product id, with no line ever at quantity zero. [`CartStore`] wraps a
//! cart and writes it to durable storage under [`keys::CART`] after every
//! change, so a restarted session picks up where it left off.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use record_shop_core::{Price, ProductId};

use crate::catalog::CatalogProduct;
use crate::storage::{SharedStore, StorageError, keys, set_json};

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Product identifier, unique within the cart.
    pub id: ProductId,
    /// Display name at the time it was added.
    pub name: String,
    /// Cover image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Unit price at the time it was added.
    pub price: Price,
    /// Units in the cart, always at least 1.
    pub quantity: u32,
}

impl CartLineItem {
    /// Price of all units on this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl From<&CatalogProduct> for CartLineItem {
    fn from(product: &CatalogProduct) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price,
            quantity: 1,
        }
    }
}

/// Ordered collection of line items, unique by product id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from stored line items.
    ///
    /// Lines with quantity zero are dropped and repeated ids keep only their
    /// first occurrence.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLineItem>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if line.quantity == 0 || cart.get(&line.id).is_some() {
                warn!(product_id = %line.id, "Dropping invalid stored cart line");
                continue;
            }
            cart.lines.push(line);
        }
        cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Units of `id` in the cart (zero if absent).
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.get(id).map_or(0, |line| line.quantity)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLineItem::line_total).sum()
    }

    /// Add one unit of `product`: bump the existing line or append a new one.
    pub fn add(&mut self, product: &CatalogProduct) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.id == product.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLineItem::from(product));
        }
    }

    /// Set the quantity of an existing line. `quantity <= 0` removes it.
    ///
    /// Returns `false` (and changes nothing) if the product is not in the cart.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        if quantity <= 0 {
            self.lines.remove(index);
        } else if let Some(line) = self.lines.get_mut(index) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        true
    }

    /// Remove the line for `id`, returning it if present.
    pub fn remove(&mut self, id: &ProductId) -> Option<CartLineItem> {
        self.position(id).map(|index| self.lines.remove(index))
    }

    /// Remove every line. Returns `false` if the cart was already empty.
    pub fn clear(&mut self) -> bool {
        let had_lines = !self.lines.is_empty();
        self.lines.clear();
        had_lines
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|line| &line.id == id)
    }
}

/// A cart bound to durable storage.
///
/// Every successful mutation is written through before the method returns.
/// The in-memory change is applied even when the write fails; the error is
/// returned so the caller can surface it.
pub struct CartStore {
    store: SharedStore,
    cart: Cart,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Restore the cart saved in `store`, or start empty.
    ///
    /// An unreadable saved cart is logged and discarded.
    #[must_use]
    pub fn open(store: SharedStore) -> Self {
        let cart = match store.get(keys::CART) {
            None => Cart::new(),
            Some(raw) => match serde_json::from_str::<Vec<CartLineItem>>(&raw) {
                Ok(lines) => Cart::from_lines(lines),
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable stored cart");
                    Cart::new()
                }
            },
        };
        debug!(lines = cart.len(), "Cart restored");
        Self { store, cart }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be persisted.
    pub fn add(&mut self, product: &CatalogProduct) -> Result<(), StorageError> {
        self.cart.add(product);
        self.persist()
    }

    /// Set the quantity of a line; `quantity <= 0` removes it. Unknown ids
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be persisted.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<(), StorageError> {
        if self.cart.update_quantity(id, quantity) {
            self.persist()?;
        }
        Ok(())
    }

    /// Remove a line if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be persisted.
    pub fn remove(&mut self, id: &ProductId) -> Result<(), StorageError> {
        if self.cart.remove(id).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.cart.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), StorageError> {
        set_json(self.store.as_ref(), keys::CART, self.cart.lines())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use record_shop_core::CategoryId;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn product(id: &str, price: u32) -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(id),
            name: format!("Record {id}"),
            price: Price::whole(price),
            quantity_available: 5,
            category: CategoryId::new("vinyl"),
            image: None,
        }
    }

    #[test]
    fn test_add_twice_increments() {
        let mut cart = Cart::new();
        cart.add(&product("P1", 10));
        cart.add(&product("P1", 10));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(&ProductId::new("P1")), 2);
    }

    #[test]
    fn test_update_to_zero_removes() {
        let mut cart = Cart::new();
        cart.add(&product("P1", 10));
        cart.add(&product("P1", 10));

        assert!(cart.update_quantity(&ProductId::new("P1"), 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_negative_removes() {
        let mut cart = Cart::new();
        cart.add(&product("P1", 10));

        assert!(cart.update_quantity(&ProductId::new("P1"), -3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product("P1", 10));

        assert!(!cart.update_quantity(&ProductId::new("P9"), 4));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove_then_add_starts_at_one() {
        let mut cart = Cart::new();
        cart.add(&product("P1", 10));
        cart.update_quantity(&ProductId::new("P1"), 7);
        cart.remove(&ProductId::new("P1"));
        cart.add(&product("P1", 10));

        assert_eq!(cart.quantity_of(&ProductId::new("P1")), 1);
    }

    #[test]
    fn test_subtotal_and_item_count() {
        let mut cart = Cart::new();
        cart.add(&product("P1", 10));
        cart.add(&product("P1", 10));
        cart.add(&product("P2", 5));

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), Price::whole(25));
    }

    #[test]
    fn test_from_lines_drops_zero_and_duplicates() {
        let line = CartLineItem::from(&product("P1", 10));
        let zero = CartLineItem {
            quantity: 0,
            ..CartLineItem::from(&product("P2", 10))
        };
        let cart = Cart::from_lines(vec![line.clone(), zero, line]);

        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_store_persists_every_mutation() {
        let backend = Arc::new(MemoryStore::new());
        let mut store = CartStore::open(backend.clone());

        store.add(&product("P1", 10)).unwrap();
        let saved = backend.get(keys::CART).unwrap();
        assert!(saved.contains("\"P1\""));

        store.clear().unwrap();
        assert_eq!(backend.get(keys::CART).as_deref(), Some("[]"));
    }

    #[test]
    fn test_store_restores_saved_cart() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set(
                keys::CART,
                r#"[{"id":"P1","name":"Blue Train","image":null,"price":10,"quantity":2}]"#
                    .to_string(),
            )
            .unwrap();

        let store = CartStore::open(backend);
        assert_eq!(store.cart().quantity_of(&ProductId::new("P1")), 2);
        assert_eq!(store.cart().subtotal(), Price::whole(20));
    }

    #[test]
    fn test_store_discards_garbage() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(keys::CART, "{not a cart".to_string()).unwrap();

        let store = CartStore::open(backend);
        assert!(store.cart().is_empty());
    }
}
