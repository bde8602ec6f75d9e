//! Point-of-sale stock reservation.
//!
//! The POS screen shows a catalog page next to a counter cart. Moving units
//! into the cart lowers the stock shown for that product; taking them out
//! puts the units back. [`Reconciler`] keeps the two in step so that, for
//! every product on the current page,
//!
//! ```text
//! quantity_available + units in cart == stock at fetch time
//! ```
//!
//! These reservations exist only in this process. The server never hears of
//! them until the sale is submitted, and [`Reconciler::replace_snapshot`]
//! throws them away in favour of fresh server numbers.

use thiserror::Error;
use tracing::{debug, warn};

use record_shop_core::{Price, ProductId};

use crate::cart::{Cart, CartLineItem};
use crate::catalog::CatalogSnapshot;

/// Reasons a reservation change is refused. Refusals never change state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    /// Not enough displayed stock for the requested units.
    #[error("insufficient stock for {id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product that ran out.
        id: ProductId,
        /// Additional units requested.
        requested: u32,
        /// Units still shown as available.
        available: u32,
    },

    /// The product is not on the current catalog page.
    #[error("product {0} is not in the current catalog page")]
    UnknownProduct(ProductId),
}

/// Couples a catalog page with the POS cart.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    snapshot: CatalogSnapshot,
    cart: Cart,
}

impl Reconciler {
    /// Start reserving against `snapshot` with an empty cart.
    #[must_use]
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot,
            cart: Cart::new(),
        }
    }

    /// The catalog page with local reservations applied.
    #[must_use]
    pub const fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    /// The counter cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Counter total.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.subtotal()
    }

    /// Reserve one unit of `id` from the current page.
    ///
    /// # Errors
    ///
    /// - `UnknownProduct` if `id` is not on the current page
    /// - `InsufficientStock` if no units are shown as available
    pub fn add(&mut self, id: &ProductId) -> Result<(), ReservationError> {
        let product = self
            .snapshot
            .get_mut(id)
            .ok_or_else(|| ReservationError::UnknownProduct(id.clone()))?;

        if product.quantity_available == 0 {
            warn!(product_id = %id, "Cannot reserve: out of stock");
            return Err(ReservationError::InsufficientStock {
                id: id.clone(),
                requested: 1,
                available: 0,
            });
        }

        product.quantity_available -= 1;
        self.cart.add(product);
        debug!(
            product_id = %id,
            remaining = product.quantity_available,
            "Reserved one unit"
        );
        Ok(())
    }

    /// Release every unit of `id` back to the page and drop the line.
    ///
    /// Returns the removed line, or `None` if `id` was not in the cart.
    pub fn remove(&mut self, id: &ProductId) -> Option<CartLineItem> {
        let line = self.cart.remove(id)?;
        self.restore(id, line.quantity);
        Some(line)
    }

    /// Set the reserved quantity of a cart line; `quantity <= 0` removes it.
    ///
    /// Ids not in the cart are ignored.
    ///
    /// # Errors
    ///
    /// - `InsufficientStock` if the increase exceeds the units shown as available
    /// - `UnknownProduct` if the quantity grows for a product no longer on the page
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<(), ReservationError> {
        let current = self.cart.quantity_of(id);
        if current == 0 {
            return Ok(());
        }
        if quantity <= 0 {
            self.remove(id);
            return Ok(());
        }

        let target = u32::try_from(quantity).unwrap_or(u32::MAX);
        if target > current {
            let extra = target - current;
            let product = self
                .snapshot
                .get_mut(id)
                .ok_or_else(|| ReservationError::UnknownProduct(id.clone()))?;
            if extra > product.quantity_available {
                warn!(
                    product_id = %id,
                    requested = extra,
                    available = product.quantity_available,
                    "Cannot reserve: insufficient stock"
                );
                return Err(ReservationError::InsufficientStock {
                    id: id.clone(),
                    requested: extra,
                    available: product.quantity_available,
                });
            }
            product.quantity_available -= extra;
        } else {
            self.restore(id, current - target);
        }

        self.cart.update_quantity(id, i64::from(target));
        Ok(())
    }

    /// Abandon the sale: release every reservation and empty the cart.
    pub fn cancel(&mut self) {
        let lines: Vec<CartLineItem> = self.cart.lines().to_vec();
        for line in lines {
            self.remove(&line.id);
        }
    }

    /// Empty the cart without releasing stock, after the sale went through.
    pub fn complete_sale(&mut self) -> Cart {
        std::mem::take(&mut self.cart)
    }

    /// Install a freshly fetched page.
    ///
    /// The new page's numbers are taken as-is: reservations applied to the
    /// previous page are not carried over. The cart is kept.
    pub fn replace_snapshot(&mut self, snapshot: CatalogSnapshot) {
        self.snapshot = snapshot;
    }

    fn restore(&mut self, id: &ProductId, units: u32) {
        if let Some(product) = self.snapshot.get_mut(id) {
            product.quantity_available = product.quantity_available.saturating_add(units);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use record_shop_core::CategoryId;

    use super::*;
    use crate::catalog::{CatalogProduct, CatalogQuery};

    fn snapshot(stock: &[(&str, u32)]) -> CatalogSnapshot {
        let products = stock
            .iter()
            .map(|(id, qty)| CatalogProduct {
                id: ProductId::new(*id),
                name: format!("Record {id}"),
                price: Price::whole(10),
                quantity_available: *qty,
                category: CategoryId::new("vinyl"),
                image: None,
            })
            .collect();
        CatalogSnapshot::new(CatalogQuery::default(), products, 1)
    }

    fn available(reconciler: &Reconciler, id: &str) -> u32 {
        reconciler
            .snapshot()
            .get(&ProductId::new(id))
            .unwrap()
            .quantity_available
    }

    #[test]
    fn test_add_reserves_one_unit() {
        let mut pos = Reconciler::new(snapshot(&[("P1", 3)]));
        pos.add(&ProductId::new("P1")).unwrap();
        pos.add(&ProductId::new("P1")).unwrap();

        assert_eq!(available(&pos, "P1"), 1);
        assert_eq!(pos.cart().quantity_of(&ProductId::new("P1")), 2);
    }

    #[test]
    fn test_add_out_of_stock_changes_nothing() {
        let mut pos = Reconciler::new(snapshot(&[("P2", 0)]));
        let err = pos.add(&ProductId::new("P2")).unwrap_err();

        assert!(matches!(err, ReservationError::InsufficientStock { available: 0, .. }));
        assert!(pos.cart().is_empty());
        assert_eq!(available(&pos, "P2"), 0);
    }

    #[test]
    fn test_add_unknown_product() {
        let mut pos = Reconciler::new(snapshot(&[("P1", 3)]));
        assert_eq!(
            pos.add(&ProductId::new("P9")),
            Err(ReservationError::UnknownProduct(ProductId::new("P9")))
        );
    }

    #[test]
    fn test_remove_restores_all_units() {
        let mut pos = Reconciler::new(snapshot(&[("P1", 3)]));
        pos.add(&ProductId::new("P1")).unwrap();
        pos.add(&ProductId::new("P1")).unwrap();

        let line = pos.remove(&ProductId::new("P1")).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(available(&pos, "P1"), 3);
        assert!(pos.cart().is_empty());
    }

    #[test]
    fn test_update_applies_inverse_delta() {
        let mut pos = Reconciler::new(snapshot(&[("P1", 5)]));
        pos.add(&ProductId::new("P1")).unwrap();

        pos.update_quantity(&ProductId::new("P1"), 4).unwrap();
        assert_eq!(available(&pos, "P1"), 1);

        pos.update_quantity(&ProductId::new("P1"), 2).unwrap();
        assert_eq!(available(&pos, "P1"), 3);
    }

    #[test]
    fn test_update_beyond_stock_is_rejected() {
        let mut pos = Reconciler::new(snapshot(&[("P1", 2)]));
        pos.add(&ProductId::new("P1")).unwrap();

        let err = pos.update_quantity(&ProductId::new("P1"), 5).unwrap_err();
        assert_eq!(
            err,
            ReservationError::InsufficientStock {
                id: ProductId::new("P1"),
                requested: 4,
                available: 1,
            }
        );
        assert_eq!(pos.cart().quantity_of(&ProductId::new("P1")), 1);
        assert_eq!(available(&pos, "P1"), 1);
    }

    #[test]
    fn test_update_to_zero_releases() {
        let mut pos = Reconciler::new(snapshot(&[("P1", 2)]));
        pos.add(&ProductId::new("P1")).unwrap();
        pos.update_quantity(&ProductId::new("P1"), 0).unwrap();

        assert!(pos.cart().is_empty());
        assert_eq!(available(&pos, "P1"), 2);
    }

    #[test]
    fn test_cancel_releases_everything() {
        let mut pos = Reconciler::new(snapshot(&[("P1", 2), ("P2", 4)]));
        pos.add(&ProductId::new("P1")).unwrap();
        pos.add(&ProductId::new("P2")).unwrap();
        pos.add(&ProductId::new("P2")).unwrap();
        pos.cancel();

        assert!(pos.cart().is_empty());
        assert_eq!(available(&pos, "P1"), 2);
        assert_eq!(available(&pos, "P2"), 4);
    }

    #[test]
    fn test_complete_sale_keeps_stock_decremented() {
        let mut pos = Reconciler::new(snapshot(&[("P1", 2)]));
        pos.add(&ProductId::new("P1")).unwrap();

        let sold = pos.complete_sale();
        assert_eq!(sold.item_count(), 1);
        assert!(pos.cart().is_empty());
        assert_eq!(available(&pos, "P1"), 1);
    }

    #[test]
    fn test_replace_snapshot_discards_reservations() {
        let mut pos = Reconciler::new(snapshot(&[("P1", 3)]));
        pos.add(&ProductId::new("P1")).unwrap();
        pos.replace_snapshot(snapshot(&[("P1", 3)]));

        assert_eq!(available(&pos, "P1"), 3);
        assert_eq!(pos.cart().quantity_of(&ProductId::new("P1")), 1);
    }

    #[test]
    fn test_remove_off_page_product_only_touches_cart() {
        let mut pos = Reconciler::new(snapshot(&[("P1", 3)]));
        pos.add(&ProductId::new("P1")).unwrap();
        pos.replace_snapshot(snapshot(&[("P2", 1)]));

        assert!(pos.remove(&ProductId::new("P1")).is_some());
        assert_eq!(available(&pos, "P2"), 1);
    }
}
