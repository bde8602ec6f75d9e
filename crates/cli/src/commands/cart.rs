//! Customer cart commands.

use tracing::info;

use record_shop_core::ProductId;
use record_shop_storefront::error::{ClientError, add_breadcrumb};
use record_shop_storefront::reservation::ReservationError;
use record_shop_storefront::state::ShopState;

/// Print the cart lines and subtotal.
pub async fn show(state: &ShopState) {
    let store = state.cart().lock().await;
    let cart = store.cart();
    if cart.is_empty() {
        info!("Your cart is empty");
        return;
    }

    for line in cart.lines() {
        info!(
            "{:<10} {:<40} {:>3} x {:>10} = {:>10}",
            line.id,
            line.name,
            line.quantity,
            line.price.to_string(),
            line.line_total().to_string()
        );
    }
    info!("{} items, subtotal {}", cart.item_count(), cart.subtotal());
}

/// Add one unit of a product, looked up on the server.
///
/// # Errors
///
/// Returns an error if the product cannot be fetched, is sold out, or the
/// cart cannot be saved.
pub async fn add(state: &ShopState, id: &ProductId) -> Result<(), ClientError> {
    let product = state.api().product(id).await?;
    if !product.in_stock() {
        return Err(ReservationError::InsufficientStock {
            id: product.id,
            requested: 1,
            available: 0,
        }
        .into());
    }

    let mut store = state.cart().lock().await;
    store.add(&product)?;
    add_breadcrumb("cart", "Added product", Some(&[("product_id", id.as_str())]));
    info!(
        "Added {} ({} in cart)",
        product.name,
        store.cart().quantity_of(id)
    );
    Ok(())
}

/// Set the quantity of a line already in the cart.
///
/// # Errors
///
/// Returns `BadRequest` if the product is not in the cart, or an error if
/// the cart cannot be saved.
pub async fn set(state: &ShopState, id: &ProductId, quantity: i64) -> Result<(), ClientError> {
    let mut store = state.cart().lock().await;
    if store.cart().get(id).is_none() {
        return Err(ClientError::BadRequest(format!("{id} is not in your cart")));
    }

    store.update_quantity(id, quantity)?;
    let quantity = quantity.to_string();
    add_breadcrumb(
        "cart",
        "Updated quantity",
        Some(&[("product_id", id.as_str()), ("quantity", quantity.as_str())]),
    );
    info!("{id}: {} in cart", store.cart().quantity_of(id));
    Ok(())
}

/// Remove a line from the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub async fn remove(state: &ShopState, id: &ProductId) -> Result<(), ClientError> {
    state.cart().lock().await.remove(id)?;
    add_breadcrumb("cart", "Removed product", Some(&[("product_id", id.as_str())]));
    info!("Removed {id}");
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub async fn clear(state: &ShopState) -> Result<(), ClientError> {
    state.cart().lock().await.clear()?;
    add_breadcrumb("cart", "Cleared cart", None);
    info!("Cart cleared");
    Ok(())
}
