//! Checkout and order history.

use tracing::info;

use record_shop_core::DeliveryType;
use record_shop_storefront::checkout::CheckoutRequest;
use record_shop_storefront::error::{ClientError, add_breadcrumb};
use record_shop_storefront::session::SessionError;
use record_shop_storefront::state::ShopState;

/// Submit the cart as an order.
///
/// # Errors
///
/// Returns the validation failure or the server's refusal. The cart is kept
/// on failure.
pub async fn checkout(
    state: &ShopState,
    delivery: DeliveryType,
    accepted_terms: bool,
) -> Result<(), ClientError> {
    add_breadcrumb(
        "checkout",
        "Submitting order",
        Some(&[("delivery", delivery.as_str())]),
    );

    let token = state.session().token();
    let confirmation = state
        .checkout()
        .submit(
            state.cart(),
            token.as_ref(),
            CheckoutRequest {
                delivery,
                accepted_terms,
            },
        )
        .await?;

    info!(
        "{}",
        confirmation
            .message
            .as_deref()
            .unwrap_or("Thank you for your order")
    );
    if let Some(number) = &confirmation.order_number {
        info!("Order number: {number}");
    }
    Ok(())
}

/// List the logged-in customer's orders.
///
/// # Errors
///
/// Returns `NotAuthenticated` without a session, or the API failure.
pub async fn list(state: &ShopState) -> Result<(), ClientError> {
    let token = state
        .session()
        .token()
        .ok_or(SessionError::NotAuthenticated)?;
    let orders = state.api().my_orders(&token).await?;

    if orders.is_empty() {
        info!("You have no orders yet");
        return Ok(());
    }

    for order in &orders {
        let delivery = order.delivery.map_or("-", |d| d.as_str());
        info!(
            "#{:<8} {}  {:<12} {:<8} {:>10}",
            order.order_number,
            order.placed_at.format("%Y-%m-%d"),
            order.status,
            delivery,
            order.total.to_string()
        );
    }
    Ok(())
}
