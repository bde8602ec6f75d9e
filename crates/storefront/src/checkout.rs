//! Customer checkout.
//!
//! [`CheckoutSubmitter`] validates the cart and the customer's choices,
//! sends the order exactly once, and empties the cart when the server
//! accepts it. Validation failures never reach the network; server failures
//! leave the cart untouched for the customer to try again.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::SecretString;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use record_shop_core::DeliveryType;

use crate::api::{ApiError, OrderConfirmation, OrderRequest};
use crate::cart::CartStore;

/// Destination for customer orders.
pub trait OrderGateway {
    /// Create an order from the cart payload.
    fn place_order(
        &self,
        token: &SecretString,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, ApiError>> + Send;
}

/// Errors surfaced by checkout and POS submission.
///
/// Every variant except `Api` is raised before any network call.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to submit.
    #[error("Your cart is empty, add products first")]
    EmptyCart,

    /// The customer has not accepted the terms and conditions.
    #[error("You must accept the terms and conditions")]
    TermsNotAccepted,

    /// No auth token in the session.
    #[error("Please log in to continue")]
    NotAuthenticated,

    /// A submission is already waiting for the server.
    #[error("An order is already being submitted")]
    InProgress,

    /// The server refused the submission or could not be reached.
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Whether this is a validation failure raised before the network.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(self, Self::Api(_))
    }
}

/// What the customer chose at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckoutRequest {
    /// Pickup or shipping.
    pub delivery: DeliveryType,
    /// Explicit acceptance of the terms and conditions.
    pub accepted_terms: bool,
}

/// Marks a submission as outstanding until dropped.
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    /// Claim the flag, or `None` if a submission is already outstanding.
    pub(crate) fn begin(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Submits the cart as a customer order.
#[derive(Debug)]
pub struct CheckoutSubmitter<G> {
    gateway: G,
    in_flight: AtomicBool,
}

impl<G: OrderGateway> CheckoutSubmitter<G> {
    /// Create a submitter sending orders through `gateway`.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self {
            gateway,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a submission is waiting for the server.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The gateway orders are sent through.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Validate and submit the cart.
    ///
    /// The cart lock is held only to read the lines and, after success, to
    /// clear them; it is not held while waiting for the server.
    ///
    /// # Errors
    ///
    /// - `InProgress` if another submission is outstanding
    /// - `EmptyCart`, `TermsNotAccepted`, `NotAuthenticated` on validation
    /// - `Api` with the server message if the order was refused
    #[instrument(skip(self, cart, token))]
    pub async fn submit(
        &self,
        cart: &Mutex<CartStore>,
        token: Option<&SecretString>,
        request: CheckoutRequest,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let Some(_guard) = InFlight::begin(&self.in_flight) else {
            warn!("Checkout already in progress");
            return Err(CheckoutError::InProgress);
        };

        let order = {
            let store = cart.lock().await;
            let current = store.cart();
            if current.is_empty() {
                return Err(CheckoutError::EmptyCart);
            }
            OrderRequest {
                lines: current.lines().to_vec(),
                delivery: request.delivery,
                accepted_terms: request.accepted_terms,
                total: current.subtotal(),
            }
        };
        if !request.accepted_terms {
            return Err(CheckoutError::TermsNotAccepted);
        }
        let token = token.ok_or(CheckoutError::NotAuthenticated)?;

        let confirmation = match self.gateway.place_order(token, &order).await {
            Ok(confirmation) => confirmation,
            // The order exists even though its confirmation was unreadable.
            Err(e) if e.is_accepted() => {
                error!(error = %e, "Order accepted with an unreadable confirmation");
                OrderConfirmation {
                    order_number: None,
                    message: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Order refused");
                return Err(e.into());
            }
        };

        // The order exists server-side; a failed local write must not turn
        // it into an error the customer might retry.
        if let Err(e) = cart.lock().await.clear() {
            error!(error = %e, "Order placed but cart could not be cleared");
        }

        info!(
            order_number = confirmation.order_number.as_ref().map_or("-", |n| n.as_str()),
            total = %order.total,
            "Order placed"
        );
        Ok(confirmation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use record_shop_core::{CategoryId, OrderNumber, Price, ProductId};

    use super::*;
    use crate::catalog::CatalogProduct;
    use crate::storage::MemoryStore;

    #[derive(Default)]
    struct FakeGateway {
        calls: AtomicUsize,
        refuse_with: Option<String>,
    }

    impl OrderGateway for FakeGateway {
        async fn place_order(
            &self,
            _token: &SecretString,
            _order: &OrderRequest,
        ) -> Result<OrderConfirmation, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.refuse_with {
                Some(message) => Err(ApiError::Rejected {
                    status: 400,
                    message: message.clone(),
                }),
                None => Ok(OrderConfirmation {
                    order_number: Some(OrderNumber::new("1234")),
                    message: Some("Gracias por tu compra".to_string()),
                }),
            }
        }
    }

    fn cart_with(ids: &[&str]) -> Mutex<CartStore> {
        let mut store = CartStore::open(Arc::new(MemoryStore::new()));
        for id in ids {
            store
                .add(&CatalogProduct {
                    id: ProductId::new(*id),
                    name: format!("Record {id}"),
                    price: Price::whole(10),
                    quantity_available: 1,
                    category: CategoryId::new("vinyl"),
                    image: None,
                })
                .unwrap();
        }
        Mutex::new(store)
    }

    fn token() -> SecretString {
        SecretString::from("token-abc")
    }

    fn accepted() -> CheckoutRequest {
        CheckoutRequest {
            delivery: DeliveryType::Pickup,
            accepted_terms: true,
        }
    }

    #[tokio::test]
    async fn test_empty_cart_never_calls_gateway() {
        let submitter = CheckoutSubmitter::new(FakeGateway::default());
        let err = submitter
            .submit(&cart_with(&[]), Some(&token()), accepted())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(err.to_string().contains("add products first"));
        assert_eq!(submitter.gateway().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_terms_must_be_accepted() {
        let submitter = CheckoutSubmitter::new(FakeGateway::default());
        let err = submitter
            .submit(
                &cart_with(&["P1"]),
                Some(&token()),
                CheckoutRequest::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::TermsNotAccepted));
        assert_eq!(submitter.gateway().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_requires_token() {
        let submitter = CheckoutSubmitter::new(FakeGateway::default());
        let err = submitter
            .submit(&cart_with(&["P1"]), None, accepted())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::NotAuthenticated));
        assert_eq!(submitter.gateway().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_clears_cart() {
        let submitter = CheckoutSubmitter::new(FakeGateway::default());
        let cart = cart_with(&["P1", "P2"]);

        let confirmation = submitter
            .submit(&cart, Some(&token()), accepted())
            .await
            .unwrap();

        assert_eq!(confirmation.order_number, Some(OrderNumber::new("1234")));
        assert!(cart.lock().await.cart().is_empty());
        assert!(!submitter.is_submitting());
    }

    #[tokio::test]
    async fn test_refusal_keeps_cart() {
        let submitter = CheckoutSubmitter::new(FakeGateway {
            refuse_with: Some("Stock insuficiente".to_string()),
            ..FakeGateway::default()
        });
        let cart = cart_with(&["P1"]);

        let err = submitter
            .submit(&cart, Some(&token()), accepted())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Stock insuficiente");
        assert!(!err.is_validation());
        assert_eq!(cart.lock().await.cart().item_count(), 1);
        assert_eq!(submitter.gateway().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_in_flight_flag_is_exclusive() {
        let flag = AtomicBool::new(false);
        let guard = InFlight::begin(&flag).unwrap();
        assert!(InFlight::begin(&flag).is_none());
        drop(guard);
        assert!(InFlight::begin(&flag).is_some());
    }
}
