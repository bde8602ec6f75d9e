//! Point-of-sale counter sales.
//!
//! A counter sale submits the [`Reconciler`]'s cart with the payment method
//! the customer used. Once the server records it the cart is emptied while
//! the displayed stock stays reduced: those units have left the shop.

use std::future::Future;
use std::sync::atomic::AtomicBool;

use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use record_shop_core::PaymentMethod;

use crate::api::{ApiError, SaleReceipt, SaleRequest};
use crate::checkout::{CheckoutError, InFlight};
use crate::reservation::Reconciler;

/// Destination for POS sales.
pub trait SaleGateway {
    /// Record a completed counter sale.
    fn record_sale(
        &self,
        token: &SecretString,
        sale: &SaleRequest,
    ) -> impl Future<Output = Result<SaleReceipt, ApiError>> + Send;
}

/// Submits counter sales.
#[derive(Debug)]
pub struct SaleSubmitter<G> {
    gateway: G,
    in_flight: AtomicBool,
}

impl<G: SaleGateway> SaleSubmitter<G> {
    /// Create a submitter recording sales through `gateway`.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self {
            gateway,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The gateway sales are sent through.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Submit the counter cart as a sale.
    ///
    /// # Errors
    ///
    /// - `InProgress` if another sale is outstanding
    /// - `EmptyCart` or `NotAuthenticated` on validation
    /// - `Api` with the server message if the sale was refused
    #[instrument(skip(self, counter, token))]
    pub async fn submit(
        &self,
        counter: &Mutex<Reconciler>,
        token: Option<&SecretString>,
        payment: PaymentMethod,
    ) -> Result<SaleReceipt, CheckoutError> {
        let Some(_guard) = InFlight::begin(&self.in_flight) else {
            return Err(CheckoutError::InProgress);
        };

        let sale = {
            let counter = counter.lock().await;
            if counter.cart().is_empty() {
                return Err(CheckoutError::EmptyCart);
            }
            SaleRequest {
                lines: counter.cart().lines().to_vec(),
                payment,
                total: counter.total(),
            }
        };
        let token = token.ok_or(CheckoutError::NotAuthenticated)?;

        let receipt = match self.gateway.record_sale(token, &sale).await {
            Ok(receipt) => receipt,
            Err(e) if e.is_accepted() => {
                warn!(error = %e, "Sale recorded with an unreadable receipt");
                SaleReceipt {
                    sale_number: None,
                    message: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Sale refused");
                return Err(e.into());
            }
        };

        let sold = counter.lock().await.complete_sale();
        info!(
            sale_number = receipt.sale_number.as_deref().unwrap_or("-"),
            units = sold.item_count(),
            total = %sale.total,
            payment = %payment,
            "Sale recorded"
        );
        Ok(receipt)
    }
}
