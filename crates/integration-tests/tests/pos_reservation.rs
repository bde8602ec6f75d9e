//! Counter reservations against a catalog page.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use proptest::test_runner::Config;
use secrecy::SecretString;
use tokio::sync::Mutex;

use record_shop_core::{PaymentMethod, ProductId};
use record_shop_integration_tests::{page, product};
use record_shop_storefront::api::{ApiError, SaleReceipt, SaleRequest};
use record_shop_storefront::pos::{SaleGateway, SaleSubmitter};
use record_shop_storefront::reservation::{Reconciler, ReservationError};

const STOCK: [u32; 3] = [0, 2, 5];

fn counter() -> Reconciler {
    Reconciler::new(page(vec![
        product("P0", 12, STOCK[0]),
        product("P1", 20, STOCK[1]),
        product("P2", 8, STOCK[2]),
    ]))
}

fn id(index: usize) -> ProductId {
    ProductId::new(format!("P{index}"))
}

fn available(counter: &Reconciler, index: usize) -> u32 {
    counter.snapshot().get(&id(index)).unwrap().quantity_available
}

/// Cart lines and page stock, for comparing states.
fn observe(counter: &Reconciler) -> (Vec<(ProductId, u32)>, Vec<u32>) {
    let lines = counter
        .cart()
        .lines()
        .iter()
        .map(|l| (l.id.clone(), l.quantity))
        .collect();
    let stock = (0..STOCK.len()).map(|i| available(counter, i)).collect();
    (lines, stock)
}

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
    Update(usize, i64),
    Cancel,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..STOCK.len()).prop_map(Op::Add),
        1 => (0..STOCK.len()).prop_map(Op::Remove),
        3 => ((0..STOCK.len()), -2_i64..8).prop_map(|(i, q)| Op::Update(i, q)),
        1 => Just(Op::Cancel),
    ]
}

proptest! {
    #![proptest_config(Config::with_cases(256))]
    #[test]
    fn reservations_conserve_stock(ops in proptest::collection::vec(op(), 0..40)) {
        let mut counter = counter();

        for op in ops {
            let before = observe(&counter);
            let result = match op {
                Op::Add(i) => counter.add(&id(i)),
                Op::Remove(i) => {
                    counter.remove(&id(i));
                    Ok(())
                }
                Op::Update(i, q) => counter.update_quantity(&id(i), q),
                Op::Cancel => {
                    counter.cancel();
                    Ok(())
                }
            };
            if result.is_err() {
                prop_assert_eq!(observe(&counter), before);
            }

            for line in counter.cart().lines() {
                prop_assert!(line.quantity > 0);
            }
            for (i, stock) in STOCK.iter().enumerate() {
                let reserved = counter.cart().quantity_of(&id(i));
                prop_assert_eq!(available(&counter, i) + reserved, *stock);
            }
            let mut ids: Vec<_> = counter.cart().lines().iter().map(|l| l.id.clone()).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), counter.cart().len());
        }
    }
}

#[test]
fn test_sold_out_product_is_refused() {
    let mut counter = counter();

    let err = counter.add(&id(0)).unwrap_err();

    assert_eq!(
        err,
        ReservationError::InsufficientStock {
            id: id(0),
            requested: 1,
            available: 0,
        }
    );
    assert!(counter.cart().is_empty());
    assert_eq!(available(&counter, 0), 0);
}

#[test]
fn test_update_to_zero_restores_stock() {
    let mut counter = counter();
    counter.add(&id(1)).unwrap();
    counter.add(&id(1)).unwrap();
    assert_eq!(available(&counter, 1), 0);

    counter.update_quantity(&id(1), 0).unwrap();

    assert!(counter.cart().is_empty());
    assert_eq!(available(&counter, 1), 2);
}

#[test]
fn test_increase_beyond_stock_is_refused() {
    let mut counter = counter();
    counter.add(&id(1)).unwrap();

    let err = counter.update_quantity(&id(1), 3).unwrap_err();

    assert!(matches!(
        err,
        ReservationError::InsufficientStock {
            requested: 2,
            available: 1,
            ..
        }
    ));
    assert_eq!(counter.cart().quantity_of(&id(1)), 1);
    assert_eq!(available(&counter, 1), 1);
}

#[test]
fn test_refetch_discards_reservations_but_keeps_cart() {
    let mut counter = counter();
    counter.add(&id(2)).unwrap();
    counter.add(&id(2)).unwrap();

    counter.replace_snapshot(page(vec![product("P2", 8, 5)]));

    assert_eq!(available(&counter, 2), 5);
    assert_eq!(counter.cart().quantity_of(&id(2)), 2);
}

struct Register;

impl SaleGateway for Register {
    async fn record_sale(
        &self,
        _token: &SecretString,
        sale: &SaleRequest,
    ) -> Result<SaleReceipt, ApiError> {
        assert_eq!(sale.payment, PaymentMethod::Transfer);
        assert_eq!(sale.total.to_string(), "$36.00");
        Ok(SaleReceipt {
            sale_number: Some("V-9".to_string()),
            message: Some("Venta registrada".to_string()),
        })
    }
}

#[tokio::test]
async fn test_sale_keeps_sold_units_off_the_page() {
    let mut reconciler = counter();
    reconciler.add(&id(1)).unwrap();
    reconciler.add(&id(2)).unwrap();
    reconciler.update_quantity(&id(2), 2).unwrap();
    let counter = Mutex::new(reconciler);
    let token = SecretString::from("admin");

    let receipt = SaleSubmitter::new(Register)
        .submit(&counter, Some(&token), PaymentMethod::Transfer)
        .await
        .unwrap();

    assert_eq!(receipt.sale_number.as_deref(), Some("V-9"));
    let counter = counter.lock().await;
    assert!(counter.cart().is_empty());
    assert_eq!(available(&counter, 1), 1);
    assert_eq!(available(&counter, 2), 3);
}
