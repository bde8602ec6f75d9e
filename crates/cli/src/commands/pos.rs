//! Point-of-sale counter commands.

use tokio::sync::Mutex;
use tracing::info;

use record_shop_core::{CategoryId, PaymentMethod, ProductId};
use record_shop_storefront::catalog::CatalogQuery;
use record_shop_storefront::error::{ClientError, add_breadcrumb};
use record_shop_storefront::reservation::Reconciler;
use record_shop_storefront::state::ShopState;

/// Parse an `ID` or `ID:QUANTITY` item argument.
///
/// # Errors
///
/// Returns a message if the id is empty or the quantity is not a positive
/// number.
pub fn parse_item(s: &str) -> Result<(ProductId, u32), String> {
    let (id, quantity) = match s.rsplit_once(':') {
        Some((id, quantity)) => {
            let quantity: u32 = quantity
                .trim()
                .parse()
                .map_err(|_| format!("invalid quantity in '{s}'"))?;
            (id, quantity)
        }
        None => (s, 1),
    };

    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing product id in '{s}'"));
    }
    if quantity == 0 {
        return Err(format!("quantity must be at least 1 in '{s}'"));
    }
    Ok((ProductId::new(id), quantity))
}

/// Reserve `items` against one catalog page and record the sale.
///
/// # Errors
///
/// Returns an error if the user is not an admin, an item is not on the page
/// or lacks stock, or the server refuses the sale.
pub async fn sell(
    state: &ShopState,
    items: &[(ProductId, u32)],
    payment: PaymentMethod,
    page: u32,
    category: Option<CategoryId>,
    search: Option<String>,
) -> Result<(), ClientError> {
    let token = state.session().require_admin()?;

    let query = CatalogQuery {
        page,
        per_page: state.config().page_size,
        category,
        search,
    };
    let snapshot = state.api().products(&query).await?;
    let mut counter = Reconciler::new(snapshot);

    for (id, quantity) in items {
        counter.add(id)?;
        if *quantity > 1 {
            let target = counter.cart().quantity_of(id).saturating_add(quantity - 1);
            counter.update_quantity(id, i64::from(target))?;
        }
        add_breadcrumb("pos", "Reserved product", Some(&[("product_id", id.as_str())]));
    }

    for line in counter.cart().lines() {
        info!("{:<10} {:<40} {:>3}", line.id, line.name, line.quantity);
    }
    info!("Total {}", counter.total());

    let counter = Mutex::new(counter);
    let receipt = state.pos().submit(&counter, Some(&token), payment).await?;

    info!("{}", receipt.message.as_deref().unwrap_or("Sale recorded"));
    if let Some(number) = &receipt.sale_number {
        info!("Sale number: {number}");
    }
    Ok(())
}
