//! Catalog browsing.

use tracing::info;

use record_shop_core::CategoryId;
use record_shop_storefront::catalog::CatalogQuery;
use record_shop_storefront::error::ClientError;
use record_shop_storefront::state::ShopState;

/// List one catalog page.
///
/// An explicit category is remembered for later calls; `all_categories`
/// forgets it.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched.
pub async fn list(
    state: &ShopState,
    page: u32,
    category: Option<CategoryId>,
    all_categories: bool,
    search: Option<String>,
) -> Result<(), ClientError> {
    if all_categories {
        state.session().set_selected_category(None)?;
    } else if let Some(category) = &category {
        state.session().set_selected_category(Some(category))?;
    }

    let query = CatalogQuery {
        page,
        per_page: state.config().page_size,
        category: state.session().selected_category(),
        search,
    };
    let snapshot = state.api().products(&query).await?;

    if snapshot.products().is_empty() {
        info!("No products found");
        return Ok(());
    }

    for product in snapshot.products() {
        let stock = if product.in_stock() {
            format!("{} in stock", product.quantity_available)
        } else {
            "sold out".to_string()
        };
        info!(
            "{:<10} {:<40} {:>10}  {}",
            product.id, product.name, product.price.to_string(), stock
        );
    }
    info!("Page {} of {}", snapshot.query().page, snapshot.total_pages());
    Ok(())
}
