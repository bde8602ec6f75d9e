//! Catalog snapshots.
//!
//! A [`CatalogSnapshot`] is the most recently fetched page of products. Its
//! stock counts are the server's numbers at fetch time minus whatever the
//! local POS cart has reserved since; they are a display aid, never an
//! authoritative inventory figure. Refetching replaces the page wholesale.

use serde::{Deserialize, Serialize};

use record_shop_core::{CategoryId, Price, ProductId};

/// Default number of products per catalog page.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Product identifier.
    #[serde(alias = "_id")]
    pub id: ProductId,
    /// Display name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Unit price.
    #[serde(rename = "precio")]
    pub price: Price,
    /// Units in stock, less local reservations.
    #[serde(rename = "cantidad")]
    pub quantity_available: u32,
    /// Category the product is filed under.
    #[serde(rename = "categoria")]
    pub category: CategoryId,
    /// Cover image URL.
    #[serde(rename = "imagen", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CatalogProduct {
    /// Whether at least one unit can still be reserved.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity_available > 0
    }
}

/// Which page of the catalog to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// 1-based page number.
    pub page: u32,
    /// Products per page.
    pub per_page: u32,
    /// Restrict to one category.
    pub category: Option<CategoryId>,
    /// Free-text search on product names.
    pub search: Option<String>,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
            category: None,
            search: None,
        }
    }
}

impl CatalogQuery {
    /// Query parameters as sent to `GET /producto/listar`.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("pagina", self.page.max(1).to_string()),
            ("limite", self.per_page.to_string()),
        ];
        if let Some(category) = &self.category {
            pairs.push(("categoria", category.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            pairs.push(("buscar", search.to_owned()));
        }
        pairs
    }
}

/// One fetched page of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogSnapshot {
    query: CatalogQuery,
    products: Vec<CatalogProduct>,
    total_pages: u32,
}

impl CatalogSnapshot {
    /// Build a snapshot from a fetched page.
    #[must_use]
    pub fn new(query: CatalogQuery, products: Vec<CatalogProduct>, total_pages: u32) -> Self {
        Self {
            query,
            products,
            total_pages,
        }
    }

    /// The query this page answers.
    #[must_use]
    pub const fn query(&self) -> &CatalogQuery {
        &self.query
    }

    /// Products on this page, in server order.
    #[must_use]
    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    /// Total number of pages for the query.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Whether no later page exists.
    #[must_use]
    pub const fn is_last_page(&self) -> bool {
        self.query.page >= self.total_pages
    }

    /// Look up a product on this page.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CatalogProduct> {
        self.products.iter().find(|p| &p.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &ProductId) -> Option<&mut CatalogProduct> {
        self.products.iter_mut().find(|p| &p.id == id)
    }
}
