//! Product listings for the storefront, the order page and the back office

use tracing::{debug, warn};

use crate::gateway::{fetch_records, DataGateway};
use crate::models::{Product, StockStatus};
use crate::postgrest::SelectQuery;

/// Wildcard facet value matching every flavor
pub const ALL_FLAVORS: &str = "all";

const FEATURED_LIMIT: usize = 3;

/// Which screen the product list is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogPurpose {
    /// Public listing, newest first, out-of-stock included
    Browse,
    /// Order page, orderable products only, by name
    Ordering,
    /// Back office, newest first
    Admin,
}

impl CatalogPurpose {
    pub fn query(self) -> SelectQuery {
        match self {
            CatalogPurpose::Browse | CatalogPurpose::Admin => SelectQuery::newest_first(),
            CatalogPurpose::Ordering => SelectQuery::new()
                .neq("stock_status", StockStatus::OutOfStock)
                .order("name", true),
        }
    }
}

/// What the product card offers the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallToAction {
    Order,
    Disabled,
}

pub fn call_to_action(product: &Product) -> CallToAction {
    if product.is_orderable() {
        CallToAction::Order
    } else {
        CallToAction::Disabled
    }
}

/// Load the product list for `purpose`.
///
/// A failed read yields an empty list; the caller shows its empty state.
pub async fn load_catalog(gateway: &dyn DataGateway, purpose: CatalogPurpose) -> Vec<Product> {
    match fetch_records::<Product>(gateway, &purpose.query()).await {
        Ok(products) => {
            debug!(?purpose, count = products.len(), "catalog loaded");
            products
        }
        Err(e) => {
            warn!(?purpose, error = %e, "failed to load catalog");
            Vec::new()
        }
    }
}

/// Up to three products flagged for the landing page
pub async fn load_featured(gateway: &dyn DataGateway) -> Vec<Product> {
    let query = SelectQuery::new().eq("is_featured", true).limit(FEATURED_LIMIT);
    match fetch_records::<Product>(gateway, &query).await {
        Ok(products) => products,
        Err(e) => {
            warn!(error = %e, "failed to load featured products");
            Vec::new()
        }
    }
}

/// `all` followed by each distinct flavor in listing order
pub fn facet_values(products: &[Product]) -> Vec<String> {
    let mut values = vec![ALL_FLAVORS.to_string()];
    for product in products {
        if !values.contains(&product.flavor) {
            values.push(product.flavor.clone());
        }
    }
    values
}

/// A loaded product list with a client-side flavor filter
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    selected_flavor: Option<String>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            selected_flavor: None,
        }
    }

    pub async fn load(gateway: &dyn DataGateway, purpose: CatalogPurpose) -> Self {
        Self::new(load_catalog(gateway, purpose).await)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn facets(&self) -> Vec<String> {
        facet_values(&self.products)
    }

    /// Narrow the listing to one flavor; [`ALL_FLAVORS`] clears the filter
    pub fn select_flavor(&mut self, flavor: &str) {
        self.selected_flavor = (flavor != ALL_FLAVORS).then(|| flavor.to_string());
    }

    pub fn selected_flavor(&self) -> &str {
        self.selected_flavor.as_deref().unwrap_or(ALL_FLAVORS)
    }

    pub fn visible(&self) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| match &self.selected_flavor {
                Some(flavor) => &p.flavor == flavor,
                None => true,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
