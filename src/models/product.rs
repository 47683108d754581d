//! Catalog products and their stock status

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::Error;
use crate::gateway::{Collection, Record};
use crate::models::nullable_string;

/// Staff-set availability label; not tied to any stock count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub const ALL: [StockStatus; 3] = [
        StockStatus::InStock,
        StockStatus::LowStock,
        StockStatus::OutOfStock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }

    /// Staff may set any status from any status
    pub fn allowed_transitions(self) -> &'static [StockStatus] {
        &Self::ALL
    }

    pub fn can_transition_to(self, next: StockStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_orderable(self) -> bool {
        self != StockStatus::OutOfStock
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub flavor: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "nullable_string")]
    pub image_url: String,
    pub stock_status: StockStatus,
    #[serde(default)]
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_orderable(&self) -> bool {
        self.stock_status.is_orderable()
    }
}

impl Record for Product {
    const COLLECTION: Collection = Collection::Products;

    fn validate(&self) -> Result<(), Error> {
        if self.price.is_sign_negative() {
            return Err(Error::invalid_row(format!(
                "product {} has negative price {}",
                self.id, self.price
            )));
        }
        Ok(())
    }
}

/// Patch applied by the stock-status transition
#[derive(Debug, Clone, Serialize)]
pub struct StockStatusPatch {
    pub stock_status: StockStatus,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(price: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "7d9f2c1e-3b7a-4c55-9a53-1f6f0f7d2a10",
            "name": "Strawberry Swirl",
            "flavor": "strawberry",
            "description": null,
            "price": price,
            "image_url": "https://cdn.example.com/strawberry.png",
            "stock_status": "low_stock",
            "is_featured": true,
            "created_at": "2024-03-01T08:00:00+00:00",
            "updated_at": "2024-03-02T08:00:00+00:00"
        })
    }

    #[test]
    fn parses_row_with_numeric_price() {
        let product: Product = serde_json::from_value(row(json!(25.5))).unwrap();
        assert_eq!(product.price, Decimal::new(255, 1));
        assert_eq!(product.stock_status, StockStatus::LowStock);
        assert_eq!(product.description, "");
        assert!(product.is_orderable());
        assert!(product.validate().is_ok());
    }

    #[test]
    fn negative_price_fails_validation() {
        let product: Product = serde_json::from_value(row(json!(-1))).unwrap();
        assert!(matches!(product.validate(), Err(Error::InvalidRow(_))));
    }

    #[test]
    fn every_stock_transition_is_allowed() {
        for from in StockStatus::ALL {
            for to in StockStatus::ALL {
                assert!(from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn out_of_stock_is_not_orderable() {
        assert!(!StockStatus::OutOfStock.is_orderable());
        assert_eq!(serde_json::to_value(StockStatus::OutOfStock).unwrap(), json!("out_of_stock"));
    }
}
