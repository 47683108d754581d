//! Orders and their fulfilment status

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::Error;
use crate::gateway::{Collection, Record};
use crate::models::blank_as_none;

pub type OrderId = Uuid;

/// Fulfilment state of an order, set by staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Statuses staff may move an order to from `self`.
    ///
    /// Delivered and cancelled are not terminal: staff can reopen an order
    /// from any state.
    pub fn allowed_transitions(self) -> &'static [OrderStatus] {
        &Self::ALL
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line of a placed order, frozen at submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OrderItem {
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub order_items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Order {
    const COLLECTION: Collection = Collection::Orders;

    fn validate(&self) -> Result<(), Error> {
        if self.total_amount.is_sign_negative() {
            return Err(Error::invalid_row(format!("order {} has a negative total", self.id)));
        }
        if let Some(item) = self
            .order_items
            .iter()
            .find(|item| item.quantity == 0 || item.price.is_sign_negative())
        {
            return Err(Error::invalid_row(format!(
                "order {} has an invalid line for {}",
                self.id, item.product_name
            )));
        }
        Ok(())
    }
}

/// Row inserted by the order workflow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub order_items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub notes: Option<String>,
}

/// Patch applied by the order status transition
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusPatch {
    pub status: OrderStatus,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_stored_order() {
        let order: Order = serde_json::from_value(json!({
            "id": "0b7c1d55-8f0e-4a57-b0a1-2a7e7f5d9c11",
            "customer_name": "Thandi",
            "customer_email": "thandi@example.com",
            "customer_phone": "0821234567",
            "delivery_address": "12 Main Rd",
            "order_items": [
                { "product_id": "7d9f2c1e-3b7a-4c55-9a53-1f6f0f7d2a10", "product_name": "Strawberry", "quantity": 2, "price": 25 },
                { "product_id": "5a3e8d0c-1c44-4b5e-8f2a-6b9d0c1e2f33", "product_name": "Chocolate", "quantity": 1, "price": 30.0 }
            ],
            "total_amount": 80,
            "status": "confirmed",
            "notes": "",
            "created_at": "2024-03-01T08:00:00+00:00",
            "updated_at": "2024-03-01T08:00:00+00:00"
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.notes, None);
        assert_eq!(order.order_items[0].subtotal(), Decimal::from(50));
        assert_eq!(order.total_amount, Decimal::from(80));
        assert!(order.validate().is_ok());
    }

    #[test]
    fn cancelled_and_delivered_are_not_terminal() {
        assert!(OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Preparing));
        assert_eq!(OrderStatus::Pending.allowed_transitions().len(), 5);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(OrderStatus::Delivered).unwrap(), json!("delivered"));
        assert_eq!(OrderStatus::Preparing.to_string(), "preparing");
    }
}
