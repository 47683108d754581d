//! Order submission: cart plus delivery details become one `orders` row

use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::cart::Cart;
use crate::error::{Error, SubmitError, ValidationError};
use crate::gateway::{Collection, DynDataGateway};
use crate::models::{NewOrder, OrderId, OrderStatus};
use crate::submission::SubmissionState;

const ORDER_FAILED: &str = "Error placing order. Please try again.";

/// Delivery details entered by the customer
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct OrderForm {
    #[validate(length(min = 1))]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: String,
    #[validate(length(min = 1))]
    pub customer_phone: String,
    #[validate(length(min = 1))]
    pub delivery_address: String,
    pub notes: String,
}

/// Cart, form and submission state of the order page
pub struct OrderWorkflow {
    gateway: DynDataGateway,
    cart: Cart,
    form: OrderForm,
    state: SubmissionState,
}

impl OrderWorkflow {
    pub fn new(gateway: DynDataGateway, notice_duration: Duration) -> Self {
        Self {
            gateway,
            cart: Cart::new(),
            form: OrderForm::default(),
            state: SubmissionState::new(notice_duration),
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn form(&self) -> &OrderForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut OrderForm {
        &mut self.form
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_in_flight()
    }

    pub fn success_visible(&self) -> bool {
        self.state.success_visible()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Validate and freeze the current cart into an order row
    pub fn build_order(&self) -> Result<NewOrder, ValidationError> {
        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        self.form.validate()?;

        let notes = self.form.notes.trim();
        Ok(NewOrder {
            id: Uuid::new_v4(),
            customer_name: self.form.customer_name.clone(),
            customer_email: self.form.customer_email.clone(),
            customer_phone: self.form.customer_phone.clone(),
            delivery_address: self.form.delivery_address.clone(),
            order_items: self.cart.to_order_items(),
            total_amount: self.cart.total(),
            status: OrderStatus::Pending,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }

    /// Start a submission: validates and marks the workflow in flight
    pub fn begin_submit(&mut self) -> Result<NewOrder, SubmitError> {
        let order = self.build_order()?;
        self.state.begin()?;
        Ok(order)
    }

    /// Apply the gateway's answer for an order started with [`Self::begin_submit`]
    pub fn finish_submit(&mut self, order: &NewOrder, result: Result<(), Error>) -> Result<OrderId, SubmitError> {
        match result {
            Ok(()) => {
                info!(order_id = %order.id, total = %order.total_amount, items = order.order_items.len(), "order placed");
                self.cart.clear();
                self.form = OrderForm::default();
                self.state.succeed();
                Ok(order.id)
            }
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "order submission failed");
                self.state.fail(ORDER_FAILED);
                Err(SubmitError::Gateway(e))
            }
        }
    }

    /// Validate, insert one pending order and reset on success.
    ///
    /// Cart and form are kept when the insert fails so the customer can retry.
    pub async fn submit(&mut self) -> Result<OrderId, SubmitError> {
        let order = self.begin_submit()?;
        let result = match serde_json::to_value(&order) {
            Ok(row) => self.gateway.insert(Collection::Orders, row).await,
            Err(e) => Err(e.into()),
        };
        self.finish_submit(&order, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::ProductSnapshot;
    use crate::gateway::MemoryGateway;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn filled_form() -> OrderForm {
        OrderForm {
            customer_name: "Thandi".into(),
            customer_email: "thandi@example.com".into(),
            customer_phone: "0821234567".into(),
            delivery_address: "12 Main Rd".into(),
            notes: "  ".into(),
        }
    }

    fn workflow() -> OrderWorkflow {
        OrderWorkflow::new(Arc::new(MemoryGateway::new()), Duration::from_secs(5))
    }

    #[test]
    fn empty_cart_is_rejected_first() {
        let workflow = workflow();
        assert_eq!(workflow.build_order(), Err(ValidationError::EmptyCart));
    }

    #[test]
    fn missing_fields_are_named() {
        let mut workflow = workflow();
        workflow.cart_mut().add_snapshot(ProductSnapshot {
            id: Uuid::new_v4(),
            name: "Plain".into(),
            price: Decimal::new(1000, 2),
        });
        workflow.form_mut().customer_email = "not-an-email".into();

        match workflow.build_order() {
            Err(ValidationError::InvalidFields(fields)) => assert_eq!(
                fields,
                vec!["customer_email", "customer_name", "customer_phone", "delivery_address"]
            ),
            other => panic!("expected invalid fields, got {:?}", other),
        }
    }

    #[test]
    fn built_order_is_pending_with_snapshot_total() {
        let mut workflow = workflow();
        let snapshot = ProductSnapshot {
            id: Uuid::new_v4(),
            name: "Strawberry".into(),
            price: Decimal::new(2500, 2),
        };
        workflow.cart_mut().add_snapshot(snapshot.clone());
        workflow.cart_mut().add_snapshot(snapshot.clone());
        *workflow.form_mut() = filled_form();

        let order = workflow.build_order().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, Decimal::new(5000, 2));
        assert_eq!(order.order_items.len(), 1);
        assert_eq!(order.order_items[0].quantity, 2);
        assert_eq!(order.order_items[0].product_id, snapshot.id);
        assert_eq!(order.notes, None);
    }
}
