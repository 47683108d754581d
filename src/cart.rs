//! In-memory shopping cart
//!
//! Lines keep the order in which products were first added. Each line holds a
//! snapshot of the product's name and price taken when it was added, so later
//! catalog edits do not change what the customer is about to pay.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{OrderItem, Product};

/// Name and price of a product as seen when it entered the cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: ProductSnapshot,
    quantity: u32,
}

impl CartLine {
    /// Always at least 1
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }

    pub fn to_order_item(&self) -> OrderItem {
        OrderItem {
            product_id: self.product.id,
            product_name: self.product.name.clone(),
            quantity: self.quantity,
            price: self.product.price,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit: bumps an existing line or appends a new one
    pub fn add(&mut self, product: &Product) {
        self.add_snapshot(ProductSnapshot::from(product));
    }

    /// Like [`Cart::add`]; an existing line keeps its original snapshot
    pub fn add_snapshot(&mut self, snapshot: ProductSnapshot) {
        match self.line_mut(snapshot.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine {
                product: snapshot,
                quantity: 1,
            }),
        }
    }

    /// Set a line's quantity in place; zero or less removes the line
    pub fn update_quantity(&mut self, product_id: Uuid, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity;
        }
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.lines.retain(|line| line.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of price × quantity, recomputed on every call
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: Uuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product_id)
    }

    /// Number of distinct products
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of units across all lines
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn to_order_items(&self) -> Vec<OrderItem> {
        self.lines.iter().map(CartLine::to_order_item).collect()
    }

    fn line_mut(&mut self, product_id: Uuid) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product.id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(name: &str, cents: i64) -> ProductSnapshot {
        ProductSnapshot {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let mut cart = Cart::new();
        let p = snapshot("Plain", 1000);
        for _ in 0..3 {
            cart.add_snapshot(p.clone());
        }
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(p.id).map(CartLine::quantity), Some(3));
        assert_eq!(cart.total(), Decimal::new(3000, 2));
    }

    #[test]
    fn mixed_cart_total() {
        let mut cart = Cart::new();
        let strawberry = snapshot("Strawberry", 2500);
        let chocolate = snapshot("Chocolate", 3000);
        cart.add_snapshot(strawberry.clone());
        cart.add_snapshot(strawberry);
        cart.add_snapshot(chocolate);
        assert_eq!(cart.total(), Decimal::new(8000, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn lines_keep_first_add_order() {
        let mut cart = Cart::new();
        let a = snapshot("A", 100);
        let b = snapshot("B", 200);
        cart.add_snapshot(a.clone());
        cart.add_snapshot(b.clone());
        cart.add_snapshot(a.clone());
        cart.update_quantity(b.id, 7);

        let names: Vec<&str> = cart.lines().iter().map(|l| l.product.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(cart.line(b.id).map(CartLine::quantity), Some(7));
    }

    #[test]
    fn non_positive_quantity_removes_line() {
        for quantity in [0, -1, -40] {
            let mut removed = Cart::new();
            let mut updated = Cart::new();
            let keep = snapshot("Keep", 500);
            let drop = snapshot("Drop", 700);
            for cart in [&mut removed, &mut updated] {
                cart.add_snapshot(keep.clone());
                cart.add_snapshot(drop.clone());
            }
            removed.remove(drop.id);
            updated.update_quantity(drop.id, quantity);
            assert_eq!(removed, updated);
            assert_eq!(updated.len(), 1);
        }
    }

    #[test]
    fn total_ignores_add_order() {
        let a = snapshot("A", 1999);
        let b = snapshot("B", 250);
        let mut forward = Cart::new();
        let mut backward = Cart::new();
        forward.add_snapshot(a.clone());
        forward.add_snapshot(b.clone());
        backward.add_snapshot(b);
        backward.add_snapshot(a);
        assert_eq!(forward.total(), backward.total());
    }

    #[test]
    fn later_adds_keep_original_snapshot() {
        let mut cart = Cart::new();
        let original = snapshot("Mango", 2000);
        let mut repriced = original.clone();
        repriced.price = Decimal::new(9900, 2);
        cart.add_snapshot(original.clone());
        cart.add_snapshot(repriced);
        assert_eq!(cart.line(original.id).map(|l| l.product.price), Some(Decimal::new(2000, 2)));
        assert_eq!(cart.total(), Decimal::new(4000, 2));
    }

    #[test]
    fn adding_to_a_maxed_line_saturates() {
        let mut cart = Cart::new();
        let p = snapshot("Bulk", 100);
        cart.add_snapshot(p.clone());
        cart.update_quantity(p.id, 10_000_000_000);
        assert_eq!(cart.line(p.id).map(CartLine::quantity), Some(u32::MAX));

        cart.add_snapshot(p.clone());
        assert_eq!(cart.line(p.id).map(CartLine::quantity), Some(u32::MAX));
        assert_eq!(cart.item_count(), u64::from(u32::MAX));
    }

    #[test]
    fn removing_absent_product_is_noop() {
        let mut cart = Cart::new();
        cart.add_snapshot(snapshot("A", 100));
        let before = cart.clone();
        cart.remove(Uuid::new_v4());
        cart.update_quantity(Uuid::new_v4(), 4);
        assert_eq!(cart, before);
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(Cart::new().total(), Decimal::ZERO);
    }
}
