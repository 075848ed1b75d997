//! Cart model.
//!
//! A [`Cart`] is the locally held mirror of the cart the backend persists per
//! user. Lines are keyed by (product, size, color); adding a line that already
//! exists increments its quantity instead of appending a duplicate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;
use crate::types::{ProductId, format_amount};

/// Errors raised by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Quantity must be greater than 0.")]
    InvalidQuantity,

    #[error("Not enough stock available")]
    InsufficientStock { requested: u32, available: u32 },

    #[error("cart line not found")]
    LineNotFound,
}

/// Identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
}

impl LineKey {
    #[must_use]
    pub fn new(product_id: ProductId, size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            product_id,
            size: size.into(),
            color: color.into(),
        }
    }
}

/// One line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub price: Decimal,
    /// Stock reported by the backend when the line was built.
    pub stock: u32,
    pub size: String,
    pub color: String,
    pub quantity: u32,
}

impl CartLine {
    /// Build a line for `product` with the chosen variant.
    #[must_use]
    pub fn from_product(
        product: &Product,
        size: impl Into<String>,
        color: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image: product.primary_image().map(str::to_owned),
            price: product.price,
            stock: product.stock,
            size: size.into(),
            color: color.into(),
            quantity,
        }
    }

    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id.clone(), self.size.clone(), self.color.clone())
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.size == key.size && self.color == key.color
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    #[must_use]
    pub fn display_price(&self) -> String {
        format_amount(self.price)
    }

    #[must_use]
    pub fn display_total(&self) -> String {
        format_amount(self.line_total())
    }
}

/// Ordered list of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        cart.replace(lines);
        cart
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.matches(key))
    }

    /// Add a line, merging into an existing line with the same key.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity.
    pub fn add(&mut self, line: CartLine) -> Result<(), CartError> {
        if line.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let key = line.key();
        match self.lines.iter_mut().find(|l| l.matches(&key)) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
                existing.stock = line.stock;
                existing.price = line.price;
            }
            None => self.lines.push(line),
        }
        Ok(())
    }

    /// Check that adding `line` keeps its merged quantity within stock.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InsufficientStock`] when it would not.
    pub fn check_stock(&self, line: &CartLine) -> Result<(), CartError> {
        let already = self.get(&line.key()).map_or(0, |l| l.quantity);
        let requested = already.saturating_add(line.quantity);
        if requested > line.stock {
            return Err(CartError::InsufficientStock {
                requested,
                available: line.stock,
            });
        }
        Ok(())
    }

    /// Remove a line. Returns the removed line, if any.
    pub fn remove(&mut self, key: &LineKey) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.matches(key))?;
        Some(self.lines.remove(index))
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for zero and
    /// [`CartError::LineNotFound`] for an unknown key.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.matches(key))
            .ok_or(CartError::LineNotFound)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Replace every line with `lines`, as loaded from the server.
    ///
    /// Lines are taken as-is; the server's cart is authoritative.
    pub fn replace(&mut self, lines: Vec<CartLine>) {
        self.lines = lines;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// `Σ price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |acc, line| acc + line.line_total())
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: &str, price: i64, size: &str, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            image: None,
            price: Decimal::new(price, 0),
            stock: 10,
            size: size.to_string(),
            color: "Black".to_string(),
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_subtotal_is_zero() {
        let cart = Cart::new();
        assert_eq!(cart.subtotal(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_subtotal_sums_price_times_quantity() {
        let cart = Cart::from_lines(vec![
            line("a", 499, "M", 2),
            line("b", 1299, "L", 1),
            line("c", 250, "S", 3),
        ]);
        assert_eq!(cart.subtotal(), Decimal::new(499 * 2 + 1299 + 250 * 3, 0));
        assert_eq!(cart.item_count(), 6);
    }

    #[test]
    fn test_add_same_variant_increments_quantity() {
        let mut cart = Cart::new();
        cart.add(line("a", 100, "M", 1)).unwrap();
        cart.add(line("a", 100, "M", 2)).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_add_different_size_appends() {
        let mut cart = Cart::new();
        cart.add(line("a", 100, "M", 1)).unwrap();
        cart.add(line("a", 100, "L", 1)).unwrap();
        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn test_add_zero_quantity_is_rejected() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(line("a", 100, "M", 0)), Err(CartError::InvalidQuantity));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_check_stock_counts_existing_quantity() {
        let mut cart = Cart::new();
        cart.add(line("a", 100, "M", 8)).unwrap();
        assert!(cart.check_stock(&line("a", 100, "M", 2)).is_ok());
        assert_eq!(
            cart.check_stock(&line("a", 100, "M", 3)),
            Err(CartError::InsufficientStock {
                requested: 11,
                available: 10,
            })
        );
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::from_lines(vec![line("a", 100, "M", 1)]);
        let key = LineKey::new(ProductId::new("a"), "M", "Black");
        cart.set_quantity(&key, 4).unwrap();
        assert_eq!(cart.get(&key).unwrap().quantity, 4);
        assert_eq!(cart.set_quantity(&key, 0), Err(CartError::InvalidQuantity));

        let missing = LineKey::new(ProductId::new("z"), "M", "Black");
        assert_eq!(cart.set_quantity(&missing, 1), Err(CartError::LineNotFound));
    }

    #[test]
    fn test_remove_and_replace() {
        let mut cart = Cart::from_lines(vec![line("a", 100, "M", 1), line("b", 100, "M", 1)]);
        let removed = cart.remove(&LineKey::new(ProductId::new("a"), "M", "Black"));
        assert!(removed.is_some());
        assert_eq!(cart.lines().len(), 1);

        cart.replace(vec![line("c", 5, "S", 1)]);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].product_id.as_str(), "c");
    }

    #[test]
    fn test_display_helpers() {
        let l = line("a", 499, "M", 2);
        assert_eq!(l.display_price(), "₹499.00");
        assert_eq!(l.display_total(), "₹998.00");
    }
}
