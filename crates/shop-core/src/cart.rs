//! # Cart
//!
//! Line items a shopper has asked for, in the order they were added.
//!
//! Availability is checked when an item is added but nothing is reserved.
//! Stock only moves at checkout, which checks availability again.

use crate::error::{ShopError, ShopResult};
use crate::money::Money;
use crate::product::Product;
use serde::{Deserialize, Serialize};

/// A line item in a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog product ID
    pub product_id: String,

    /// Product name (denormalized for display)
    pub name: String,

    /// Unit price when the item was added (display only)
    pub unit_price: Money,

    /// Requested units, always at least 1
    pub quantity: u32,
}

impl CartItem {
    fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
        }
    }

    /// Price for this line item at the snapshot price
    pub fn line_total(&self) -> ShopResult<Money> {
        self.unit_price
            .checked_mul(self.quantity)
            .ok_or_else(|| ShopError::AmountOverflow {
                context: format!("{} x {}", self.quantity, self.name),
            })
    }
}

/// A shopping cart
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append a line item after checking the product's current stock.
    ///
    /// The same product may be added more than once; each call becomes its
    /// own line item.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> ShopResult<()> {
        if quantity == 0 {
            return Err(ShopError::InvalidQuantity {
                product: product.name.clone(),
            });
        }
        if quantity > product.quantity {
            return Err(ShopError::InsufficientStock {
                product: product.name.clone(),
                available: product.quantity,
                requested: quantity,
            });
        }
        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of line items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Subtotal at snapshot prices. Checkout recomputes from the catalog.
    pub fn subtotal(&self) -> ShopResult<Money> {
        self.items.iter().try_fold(Money::zero(), |acc, item| {
            acc.checked_add(item.line_total()?)
                .ok_or_else(|| ShopError::AmountOverflow {
                    context: "cart subtotal".to_string(),
                })
        })
    }

    /// Drop every line item
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
