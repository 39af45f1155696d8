//! # Shop Error Types
//!
//! Typed error handling for the quick-cart checkout engine.
//! All cart and checkout operations return `Result<T, ShopError>`.
//!
//! Every variant is terminal for the operation that raised it: nothing is
//! retried internally and no state is mutated before the error is returned.

use crate::money::Money;
use crate::product::Capability;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core error type for all shop operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    /// Requested quantity exceeds available stock.
    /// Raised at add-time (advisory) and at checkout (authoritative).
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: u32,
        requested: u32,
    },

    /// Perishable product is past its expiry at checkout time
    #[error("Product {product} is expired (expired at {expired_at})")]
    ExpiredProduct {
        product: String,
        expired_at: DateTime<Utc>,
    },

    /// Checkout attempted with no line items
    #[error("Cart is empty")]
    EmptyCart,

    /// Customer balance does not cover the computed total
    #[error("Insufficient balance: {balance} available, {required} required")]
    InsufficientBalance { balance: Money, required: Money },

    /// A capability-specific attribute was requested on a product without it
    #[error("Product {product} is not {capability}")]
    MissingCapability {
        product: String,
        capability: Capability,
    },

    /// Zero quantity requested for a line item
    #[error("Quantity for {product} must be at least 1")]
    InvalidQuantity { product: String },

    /// Cart references a product the catalog no longer has
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// A line total, fee or order total does not fit in `Money`
    #[error("Amount too large: {context}")]
    AmountOverflow { context: String },

    /// Product data violates catalog invariants
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// Configuration errors (unreadable catalog, bad values)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ShopError {
    /// Stable kind name, used for log fields and labelled output
    pub fn label(&self) -> &'static str {
        match self {
            ShopError::InsufficientStock { .. } => "insufficient_stock",
            ShopError::ExpiredProduct { .. } => "expired_product",
            ShopError::EmptyCart => "empty_cart",
            ShopError::InsufficientBalance { .. } => "insufficient_balance",
            ShopError::MissingCapability { .. } => "missing_capability",
            ShopError::InvalidQuantity { .. } => "invalid_quantity",
            ShopError::ProductNotFound { .. } => "product_not_found",
            ShopError::AmountOverflow { .. } => "amount_overflow",
            ShopError::InvalidProduct(_) => "invalid_product",
            ShopError::Configuration(_) => "configuration",
        }
    }

    /// Returns true for programming-contract violations that a shopper
    /// cannot cause through the cart.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ShopError::MissingCapability { .. })
    }
}

/// Result type alias for shop operations
pub type ShopResult<T> = Result<T, ShopError>;
