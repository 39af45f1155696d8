//! # shop-core
//!
//! Catalog, cart and checkout engine for quick-cart.
//!
//! This crate provides:
//! - `Product` with independent perishable / shippable capabilities
//! - `ProductCatalog` loaded from TOML or built in code
//! - `Cart` and `CartItem` for collecting line items
//! - `CheckoutEngine` for all-or-nothing checkout
//! - `ShippingNotifier` for reporting what ships
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use shop_core::{checkout, Cart, Customer, Money, ProductCatalog};
//!
//! let now = Utc::now();
//! let mut catalog = ProductCatalog::demo(now);
//! let mut customer = Customer::new("Mona", Money::from_major(6000));
//!
//! let mut cart = Cart::new();
//! cart.add_item(catalog.get("cheese").unwrap(), 2)?;
//!
//! let summary = checkout(&cart, &mut catalog, &mut customer, now)?;
//! assert_eq!(summary.total, Money::from_major(115));
//! assert_eq!(customer.balance(), Money::from_major(5885));
//! # Ok::<(), shop_core::ShopError>(())
//! ```
//!
//! No terminal I/O happens here; time is always passed in.

pub mod cart;
pub mod checkout;
pub mod customer;
pub mod error;
pub mod money;
pub mod product;
pub mod shipping;

// Re-exports for convenience
pub use cart::{Cart, CartItem};
pub use checkout::{checkout, CheckoutEngine, CheckoutSummary, Shipment};
pub use customer::Customer;
pub use error::{ShopError, ShopResult};
pub use money::{Money, ParseMoneyError, ShippingPolicy, Weight, SHIPPING_RATE_PER_KG};
pub use product::{Capability, Product, ProductCatalog};
pub use shipping::{dispatch_shipments, LoggingShippingNotifier, ShippingNotifier};
