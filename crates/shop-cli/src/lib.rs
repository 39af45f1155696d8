//! # shop-cli
//!
//! Interactive shop front for quick-cart.
//!
//! This crate provides:
//! - Environment-driven configuration and catalog loading
//! - A menu loop generic over any `BufRead` / `Write` pair
//! - Text rendering of products, cart, checkout summary and shipping notice
//!
//! ## Menu
//!
//! | Choice | Action |
//! |--------|--------|
//! | 1 | View products |
//! | 2 | Add product to cart |
//! | 3 | View cart |
//! | 4 | Checkout |
//! | 5 | Exit |

pub mod handlers;
pub mod menu;
pub mod state;

pub use menu::run;
pub use state::{load_catalog, AppConfig, ShopState};
