//! # Application State
//!
//! Session state for the interactive shop.
//! Contains configuration, the product catalog, the cart and the customer.

use anyhow::Context;
use chrono::{DateTime, Utc};
use shop_core::{
    Cart, CheckoutEngine, Customer, Money, ProductCatalog, ShippingPolicy, ShopError, ShopResult,
};
use std::path::PathBuf;

/// Catalog locations tried when `SHOP_CATALOG` is not set
const DEFAULT_CATALOG_PATHS: [&str; 3] = [
    "config/products.toml",
    "../config/products.toml",
    "../../config/products.toml",
];

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Explicit catalog file
    pub catalog_path: Option<PathBuf>,
    /// Customer's starting balance
    pub opening_balance: Money,
    /// Currency label shown after amounts
    pub currency: String,
    /// Shipping fee policy
    pub shipping: ShippingPolicy,
    /// Customer name; prompted for when absent
    pub customer_name: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> ShopResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup. Unset keys take defaults; unparseable
    /// values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ShopResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let opening_balance = match get("SHOP_OPENING_BALANCE") {
            Some(raw) => parse_money("SHOP_OPENING_BALANCE", &raw)?,
            None => Money::from_major(6000),
        };
        if opening_balance.is_negative() {
            return Err(ShopError::Configuration(
                "SHOP_OPENING_BALANCE must not be negative".to_string(),
            ));
        }

        let rate = match get("SHOP_SHIPPING_RATE") {
            Some(raw) => parse_money("SHOP_SHIPPING_RATE", &raw)?,
            None => ShippingPolicy::default().rate_per_kg,
        };
        if rate.is_negative() {
            return Err(ShopError::Configuration(
                "SHOP_SHIPPING_RATE must not be negative".to_string(),
            ));
        }

        let per_unit = match get("SHOP_SHIPPING_PER_UNIT") {
            Some(raw) => raw.trim().parse::<bool>().map_err(|_| {
                ShopError::Configuration(format!(
                    "SHOP_SHIPPING_PER_UNIT must be true or false, got '{}'",
                    raw
                ))
            })?,
            None => false,
        };

        let mut shipping = ShippingPolicy::new(rate);
        if per_unit {
            shipping = shipping.per_unit();
        }

        Ok(Self {
            catalog_path: get("SHOP_CATALOG").map(PathBuf::from),
            opening_balance,
            currency: get("SHOP_CURRENCY").unwrap_or_else(|| "EGP".to_string()),
            shipping,
            customer_name: get("SHOP_CUSTOMER").map(|n| n.trim().to_string()),
        })
    }

    /// Format an amount with the currency label
    pub fn price(&self, amount: Money) -> String {
        format!("{} {}", amount, self.currency)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            opening_balance: Money::from_major(6000),
            currency: "EGP".to_string(),
            shipping: ShippingPolicy::default(),
            customer_name: None,
        }
    }
}

fn parse_money(key: &str, raw: &str) -> ShopResult<Money> {
    raw.parse::<Money>()
        .map_err(|e| ShopError::Configuration(format!("{}: {}", key, e)))
}

/// Shared session state
#[derive(Debug)]
pub struct ShopState {
    /// Application config
    pub config: AppConfig,
    /// Product catalog
    pub catalog: ProductCatalog,
    /// Current cart
    pub cart: Cart,
    /// The shopper
    pub customer: Customer,
    /// Checkout engine built from the shipping policy
    pub engine: CheckoutEngine,
}

impl ShopState {
    pub fn new(config: AppConfig, catalog: ProductCatalog, customer_name: impl Into<String>) -> Self {
        let customer = Customer::new(customer_name, config.opening_balance);
        let engine = CheckoutEngine::new(config.shipping);
        Self {
            config,
            catalog,
            cart: Cart::new(),
            customer,
            engine,
        }
    }
}

/// Load the product catalog from the configured file, the default
/// locations, or fall back to the demo catalog.
pub fn load_catalog(config: &AppConfig, now: DateTime<Utc>) -> anyhow::Result<ProductCatalog> {
    if let Some(path) = &config.catalog_path {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let catalog = ProductCatalog::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded {} products from {}", catalog.len(), path.display());
        return Ok(catalog);
    }

    for path in DEFAULT_CATALOG_PATHS {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = ProductCatalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded {} products from {}", catalog.len(), path);
            return Ok(catalog);
        }
    }

    tracing::warn!("No product catalog found, using demo catalog");
    Ok(ProductCatalog::demo(now))
}
