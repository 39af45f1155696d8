//! # Product Types
//!
//! Product catalog types for quick-cart.
//! Products are loaded from `config/products.toml` or built in code.
//!
//! A product has two independent, optional capabilities:
//!
//! ```text
//!                  weight = None      weight = Some(w)
//!               ┌──────────────────┬──────────────────┐
//! expiry = None │  Scratch Card    │  TV              │
//!               ├──────────────────┼──────────────────┤
//! expiry = Some │  Biscuits        │  Cheese          │
//!               └──────────────────┴──────────────────┘
//! ```
//!
//! Behavior is decided by the predicates below, never by the product's type.

use crate::error::{ShopError, ShopResult};
use crate::money::{Money, Weight};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Carries an expiry timestamp
    Perishable,
    /// Carries a shipping weight
    Shippable,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Perishable => "perishable",
            Capability::Shippable => "shippable",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier (e.g., "cheese")
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price, in the smallest currency unit
    pub price: Money,

    /// Units in stock
    pub quantity: u32,

    /// Expiry timestamp (perishable products only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Shipping weight (shippable products only)
    #[serde(default, rename = "weight_kg", skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
}

impl Product {
    /// Create a product with neither capability
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
            expires_at: None,
            weight: None,
        }
    }

    /// Builder: make perishable
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Builder: make shippable
    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn is_perishable(&self) -> bool {
        self.expires_at.is_some()
    }

    /// False for non-perishable products; otherwise `now > expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| now > exp).unwrap_or(false)
    }

    pub fn requires_shipping(&self) -> bool {
        self.weight.is_some()
    }

    /// Shipping weight, or `MissingCapability` for non-shippable products
    pub fn shipping_weight(&self) -> ShopResult<Weight> {
        self.weight.ok_or_else(|| ShopError::MissingCapability {
            product: self.name.clone(),
            capability: Capability::Shippable,
        })
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Perishable => self.is_perishable(),
            Capability::Shippable => self.requires_shipping(),
        }
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        [Capability::Perishable, Capability::Shippable]
            .into_iter()
            .filter(|c| self.has(*c))
            .collect()
    }

    pub fn line_total(&self, quantity: u32) -> ShopResult<Money> {
        self.price
            .checked_mul(quantity)
            .ok_or_else(|| ShopError::AmountOverflow {
                context: format!("{} x {}", quantity, self.name),
            })
    }

    /// Check catalog invariants. Weight positivity is enforced by `Weight`
    /// and quantity by `u32`.
    pub fn validate(&self) -> ShopResult<()> {
        if self.id.trim().is_empty() {
            return Err(ShopError::InvalidProduct(format!(
                "product '{}' has an empty id",
                self.name
            )));
        }
        if self.name.trim().is_empty() {
            return Err(ShopError::InvalidProduct(format!(
                "product '{}' has an empty name",
                self.id
            )));
        }
        if self.price.is_negative() {
            return Err(ShopError::InvalidProduct(format!(
                "product '{}' has a negative price",
                self.id
            )));
        }
        Ok(())
    }
}

/// Product catalog. Order is the listing order shoppers see.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: Product) -> ShopResult<()> {
        product.validate()?;
        if self.get(&product.id).is_some() {
            return Err(ShopError::InvalidProduct(format!(
                "duplicate product id '{}'",
                product.id
            )));
        }
        self.products.push(product);
        Ok(())
    }

    /// Builder: add a product
    pub fn with_product(mut self, product: Product) -> ShopResult<Self> {
        self.add(product)?;
        Ok(self)
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub(crate) fn locate(&self, id: &str) -> Option<(usize, &Product)> {
        self.products.iter().enumerate().find(|(_, p)| p.id == id)
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> Option<&mut Product> {
        self.products.get_mut(index)
    }

    /// Find a product by its 1-based listing number
    pub fn nth(&self, number: usize) -> Option<&Product> {
        number.checked_sub(1).and_then(|i| self.products.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Load catalog from TOML string. Every product is validated.
    pub fn from_toml(toml_str: &str) -> ShopResult<Self> {
        let raw: ProductCatalog =
            toml::from_str(toml_str).map_err(|e| ShopError::Configuration(e.to_string()))?;
        let mut catalog = ProductCatalog::new();
        for product in raw.products {
            catalog.add(product)?;
        }
        Ok(catalog)
    }

    /// The stock demo catalog: cheese expiring five days after `now`, a TV
    /// and scratch cards.
    pub fn demo(now: DateTime<Utc>) -> Self {
        let cheese = Product::new("cheese", "Cheese", Money::from_major(50), 10)
            .with_expiry(now + Duration::days(5))
            .with_weight(Weight::nonzero_grams(1_500));
        let tv = Product::new("tv", "TV", Money::from_major(5000), 2)
            .with_weight(Weight::nonzero_grams(8_000));
        let card = Product::new("scratch-card", "Scratch Card", Money::from_major(10), 20);

        Self {
            products: vec![cheese, tv, card],
        }
    }
}
