//! # Checkout Engine
//!
//! Turns a cart into a committed order.
//!
//! ```text
//!   Cart ──► plan() ──────────────────────────► commit() ──► CheckoutSummary
//!            │ 1. cart not empty                  │ debit customer
//!            │ 2. per line item, in order:        │ decrement stock
//!            │    a. not expired                  │
//!            │    b. enough stock (cumulative)    │
//!            │    c. subtotal += qty * price      │
//!            │    d. shipping fee, shipments      │
//!            │ 3. total = subtotal + shipping     │
//!            │ 4. balance covers total            │
//!            └── any failure: nothing mutated     └── cannot fail
//! ```

use crate::cart::Cart;
use crate::customer::Customer;
use crate::error::{ShopError, ShopResult};
use crate::money::{Money, ShippingPolicy, Weight};
use crate::product::ProductCatalog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// One shippable line item of a completed checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub product_id: String,
    pub name: String,
    /// Unit weight
    pub weight: Weight,
    pub quantity: u32,
}

/// Result of a completed checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSummary {
    /// Generated order ID
    pub order_id: Uuid,

    /// Customer name
    pub customer: String,

    pub subtotal: Money,

    /// Zero when nothing ships
    pub shipping_fee: Money,

    pub total: Money,

    /// Customer balance after the debit
    pub balance_after: Money,

    /// Shippable line items in cart order. A product added twice appears twice.
    pub shipments: Vec<Shipment>,

    pub completed_at: DateTime<Utc>,
}

impl CheckoutSummary {
    pub fn has_shipments(&self) -> bool {
        !self.shipments.is_empty()
    }
}

/// Validated checkout, ready to apply
#[derive(Debug)]
struct CheckoutPlan {
    subtotal: Money,
    shipping_fee: Money,
    total: Money,
    shipments: Vec<Shipment>,
    /// (catalog index, cumulative units) per distinct product
    reservations: Vec<(usize, u32)>,
}

/// Checkout engine configured with a shipping policy
#[derive(Debug, Clone, Default)]
pub struct CheckoutEngine {
    policy: ShippingPolicy,
}

impl CheckoutEngine {
    pub fn new(policy: ShippingPolicy) -> Self {
        Self { policy }
    }

    /// Validate the whole cart, then debit the customer and decrement stock.
    ///
    /// Either everything commits or nothing changes. The cart itself is
    /// left as is; callers clear it after a successful checkout.
    pub fn checkout(
        &self,
        cart: &Cart,
        catalog: &mut ProductCatalog,
        customer: &mut Customer,
        now: DateTime<Utc>,
    ) -> ShopResult<CheckoutSummary> {
        let plan = self.plan(cart, catalog, customer, now).map_err(|e| {
            debug!(kind = e.label(), error = %e, "checkout rejected");
            e
        })?;
        Ok(Self::commit(plan, catalog, customer, now))
    }

    fn plan(
        &self,
        cart: &Cart,
        catalog: &ProductCatalog,
        customer: &Customer,
        now: DateTime<Utc>,
    ) -> ShopResult<CheckoutPlan> {
        if cart.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let mut subtotal = Money::zero();
        let mut shipping_fee = Money::zero();
        let mut shipments = Vec::new();
        let mut reservations: Vec<(usize, u32)> = Vec::new();

        for item in cart.items() {
            let (index, product) =
                catalog
                    .locate(&item.product_id)
                    .ok_or_else(|| ShopError::ProductNotFound {
                        product_id: item.product_id.clone(),
                    })?;

            if let Some(expired_at) = product.expires_at.filter(|_| product.is_expired(now)) {
                return Err(ShopError::ExpiredProduct {
                    product: product.name.clone(),
                    expired_at,
                });
            }

            let requested = match reservations.iter_mut().find(|(i, _)| *i == index) {
                Some((_, units)) => {
                    *units = units.saturating_add(item.quantity);
                    *units
                }
                None => {
                    reservations.push((index, item.quantity));
                    item.quantity
                }
            };
            if requested > product.quantity {
                return Err(ShopError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.quantity,
                    requested,
                });
            }

            subtotal = add_amounts(subtotal, product.line_total(item.quantity)?, "subtotal")?;

            if product.requires_shipping() {
                let weight = product.shipping_weight()?;
                let fee = self.policy.fee_for(weight, item.quantity).ok_or_else(|| {
                    ShopError::AmountOverflow {
                        context: format!("shipping fee for {}", product.name),
                    }
                })?;
                shipping_fee = add_amounts(shipping_fee, fee, "shipping fee")?;
                shipments.push(Shipment {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    weight,
                    quantity: item.quantity,
                });
            }

            debug!(product = %product.id, quantity = item.quantity, "line item validated");
        }

        let total = add_amounts(subtotal, shipping_fee, "total")?;
        if !customer.can_afford(total) {
            return Err(ShopError::InsufficientBalance {
                balance: customer.balance(),
                required: total,
            });
        }

        Ok(CheckoutPlan {
            subtotal,
            shipping_fee,
            total,
            shipments,
            reservations,
        })
    }

    fn commit(
        plan: CheckoutPlan,
        catalog: &mut ProductCatalog,
        customer: &mut Customer,
        now: DateTime<Utc>,
    ) -> CheckoutSummary {
        customer.debit(plan.total);
        for (index, units) in &plan.reservations {
            if let Some(product) = catalog.at_mut(*index) {
                product.quantity -= units;
            }
        }

        let summary = CheckoutSummary {
            order_id: Uuid::new_v4(),
            customer: customer.name.clone(),
            subtotal: plan.subtotal,
            shipping_fee: plan.shipping_fee,
            total: plan.total,
            balance_after: customer.balance(),
            shipments: plan.shipments,
            completed_at: now,
        };

        info!(
            order_id = %summary.order_id,
            customer = %summary.customer,
            subtotal = %summary.subtotal,
            shipping_fee = %summary.shipping_fee,
            total = %summary.total,
            "checkout committed"
        );

        summary
    }
}

fn add_amounts(a: Money, b: Money, context: &str) -> ShopResult<Money> {
    a.checked_add(b).ok_or_else(|| ShopError::AmountOverflow {
        context: context.to_string(),
    })
}

/// Check out with the default shipping policy
pub fn checkout(
    cart: &Cart,
    catalog: &mut ProductCatalog,
    customer: &mut Customer,
    now: DateTime<Utc>,
) -> ShopResult<CheckoutSummary> {
    CheckoutEngine::default().checkout(cart, catalog, customer, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn kg(value: f64) -> Weight {
        Weight::from_kg(value).unwrap()
    }

    fn catalog() -> ProductCatalog {
        ProductCatalog::new()
            .with_product(
                Product::new("cheese", "Cheese", Money::from_major(50), 10)
                    .with_expiry(now() + Duration::days(5))
                    .with_weight(kg(1.5)),
            )
            .and_then(|c| {
                c.with_product(
                    Product::new("tv", "TV", Money::from_major(5000), 2).with_weight(kg(8.0)),
                )
            })
            .and_then(|c| {
                c.with_product(Product::new(
                    "scratch-card",
                    "Scratch Card",
                    Money::from_major(10),
                    20,
                ))
            })
            .and_then(|c| {
                c.with_product(
                    Product::new("old-cheese", "Expired Cheese", Money::from_major(40), 5)
                        .with_expiry(now() - Duration::days(1))
                        .with_weight(kg(1.0)),
                )
            })
            .unwrap()
    }

    fn stock(catalog: &ProductCatalog, id: &str) -> u32 {
        catalog.get(id).unwrap().quantity
    }

    fn stocks(catalog: &ProductCatalog) -> Vec<u32> {
        catalog.iter().map(|p| p.quantity).collect()
    }

    fn add(cart: &mut Cart, catalog: &ProductCatalog, id: &str, quantity: u32) {
        cart.add_item(catalog.get(id).unwrap(), quantity).unwrap();
    }

    #[test]
    fn scenario_a_shippable_perishable() {
        let mut catalog = catalog();
        let mut customer = Customer::new("Mona", Money::from_major(6000));
        let mut cart = Cart::new();
        add(&mut cart, &catalog, "cheese", 2);

        let summary = checkout(&cart, &mut catalog, &mut customer, now()).unwrap();

        assert_eq!(summary.subtotal, Money::from_major(100));
        assert_eq!(summary.shipping_fee, Money::from_major(15));
        assert_eq!(summary.total, Money::from_major(115));
        assert_eq!(summary.balance_after, Money::from_major(5885));
        assert_eq!(customer.balance(), Money::from_major(5885));
        assert_eq!(stock(&catalog, "cheese"), 8);
        assert_eq!(summary.shipments.len(), 1);
        assert_eq!(summary.shipments[0].name, "Cheese");
        assert_eq!(summary.shipments[0].weight, kg(1.5));
        assert_eq!(summary.completed_at, now());
    }

    #[test]
    fn scenario_b_stock_exceeded_at_checkout() {
        let mut catalog = catalog();
        let mut customer = Customer::new("Mona", Money::from_major(100_000));

        // The add-time check rejects it outright
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_item(catalog.get("tv").unwrap(), 3),
            Err(ShopError::InsufficientStock { .. })
        ));

        // Two line items of 2 pass at add time but not together at checkout
        add(&mut cart, &catalog, "tv", 2);
        add(&mut cart, &catalog, "tv", 1);
        let err = checkout(&cart, &mut catalog, &mut customer, now()).unwrap_err();
        assert_eq!(
            err,
            ShopError::InsufficientStock {
                product: "TV".into(),
                available: 2,
                requested: 3,
            }
        );
        assert_eq!(stock(&catalog, "tv"), 2);
        assert_eq!(customer.balance(), Money::from_major(100_000));
    }

    #[test]
    fn scenario_c_nothing_to_ship() {
        let mut catalog = catalog();
        let mut customer = Customer::new("Mona", Money::from_major(6000));
        let mut cart = Cart::new();
        add(&mut cart, &catalog, "scratch-card", 5);

        let summary = checkout(&cart, &mut catalog, &mut customer, now()).unwrap();

        assert_eq!(summary.subtotal, Money::from_major(50));
        assert_eq!(summary.shipping_fee, Money::zero());
        assert_eq!(summary.total, Money::from_major(50));
        assert!(!summary.has_shipments());
        assert_eq!(stock(&catalog, "scratch-card"), 15);
    }

    #[test]
    fn scenario_d_expired_product() {
        let mut catalog = catalog();
        let mut customer = Customer::new("Mona", Money::from_major(6000));
        let mut cart = Cart::new();
        add(&mut cart, &catalog, "old-cheese", 1);

        let err = checkout(&cart, &mut catalog, &mut customer, now()).unwrap_err();
        assert_eq!(
            err,
            ShopError::ExpiredProduct {
                product: "Expired Cheese".into(),
                expired_at: now() - Duration::days(1),
            }
        );
        assert_eq!(stock(&catalog, "old-cheese"), 5);
        assert_eq!(customer.balance(), Money::from_major(6000));
    }

    #[test]
    fn scenario_e_empty_cart() {
        let mut catalog = catalog();
        let mut customer = Customer::new("Mona", Money::from_major(6000));
        let err = checkout(&Cart::new(), &mut catalog, &mut customer, now()).unwrap_err();
        assert_eq!(err, ShopError::EmptyCart);
    }

    #[test]
    fn scenario_f_insufficient_balance() {
        let mut catalog = catalog();
        let mut customer = Customer::new("Mona", Money::from_major(6000));
        let mut cart = Cart::new();
        add(&mut cart, &catalog, "tv", 2);

        let before = stocks(&catalog);
        let err = checkout(&cart, &mut catalog, &mut customer, now()).unwrap_err();
        assert_eq!(
            err,
            ShopError::InsufficientBalance {
                balance: Money::from_major(6000),
                required: Money::from_major(10_080),
            }
        );
        assert_eq!(customer.balance(), Money::from_major(6000));
        assert_eq!(stocks(&catalog), before);
    }

    #[test]
    fn failure_at_any_position_leaves_state_untouched() {
        // The bad line item moves through every position of an otherwise valid cart
        let good = [("cheese", 1), ("scratch-card", 2), ("tv", 1)];
        for position in 0..=good.len() {
            let mut catalog = catalog();
            let mut customer = Customer::new("Mona", Money::from_major(50_000));
            let mut cart = Cart::new();
            for (i, (id, qty)) in good.iter().enumerate() {
                if i == position {
                    add(&mut cart, &catalog, "old-cheese", 1);
                }
                add(&mut cart, &catalog, id, *qty);
            }
            if position == good.len() {
                add(&mut cart, &catalog, "old-cheese", 1);
            }

            let before = stocks(&catalog);
            let result = checkout(&cart, &mut catalog, &mut customer, now());
            assert!(matches!(result, Err(ShopError::ExpiredProduct { .. })));
            assert_eq!(stocks(&catalog), before, "stock changed (position {position})");
            assert_eq!(customer.balance(), Money::from_major(50_000));
        }
    }

    #[test]
    fn success_decrements_exactly_what_was_requested() {
        let mut catalog = catalog();
        let mut customer = Customer::new("Mona", Money::from_major(20_000));
        let mut cart = Cart::new();
        add(&mut cart, &catalog, "cheese", 3);
        add(&mut cart, &catalog, "tv", 1);
        add(&mut cart, &catalog, "cheese", 4);
        add(&mut cart, &catalog, "scratch-card", 20);

        let summary = checkout(&cart, &mut catalog, &mut customer, now()).unwrap();

        assert_eq!(stock(&catalog, "cheese"), 3);
        assert_eq!(stock(&catalog, "tv"), 1);
        assert_eq!(stock(&catalog, "scratch-card"), 0);
        assert_eq!(stock(&catalog, "old-cheese"), 5);
        // 350 cheese + 5000 tv + 200 cards
        assert_eq!(summary.subtotal, Money::from_major(5550));
        // cheese line 15 + tv 80 + cheese line 15
        assert_eq!(summary.shipping_fee, Money::from_major(110));
        assert_eq!(customer.balance(), Money::from_major(20_000) - summary.total);

        let shipped: Vec<&str> = summary.shipments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(shipped, vec!["Cheese", "TV", "Cheese"]);
    }

    #[test]
    fn stock_is_revalidated_at_checkout() {
        let mut catalog = catalog();
        let mut first = Customer::new("Mona", Money::from_major(20_000));
        let mut second = Customer::new("Karim", Money::from_major(20_000));

        let mut cart_a = Cart::new();
        let mut cart_b = Cart::new();
        add(&mut cart_a, &catalog, "tv", 2);
        add(&mut cart_b, &catalog, "tv", 1);

        checkout(&cart_a, &mut catalog, &mut first, now()).unwrap();
        let err = checkout(&cart_b, &mut catalog, &mut second, now()).unwrap_err();
        assert_eq!(
            err,
            ShopError::InsufficientStock {
                product: "TV".into(),
                available: 0,
                requested: 1,
            }
        );
        assert_eq!(second.balance(), Money::from_major(20_000));
    }

    #[test]
    fn expiry_is_checked_at_checkout_time() {
        let mut catalog = catalog();
        let mut customer = Customer::new("Mona", Money::from_major(6000));
        let mut cart = Cart::new();
        add(&mut cart, &catalog, "cheese", 1);

        let later = now() + Duration::days(6);
        let err = checkout(&cart, &mut catalog, &mut customer, later).unwrap_err();
        assert!(matches!(err, ShopError::ExpiredProduct { .. }));
        assert_eq!(stock(&catalog, "cheese"), 10);
    }

    #[test]
    fn unknown_product_is_rejected() {
        let source = catalog();
        let mut cart = Cart::new();
        add(&mut cart, &source, "tv", 1);

        let mut other = ProductCatalog::new();
        let mut customer = Customer::new("Mona", Money::from_major(6000));
        let err = checkout(&cart, &mut other, &mut customer, now()).unwrap_err();
        assert_eq!(
            err,
            ShopError::ProductNotFound {
                product_id: "tv".into()
            }
        );
    }

    #[test]
    fn exact_balance_is_enough() {
        let mut catalog = catalog();
        let mut customer = Customer::new("Mona", Money::from_major(115));
        let mut cart = Cart::new();
        add(&mut cart, &catalog, "cheese", 2);

        let summary = checkout(&cart, &mut catalog, &mut customer, now()).unwrap();
        assert_eq!(summary.balance_after, Money::zero());
    }

    #[test]
    fn per_unit_policy_scales_with_quantity() {
        let engine = CheckoutEngine::new(ShippingPolicy::default().per_unit());
        let mut catalog = catalog();
        let mut customer = Customer::new("Mona", Money::from_major(6000));
        let mut cart = Cart::new();
        add(&mut cart, &catalog, "cheese", 2);
        add(&mut cart, &catalog, "tv", 1);

        let summary = engine
            .checkout(&cart, &mut catalog, &mut customer, now())
            .unwrap();
        // 10 * (1.5 * 2 + 8 * 1)
        assert_eq!(summary.shipping_fee, Money::from_major(110));
    }

    #[test]
    fn oversized_amounts_are_rejected_without_mutation() {
        let huge = Money::from_minor(i64::MAX / 2 + 1);
        let mut catalog = ProductCatalog::new()
            .with_product(Product::new("gold", "Gold", huge, 2))
            .and_then(|c| {
                c.with_product(
                    Product::new("statue", "Statue", huge, 1).with_weight(kg(2.0)),
                )
            })
            .unwrap();
        let mut customer = Customer::new("Mona", Money::from_major(6000));

        // Line total overflows
        let mut cart = Cart::new();
        add(&mut cart, &catalog, "gold", 2);
        let err = checkout(&cart, &mut catalog, &mut customer, now()).unwrap_err();
        assert!(matches!(err, ShopError::AmountOverflow { .. }));

        // Each line fits but the subtotal does not
        let mut cart = Cart::new();
        add(&mut cart, &catalog, "gold", 1);
        add(&mut cart, &catalog, "statue", 1);
        let err = checkout(&cart, &mut catalog, &mut customer, now()).unwrap_err();
        assert!(matches!(err, ShopError::AmountOverflow { .. }));

        let mut cart = Cart::new();
        add(&mut cart, &catalog, "statue", 1);

        // Shipping fee overflows on its own
        let engine = CheckoutEngine::new(ShippingPolicy::new(huge));
        let err = engine
            .checkout(&cart, &mut catalog, &mut customer, now())
            .unwrap_err();
        assert!(matches!(err, ShopError::AmountOverflow { .. }));

        // Subtotal and fee fit but their sum does not
        let half_rate = Money::from_minor(huge.minor() / 2);
        let engine = CheckoutEngine::new(ShippingPolicy::new(half_rate));
        let err = engine
            .checkout(&cart, &mut catalog, &mut customer, now())
            .unwrap_err();
        assert_eq!(
            err,
            ShopError::AmountOverflow {
                context: "total".into()
            }
        );

        assert_eq!(customer.balance(), Money::from_major(6000));
        assert_eq!(stocks(&catalog), vec![2, 1]);
    }

    #[test]
    fn summary_serializes() {
        let mut catalog = catalog();
        let mut customer = Customer::new("Mona", Money::from_major(6000));
        let mut cart = Cart::new();
        add(&mut cart, &catalog, "cheese", 2);

        let summary = checkout(&cart, &mut catalog, &mut customer, now()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["subtotal"], 10_000);
        assert_eq!(json["shipping_fee"], 1_500);
        assert_eq!(json["total"], 11_500);
        assert_eq!(json["balance_after"], 588_500);
        assert_eq!(json["shipments"][0]["weight"], 1.5);

        let back: CheckoutSummary = serde_json::from_value(json).unwrap();
        assert_eq!(back, summary);
    }
}
