//! # Command Handlers
//!
//! One handler per menu command. Handlers call into `shop-core` and render
//! the results as text; they never read input themselves.

use crate::state::ShopState;
use chrono::{DateTime, Utc};
use shop_core::{dispatch_shipments, CheckoutSummary, Shipment, ShippingNotifier, ShopError};
use std::cell::RefCell;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

// =============================================================================
// Errors
// =============================================================================

/// Problems with what the shopper typed. These never reach `shop-core`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("'{0}' is not a valid number")]
    NotANumber(String),

    #[error("Invalid product number.")]
    NoSuchProduct(usize),
}

/// Anything a command can fail with that the loop reports and moves past
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Shop(#[from] ShopError),

    /// Output failures end the session
    #[error("output failed: {0}")]
    Io(#[from] io::Error),
}

// =============================================================================
// Shipping notice
// =============================================================================

/// Writes the shipping notice to the session output.
///
/// A write failure is kept and handed back by `take_error`.
pub struct ConsoleShippingNotifier<W: Write> {
    out: RefCell<W>,
    failure: RefCell<Option<io::Error>>,
}

impl<W: Write> ConsoleShippingNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
            failure: RefCell::new(None),
        }
    }

    /// The first write failure, if any
    pub fn take_error(&self) -> Option<io::Error> {
        self.failure.borrow_mut().take()
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> ShippingNotifier for ConsoleShippingNotifier<W> {
    fn notify(&self, shipments: &[Shipment]) {
        let mut out = self.out.borrow_mut();
        if let Err(e) = write_shipments(&mut *out, shipments) {
            error!(error = %e, "failed to write shipping notice");
            self.failure.borrow_mut().get_or_insert(e);
        }
    }
}

fn write_shipments(out: &mut impl Write, shipments: &[Shipment]) -> io::Result<()> {
    writeln!(out, "\nShipping the following items:")?;
    for shipment in shipments {
        writeln!(out, "- {} ({})", shipment.name, shipment.weight)?;
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Print the catalog with 1-based numbers
pub fn list_products(state: &ShopState, out: &mut impl Write, now: DateTime<Utc>) -> io::Result<()> {
    writeln!(out, "\nAvailable Products:")?;
    for (number, product) in state.catalog.iter().enumerate() {
        let status = if product.is_expired(now) { " (Expired)" } else { "" };
        writeln!(
            out,
            "{}. {} - {} - {} in stock{}",
            number + 1,
            product.name,
            state.config.price(product.price),
            product.quantity,
            status
        )?;
    }
    Ok(())
}

/// Resolve a product number and add it to the cart.
/// Returns the product name on success.
#[instrument(skip(state))]
pub fn add_to_cart(
    state: &mut ShopState,
    product_number: usize,
    quantity: u32,
) -> Result<String, CommandError> {
    let product = state
        .catalog
        .nth(product_number)
        .ok_or(InputError::NoSuchProduct(product_number))?;
    state.cart.add_item(product, quantity)?;
    debug!(product = %product.id, quantity, "added to cart");
    Ok(product.name.clone())
}

/// Print the cart's line items and their subtotal
pub fn view_cart(state: &ShopState, out: &mut impl Write) -> Result<(), CommandError> {
    writeln!(out, "\nYour Cart:")?;
    if state.cart.is_empty() {
        writeln!(out, "Cart is empty.")?;
        return Ok(());
    }
    for (number, item) in state.cart.items().iter().enumerate() {
        writeln!(
            out,
            "{}. {} x {} = {}",
            number + 1,
            item.name,
            item.quantity,
            state.config.price(item.line_total()?)
        )?;
    }
    writeln!(out, "Cart Subtotal: {}", state.config.price(state.cart.subtotal()?))?;
    Ok(())
}

/// Check out, empty the cart, then print the summary and shipping notice.
/// The order stands even when printing fails.
#[instrument(skip(state, out), fields(items = state.cart.len()))]
pub fn checkout<W: Write>(
    state: &mut ShopState,
    out: &mut W,
    now: DateTime<Utc>,
) -> Result<CheckoutSummary, CommandError> {
    let summary = state
        .engine
        .checkout(&state.cart, &mut state.catalog, &mut state.customer, now)
        .map_err(|e| {
            warn!(kind = e.label(), error = %e, "checkout failed");
            e
        })?;

    state.cart.clear();
    info!(order_id = %summary.order_id, total = %summary.total, "order placed");
    match serde_json::to_string(&summary) {
        Ok(receipt) => debug!(%receipt, "checkout receipt"),
        Err(e) => warn!(error = %e, "could not serialize receipt"),
    }

    render_summary(state, &summary, out)?;
    let notifier = ConsoleShippingNotifier::new(&mut *out);
    dispatch_shipments(&notifier, &summary);
    if let Some(e) = notifier.take_error() {
        return Err(CommandError::Io(e));
    }
    Ok(summary)
}

fn render_summary(
    state: &ShopState,
    summary: &CheckoutSummary,
    out: &mut impl Write,
) -> io::Result<()> {
    let config = &state.config;
    writeln!(out, "Checkout Summary:")?;
    writeln!(out, "Subtotal: {}", config.price(summary.subtotal))?;
    writeln!(out, "Shipping Fees: {}", config.price(summary.shipping_fee))?;
    writeln!(out, "Total Paid: {}", config.price(summary.total))?;
    writeln!(out, "Customer Balance: {}", config.price(summary.balance_after))?;
    Ok(())
}
