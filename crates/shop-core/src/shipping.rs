//! # Shipping Notifications
//!
//! After a checkout commits, the shippable line items are handed to a
//! [`ShippingNotifier`]. The engine never calls it; the caller decides.
//!
//! ```rust,ignore
//! use shop_core::{checkout, dispatch_shipments, LoggingShippingNotifier};
//!
//! let summary = checkout(&cart, &mut catalog, &mut customer, Utc::now())?;
//! dispatch_shipments(&LoggingShippingNotifier, &summary);
//! ```

use crate::checkout::{CheckoutSummary, Shipment};
use tracing::info;

/// Receives the shippable items of a completed checkout.
///
/// The default implementation logs one event per shipment.
pub trait ShippingNotifier {
    fn notify(&self, shipments: &[Shipment]) {
        for shipment in shipments {
            info!(
                product = %shipment.product_id,
                name = %shipment.name,
                weight = %shipment.weight,
                quantity = shipment.quantity,
                "shipment queued"
            );
        }
    }
}

/// Notifier that only logs
pub struct LoggingShippingNotifier;

impl ShippingNotifier for LoggingShippingNotifier {}

/// Hand a summary's shipments to `notifier` when there are any.
/// Returns whether the notifier was called.
pub fn dispatch_shipments(notifier: &dyn ShippingNotifier, summary: &CheckoutSummary) -> bool {
    if !summary.has_shipments() {
        return false;
    }
    notifier.notify(&summary.shipments);
    true
}
