//! Checkout.
//!
//! Validates the order and snapshots it. No payment is taken and the cart
//! is left as it was.

use bazaar_core::forms::{FieldErrors, ShippingDetails};
use bazaar_core::{Email, LineItem};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::add_breadcrumb;
use crate::store::Store;

/// Errors that can occur when placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout needs a signed-in user.
    #[error("sign in to check out")]
    NotSignedIn,

    #[error("cart is empty")]
    EmptyCart,

    /// One or more shipping fields are missing.
    #[error("{0}")]
    Validation(#[from] FieldErrors),
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: Uuid,
    pub email: Email,
    pub shipping: ShippingDetails,
    pub lines: Vec<LineItem>,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
}

/// Place an order for the current cart.
///
/// # Errors
///
/// Returns `CheckoutError::NotSignedIn` without a signed-in user,
/// `CheckoutError::EmptyCart` for an empty cart, and
/// `CheckoutError::Validation` with one message per missing field.
#[instrument(skip(store, shipping))]
pub fn place_order(
    store: &Store,
    shipping: &ShippingDetails,
) -> Result<OrderConfirmation, CheckoutError> {
    let user = store.auth().user().ok_or(CheckoutError::NotSignedIn)?;
    let cart = store.cart();
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    shipping.validate()?;

    let order = OrderConfirmation {
        order_id: Uuid::new_v4(),
        email: user.email.clone(),
        shipping: shipping.clone(),
        lines: cart.items().to_vec(),
        total: cart.total(),
        placed_at: Utc::now(),
    };

    let order_id = order.order_id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));
    info!(order_id = %order.order_id, total = %order.total, "Order placed");
    Ok(order)
}
