//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod order_number;
pub mod page;
pub mod range;
pub mod status;
pub mod stock;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{
    AmountError, CheckoutRates, MAX_AMOUNT, OrderTotals, check_storable, effective_unit_price,
    line_total, to_minor_units,
};
pub use order_number::{OrderNumber, OrderNumberError};
pub use page::{PageInfo, PageRequest};
pub use range::AnalyticsRange;
pub use status::*;
pub use stock::{StockError, check_cart_add, check_cart_update};
