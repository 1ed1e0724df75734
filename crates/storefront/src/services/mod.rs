//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Email and password authentication
//! - `checkout` - Cart totals, payment intents and order placement
//! - `payments` - Payment provider REST client

pub mod auth;
pub mod checkout;
pub mod payments;
