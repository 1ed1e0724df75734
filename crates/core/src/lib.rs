//! Bazaar Core - Shared domain types.
//!
//! This crate provides the types shared by all Bazaar components:
//! - `storefront` - HTTP JSON API for shoppers and sellers
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure computations - no I/O, no
//! database access, no HTTP clients. Checkout arithmetic, the stock guard and
//! the order status transition table live here so they can be tested without
//! a database.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, statuses, order numbers, money, stock checks,
//!   pagination and analytics ranges

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
