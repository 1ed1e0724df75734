//! Domain models for the storefront.
//!
//! These types are validated domain objects, separate from the database row
//! types in [`crate::db`]. They serialize with camelCase field names and form
//! the JSON API's response bodies.

pub mod analytics;
pub mod cart;
pub mod order;
pub mod payment;
pub mod product;
pub mod session;
pub mod shop;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
