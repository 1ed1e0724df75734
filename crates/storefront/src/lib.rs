//! Bazaar Storefront library.
//!
//! The HTTP JSON API for shoppers and sellers, exposed as a library so the
//! router can be built in tests and the CLI can reuse the repositories.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
