//! Cartwheel Core - Shared domain types.
//!
//! This crate provides the value types used across all Cartwheel components:
//! - `shop` - Store, cart, pricing, checkout and catalog client
//! - `cli` - The `cartwheel` command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. SQLite encoding for the ID and email newtypes is available
//! behind the `sqlite` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails and subscriptions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
