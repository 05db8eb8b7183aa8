//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `catalog` - Failure-tolerant catalog browsing with a local snapshot
//! - `checkout` - Atomic order placement
//! - `orders` - Quotes and order history for the signed-in shopper

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod orders;
