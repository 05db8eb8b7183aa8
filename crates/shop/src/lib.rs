//! Cartwheel shop library.
//!
//! Catalog browsing, a persistent cart, pricing, checkout and order history
//! over a local SQLite store. The `cartwheel` CLI is a thin layer over this
//! crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod lifetime;
pub mod models;
pub mod pricing;
pub mod services;
pub mod session;
pub mod state;
