//! Domain models for the shop.
//!
//! These types represent validated domain objects separate from database row
//! types. Product data is copied into cart and order rows as plain values; no
//! model holds a reference to a catalog product.

pub mod cart;
pub mod order;
pub mod user;

pub use cart::{AddOutcome, CartLine, DecrementOutcome, NewCartLine, subtotal};
pub use order::{Coordinates, DeliveryDetails, Order, OrderLine};
pub use user::{NewUser, User};
