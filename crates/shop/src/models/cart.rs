//! Cart domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartwheel_core::ProductId;

/// One product's entry in the cart.
///
/// Keyed by product ID; the cart holds at most one line per product and a
/// stored quantity is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID (also the cart row's primary key).
    pub id: ProductId,
    /// Product title at the time it was added.
    pub title: String,
    /// Unit price at the time it was added.
    pub price: Decimal,
    /// Units in the cart.
    pub quantity: u32,
    /// Thumbnail image URL.
    pub thumbnail: String,
    /// Full-size image URL.
    pub photo: String,
    /// Product discount as a fraction (0.12 = 12%), if the catalog offered one.
    pub discount: Option<Decimal>,
}

impl CartLine {
    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Product fields copied into the cart on first add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    /// Product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Unit price.
    pub price: Decimal,
    /// Thumbnail image URL.
    pub thumbnail: String,
    /// Full-size image URL.
    pub photo: String,
    /// Product discount as a fraction.
    pub discount: Option<Decimal>,
}

/// Result of adding a product to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created with quantity 1.
    Added,
    /// The product was already in the cart; its quantity went up by one.
    QuantityIncreased,
}

impl AddOutcome {
    /// Message shown to the shopper.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Added => "Item added to cart",
            Self::QuantityIncreased => "Quantity increased",
        }
    }
}

/// Result of decrementing a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// Quantity went down by one and the line remains.
    Decremented,
    /// The line was at quantity 1 and has been removed.
    Removed,
}

/// Undiscounted cart total, `Σ price × quantity`.
#[must_use]
pub fn subtotal(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i64, price: Decimal, quantity: u32) -> CartLine {
        CartLine {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price,
            quantity,
            thumbnail: String::new(),
            photo: String::new(),
            discount: None,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(
            line(1, Decimal::new(999, 2), 3).line_total(),
            Decimal::new(2997, 2)
        );
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let lines = [
            line(1, Decimal::new(1050, 2), 2),
            line(2, Decimal::from(5), 1),
        ];
        assert_eq!(subtotal(&lines), Decimal::from(26));
        assert_eq!(subtotal(&[]), Decimal::ZERO);
    }
}
