//! Order domain types.
//!
//! Orders are stored denormalized: one `orders` row per purchased cart line,
//! each repeating the delivery details. [`Order`] regroups those rows by their
//! shared order ID so that listing and cancellation work on whole orders.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartwheel_core::{OrderId, OrderLineId};

/// A delivery location picked on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Delivery details entered at checkout, passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// Selected map location, if any.
    pub location: Option<Coordinates>,
}

/// One persisted order row (a snapshot of one cart line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Row ID.
    pub id: OrderLineId,
    /// Order this line belongs to.
    pub order_id: OrderId,
    /// Shopper's username at checkout.
    pub user_name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// Delivery latitude.
    pub latitude: Option<f64>,
    /// Delivery longitude.
    pub longitude: Option<f64>,
    /// Product title.
    pub product_name: String,
    /// Unit price.
    pub product_price: Decimal,
    /// Unit price × quantity.
    pub total_price: Decimal,
}

/// All lines of one checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Shared order ID.
    pub order_id: OrderId,
    /// Shopper's username.
    pub user_name: String,
    /// Delivery details (identical on every line).
    pub delivery: DeliveryDetails,
    /// Purchased lines.
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Sum of line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|l| l.total_price).sum()
    }

    /// Group raw order rows into orders, oldest order first.
    #[must_use]
    pub fn group(lines: Vec<OrderLine>) -> Vec<Self> {
        let mut orders: BTreeMap<OrderId, Self> = BTreeMap::new();
        for line in lines {
            orders
                .entry(line.order_id)
                .or_insert_with(|| Self {
                    order_id: line.order_id,
                    user_name: line.user_name.clone(),
                    delivery: DeliveryDetails {
                        address: line.address.clone(),
                        city: line.city.clone(),
                        postal_code: line.postal_code.clone(),
                        location: line.latitude.zip(line.longitude).map(
                            |(latitude, longitude)| Coordinates {
                                latitude,
                                longitude,
                            },
                        ),
                    },
                    lines: Vec::new(),
                })
                .lines
                .push(line);
        }
        orders.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, order_id: i64, total: i64) -> OrderLine {
        OrderLine {
            id: OrderLineId::new(id),
            order_id: OrderId::new(order_id),
            user_name: "ana".into(),
            address: "1 Main St".into(),
            city: "Pune".into(),
            postal_code: "411001".into(),
            latitude: Some(18.52),
            longitude: Some(73.85),
            product_name: format!("Product {id}"),
            product_price: Decimal::from(total),
            total_price: Decimal::from(total),
        }
    }

    #[test]
    fn test_group_by_order_id() {
        let orders = Order::group(vec![row(1, 20, 5), row(2, 10, 7), row(3, 20, 1)]);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_id, OrderId::new(10));
        assert_eq!(orders[1].lines.len(), 2);
        assert_eq!(orders[1].total(), Decimal::from(6));
        assert_eq!(
            orders[1].delivery.location,
            Some(Coordinates {
                latitude: 18.52,
                longitude: 73.85
            })
        );
    }

    #[test]
    fn test_group_empty() {
        assert!(Order::group(Vec::new()).is_empty());
    }
}
