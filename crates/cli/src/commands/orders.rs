//! Order commands.
//!
//! ```bash
//! cartwheel order quote --delivery-date 2024-06-01
//! cartwheel order place --address "1 Main St" --city Pune --postal-code 411001 \
//!     --lat 18.52 --lon 73.85 --delivery-date 2024-06-01
//! cartwheel order list
//! cartwheel order cancel 1717236000000 --yes
//! ```

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader};

use cartwheel_core::OrderId;
use cartwheel_shop::db::RepositoryError;
use cartwheel_shop::error::{AppError, add_breadcrumb};
use cartwheel_shop::lifetime::ScreenScope;
use cartwheel_shop::models::{Coordinates, DeliveryDetails, Order};
use cartwheel_shop::services::orders::OrderSummary;
use cartwheel_shop::state::AppState;

use super::{delivery_instant, money, require_user, say};

#[derive(Subcommand)]
pub enum OrderAction {
    /// Price the cart for the signed-in shopper
    Quote {
        /// Delivery date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        delivery_date: Option<NaiveDate>,
    },
    /// Place an order for everything in the cart
    Place {
        /// Street address
        #[arg(long)]
        address: String,

        /// City
        #[arg(long)]
        city: String,

        /// Postal code
        #[arg(long)]
        postal_code: String,

        /// Delivery latitude
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Delivery longitude
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Delivery date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        delivery_date: Option<NaiveDate>,
    },
    /// List placed orders
    List,
    /// Cancel a whole order
    Cancel {
        /// Order ID
        order_id: OrderId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Run an order command.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if placing an order while signed out,
/// `AppError::NotFound` for an unknown order, or an error if the store fails.
pub async fn run(state: &AppState, scope: &ScreenScope, action: OrderAction) -> Result<(), AppError> {
    match action {
        OrderAction::Quote { delivery_date } => {
            let user = state.session().current_user().await?;
            let now = Utc::now();
            let summary = scope
                .run(state.order_summaries().summary(
                    user.as_ref(),
                    delivery_instant(delivery_date, now),
                    now,
                ))
                .await??;
            print_summary(&summary);
        }
        OrderAction::Place {
            address,
            city,
            postal_code,
            lat,
            lon,
            delivery_date,
        } => {
            let user = require_user(state, "place an order").await?;
            let now = Utc::now();
            let summary = scope
                .run(state.order_summaries().summary(
                    Some(&user),
                    delivery_instant(delivery_date, now),
                    now,
                ))
                .await??;

            let delivery = DeliveryDetails {
                address,
                city,
                postal_code,
                location: lat.zip(lon).map(|(latitude, longitude)| Coordinates {
                    latitude,
                    longitude,
                }),
            };

            let order_id = scope
                .run(state.checkout().place_order(&summary.lines, &user, &delivery))
                .await??;

            add_breadcrumb("checkout", "Order placed", None);
            print_summary(&summary);
            say(&format!("Order {order_id} has been placed successfully."));
        }
        OrderAction::List => {
            let orders = scope.run(state.orders().list_orders()).await??;
            if orders.is_empty() {
                say("No orders yet.");
            }
            for order in &orders {
                print_order(order);
            }
        }
        OrderAction::Cancel { order_id, yes } => {
            if !yes && !confirm(&format!("Cancel order {order_id}?")).await? {
                say("Kept the order.");
                return Ok(());
            }
            let removed = scope
                .run(state.orders().cancel(order_id))
                .await?
                .map_err(|e| match e {
                    RepositoryError::NotFound => AppError::NotFound(format!("Order {order_id}")),
                    other => other.into(),
                })?;
            say(&format!("Order {order_id} cancelled ({removed} line(s) removed)."));
        }
    }
    Ok(())
}

fn print_summary(summary: &OrderSummary) {
    for line in &summary.lines {
        say(&format!(
            "{} - {} x {}",
            line.title,
            money(line.price),
            line.quantity
        ));
    }
    if let Some(plan) = summary.subscription {
        say(&format!("Subscription: {}", plan.label()));
    }
    say(&format!("Additional discount: {}%", summary.additional_percent()));
    say(&format!("Subtotal: {}", money(summary.quote.base_total)));
    say(&format!(
        "Total discount: {}%",
        summary.quote.discount_percent()
    ));
    say(&format!(
        "Total after Discounts: {}",
        money(summary.quote.total)
    ));
}

fn print_order(order: &Order) {
    say(&format!("Order {} for {}", order.order_id, order.user_name));
    let d = &order.delivery;
    say(&format!("  Deliver to: {}, {} {}", d.address, d.city, d.postal_code));
    if let Some(at) = d.location {
        say(&format!("  Location:   {:.6}, {:.6}", at.latitude, at.longitude));
    }
    for line in &order.lines {
        say(&format!(
            "  {} - {} ({})",
            line.product_name,
            money(line.total_price),
            money(line.product_price)
        ));
    }
    say(&format!("  Total: {}", money(order.total())));
}

/// Ask a yes/no question on stdin. Anything but `y`/`yes` is a no.
async fn confirm(question: &str) -> Result<bool, AppError> {
    say(&format!("{question} [y/N]"));
    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .map_err(|e| AppError::BadRequest(format!("could not read confirmation: {e}")))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
