//! Command handlers, one module per screen group.
//!
//! Handlers print their results on stdout. Errors bubble up to `main`, which
//! reports them and prints the shopper-facing message on stderr.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod init;
pub mod orders;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use cartwheel_core::Price;
use cartwheel_shop::catalog::ProductListing;
use cartwheel_shop::error::AppError;
use cartwheel_shop::models::User;
use cartwheel_shop::state::AppState;

/// Print one line of command output.
#[allow(clippy::print_stdout)]
pub fn say(line: &str) {
    println!("{line}");
}

/// Print an alert for the shopper.
#[allow(clippy::print_stderr)]
pub fn alert(line: &str) {
    eprintln!("{line}");
}

/// Format an amount for display.
pub fn money(amount: Decimal) -> String {
    Price::of(amount).display()
}

/// The signed-in shopper, or an `Unauthorized` error naming `action`.
pub async fn require_user(state: &AppState, action: &str) -> Result<User, AppError> {
    state
        .session()
        .current_user()
        .await?
        .ok_or_else(|| AppError::Unauthorized(format!("Please log in to {action}")))
}

/// A delivery instant on `date` at the current time of day, or now.
pub fn delivery_instant(date: Option<NaiveDate>, now: DateTime<Utc>) -> DateTime<Utc> {
    date.map_or(now, |d| d.and_time(now.time()).and_utc())
}

/// Print a product table.
pub fn print_listing(listing: &ProductListing) {
    if listing.products.is_empty() {
        say("No products found.");
        return;
    }
    for p in &listing.products {
        let discount = p
            .discount_percentage
            .map(|pct| format!("  -{}%", pct.round_dp(2).normalize()))
            .unwrap_or_default();
        say(&format!("{:>5}  {:<40}  {}{discount}", p.id, p.title, money(p.price)));
    }
    say(&format!(
        "Showing {} of {} (skip {})",
        listing.products.len(),
        listing.total,
        listing.skip
    ));
}
