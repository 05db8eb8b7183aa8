//! Cart pricing.
//!
//! The discount rate is assembled in steps:
//!
//! 1. Subscription discount: 10% for a 5-day plan, 15% for a 10-day plan.
//! 2. The largest per-product discount in the cart replaces it when strictly
//!    greater.
//! 3. Scheduling delivery 5 or more days out adds 5%, capped at 30%.
//! 4. A flat additional 10% is always added, capped at 40%.
//!
//! An empty cart or a shopper who is not signed in gets a zero quote.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::cart::{CartLine, subtotal};
use crate::models::user::User;

/// Lead time (in days) from which the advance-booking discount applies.
pub const ADVANCE_BOOKING_DAYS: i64 = 5;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Discount for a 5-day subscription.
fn five_day_rate() -> Decimal {
    Decimal::new(10, 2)
}

/// Discount for a 10-day subscription.
fn ten_day_rate() -> Decimal {
    Decimal::new(15, 2)
}

fn advance_booking_rate() -> Decimal {
    Decimal::new(5, 2)
}

fn advance_booking_cap() -> Decimal {
    Decimal::new(30, 2)
}

/// The flat discount added to every order.
#[must_use]
pub fn additional_rate() -> Decimal {
    Decimal::new(10, 2)
}

fn max_rate() -> Decimal {
    Decimal::new(40, 2)
}

/// Priced cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// `Σ price × quantity`.
    pub base_total: Decimal,
    /// Fraction taken off, between 0 and 0.40.
    pub discount_rate: Decimal,
    /// `base_total × (1 − discount_rate)`.
    pub total: Decimal,
}

impl Quote {
    /// Nothing to pay.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            base_total: Decimal::ZERO,
            discount_rate: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    /// Discount rate as a whole percentage, e.g. `30` for 0.30.
    #[must_use]
    pub fn discount_percent(&self) -> Decimal {
        (self.discount_rate * Decimal::ONE_HUNDRED).normalize()
    }
}

/// Price the cart for `user` with delivery on `delivery`, as seen on `today`.
#[must_use]
pub fn compute_total(
    lines: &[CartLine],
    user: Option<&User>,
    delivery: DateTime<Utc>,
    today: DateTime<Utc>,
) -> Quote {
    let Some(user) = user else {
        return Quote::zero();
    };
    if lines.is_empty() {
        return Quote::zero();
    }

    let base_total = subtotal(lines);

    let mut rate = match user.subscription_days.map(|d| d.get()) {
        Some(5) => five_day_rate(),
        Some(10) => ten_day_rate(),
        _ => Decimal::ZERO,
    };

    let best_product = lines
        .iter()
        .filter_map(|l| l.discount)
        .max()
        .unwrap_or(Decimal::ZERO);
    if best_product > rate {
        rate = best_product;
    }

    if lead_days(delivery, today) >= ADVANCE_BOOKING_DAYS {
        rate = (rate + advance_booking_rate()).min(advance_booking_cap());
    }

    rate = (rate + additional_rate()).min(max_rate());

    Quote {
        base_total,
        discount_rate: rate,
        total: base_total * (Decimal::ONE - rate),
    }
}

/// Whole days between two instants, rounded up.
#[must_use]
pub fn lead_days(delivery: DateTime<Utc>, today: DateTime<Utc>) -> i64 {
    let millis = (delivery - today).num_milliseconds().abs();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use cartwheel_core::{Email, ProductId, SubscriptionDays, SubscriptionType, UserId};

    use super::*;

    fn user(days: Option<u32>) -> User {
        User {
            id: UserId::new(1),
            username: "ana".into(),
            email: Email::parse("ana@example.com").unwrap(),
            subscription_type: SubscriptionType::Weekend,
            subscription_days: days.map(SubscriptionDays::new),
        }
    }

    fn line(price: i64, quantity: u32, discount: Option<Decimal>) -> CartLine {
        CartLine {
            id: ProductId::new(price),
            title: "Item".into(),
            price: Decimal::from(price),
            quantity,
            thumbnail: String::new(),
            photo: String::new(),
            discount,
        }
    }

    fn today() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_empty_cart_is_zero() {
        let u = user(Some(10));
        assert_eq!(compute_total(&[], Some(&u), today(), today()), Quote::zero());
    }

    #[test]
    fn test_no_user_is_zero() {
        let lines = [line(100, 1, None)];
        assert_eq!(compute_total(&lines, None, today(), today()), Quote::zero());
    }

    #[test]
    fn test_ten_day_plan_with_six_day_lead() {
        let lines = [line(1000, 1, Some(Decimal::new(12, 2)))];
        let u = user(Some(10));
        let quote = compute_total(&lines, Some(&u), today() + Duration::days(6), today());
        assert_eq!(quote.base_total, Decimal::from(1000));
        assert_eq!(quote.discount_rate, Decimal::new(30, 2));
        assert_eq!(quote.total, Decimal::from(700));
        assert_eq!(quote.discount_percent(), Decimal::from(30));
    }

    #[test]
    fn test_ten_day_plan_with_one_day_lead() {
        let lines = [line(1000, 1, Some(Decimal::new(12, 2)))];
        let u = user(Some(10));
        let quote = compute_total(&lines, Some(&u), today() + Duration::days(1), today());
        assert_eq!(quote.discount_rate, Decimal::new(25, 2));
        assert_eq!(quote.total, Decimal::from(750));
    }

    #[test]
    fn test_product_discount_replaces_smaller_subscription_discount() {
        let lines = [
            line(50, 2, Some(Decimal::new(20, 2))),
            line(100, 1, Some(Decimal::new(5, 2))),
        ];
        let u = user(Some(5));
        let quote = compute_total(&lines, Some(&u), today(), today());
        assert_eq!(quote.base_total, Decimal::from(200));
        assert_eq!(quote.discount_rate, Decimal::new(30, 2));
        assert_eq!(quote.total, Decimal::from(140));
    }

    #[test]
    fn test_caps() {
        let lines = [line(100, 1, Some(Decimal::new(35, 2)))];
        let u = user(None);

        // 0.35 + 0.05 is capped at 0.30, then 0.30 + 0.10 = 0.40.
        let far = compute_total(&lines, Some(&u), today() + Duration::days(9), today());
        assert_eq!(far.discount_rate, Decimal::new(40, 2));

        // Without the advance booking bonus 0.35 + 0.10 is capped at 0.40.
        let near = compute_total(&lines, Some(&u), today(), today());
        assert_eq!(near.discount_rate, Decimal::new(40, 2));
    }

    #[test]
    fn test_unknown_plan_gets_only_additional_discount() {
        let lines = [line(10, 3, None)];
        let u = user(Some(7));
        let quote = compute_total(&lines, Some(&u), today(), today());
        assert_eq!(quote.discount_rate, Decimal::new(10, 2));
        assert_eq!(quote.total, Decimal::from(27));
    }

    #[test]
    fn test_lead_days_rounds_up_and_ignores_direction() {
        let t = today();
        assert_eq!(lead_days(t, t), 0);
        assert_eq!(lead_days(t + Duration::hours(1), t), 1);
        assert_eq!(lead_days(t + Duration::hours(97), t), 5);
        assert_eq!(lead_days(t - Duration::days(6), t), 6);
    }
}
