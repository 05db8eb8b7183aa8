//! Order summaries priced from the stored cart.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use cartwheel_integration_tests::{TestContext, product};

fn today() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
}

#[tokio::test]
async fn test_empty_cart_quotes_zero() {
    let ctx = TestContext::new().await;
    let user = ctx.register("ana@example.com", "pw", Some(10)).await.unwrap();

    let summary = ctx
        .state
        .order_summaries()
        .summary(Some(&user), today(), today())
        .await
        .unwrap();

    assert!(summary.lines.is_empty());
    assert_eq!(summary.quote.total, Decimal::ZERO);
}

#[tokio::test]
async fn test_signed_out_shopper_quotes_zero() {
    let ctx = TestContext::new().await;
    ctx.state
        .cart()
        .add(&product(1, Decimal::from(100), None))
        .await
        .unwrap();

    let summary = ctx
        .state
        .order_summaries()
        .summary(None, today(), today())
        .await
        .unwrap();

    assert_eq!(summary.lines.len(), 1);
    assert_eq!(summary.quote.total, Decimal::ZERO);
}

#[tokio::test]
async fn test_advance_booking_takes_ten_day_plan_to_thirty_percent() {
    let ctx = TestContext::new().await;
    let user = ctx.register("ana@example.com", "pw", Some(10)).await.unwrap();
    ctx.state
        .cart()
        .add(&product(1, Decimal::from(1000), Some(Decimal::new(12, 2))))
        .await
        .unwrap();
    let summaries = ctx.state.order_summaries();

    let early = summaries
        .summary(Some(&user), today() + Duration::days(6), today())
        .await
        .unwrap();
    assert_eq!(early.quote.base_total, Decimal::from(1000));
    assert_eq!(early.quote.discount_percent(), Decimal::from(30));
    assert_eq!(early.quote.total, Decimal::from(700));

    let late = summaries
        .summary(Some(&user), today() + Duration::days(1), today())
        .await
        .unwrap();
    assert_eq!(late.quote.discount_percent(), Decimal::from(25));
    assert_eq!(late.quote.total, Decimal::from(750));
}

#[tokio::test]
async fn test_summary_reports_the_plan() {
    let ctx = TestContext::new().await;
    let user = ctx.register("ana@example.com", "pw", Some(5)).await.unwrap();
    ctx.state
        .cart()
        .add(&product(1, Decimal::from(200), None))
        .await
        .unwrap();

    let summary = ctx
        .state
        .order_summaries()
        .summary(Some(&user), today(), today())
        .await
        .unwrap();

    assert_eq!(summary.subscription, Some(user.subscription_type));
    assert_eq!(summary.additional_percent(), Decimal::from(10));
    // 5-day plan 10% + flat 10%
    assert_eq!(summary.quote.total, Decimal::from(160));
}
