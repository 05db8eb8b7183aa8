//! User domain types.

use serde::{Deserialize, Serialize};

use cartwheel_core::{Email, SubscriptionDays, SubscriptionType, UserId};

/// A registered shopper (domain type).
///
/// This is also the value cached in the session after login, so it never
/// carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name chosen at registration.
    pub username: String,
    /// Login email address.
    pub email: Email,
    /// Delivery subscription plan.
    pub subscription_type: SubscriptionType,
    /// Subscription length in days; drives the baseline discount tier.
    #[serde(default)]
    pub subscription_days: Option<SubscriptionDays>,
}

/// Validated registration data.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub username: String,
    /// Login email address.
    pub email: Email,
    /// Delivery subscription plan.
    pub subscription_type: SubscriptionType,
    /// Optional subscription length.
    pub subscription_days: Option<SubscriptionDays>,
}
