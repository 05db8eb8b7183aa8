//! Subscription attributes carried by a user.
//!
//! The subscription type is chosen at registration. The optional subscription
//! length in days drives the baseline discount tier at checkout.

use serde::{Deserialize, Serialize};

/// Errors from parsing subscription values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Unknown subscription type name.
    #[error("invalid subscription type: {0} (expected Weekend, Weekdays or Random)")]
    UnknownType(String),
    /// Subscription length is not a whole number of days.
    #[error("invalid subscription length: {0}")]
    InvalidDays(String),
}

/// Delivery subscription plan selected at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SubscriptionType {
    /// Deliveries on weekends.
    #[default]
    Weekend,
    /// Deliveries on weekdays.
    Weekdays,
    /// Deliveries on any day.
    Random,
}

impl SubscriptionType {
    /// Name as stored in the `users.subscription_type` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekend => "Weekend",
            Self::Weekdays => "Weekdays",
            Self::Random => "Random",
        }
    }

    /// Label shown to shoppers.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Weekend => "Weekend Subscription",
            Self::Weekdays => "Weekdays Subscription",
            Self::Random => "Random Day Subscription",
        }
    }
}

impl std::fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionType {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekend" => Ok(Self::Weekend),
            "weekdays" => Ok(Self::Weekdays),
            "random" => Ok(Self::Random),
            _ => Err(SubscriptionError::UnknownType(s.to_owned())),
        }
    }
}

/// Length of a subscription in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionDays(u32);

impl SubscriptionDays {
    /// Create a subscription length.
    #[must_use]
    pub const fn new(days: u32) -> Self {
        Self(days)
    }

    /// Number of days.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl std::str::FromStr for SubscriptionDays {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| SubscriptionError::InvalidDays(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_type_round_trips_through_text() {
        for kind in [
            SubscriptionType::Weekend,
            SubscriptionType::Weekdays,
            SubscriptionType::Random,
        ] {
            assert_eq!(kind.as_str().parse::<SubscriptionType>().unwrap(), kind);
        }
    }

    #[test]
    fn test_subscription_type_parse_is_case_insensitive() {
        assert_eq!(
            "WEEKDAYS".parse::<SubscriptionType>().unwrap(),
            SubscriptionType::Weekdays
        );
        assert!("monthly".parse::<SubscriptionType>().is_err());
    }

    #[test]
    fn test_subscription_days_parse() {
        assert_eq!("10".parse::<SubscriptionDays>().unwrap().get(), 10);
        assert!("-5".parse::<SubscriptionDays>().is_err());
    }
}
