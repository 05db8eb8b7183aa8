//! Authentication service.
//!
//! Password registration and login against the local `users` table.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use cartwheel_core::{Email, SubscriptionDays, SubscriptionType};

use crate::db::{RepositoryError, Store};
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};

/// Subscription lengths offered at registration.
pub const SUBSCRIPTION_DAY_OPTIONS: [u32; 2] = [5, 10];

/// Registration form input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub subscription_type: SubscriptionType,
    pub subscription_days: Option<SubscriptionDays>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            users: UserRepository::new(store),
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if username, email or password is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UnsupportedSubscriptionDays` for a length other than 5 or 10.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &Registration) -> Result<User, AuthError> {
        require_fields(&[
            ("username", form.username.as_str()),
            ("email", form.email.as_str()),
            ("password", form.password.expose_secret()),
        ])?;

        let email = Email::parse(&form.email)?;

        if let Some(days) = form.subscription_days
            && !SUBSCRIPTION_DAY_OPTIONS.contains(&days.get())
        {
            return Err(AuthError::UnsupportedSubscriptionDays(days.get()));
        }

        let password_hash = hash_password(form.password.expose_secret())?;

        let new_user = NewUser {
            username: form.username.trim().to_owned(),
            email,
            subscription_type: form.subscription_type,
            subscription_days: form.subscription_days,
        };

        let user = self
            .users
            .create(&new_user, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either field is blank.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        require_fields(&[("email", email), ("password", password.expose_secret())])?;

        // A malformed email cannot belong to anyone.
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password.expose_secret(), &password_hash)?;

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }
}

/// Reject blank fields, naming every one that is missing.
fn require_fields(fields: &[(&'static str, &str)]) -> Result<(), AuthError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AuthError::MissingFields(missing))
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str) -> Registration {
        Registration {
            username: "ana".into(),
            email: email.into(),
            password: SecretString::from(password.to_owned()),
            subscription_type: SubscriptionType::Weekdays,
            subscription_days: Some(SubscriptionDays::new(5)),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = Store::in_memory().await.unwrap();
        let auth = AuthService::new(&store);

        let registered = auth.register(&form("ana@example.com", "pw")).await.unwrap();
        let logged_in = auth
            .login("ana@example.com", &SecretString::from("pw".to_owned()))
            .await
            .unwrap();

        assert_eq!(logged_in, registered);
        assert_eq!(logged_in.subscription_type, SubscriptionType::Weekdays);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email() {
        let store = Store::in_memory().await.unwrap();
        let auth = AuthService::new(&store);
        auth.register(&form("ana@example.com", "pw")).await.unwrap();

        assert!(matches!(
            auth.login("ana@example.com", &SecretString::from("nope".to_owned())).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("bob@example.com", &SecretString::from("pw".to_owned())).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_validation_happens_before_store_access() {
        let store = Store::in_memory().await.unwrap();
        let auth = AuthService::new(&store);

        let err = auth.register(&form("  ", "")).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingFields(ref f) if *f == ["email", "password"]));

        assert!(matches!(
            auth.register(&form("not-an-email", "pw")).await,
            Err(AuthError::InvalidEmail(_))
        ));

        let mut bad_plan = form("ana@example.com", "pw");
        bad_plan.subscription_days = Some(SubscriptionDays::new(7));
        assert!(matches!(
            auth.register(&bad_plan).await,
            Err(AuthError::UnsupportedSubscriptionDays(7))
        ));

        assert!(matches!(
            auth.login("", &SecretString::from("pw".to_owned())).await,
            Err(AuthError::MissingFields(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let store = Store::in_memory().await.unwrap();
        let auth = AuthService::new(&store);
        auth.register(&form("ana@example.com", "pw")).await.unwrap();

        assert!(matches!(
            auth.register(&form("ana@example.com", "other")).await,
            Err(AuthError::UserAlreadyExists)
        ));
    }
}
