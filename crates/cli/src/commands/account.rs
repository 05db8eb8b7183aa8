//! Account commands.
//!
//! ```bash
//! cartwheel account register -u ana -e ana@example.com -p secret -t weekdays -d 10
//! cartwheel account login -e ana@example.com -p secret
//! cartwheel account profile
//! cartwheel account logout
//! ```

use clap::Subcommand;
use secrecy::SecretString;

use cartwheel_core::{SubscriptionDays, SubscriptionType};
use cartwheel_shop::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use cartwheel_shop::lifetime::ScreenScope;
use cartwheel_shop::models::User;
use cartwheel_shop::services::auth::Registration;
use cartwheel_shop::state::AppState;

use super::say;

#[derive(Subcommand)]
pub enum AccountAction {
    /// Create an account
    Register {
        /// Display name
        #[arg(short, long)]
        username: String,

        /// Login email
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Subscription plan (`weekend`, `weekdays`, `random`)
        #[arg(short = 't', long, default_value = "weekend")]
        subscription_type: SubscriptionType,

        /// Subscription length in days (5 or 10)
        #[arg(short = 'd', long)]
        subscription_days: Option<SubscriptionDays>,
    },
    /// Sign in
    Login {
        /// Login email
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and clear the session
    Logout,
    /// Show the signed-in shopper
    Profile,
}

/// Run an account command.
///
/// # Errors
///
/// Returns an error if validation, authentication or session storage fails.
pub async fn run(state: &AppState, scope: &ScreenScope, action: AccountAction) -> Result<(), AppError> {
    match action {
        AccountAction::Register {
            username,
            email,
            password,
            subscription_type,
            subscription_days,
        } => {
            let form = Registration {
                username,
                email,
                password: SecretString::from(password),
                subscription_type,
                subscription_days,
            };
            let user = scope.run(state.auth().register(&form)).await??;
            say(&format!("User {} registered successfully!", user.username));
        }
        AccountAction::Login { email, password } => {
            if let Some(user) = state.session().current_user().await? {
                say(&format!("Already signed in as {} <{}>", user.username, user.email));
                return Ok(());
            }

            let password = SecretString::from(password);
            let user = scope.run(state.auth().login(&email, &password)).await??;
            state.session().sign_in(&user).await?;

            set_sentry_user(&user.id, Some(user.email.as_str()));
            add_breadcrumb("auth", "Logged in", None);
            say(&format!("Login successful. Welcome, {}!", user.username));
        }
        AccountAction::Logout => {
            state.session().sign_out().await?;
            clear_sentry_user();
            say("Logged out.");
        }
        AccountAction::Profile => match state.session().current_user().await? {
            Some(user) => print_profile(&user),
            None => say("Not signed in."),
        },
    }
    Ok(())
}

fn print_profile(user: &User) {
    say(&format!("Username:     {}", user.username));
    say(&format!("Email:        {}", user.email));
    say(&format!("Subscription: {}", user.subscription_type.label()));
    if let Some(days) = user.subscription_days {
        say(&format!("Plan length:  {} days", days.get()));
    }
}
