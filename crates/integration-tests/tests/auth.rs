//! Registration, login and the signed-in session.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use cartwheel_core::SubscriptionDays;
use cartwheel_integration_tests::TestContext;
use cartwheel_shop::services::auth::AuthError;

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

#[tokio::test]
async fn test_register_then_login_returns_the_same_user() {
    let ctx = TestContext::new().await;
    let registered = ctx
        .register("ana@example.com", "correct horse", Some(10))
        .await
        .unwrap();

    let logged_in = ctx
        .state
        .auth()
        .login("ana@example.com", &secret("correct horse"))
        .await
        .unwrap();

    assert_eq!(logged_in, registered);
    assert_eq!(logged_in.subscription_days, Some(SubscriptionDays::new(10)));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let ctx = TestContext::new().await;
    ctx.register("ana@example.com", "right", None).await.unwrap();
    let auth = ctx.state.auth();

    assert!(matches!(
        auth.login("ana@example.com", &secret("wrong")).await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.login("nobody@example.com", &secret("right")).await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.register("ana@example.com", "one", None).await.unwrap();

    assert!(matches!(
        ctx.register("ana@example.com", "two", None).await,
        Err(AuthError::UserAlreadyExists)
    ));
}

#[tokio::test]
async fn test_unsupported_plan_length_is_rejected() {
    let ctx = TestContext::new().await;

    assert!(matches!(
        ctx.register("ana@example.com", "pw", Some(7)).await,
        Err(AuthError::UnsupportedSubscriptionDays(7))
    ));
}

#[tokio::test]
async fn test_session_holds_the_user_until_sign_out() {
    let ctx = TestContext::new().await;
    let user = ctx.register("ana@example.com", "pw", Some(5)).await.unwrap();
    let session = ctx.state.session();

    assert!(session.current_user().await.unwrap().is_none());

    session.sign_in(&user).await.unwrap();
    assert_eq!(session.current_user().await.unwrap(), Some(user));

    session.sign_out().await.unwrap();
    assert!(session.current_user().await.unwrap().is_none());
}
