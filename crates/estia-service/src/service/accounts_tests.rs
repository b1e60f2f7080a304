//! Tests for account registration and sign-in.

use estia_core::Error;

use super::test_helpers::{backdate_login_reward, register_user, setup};

#[tokio::test]
async fn register_normalizes_email() {
    let svc = setup().await;

    let user = svc
        .accounts
        .register("acct-1", "  Alice@Example.COM ", "Alice")
        .await
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.roles, "user");
    assert_eq!(user.status, "not_verified");
    assert_eq!(user.credits, 0);
}

#[tokio::test]
async fn register_validation_and_uniqueness() {
    let svc = setup().await;
    register_user(&svc, 1).await;

    assert!(matches!(
        svc.accounts.register("", "a@b.c", "X").await,
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        svc.accounts.register("acct-2", "not-an-email", "X").await,
        Err(Error::InvalidArgument(_))
    ));

    // duplicate account id
    assert!(matches!(
        svc.accounts.register("acct-1", "other@example.com", "X").await,
        Err(Error::AlreadyExists(_))
    ));
    // duplicate email (case-insensitive)
    assert!(matches!(
        svc.accounts
            .register("acct-2", "USER1@example.com", "X")
            .await,
        Err(Error::AlreadyExists(_))
    ));
}

#[tokio::test]
async fn sign_in_grants_bonus_once_per_day() {
    let svc = setup().await;
    let user = register_user(&svc, 1).await;

    let first = svc.accounts.sign_in("acct-1").await.unwrap();
    assert!(first.bonus_granted);
    assert_eq!(first.balance, 2);
    assert_eq!(first.user.id, user.id);

    let second = svc.accounts.sign_in("acct-1").await.unwrap();
    assert!(!second.bonus_granted);
    assert_eq!(second.balance, 2);

    backdate_login_reward(&svc.db, &user.id, 86_401).await;
    let next_day = svc.accounts.sign_in("acct-1").await.unwrap();
    assert!(next_day.bonus_granted);
    assert_eq!(next_day.balance, 4);
}

#[tokio::test]
async fn sign_in_unknown_account() {
    let svc = setup().await;

    assert!(matches!(
        svc.accounts.sign_in("acct-ghost").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn notifications_read_flow() {
    let svc = setup().await;
    register_user(&svc, 1).await;
    let app = svc
        .applications
        .submit("acct-1", "User One", "msg")
        .await
        .unwrap();
    svc.applications
        .reject(&app.id, "admin-1", None)
        .await
        .unwrap();

    let notifications = svc.accounts.notifications("acct-1", 10).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].read, 0);

    svc.accounts
        .mark_notification_read(&notifications[0].id)
        .await
        .unwrap();
    let after = svc.accounts.notifications("acct-1", 10).await.unwrap();
    assert_eq!(after[0].read, 1);

    assert!(matches!(
        svc.accounts.mark_notification_read("missing").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn signup_and_bonus_appear_in_recent_activity() {
    let svc = setup().await;
    register_user(&svc, 1).await;
    svc.accounts.sign_in("acct-1").await.unwrap();

    let recent = svc.activity.list_recent(10).await.unwrap();
    let actions: Vec<&str> = recent.iter().map(|r| r.action.as_str()).collect();
    assert!(actions.contains(&"signup"));
    assert!(actions.contains(&"signin_bonus"));
}
