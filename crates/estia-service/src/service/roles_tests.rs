//! Tests for role and status administration.

use estia_core::Error;

use crate::storage::{Role, UserStatus};

use super::test_helpers::{register_user, setup};

#[tokio::test]
async fn set_role_validates_vocabulary() {
    let svc = setup().await;
    let user = register_user(&svc, 1).await;

    assert!(matches!(
        svc.roles.set_role(&user.id, "superuser").await,
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        svc.roles.set_role("missing", "agent").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn set_role_keeps_user_role() {
    let svc = setup().await;
    let user = register_user(&svc, 1).await;

    let updated = svc.roles.set_role(&user.id, "agent").await.unwrap();
    assert_eq!(updated.roles, "user,agent");

    let updated = svc.roles.set_role(&user.id, "user").await.unwrap();
    assert_eq!(updated.roles, "user");
}

#[tokio::test]
async fn sole_admin_cannot_be_demoted() {
    let svc = setup().await;
    let admin = register_user(&svc, 1).await;
    svc.roles.set_role(&admin.id, "admin").await.unwrap();
    assert_eq!(svc.db.count_admins().await.unwrap(), 1);

    let err = svc.roles.set_role(&admin.id, "user").await.unwrap_err();
    assert!(matches!(err, Error::InvariantViolation(_)));
    assert!(
        svc.db
            .get_user(&admin.id)
            .await
            .unwrap()
            .has_role(Role::Admin)
    );
}

#[tokio::test]
async fn demotion_allowed_with_two_admins() {
    let svc = setup().await;
    let first = register_user(&svc, 1).await;
    let second = register_user(&svc, 2).await;
    svc.roles.set_role(&first.id, "admin").await.unwrap();
    svc.roles.set_role(&second.id, "admin").await.unwrap();
    assert_eq!(svc.db.count_admins().await.unwrap(), 2);

    let updated = svc.roles.set_role(&first.id, "agent").await.unwrap();
    assert_eq!(updated.roles, "user,agent");
    assert_eq!(svc.db.count_admins().await.unwrap(), 1);
}

#[tokio::test]
async fn promoting_an_admin_to_admin_is_allowed() {
    let svc = setup().await;
    let admin = register_user(&svc, 1).await;
    svc.roles.set_role(&admin.id, "admin").await.unwrap();

    // not a demotion, so the sole-admin guard does not apply
    let updated = svc.roles.set_role(&admin.id, "admin").await.unwrap();
    assert!(updated.has_role(Role::Admin));
}

#[tokio::test]
async fn set_status() {
    let svc = setup().await;
    let user = register_user(&svc, 1).await;
    assert_eq!(user.user_status(), Some(UserStatus::NotVerified));

    let updated = svc.roles.set_status(&user.id, "suspended").await.unwrap();
    assert_eq!(updated.user_status(), Some(UserStatus::Suspended));

    assert!(matches!(
        svc.roles.set_status(&user.id, "banned").await,
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        svc.roles.set_status("missing", "active").await,
        Err(Error::NotFound(_))
    ));
}
