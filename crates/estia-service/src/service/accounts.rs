//! Account registration and sign-in.
//!
//! The external identity provider has already authenticated the caller and
//! supplies an opaque account identifier; no credentials are issued or
//! checked here.

use std::time::Duration;

use tracing::{info, instrument};
use uuid::Uuid;

use estia_core::db::with_deadline;
use estia_core::{Error, Result};

use crate::storage::{ActivityParams, MarketDatabase, Notification, Role, UserRecord};

use super::activity::ActivityLog;
use super::ledger::CreditLedger;

/// Result of a sign-in: the resolved user plus the bonus outcome.
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    pub user: UserRecord,
    pub bonus_granted: bool,
    pub balance: i64,
}

#[derive(Clone)]
pub struct AccountService {
    db: MarketDatabase,
    ledger: CreditLedger,
    activity: ActivityLog,
    store_timeout: Duration,
}

impl AccountService {
    pub const fn new(
        db: MarketDatabase,
        ledger: CreditLedger,
        activity: ActivityLog,
        store_timeout: Duration,
    ) -> Self {
        Self {
            db,
            ledger,
            activity,
            store_timeout,
        }
    }

    /// Register a new user record for an authenticated account.
    ///
    /// The email is lowercase-normalized before storage and must be unique,
    /// as must the account identifier.
    #[instrument(skip(self))]
    pub async fn register(
        &self,
        account_id: &str,
        email: &str,
        full_name: &str,
    ) -> Result<UserRecord> {
        if account_id.trim().is_empty() {
            return Err(Error::InvalidArgument("account_id is required".into()));
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(Error::InvalidArgument(format!("invalid email '{email}'")));
        }

        let email = email.trim().to_lowercase();

        match with_deadline(
            "check_account",
            self.store_timeout,
            self.db.get_user_by_account(account_id),
        )
        .await
        {
            Ok(_) => {
                return Err(Error::AlreadyExists(format!(
                    "account {account_id} is already registered"
                )));
            }
            Err(Error::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let existing = with_deadline(
            "check_email",
            self.store_timeout,
            self.db.find_user_by_email(&email),
        )
        .await?;
        if existing.is_some() {
            return Err(Error::AlreadyExists(format!("email {email} is taken")));
        }

        let id = Uuid::new_v4().to_string();
        let user = with_deadline(
            "create_user",
            self.store_timeout,
            self.db.create_user(&id, account_id, &email, full_name),
        )
        .await?;

        info!(user_id = %user.id, account_id, "User registered");

        self.activity
            .append(ActivityParams {
                actor_id: &user.id,
                actor_role: Role::User.as_str(),
                action: "signup",
                message: &format!("{email} signed up"),
                amount: None,
                ref_id: None,
                ref_type: None,
            })
            .await;

        Ok(user)
    }

    /// Resolve a sign-in and grant the daily bonus when due.
    #[instrument(skip(self))]
    pub async fn sign_in(&self, account_id: &str) -> Result<SignInOutcome> {
        let user = with_deadline(
            "load_user",
            self.store_timeout,
            self.db.get_user_by_account(account_id),
        )
        .await?;

        let bonus = self.ledger.grant_sign_in_bonus(&user.id).await?;

        Ok(SignInOutcome {
            user,
            bonus_granted: bonus.bonus_granted,
            balance: bonus.balance,
        })
    }

    /// Notifications for an account, newest first.
    #[instrument(skip(self))]
    pub async fn notifications(&self, account_id: &str, limit: u32) -> Result<Vec<Notification>> {
        with_deadline(
            "list_notifications",
            self.store_timeout,
            self.db.list_notifications(account_id, limit),
        )
        .await
    }

    /// Mark one notification as read.
    #[instrument(skip(self))]
    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<()> {
        let updated = with_deadline(
            "mark_notification_read",
            self.store_timeout,
            self.db.mark_notification_read(notification_id),
        )
        .await?;

        if !updated {
            return Err(Error::NotFound(format!(
                "Notification {notification_id}"
            )));
        }
        Ok(())
    }
}
