//! Credit ledger.
//!
//! Balances are non-negative integers. Every mutation writes the balance and
//! the last-action audit fields in the same statement; the sign-in bonus is
//! cooldown-gated by an atomic compare-timestamp-else-no-op update.

use std::time::Duration;

use tracing::{info, instrument};

use estia_core::config::LedgerConfig;
use estia_core::db::with_deadline;
use estia_core::{Error, Result};

use crate::storage::{ActivityParams, MarketDatabase, Role};

use super::activity::ActivityLog;

/// Result of a sign-in bonus attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusOutcome {
    pub bonus_granted: bool,
    pub balance: i64,
}

#[derive(Clone)]
pub struct CreditLedger {
    db: MarketDatabase,
    activity: ActivityLog,
    sign_in_bonus: i64,
    bonus_cooldown_secs: i64,
    store_timeout: Duration,
}

impl CreditLedger {
    pub fn new(
        db: MarketDatabase,
        activity: ActivityLog,
        config: &LedgerConfig,
        store_timeout: Duration,
    ) -> Self {
        #[allow(clippy::cast_possible_wrap)]
        let bonus_cooldown_secs = (config.bonus_cooldown_hours * 3600) as i64;
        Self {
            db,
            activity,
            sign_in_bonus: config.sign_in_bonus,
            bonus_cooldown_secs,
            store_timeout,
        }
    }

    /// Current balance. A user that exists but has never touched the ledger
    /// reports 0.
    #[instrument(skip(self))]
    pub async fn get_credits(&self, user_id: &str) -> Result<i64> {
        let user =
            with_deadline("load_user", self.store_timeout, self.db.get_user(user_id)).await?;
        Ok(user.credits)
    }

    /// Add credits. Returns the new balance.
    #[instrument(skip(self))]
    pub async fn add_credits(&self, user_id: &str, amount: i64, reason: &str) -> Result<i64> {
        validate_amount(amount)?;

        let balance = with_deadline(
            "add_credits",
            self.store_timeout,
            self.db.add_user_credits(user_id, amount, reason),
        )
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {user_id}")))?;

        info!(user_id, amount, balance, "Credits added");

        self.activity
            .append(ActivityParams {
                actor_id: user_id,
                actor_role: Role::User.as_str(),
                action: "credits_add",
                message: &format!("Added {amount} credits ({reason})"),
                amount: Some(amount),
                ref_id: None,
                ref_type: None,
            })
            .await;

        Ok(balance)
    }

    /// Deduct credits. Fails with `InsufficientFunds` (balance untouched)
    /// when the balance does not cover the amount.
    #[instrument(skip(self))]
    pub async fn deduct_credits(&self, user_id: &str, amount: i64, reason: &str) -> Result<i64> {
        validate_amount(amount)?;

        let balance = with_deadline(
            "deduct_credits",
            self.store_timeout,
            self.db.deduct_user_credits(user_id, amount, reason),
        )
        .await?;

        let Some(balance) = balance else {
            // The conditional update matched nothing: missing user or
            // balance below the amount. Distinguish for the caller.
            let user =
                with_deadline("load_user", self.store_timeout, self.db.get_user(user_id)).await?;
            return Err(Error::InsufficientFunds {
                balance: user.credits,
                requested: amount,
            });
        };

        info!(user_id, amount, balance, "Credits deducted");

        self.activity
            .append(ActivityParams {
                actor_id: user_id,
                actor_role: Role::User.as_str(),
                action: "credits_deduct",
                message: &format!("Deducted {amount} credits ({reason})"),
                amount: Some(amount),
                ref_id: None,
                ref_type: None,
            })
            .await;

        Ok(balance)
    }

    /// Grant the daily sign-in bonus, at most once per cooldown window.
    ///
    /// A call inside the window is a silent no-op, never an error.
    #[instrument(skip(self))]
    pub async fn grant_sign_in_bonus(&self, user_id: &str) -> Result<BonusOutcome> {
        let user =
            with_deadline("load_user", self.store_timeout, self.db.get_user(user_id)).await?;

        let granted = with_deadline(
            "grant_login_bonus",
            self.store_timeout,
            self.db
                .grant_login_bonus(user_id, self.sign_in_bonus, self.bonus_cooldown_secs),
        )
        .await?;

        let Some(balance) = granted else {
            return Ok(BonusOutcome {
                bonus_granted: false,
                balance: user.credits,
            });
        };

        info!(user_id, bonus = self.sign_in_bonus, balance, "Sign-in bonus granted");

        self.activity
            .append(ActivityParams {
                actor_id: user_id,
                actor_role: Role::User.as_str(),
                action: "signin_bonus",
                message: &format!("Daily sign-in bonus of {} credits", self.sign_in_bonus),
                amount: Some(self.sign_in_bonus),
                ref_id: None,
                ref_type: None,
            })
            .await;

        Ok(BonusOutcome {
            bonus_granted: true,
            balance,
        })
    }
}

fn validate_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(Error::InvalidArgument(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}
