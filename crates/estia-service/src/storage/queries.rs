//! User queries for the Estia marketplace database.
//!
//! Every credit mutation is a single conditional `UPDATE ... RETURNING`
//! statement, so two concurrent mutations of the same balance serialize in
//! the store instead of racing through read-then-write.

use estia_core::db::unix_timestamp;

use super::db::{DatabaseError, MarketDatabase};
use super::models::{CreditActionKind, Role, UserRecord, UserStatus, encode_roles};

impl MarketDatabase {
    /// Create a new user with the default role set and status.
    pub async fn create_user(
        &self,
        id: &str,
        account_id: &str,
        email: &str,
        full_name: &str,
    ) -> Result<UserRecord, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO users (id, account_id, email, full_name, roles, status, credits, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(id)
        .bind(account_id)
        .bind(email)
        .bind(full_name)
        .bind(encode_roles(&[Role::User]))
        .bind(UserStatus::NotVerified.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_user(id).await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<UserRecord, DatabaseError> {
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Get a user by external account identifier.
    pub async fn get_user_by_account(&self, account_id: &str) -> Result<UserRecord, DatabaseError> {
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE account_id = ?")
            .bind(account_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User with account {account_id}")))
    }

    /// Find a user by (lowercase) email.
    pub async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Count users whose role set contains `admin`.
    ///
    /// Roles are canonical CSV over `{user, agent, admin}`; no role name is a
    /// substring of another, so a LIKE match cannot false-positive.
    pub async fn count_admins(&self) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE roles LIKE '%admin%'")
            .fetch_one(self.pool())
            .await?;

        Ok(row.0)
    }

    /// Replace a user's role set.
    ///
    /// When `check_last_admin` is set, the update runs in a transaction that
    /// first counts admins; if the target is currently the only admin the
    /// update is abandoned and `Ok(false)` is returned.
    pub async fn replace_user_roles(
        &self,
        id: &str,
        roles: &[Role],
        check_last_admin: bool,
    ) -> Result<bool, DatabaseError> {
        let now = unix_timestamp();
        let csv = encode_roles(roles);

        let mut tx = self.pool().begin().await?;

        if check_last_admin {
            let admins: (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM users WHERE roles LIKE '%admin%'")
                    .fetch_one(&mut *tx)
                    .await?;
            if admins.0 <= 1 {
                return Ok(false);
            }
        }

        let result = sqlx::query("UPDATE users SET roles = ?, updated_at = ? WHERE id = ?")
            .bind(&csv)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Update a user's status.
    pub async fn update_user_status(
        &self,
        id: &str,
        status: UserStatus,
    ) -> Result<bool, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query("UPDATE users SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically add credits and record the audit fields in the same write.
    ///
    /// Returns the new balance, or `None` if the user row does not exist.
    pub async fn add_user_credits(
        &self,
        id: &str,
        amount: i64,
        reason: &str,
    ) -> Result<Option<i64>, DatabaseError> {
        let now = unix_timestamp();

        let balance = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET credits = credits + ?, \
             last_credit_kind = ?, last_credit_amount = ?, last_credit_reason = ?, last_credit_at = ?, \
             updated_at = ? \
             WHERE id = ? RETURNING credits",
        )
        .bind(amount)
        .bind(CreditActionKind::Add.as_str())
        .bind(amount)
        .bind(reason)
        .bind(now)
        .bind(now)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(balance)
    }

    /// Atomically deduct credits if the balance covers the amount.
    ///
    /// Returns the new balance, or `None` when the conditional update matched
    /// no row (missing user or insufficient balance; callers distinguish by
    /// fetching the user).
    pub async fn deduct_user_credits(
        &self,
        id: &str,
        amount: i64,
        reason: &str,
    ) -> Result<Option<i64>, DatabaseError> {
        let now = unix_timestamp();

        let balance = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET credits = credits - ?, \
             last_credit_kind = ?, last_credit_amount = ?, last_credit_reason = ?, last_credit_at = ?, \
             updated_at = ? \
             WHERE id = ? AND credits >= ? RETURNING credits",
        )
        .bind(amount)
        .bind(CreditActionKind::Deduct.as_str())
        .bind(amount)
        .bind(reason)
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(amount)
        .fetch_optional(self.pool())
        .await?;

        Ok(balance)
    }

    /// Grant the sign-in bonus if the cooldown window has fully elapsed.
    ///
    /// The cooldown comparison and the balance update are one statement, so
    /// two concurrent sign-ins cannot both grant the bonus. Returns the new
    /// balance on grant, `None` when still inside the window (or no row).
    pub async fn grant_login_bonus(
        &self,
        id: &str,
        amount: i64,
        cooldown_secs: i64,
    ) -> Result<Option<i64>, DatabaseError> {
        let now = unix_timestamp();
        let threshold = now - cooldown_secs;

        let balance = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET credits = credits + ?, last_login_reward = ?, \
             last_credit_kind = ?, last_credit_amount = ?, last_credit_reason = ?, last_credit_at = ?, \
             updated_at = ? \
             WHERE id = ? AND (last_login_reward IS NULL OR last_login_reward <= ?) \
             RETURNING credits",
        )
        .bind(amount)
        .bind(now)
        .bind(CreditActionKind::Add.as_str())
        .bind(amount)
        .bind("sign-in bonus")
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(threshold)
        .fetch_optional(self.pool())
        .await?;

        Ok(balance)
    }
}
