//! Agent-application queries.
//!
//! Approval mutates the application, the applicant's user record, and the
//! applicant's notification feed in one transaction, so a partial failure
//! rolls back rather than leaving the records disagreeing.

use estia_core::db::unix_timestamp;
use uuid::Uuid;

use super::db::{DatabaseError, MarketDatabase};
use super::models::{AgentApplication, ReviewState, Role, UserStatus, decode_roles, encode_roles};

/// Outcome of a transactional review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The decision was recorded.
    Applied,
    /// Another reviewer got there first; nothing was written.
    AlreadyDecided,
}

impl MarketDatabase {
    /// Create a new application in the `pending` state.
    pub async fn create_application(
        &self,
        id: &str,
        account_id: &str,
        full_name: &str,
        message: &str,
    ) -> Result<AgentApplication, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO agent_applications (id, account_id, full_name, message, state, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(account_id)
        .bind(full_name)
        .bind(message)
        .bind(ReviewState::Pending.as_str())
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_application(id).await
    }

    /// Get an application by ID.
    pub async fn get_application(&self, id: &str) -> Result<AgentApplication, DatabaseError> {
        sqlx::query_as::<_, AgentApplication>("SELECT * FROM agent_applications WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Application {id}")))
    }

    /// List pending applications, oldest first.
    pub async fn list_pending_applications(
        &self,
        limit: u32,
    ) -> Result<Vec<AgentApplication>, DatabaseError> {
        let applications = sqlx::query_as::<_, AgentApplication>(
            "SELECT * FROM agent_applications WHERE state = ? ORDER BY created_at ASC LIMIT ?",
        )
        .bind(ReviewState::Pending.as_str())
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(applications)
    }

    /// Whether the account has an application still awaiting review.
    pub async fn has_pending_application(&self, account_id: &str) -> Result<bool, DatabaseError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM agent_applications WHERE account_id = ? AND state = ?",
        )
        .bind(account_id)
        .bind(ReviewState::Pending.as_str())
        .fetch_one(self.pool())
        .await?;

        Ok(row.0 > 0)
    }

    /// Approve an application: flip it to `approved`, promote the applicant
    /// to an active agent, and queue a notification -- all in one
    /// transaction.
    pub async fn approve_application(
        &self,
        application_id: &str,
        admin_id: &str,
        notes: Option<&str>,
    ) -> Result<DecisionOutcome, DatabaseError> {
        let now = unix_timestamp();

        let mut tx = self.pool().begin().await?;

        let decided = sqlx::query(
            "UPDATE agent_applications SET state = ?, reviewed_by = ?, reviewed_at = ?, review_notes = ? \
             WHERE id = ? AND state = ?",
        )
        .bind(ReviewState::Approved.as_str())
        .bind(admin_id)
        .bind(now)
        .bind(notes)
        .bind(application_id)
        .bind(ReviewState::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        if decided.rows_affected() == 0 {
            return Ok(DecisionOutcome::AlreadyDecided);
        }

        let (account_id, roles_csv): (String, String) = sqlx::query_as(
            "SELECT a.account_id, u.roles FROM agent_applications a \
             JOIN users u ON u.account_id = a.account_id WHERE a.id = ?",
        )
        .bind(application_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("User for application {application_id}")))?;

        // {user, agent}, keeping an existing admin role.
        let mut roles = decode_roles(&roles_csv);
        if !roles.contains(&Role::Agent) {
            roles.push(Role::Agent);
        }

        sqlx::query("UPDATE users SET roles = ?, status = ?, updated_at = ? WHERE account_id = ?")
            .bind(encode_roles(&roles))
            .bind(UserStatus::Active.as_str())
            .bind(now)
            .bind(&account_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO notifications (id, account_id, message, ref_id, ref_type, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&account_id)
        .bind("Your agent application has been approved")
        .bind(application_id)
        .bind("agent_application")
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DecisionOutcome::Applied)
    }

    /// Reject an application and queue a notification for the applicant.
    pub async fn reject_application(
        &self,
        application_id: &str,
        admin_id: &str,
        notes: Option<&str>,
    ) -> Result<DecisionOutcome, DatabaseError> {
        let now = unix_timestamp();

        let mut tx = self.pool().begin().await?;

        let decided = sqlx::query(
            "UPDATE agent_applications SET state = ?, reviewed_by = ?, reviewed_at = ?, review_notes = ? \
             WHERE id = ? AND state = ?",
        )
        .bind(ReviewState::Rejected.as_str())
        .bind(admin_id)
        .bind(now)
        .bind(notes)
        .bind(application_id)
        .bind(ReviewState::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        if decided.rows_affected() == 0 {
            return Ok(DecisionOutcome::AlreadyDecided);
        }

        let account_id: String =
            sqlx::query_scalar("SELECT account_id FROM agent_applications WHERE id = ?")
                .bind(application_id)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query(
            "INSERT INTO notifications (id, account_id, message, ref_id, ref_type, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&account_id)
        .bind("Your agent application has been rejected")
        .bind(application_id)
        .bind("agent_application")
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DecisionOutcome::Applied)
    }

    /// List notifications for an account, newest first.
    pub async fn list_notifications(
        &self,
        account_id: &str,
        limit: u32,
    ) -> Result<Vec<super::models::Notification>, DatabaseError> {
        let notifications = sqlx::query_as::<_, super::models::Notification>(
            "SELECT * FROM notifications WHERE account_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(notifications)
    }

    /// Mark a notification as read.
    pub async fn mark_notification_read(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
