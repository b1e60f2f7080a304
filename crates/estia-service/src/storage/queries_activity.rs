//! Activity-log queries. The table is append-only: no update or delete
//! statement exists for it anywhere in the crate.

use estia_core::db::unix_timestamp;

use super::db::{DatabaseError, MarketDatabase};
use super::models::ActivityRecord;

/// Fields for one activity-log entry.
#[derive(Debug, Clone)]
pub struct ActivityParams<'a> {
    pub actor_id: &'a str,
    pub actor_role: &'a str,
    pub action: &'a str,
    pub message: &'a str,
    pub amount: Option<i64>,
    pub ref_id: Option<&'a str>,
    pub ref_type: Option<&'a str>,
}

impl MarketDatabase {
    /// Append one activity record.
    pub async fn insert_activity(
        &self,
        id: &str,
        params: &ActivityParams<'_>,
    ) -> Result<(), DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO activity_log (id, actor_id, actor_role, action, message, amount, ref_id, ref_type, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(params.actor_id)
        .bind(params.actor_role)
        .bind(params.action)
        .bind(params.message)
        .bind(params.amount)
        .bind(params.ref_id)
        .bind(params.ref_type)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// List the most recent activity records, newest first.
    pub async fn list_recent_activity(
        &self,
        limit: u32,
    ) -> Result<Vec<ActivityRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, ActivityRecord>(
            "SELECT * FROM activity_log ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(records)
    }

    /// List activity for one actor, newest first.
    pub async fn list_activity_for_actor(
        &self,
        actor_id: &str,
        limit: u32,
    ) -> Result<Vec<ActivityRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, ActivityRecord>(
            "SELECT * FROM activity_log WHERE actor_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(actor_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(records)
    }
}
