//! Append-only activity log.
//!
//! `append` is a side effect of the other workflows and must never abort
//! them: a failed insert is logged locally and swallowed. The read paths
//! report failures normally.

use std::time::Duration;

use tracing::{instrument, warn};
use uuid::Uuid;

use estia_core::Result;
use estia_core::db::with_deadline;

use crate::storage::{ActivityParams, ActivityRecord, MarketDatabase};

#[derive(Clone)]
pub struct ActivityLog {
    db: MarketDatabase,
    store_timeout: Duration,
}

impl ActivityLog {
    pub const fn new(db: MarketDatabase, store_timeout: Duration) -> Self {
        Self { db, store_timeout }
    }

    /// Append one activity record. Infallible from the caller's view.
    pub async fn append(&self, params: ActivityParams<'_>) {
        let id = Uuid::new_v4().to_string();

        let outcome = with_deadline(
            "insert_activity",
            self.store_timeout,
            self.db.insert_activity(&id, &params),
        )
        .await;

        if let Err(e) = outcome {
            warn!(
                actor_id = params.actor_id,
                action = params.action,
                error = %e,
                "Failed to append activity record"
            );
        }
    }

    /// List the most recent records, newest first.
    #[instrument(skip(self))]
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<ActivityRecord>> {
        with_deadline(
            "list_recent_activity",
            self.store_timeout,
            self.db.list_recent_activity(limit),
        )
        .await
    }

    /// List records for one actor, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_actor(&self, actor_id: &str, limit: u32) -> Result<Vec<ActivityRecord>> {
        with_deadline(
            "list_activity_for_actor",
            self.store_timeout,
            self.db.list_activity_for_actor(actor_id, limit),
        )
        .await
    }
}
