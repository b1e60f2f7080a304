//! Agent-application review workflow.
//!
//! An application moves from `pending` to exactly one of `approved` or
//! `rejected`; either decision is terminal. Approval promotes the applicant
//! to an active agent and queues a notification, all inside one storage
//! transaction.

use std::time::Duration;

use tracing::{info, instrument};
use uuid::Uuid;

use estia_core::db::with_deadline;
use estia_core::{Error, Result};

use crate::storage::{
    ActivityParams, AgentApplication, DecisionOutcome, MarketDatabase, Role,
};

use super::activity::ActivityLog;

#[derive(Clone)]
pub struct AgentApplications {
    db: MarketDatabase,
    activity: ActivityLog,
    store_timeout: Duration,
}

impl AgentApplications {
    pub const fn new(db: MarketDatabase, activity: ActivityLog, store_timeout: Duration) -> Self {
        Self {
            db,
            activity,
            store_timeout,
        }
    }

    /// Submit a new application for the given account.
    ///
    /// One open application per account: a second submit while one is still
    /// pending fails with `AlreadyExists`. Resubmission after rejection is
    /// allowed.
    #[instrument(skip(self, message))]
    pub async fn submit(
        &self,
        account_id: &str,
        full_name: &str,
        message: &str,
    ) -> Result<AgentApplication> {
        for (field, value) in [
            ("account_id", account_id),
            ("full_name", full_name),
            ("message", message),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidArgument(format!("{field} is required")));
            }
        }
        let full_name = full_name.trim();
        let message = message.trim();

        let user = with_deadline(
            "load_user",
            self.store_timeout,
            self.db.get_user_by_account(account_id),
        )
        .await?;

        let open = with_deadline(
            "check_pending",
            self.store_timeout,
            self.db.has_pending_application(account_id),
        )
        .await?;
        if open {
            return Err(Error::AlreadyExists(format!(
                "account {account_id} already has a pending application"
            )));
        }

        let id = Uuid::new_v4().to_string();
        let application = with_deadline(
            "create_application",
            self.store_timeout,
            self.db
                .create_application(&id, account_id, full_name, message),
        )
        .await?;

        info!(application_id = %application.id, account_id, "Agent application submitted");

        self.activity
            .append(ActivityParams {
                actor_id: &user.id,
                actor_role: Role::User.as_str(),
                action: "agent_apply",
                message: &format!("{full_name} applied to become an agent"),
                amount: None,
                ref_id: Some(&application.id),
                ref_type: Some("agent_application"),
            })
            .await;

        Ok(application)
    }

    /// Pending applications, oldest first, capped at `limit`.
    #[instrument(skip(self))]
    pub async fn list_pending(&self, limit: u32) -> Result<Vec<AgentApplication>> {
        with_deadline(
            "list_pending",
            self.store_timeout,
            self.db.list_pending_applications(limit),
        )
        .await
    }

    /// Approve a pending application.
    #[instrument(skip(self, notes))]
    pub async fn approve(
        &self,
        application_id: &str,
        admin_id: &str,
        notes: Option<&str>,
    ) -> Result<AgentApplication> {
        let application = with_deadline(
            "load_application",
            self.store_timeout,
            self.db.get_application(application_id),
        )
        .await?;

        // NotFound when the referenced user is gone, before any write.
        let user = with_deadline(
            "load_user",
            self.store_timeout,
            self.db.get_user_by_account(&application.account_id),
        )
        .await?;

        let outcome = with_deadline(
            "approve_application",
            self.store_timeout,
            self.db.approve_application(application_id, admin_id, notes),
        )
        .await?;

        if outcome == DecisionOutcome::AlreadyDecided {
            return Err(Error::AlreadyDecided(format!(
                "application {application_id} was already reviewed"
            )));
        }

        info!(application_id, admin_id, user_id = %user.id, "Agent application approved");

        self.activity
            .append(ActivityParams {
                actor_id: admin_id,
                actor_role: Role::Admin.as_str(),
                action: "agent_approved",
                message: &format!("Approved agent application of {}", application.full_name),
                amount: None,
                ref_id: Some(application_id),
                ref_type: Some("agent_application"),
            })
            .await;

        with_deadline(
            "reload_application",
            self.store_timeout,
            self.db.get_application(application_id),
        )
        .await
    }

    /// Reject a pending application.
    #[instrument(skip(self, notes))]
    pub async fn reject(
        &self,
        application_id: &str,
        admin_id: &str,
        notes: Option<&str>,
    ) -> Result<AgentApplication> {
        let application = with_deadline(
            "load_application",
            self.store_timeout,
            self.db.get_application(application_id),
        )
        .await?;

        let outcome = with_deadline(
            "reject_application",
            self.store_timeout,
            self.db.reject_application(application_id, admin_id, notes),
        )
        .await?;

        if outcome == DecisionOutcome::AlreadyDecided {
            return Err(Error::AlreadyDecided(format!(
                "application {application_id} was already reviewed"
            )));
        }

        info!(application_id, admin_id, "Agent application rejected");

        self.activity
            .append(ActivityParams {
                actor_id: admin_id,
                actor_role: Role::Admin.as_str(),
                action: "agent_rejected",
                message: &format!("Rejected agent application of {}", application.full_name),
                amount: None,
                ref_id: Some(application_id),
                ref_type: Some("agent_application"),
            })
            .await;

        with_deadline(
            "reload_application",
            self.store_timeout,
            self.db.get_application(application_id),
        )
        .await
    }
}
