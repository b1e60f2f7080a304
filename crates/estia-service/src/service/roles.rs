//! Role and status administration.
//!
//! Single-primary-role semantics: `set_role` replaces the role set with
//! `{user} ∪ {role}` (the `user` role is never dropped). Demoting the only
//! remaining admin is refused.

use std::time::Duration;

use tracing::{info, instrument};

use estia_core::db::with_deadline;
use estia_core::{Error, Result};

use crate::storage::{MarketDatabase, Role, UserRecord, UserStatus};

#[derive(Clone)]
pub struct RoleService {
    db: MarketDatabase,
    store_timeout: Duration,
}

impl RoleService {
    pub const fn new(db: MarketDatabase, store_timeout: Duration) -> Self {
        Self { db, store_timeout }
    }

    /// Set a user's primary role, returning the updated record.
    #[instrument(skip(self))]
    pub async fn set_role(&self, user_id: &str, role: &str) -> Result<UserRecord> {
        let role = Role::parse(role)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown role '{role}'")))?;

        let user = with_deadline("load_user", self.store_timeout, self.db.get_user(user_id)).await?;

        let demoting_admin = user.has_role(Role::Admin) && role != Role::Admin;

        let applied = with_deadline(
            "replace_roles",
            self.store_timeout,
            self.db
                .replace_user_roles(user_id, &[Role::User, role], demoting_admin),
        )
        .await?;

        if !applied {
            if demoting_admin {
                return Err(Error::InvariantViolation(
                    "cannot remove last admin".to_string(),
                ));
            }
            return Err(Error::NotFound(format!("User {user_id}")));
        }

        info!(user_id, role = role.as_str(), "Role updated");

        with_deadline("reload_user", self.store_timeout, self.db.get_user(user_id)).await
    }

    /// Set a user's account status, returning the updated record.
    #[instrument(skip(self))]
    pub async fn set_status(&self, user_id: &str, status: &str) -> Result<UserRecord> {
        let status = UserStatus::parse(status)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown status '{status}'")))?;

        let updated = with_deadline(
            "update_status",
            self.store_timeout,
            self.db.update_user_status(user_id, status),
        )
        .await?;

        if !updated {
            return Err(Error::NotFound(format!("User {user_id}")));
        }

        info!(user_id, status = status.as_str(), "Status updated");

        with_deadline("reload_user", self.store_timeout, self.db.get_user(user_id)).await
    }
}
