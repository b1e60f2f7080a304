//! Shared fixtures for service tests.

use std::time::Duration;

use estia_core::config::LedgerConfig;

use crate::storage::{MarketDatabase, UserRecord};

use super::accounts::AccountService;
use super::activity::ActivityLog;
use super::applications::AgentApplications;
use super::ledger::CreditLedger;
use super::roles::RoleService;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Services {
    pub db: MarketDatabase,
    pub accounts: AccountService,
    pub roles: RoleService,
    pub ledger: CreditLedger,
    pub applications: AgentApplications,
    pub activity: ActivityLog,
}

/// Wire up all services over a fresh in-memory database with default
/// ledger tunables (bonus of 2 credits, 24 h cooldown).
pub async fn setup() -> Services {
    let db = MarketDatabase::open_in_memory().await.unwrap();
    let activity = ActivityLog::new(db.clone(), TEST_TIMEOUT);
    let ledger = CreditLedger::new(
        db.clone(),
        activity.clone(),
        &LedgerConfig::default(),
        TEST_TIMEOUT,
    );
    let roles = RoleService::new(db.clone(), TEST_TIMEOUT);
    let applications = AgentApplications::new(db.clone(), activity.clone(), TEST_TIMEOUT);
    let accounts = AccountService::new(db.clone(), ledger.clone(), activity.clone(), TEST_TIMEOUT);

    Services {
        db,
        accounts,
        roles,
        ledger,
        applications,
        activity,
    }
}

/// Register the numbered fixture user and return the record.
pub async fn register_user(svc: &Services, n: u32) -> UserRecord {
    svc.accounts
        .register(
            &format!("acct-{n}"),
            &format!("user{n}@example.com"),
            &format!("User {n}"),
        )
        .await
        .unwrap()
}

/// Make every activity insert fail by dropping its table.
pub async fn break_activity_log(db: &MarketDatabase) {
    sqlx::query("DROP TABLE activity_log")
        .execute(db.pool())
        .await
        .unwrap();
}

/// Backdate a user's last bonus grant so the cooldown has elapsed.
pub async fn backdate_login_reward(db: &MarketDatabase, id: &str, secs_ago: i64) {
    let then = estia_core::db::unix_timestamp() - secs_ago;
    sqlx::query("UPDATE users SET last_login_reward = ? WHERE id = ?")
        .bind(then)
        .bind(id)
        .execute(db.pool())
        .await
        .unwrap();
}
