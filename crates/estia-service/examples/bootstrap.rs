//! Composition root: config -> tracing -> database -> services.
//!
//! Wires every service from a resolved [`estia_core::Config`] and walks one
//! account through the full lifecycle. Run with:
//!
//! ```sh
//! cargo run --example bootstrap
//! ```

use std::time::Duration;

use tracing::info;

use estia_core::config::load_config;
use estia_core::tracing_init::init_tracing;
use estia_service::{
    AccountService, ActivityLog, AgentApplications, CreditLedger, MarketDatabase, RoleService,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(None)?;
    init_tracing(
        &format!("estia={}", config.logging.log_level),
        config.logging.log_json,
    );

    let db = match &config.database.path {
        Some(path) => MarketDatabase::open(path).await?,
        None => MarketDatabase::open_in_memory().await?,
    };
    let store_timeout = Duration::from_secs(config.database.store_timeout_secs);

    let activity = ActivityLog::new(db.clone(), store_timeout);
    let ledger = CreditLedger::new(db.clone(), activity.clone(), &config.ledger, store_timeout);
    let roles = RoleService::new(db.clone(), store_timeout);
    let applications = AgentApplications::new(db.clone(), activity.clone(), store_timeout);
    let accounts = AccountService::new(db, ledger.clone(), activity.clone(), store_timeout);

    let admin = accounts
        .register("acct-admin", "admin@example.com", "Site Admin")
        .await?;
    roles.set_role(&admin.id, "admin").await?;

    let user = accounts
        .register("acct-demo", "demo@example.com", "Demo User")
        .await?;
    let session = accounts.sign_in("acct-demo").await?;
    info!(
        user_id = %user.id,
        bonus_granted = session.bonus_granted,
        balance = session.balance,
        "Demo account signed in"
    );

    let application = applications
        .submit("acct-demo", "Demo User", "I would like to list properties")
        .await?;
    applications
        .approve(&application.id, &admin.id, Some("credentials check out"))
        .await?;

    ledger.add_credits(&user.id, 50, "listing promo").await?;
    let balance = ledger
        .deduct_credits(&user.id, 20, "featured listing")
        .await?;
    info!(user_id = %user.id, balance, "Ledger traffic complete");

    let recent = activity.list_recent(10).await?;
    info!(events = recent.len(), "Recent activity");

    Ok(())
}
