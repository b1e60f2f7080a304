//! Estia marketplace backend core.
//!
//! The role & credit lifecycle of a multi-tenant real-estate marketplace:
//! - Role and status administration with last-admin protection
//! - A non-negative credit ledger with a cooldown-gated sign-in bonus
//! - The agent-application review workflow
//! - An append-only activity log
//!
//! Transport (HTTP routing, sessions, OAuth) lives elsewhere; callers hand
//! each service a pre-authenticated account identifier.

pub mod service;
pub mod storage;

pub use service::{
    AccountService, ActivityLog, AgentApplications, BonusOutcome, CreditLedger, RoleService,
    SignInOutcome,
};
pub use storage::MarketDatabase;
