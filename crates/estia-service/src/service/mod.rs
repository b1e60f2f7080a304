//! Domain services for the Estia marketplace core.
//!
//! Each service receives a cloned [`MarketDatabase`](crate::storage::MarketDatabase)
//! handle and its tunables by constructor injection.

pub mod accounts;
pub mod activity;
pub mod applications;
pub mod ledger;
pub mod roles;

#[cfg(test)]
mod accounts_tests;
#[cfg(test)]
mod roles_tests;
#[cfg(test)]
pub(crate) mod test_helpers;

pub use accounts::{AccountService, SignInOutcome};
pub use activity::ActivityLog;
pub use applications::AgentApplications;
pub use ledger::{BonusOutcome, CreditLedger};
pub use roles::RoleService;
