//! SQLite storage for the Estia marketplace core.
//!
//! Provides persistence for users, agent applications, the activity log, and
//! applicant notifications.

mod db;
mod models;
mod queries;
mod queries_activity;
mod queries_applications;


pub use db::{DatabaseError, MarketDatabase};
pub use models::*;
pub use queries_activity::ActivityParams;
pub use queries_applications::DecisionOutcome;
