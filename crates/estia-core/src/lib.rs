//! Estia Core Library
//!
//! Shared functionality for Estia components:
//! - Operation error kinds
//! - Configuration resolution
//! - SQLite pool helpers, timestamps, and store-call deadlines
//! - Tracing initialization

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
