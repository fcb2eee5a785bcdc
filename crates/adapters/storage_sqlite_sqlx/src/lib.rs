//! # ruledesk-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `RulesetRepository` port defined in `ruledesk-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between rulesets and database rows
//!
//! ## Dependency rule
//! Depends on `ruledesk-app` (for port traits) and `ruledesk-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod pool;
pub mod ruleset_repo;

pub use pool::{Config, Database};
pub use ruleset_repo::SqliteRulesetRepository;
