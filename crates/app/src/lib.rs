//! # ruledesk-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RulesetRepository` — CRUD for rulesets
//!   - `EventPublisher` — edit-session notifications
//! - Define **driving/inbound ports** as use-case structs:
//!   - `RuleEditor` — apply edit commands to a rule, re-validating after each
//!   - `RulesetService` — open, edit, save, list and delete rulesets
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `ruledesk-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod editor;
pub mod event_bus;
pub mod ports;
pub mod services;
