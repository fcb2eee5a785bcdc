//! # ruledesk-domain
//!
//! Pure domain model for the ruledesk JSON rule editor.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **rule definition** shape (`when` logic groups of conditions,
//!   `then` / `otherwise` action lists) exactly as the rules backend stores it
//! - Decide whether a rule definition is complete enough to submit
//! - Resolve condition tags to asset types for action-target editors
//! - Define **Rulesets** (the stored envelope around a single rule)
//! - Define **Events** emitted by an edit session
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod duration;
pub mod event;
pub mod rule;
pub mod ruleset;
