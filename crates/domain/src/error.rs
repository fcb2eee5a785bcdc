//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`RuledeskError`] via `#[from]`.

/// Top-level error returned by use-cases and repositories.
#[derive(Debug, thiserror::Error)]
pub enum RuledeskError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("ruleset error")]
    Ruleset(#[from] RulesetError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Invariant violations on ruleset records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("realm must not be empty")]
    EmptyRealm,
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failures reading or writing the rule held by a ruleset.
#[derive(Debug, thiserror::Error)]
pub enum RulesetError {
    /// The definition is not valid JSON for the rule schema.
    #[error("invalid ruleset definition JSON")]
    Json(#[from] serde_json::Error),

    /// The definition holds no rule list, or more than one rule.
    #[error("unsupported ruleset definition with {rule_count} rules")]
    Unsupported { rule_count: usize },

    /// The rule is not complete enough to be submitted.
    #[error("rule definition is incomplete")]
    InvalidRule,
}
