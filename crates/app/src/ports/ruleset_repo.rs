//! Ruleset repository port — persistence for rulesets.

use std::future::Future;

use ruledesk_domain::error::RuledeskError;
use ruledesk_domain::id::RulesetId;
use ruledesk_domain::ruleset::Ruleset;

/// Repository for persisting and querying [`Ruleset`]s.
///
/// The `rules` field is stored as-is; repositories never parse it.
pub trait RulesetRepository {
    /// Create a new ruleset in storage.
    fn create(&self, ruleset: Ruleset)
    -> impl Future<Output = Result<Ruleset, RuledeskError>> + Send;

    /// Get a ruleset by its unique identifier.
    fn get_by_id(
        &self,
        id: RulesetId,
    ) -> impl Future<Output = Result<Option<Ruleset>, RuledeskError>> + Send;

    /// Get all rulesets, ordered by name.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Ruleset>, RuledeskError>> + Send;

    /// Get the rulesets of one realm, ordered by name.
    fn get_by_realm(
        &self,
        realm: &str,
    ) -> impl Future<Output = Result<Vec<Ruleset>, RuledeskError>> + Send;

    /// Update an existing ruleset.
    fn update(&self, ruleset: Ruleset)
    -> impl Future<Output = Result<Ruleset, RuledeskError>> + Send;

    /// Delete a ruleset by its unique identifier.
    fn delete(&self, id: RulesetId) -> impl Future<Output = Result<(), RuledeskError>> + Send;
}
