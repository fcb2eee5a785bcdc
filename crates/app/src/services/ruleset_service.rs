//! Ruleset service — use-cases for managing rulesets and editing their rule.

use ruledesk_domain::error::{NotFoundError, RuledeskError, RulesetError};
use ruledesk_domain::event::{Event, EventKind};
use ruledesk_domain::id::RulesetId;
use ruledesk_domain::rule::JsonRule;
use ruledesk_domain::ruleset::Ruleset;

use crate::editor::{EditError, RuleEdit, RuleEditor};
use crate::ports::{EventPublisher, RulesetRepository};

/// Application service for ruleset CRUD and rule edit sessions.
pub struct RulesetService<R, P> {
    repo: R,
    publisher: P,
    template: Option<JsonRule>,
}

impl<R: RulesetRepository, P: EventPublisher> RulesetService<R, P> {
    /// Create a new service backed by the given repository and publisher.
    pub fn new(repo: R, publisher: P) -> Self {
        Self {
            repo,
            publisher,
            template: None,
        }
    }

    /// Rule copied into rulesets that have no stored definition yet.
    #[must_use]
    pub fn with_template(mut self, template: JsonRule) -> Self {
        self.template = Some(template);
        self
    }

    /// Create a new ruleset after validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RuledeskError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, ruleset), fields(ruleset_name = %ruleset.name))]
    pub async fn create_ruleset(&self, ruleset: Ruleset) -> Result<Ruleset, RuledeskError> {
        ruleset.validate()?;
        self.repo.create(ruleset).await
    }

    /// Create a ruleset holding `rule`, refusing rules that do not validate.
    ///
    /// # Errors
    ///
    /// Returns [`RulesetError::InvalidRule`] for an incomplete rule,
    /// [`RuledeskError::Validation`] for a blank name or realm, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, rule))]
    pub async fn import_rule(
        &self,
        name: &str,
        realm: &str,
        rule: JsonRule,
    ) -> Result<Ruleset, RuledeskError> {
        if !rule.is_valid() {
            return Err(RulesetError::InvalidRule.into());
        }
        let mut ruleset = Ruleset::builder().name(name).realm(realm).build()?;
        ruleset.store_rule(rule)?;
        self.repo.create(ruleset).await
    }

    /// Look up a ruleset by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`RuledeskError::NotFound`] when no ruleset with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_ruleset(&self, id: RulesetId) -> Result<Ruleset, RuledeskError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Ruleset",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List rulesets, optionally restricted to one realm.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rulesets(&self, realm: Option<&str>) -> Result<Vec<Ruleset>, RuledeskError> {
        match realm {
            Some(realm) => self.repo.get_by_realm(realm).await,
            None => self.repo.get_all().await,
        }
    }

    /// Delete a ruleset by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_ruleset(&self, id: RulesetId) -> Result<(), RuledeskError> {
        self.repo.delete(id).await
    }

    /// Open an edit session on the rule of ruleset `id`.
    ///
    /// Publishes [`EventKind::RuleUnsupported`] when the stored definition
    /// cannot be edited as a single JSON rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuledeskError::NotFound`] for an unknown id, or
    /// [`RuledeskError::Ruleset`] when the definition is unsupported.
    #[tracing::instrument(skip(self))]
    pub async fn open_editor(&self, id: RulesetId) -> Result<RuleEditor, RuledeskError> {
        let ruleset = self.get_ruleset(id).await?;
        match RuleEditor::open(ruleset, self.template.as_ref()) {
            Ok(editor) => Ok(editor),
            Err(err) => {
                tracing::warn!(error = %err, "ruleset cannot be edited");
                let _ = self
                    .publisher
                    .publish(Event::new(id, EventKind::RuleUnsupported))
                    .await;
                Err(err.into())
            }
        }
    }

    /// Apply `edit` to an open session and publish the new validity.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] when the edit does not fit the current rule;
    /// nothing is published in that case.
    pub async fn edit(&self, editor: &mut RuleEditor, edit: RuleEdit) -> Result<bool, EditError> {
        let valid = editor.apply(edit)?;
        let _ = self
            .publisher
            .publish(Event::new(
                editor.ruleset().id,
                EventKind::RuleChanged { valid },
            ))
            .await;
        Ok(valid)
    }

    /// Store the session's rule into its ruleset and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`RulesetError::InvalidRule`] when the rule does not validate,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self, editor), fields(ruleset_id = %editor.ruleset().id))]
    pub async fn save(&self, editor: &RuleEditor) -> Result<Ruleset, RuledeskError> {
        let ruleset = editor.to_ruleset()?;
        let saved = self.repo.update(ruleset).await?;
        let _ = self
            .publisher
            .publish(Event::new(saved.id, EventKind::RulesetSaved))
            .await;
        Ok(saved)
    }
}
