//! Rule edit session — explicit edit commands over an immutable rule value.
//!
//! Each [`RuleEdit`] produces a patched copy of the current rule. The copy
//! replaces the session's rule only when the edit succeeds, and the rule is
//! validated exactly once per applied edit.

use std::fmt;

use ruledesk_domain::error::RulesetError;
use ruledesk_domain::rule::{
    self, JsonRule, LogicGroup, LogicGroupOperator, RuleAction, RuleCondition, RuleRecurrence,
    TypeAndTag,
};
use ruledesk_domain::ruleset::Ruleset;

/// Which action list of a rule an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSection {
    Then,
    Otherwise,
}

impl fmt::Display for ActionSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Then => f.write_str("then"),
            Self::Otherwise => f.write_str("otherwise"),
        }
    }
}

/// A single change to a rule.
///
/// `path` fields address a condition group by child-group indexes from the
/// root `when` group; an empty path is the root itself.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum RuleEdit {
    SetName(Option<String>),
    SetDescription(Option<String>),
    SetRecurrence(Option<RuleRecurrence>),
    SetWhen(Option<LogicGroup<RuleCondition>>),
    SetGroupOperator {
        path: Vec<usize>,
        operator: LogicGroupOperator,
    },
    /// Appends to the group at `path`; creates an AND root when `when` is
    /// absent and `path` is empty.
    AddCondition {
        path: Vec<usize>,
        condition: RuleCondition,
    },
    ReplaceCondition {
        path: Vec<usize>,
        index: usize,
        condition: RuleCondition,
    },
    RemoveCondition {
        path: Vec<usize>,
        index: usize,
    },
    SetConditionTag {
        path: Vec<usize>,
        index: usize,
        tag: Option<String>,
    },
    /// Appends a child group; same root creation rule as `AddCondition`.
    AddGroup {
        path: Vec<usize>,
        group: LogicGroup<RuleCondition>,
    },
    RemoveGroup {
        path: Vec<usize>,
    },
    AddAction {
        section: ActionSection,
        action: RuleAction,
    },
    ReplaceAction {
        section: ActionSection,
        index: usize,
        action: RuleAction,
    },
    RemoveAction {
        section: ActionSection,
        index: usize,
    },
}

/// An edit that does not fit the current rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("no condition group at {path:?}")]
    NoSuchGroup { path: Vec<usize> },

    #[error("no condition {index} in group {path:?}")]
    NoSuchCondition { path: Vec<usize>, index: usize },

    #[error("no action {index} in {section}")]
    NoSuchAction { section: ActionSection, index: usize },

    #[error("the root condition group cannot be removed")]
    RootGroup,
}

impl RuleEdit {
    /// Return `rule` with this edit applied; `rule` itself is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] when a path or index does not exist.
    pub fn apply_to(self, rule: &JsonRule) -> Result<JsonRule, EditError> {
        let mut next = rule.clone();
        match self {
            Self::SetName(name) => next.name = name,
            Self::SetDescription(description) => next.description = description,
            Self::SetRecurrence(recurrence) => next.recurrence = recurrence,
            Self::SetWhen(when) => next.when = when,
            Self::SetGroupOperator { path, operator } => {
                group_mut(&mut next, &path)?.operator = Some(operator);
            }
            Self::AddCondition { path, condition } => {
                ensure_root(&mut next, &path);
                group_mut(&mut next, &path)?
                    .items
                    .get_or_insert_with(Vec::new)
                    .push(condition);
            }
            Self::ReplaceCondition {
                path,
                index,
                condition,
            } => *condition_mut(&mut next, &path, index)? = condition,
            Self::RemoveCondition { path, index } => {
                let items = group_mut(&mut next, &path)?
                    .items
                    .as_mut()
                    .filter(|items| index < items.len())
                    .ok_or_else(|| EditError::NoSuchCondition {
                        path: path.clone(),
                        index,
                    })?;
                items.remove(index);
            }
            Self::SetConditionTag { path, index, tag } => {
                condition_mut(&mut next, &path, index)?.tag = tag;
            }
            Self::AddGroup { path, group } => {
                ensure_root(&mut next, &path);
                group_mut(&mut next, &path)?
                    .groups
                    .get_or_insert_with(Vec::new)
                    .push(group);
            }
            Self::RemoveGroup { path } => {
                let Some((&index, parent)) = path.split_last() else {
                    return Err(EditError::RootGroup);
                };
                let groups = group_mut(&mut next, parent)?
                    .groups
                    .as_mut()
                    .filter(|groups| index < groups.len())
                    .ok_or_else(|| EditError::NoSuchGroup { path: path.clone() })?;
                groups.remove(index);
            }
            Self::AddAction { section, action } => actions_mut(&mut next, section).push(action),
            Self::ReplaceAction {
                section,
                index,
                action,
            } => {
                let slot = actions_mut(&mut next, section)
                    .get_mut(index)
                    .ok_or(EditError::NoSuchAction { section, index })?;
                *slot = action;
            }
            Self::RemoveAction { section, index } => {
                let actions = actions_mut(&mut next, section);
                if index >= actions.len() {
                    return Err(EditError::NoSuchAction { section, index });
                }
                actions.remove(index);
            }
        }
        Ok(next)
    }
}

fn ensure_root(rule: &mut JsonRule, path: &[usize]) {
    if path.is_empty() && rule.when.is_none() {
        rule.when = Some(LogicGroup::new(LogicGroupOperator::And));
    }
}

fn group_mut<'a>(
    rule: &'a mut JsonRule,
    path: &[usize],
) -> Result<&'a mut LogicGroup<RuleCondition>, EditError> {
    rule.when
        .as_mut()
        .and_then(|when| when.group_at_mut(path))
        .ok_or_else(|| EditError::NoSuchGroup {
            path: path.to_vec(),
        })
}

fn condition_mut<'a>(
    rule: &'a mut JsonRule,
    path: &[usize],
    index: usize,
) -> Result<&'a mut RuleCondition, EditError> {
    group_mut(rule, path)?
        .items
        .as_mut()
        .and_then(|items| items.get_mut(index))
        .ok_or_else(|| EditError::NoSuchCondition {
            path: path.to_vec(),
            index,
        })
}

fn actions_mut(rule: &mut JsonRule, section: ActionSection) -> &mut Vec<RuleAction> {
    match section {
        ActionSection::Then => rule.then.get_or_insert_with(Vec::new),
        ActionSection::Otherwise => rule.otherwise.get_or_insert_with(Vec::new),
    }
}

/// An open edit session on the single rule of a ruleset.
#[derive(Debug, Clone)]
pub struct RuleEditor {
    ruleset: Ruleset,
    rule: JsonRule,
    valid: bool,
}

impl RuleEditor {
    /// Start a session on `rule`, which will be stored back into `ruleset`.
    #[must_use]
    pub fn new(ruleset: Ruleset, rule: JsonRule) -> Self {
        let valid = rule::validate(Some(&rule));
        Self {
            ruleset,
            rule,
            valid,
        }
    }

    /// Start a session on the rule stored in `ruleset`, or on a copy of
    /// `template` (else a default rule) when nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Returns [`RulesetError::Json`] or [`RulesetError::Unsupported`] when
    /// the stored definition cannot be edited as a single JSON rule.
    pub fn open(ruleset: Ruleset, template: Option<&JsonRule>) -> Result<Self, RulesetError> {
        let rule = ruleset.rule_or_template(template)?;
        Ok(Self::new(ruleset, rule))
    }

    /// Apply `edit` and re-validate, returning whether the rule can be saved.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] and keeps the current rule when the edit does
    /// not fit it.
    pub fn apply(&mut self, edit: RuleEdit) -> Result<bool, EditError> {
        let next = edit.apply_to(&self.rule)?;
        self.valid = rule::validate(Some(&next));
        self.rule = next;
        tracing::debug!(ruleset_id = %self.ruleset.id, valid = self.valid, "rule edited");
        Ok(self.valid)
    }

    #[must_use]
    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    #[must_use]
    pub fn rule(&self) -> &JsonRule {
        &self.rule
    }

    /// Result of the last validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Tag-to-asset-type pairs offered to action target editors.
    #[must_use]
    pub fn target_type_map(&self) -> Vec<TypeAndTag> {
        rule::target_type_map(&self.rule)
    }

    /// The ruleset with the current rule stored in it, ready to be saved.
    ///
    /// # Errors
    ///
    /// Returns [`RulesetError::InvalidRule`] when the rule does not validate.
    pub fn to_ruleset(&self) -> Result<Ruleset, RulesetError> {
        if !self.valid {
            return Err(RulesetError::InvalidRule);
        }
        let mut ruleset = self.ruleset.clone();
        ruleset.store_rule(self.rule.clone())?;
        Ok(ruleset)
    }
}
