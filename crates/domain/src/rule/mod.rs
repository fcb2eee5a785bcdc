//! Rule definition — a `when` tree of conditions and `then` / `otherwise`
//! action lists.
//!
//! The shape mirrors the JSON the rules backend stores: camelCase keys,
//! predicates tagged by `predicateType`, actions tagged by `action`. Every
//! field is optional because rules are edited incrementally; completeness is
//! decided by [`validate`], not by deserialization.

mod action;
mod condition;
mod logic_group;
mod predicate;
mod query;
mod targets;
mod validate;

pub use action::{RuleAction, RuleActionTarget, UpdateAction};
pub use condition::{GeoJsonPoint, RuleCondition, SunPosition, SunPositionTrigger, TriggerShape};
pub use logic_group::{LogicGroup, LogicGroupOperator};
pub use predicate::{AssetQueryMatch, AssetQueryOperator, StringMatcher, ValuePredicate};
pub use query::{AssetQuery, AttributePredicate, RealmPredicate};
pub use targets::{TypeAndTag, target_type_map, type_and_tags_from_group};
pub use validate::{
    validate, validate_actions, validate_asset_query, validate_asset_target,
    validate_condition_group, validate_value_predicate,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether recurrence is tracked per matched asset or for the rule as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrenceScope {
    PerAsset,
    Global,
}

/// How often a rule may fire again once it has fired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecurrence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<RecurrenceScope>,
    /// Minimum minutes between firings; `0` means every time. Editors write
    /// numbers or numeric strings, so the raw value is kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mins: Option<Value>,
}

/// A single JSON rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<LogicGroup<RuleCondition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<Vec<RuleAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<Vec<RuleAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RuleRecurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_start: Option<Vec<RuleAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_stop: Option<Vec<RuleAction>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JsonRule {
    /// The rule a fresh editor starts from: no conditions, no actions,
    /// and a recurrence that lets it fire every time.
    #[must_use]
    pub fn new_default() -> Self {
        Self {
            recurrence: Some(RuleRecurrence {
                scope: None,
                mins: Some(Value::from(0)),
            }),
            ..Self::default()
        }
    }

    /// `true` when the rule is complete enough to be submitted.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        validate(Some(self))
    }

    /// `(asset type, tag)` pairs declared by the `when` tree.
    #[must_use]
    pub fn target_type_map(&self) -> Vec<TypeAndTag> {
        target_type_map(self)
    }
}
