//! Condition tags resolved to the asset types they match.

use serde::Serialize;

use super::JsonRule;
use super::condition::RuleCondition;
use super::logic_group::LogicGroup;

/// An asset type declared by a `when` condition, with the condition's tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeAndTag {
    pub asset_type: String,
    pub tag: Option<String>,
}

/// Flatten a condition tree into `(asset type, tag)` pairs.
///
/// Direct items come first in array order, then the pairs of each child
/// group. Conditions without an asset type are skipped. Duplicate tags are
/// kept, so lookups resolve to the first match.
#[must_use]
pub fn type_and_tags_from_group(group: &LogicGroup<RuleCondition>) -> Vec<TypeAndTag> {
    let mut pairs: Vec<TypeAndTag> = group
        .items()
        .iter()
        .filter_map(|condition| {
            condition.asset_type().map(|asset_type| TypeAndTag {
                asset_type: asset_type.to_string(),
                tag: condition.tag.clone(),
            })
        })
        .collect();

    for child in group.groups() {
        pairs.extend(type_and_tags_from_group(child));
    }

    pairs
}

/// `(asset type, tag)` pairs of a rule's `when` tree; empty without one.
#[must_use]
pub fn target_type_map(rule: &JsonRule) -> Vec<TypeAndTag> {
    rule.when
        .as_ref()
        .map(type_and_tags_from_group)
        .unwrap_or_default()
}
