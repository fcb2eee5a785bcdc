//! Structural validation of rule definitions.
//!
//! Every check is a total predicate: incomplete shapes and unknown tags both
//! yield `false`, nothing panics, nothing is accumulated. Traversal stops at
//! the first failure, items before child groups.
//!
//! The `otherwise` list is not validated and condition tags are not required
//! to be unique.

use super::JsonRule;
use super::action::{RuleAction, RuleActionTarget};
use super::condition::RuleCondition;
use super::logic_group::LogicGroup;
use super::predicate::{AssetQueryOperator, StringMatcher, ValuePredicate};
use super::query::{AssetQuery, AttributePredicate};
use super::targets::type_and_tags_from_group;
use crate::duration::is_time_duration;

/// `true` when `rule` has a valid `when` tree and a non-empty, valid `then` list.
#[must_use]
pub fn validate(rule: Option<&JsonRule>) -> bool {
    let Some(rule) = rule else {
        return false;
    };
    let Some(when) = rule.when.as_ref() else {
        return false;
    };
    let Some(then) = rule.then.as_deref().filter(|actions| !actions.is_empty()) else {
        return false;
    };

    validate_condition_group(when) && validate_actions(rule, then)
}

/// A group must contain something, and every condition and child group in it
/// must be valid.
#[must_use]
pub fn validate_condition_group(group: &LogicGroup<RuleCondition>) -> bool {
    if group.is_empty() {
        return false;
    }

    group.items().iter().all(validate_condition)
        && group.groups().iter().all(validate_condition_group)
}

fn validate_condition(condition: &RuleCondition) -> bool {
    if condition.trigger_shapes().len() != 1 {
        return false;
    }

    condition
        .assets
        .as_ref()
        .is_none_or(|query| validate_asset_query(query, true, false))
        && condition
            .datetime
            .as_ref()
            .is_none_or(validate_value_predicate)
        && condition.timer.as_deref().is_none_or(is_time_duration)
        && condition.cron.as_deref().is_none_or(is_cron_expression)
        && condition
            .sun
            .as_ref()
            .is_none_or(|sun| sun.position.is_some())
}

/// Quartz-style: six or seven fields of digits, names and `* ? / , - # L W`.
fn is_cron_expression(cron: &str) -> bool {
    let fields: Vec<&str> = cron.split_whitespace().collect();
    (6..=7).contains(&fields.len())
        && fields.iter().all(|field| {
            field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "*?/,-#".contains(c))
        })
}

/// Check an asset query used by a condition (`is_when`) or an action target.
///
/// Types are always required. A condition query needs at least one attribute
/// predicate; a target query needs explicit ids unless it filters the
/// matched assets.
#[must_use]
pub fn validate_asset_query(query: &AssetQuery, is_when: bool, is_matched_assets: bool) -> bool {
    let Some(types) = query.types.as_deref().filter(|types| !types.is_empty()) else {
        return false;
    };
    if !types
        .iter()
        .all(|matcher| matcher.value.is_some() && matcher.predicate_type.is_some())
    {
        return false;
    }

    if is_when {
        let has_attributes = query
            .attributes
            .as_ref()
            .is_some_and(|attributes| !attributes.items().is_empty());
        if !has_attributes {
            return false;
        }
    } else if !is_matched_assets && query.ids.as_deref().is_none_or(<[String]>::is_empty) {
        return false;
    }

    query
        .attributes
        .as_ref()
        .is_none_or(validate_attribute_group)
}

fn validate_attribute_group(group: &LogicGroup<AttributePredicate>) -> bool {
    group.items().iter().all(validate_attribute_predicate)
        && group.groups().iter().all(validate_attribute_group)
}

fn validate_attribute_predicate(predicate: &AttributePredicate) -> bool {
    let name_complete = predicate
        .name
        .as_ref()
        .is_some_and(|name| name.match_mode.is_some() && name.value.is_some());

    name_complete && predicate.value.as_ref().is_some_and(validate_value_predicate)
}

fn is_complete_matcher(matcher: &StringMatcher) -> bool {
    matcher.match_mode.is_some() && matcher.value.is_some()
}

/// Check that a value predicate carries every field its type needs.
#[must_use]
pub fn validate_value_predicate(predicate: &ValuePredicate) -> bool {
    match predicate {
        ValuePredicate::String {
            match_mode, value, ..
        } => match_mode.is_some() && value.is_some(),
        ValuePredicate::Boolean { value } => value.is_some(),
        ValuePredicate::StringArray { predicates } => predicates
            .as_deref()
            .is_some_and(|members| !members.is_empty() && members.iter().all(is_complete_matcher)),
        ValuePredicate::Datetime {
            operator,
            value,
            range_value,
            ..
        } => is_complete_comparison(*operator, value.is_some(), range_value.is_some()),
        ValuePredicate::Number {
            operator,
            value,
            range_value,
            ..
        } => is_complete_comparison(*operator, value.is_some(), range_value.is_some()),
        ValuePredicate::Radial {
            radius, lat, lng, ..
        } => radius.is_some() && lat.is_some() && lng.is_some(),
        ValuePredicate::Rect {
            lat_min,
            lat_max,
            lng_min,
            lng_max,
            ..
        } => lat_min.is_some() && lat_max.is_some() && lng_min.is_some() && lng_max.is_some(),
        ValuePredicate::ObjectValueKey { key, .. } => key.is_some(),
        ValuePredicate::Array {
            value,
            index,
            length_equals,
            length_less_than,
            length_greater_than,
            ..
        } => {
            (index.is_some() && value.is_none())
                || value.is_some()
                || length_equals.is_some()
                || length_less_than.is_some()
                || length_greater_than.is_some()
        }
        ValuePredicate::ValueEmpty { .. } | ValuePredicate::ValueNotEmpty => true,
        ValuePredicate::Unknown(_) => false,
    }
}

fn is_complete_comparison(
    operator: Option<AssetQueryOperator>,
    has_value: bool,
    has_range_value: bool,
) -> bool {
    match operator {
        Some(AssetQueryOperator::Between) => has_value && has_range_value,
        Some(_) => has_value,
        None => false,
    }
}

/// Every action must be valid; one bad action rejects the list.
#[must_use]
pub fn validate_actions(rule: &JsonRule, actions: &[RuleAction]) -> bool {
    actions.iter().all(|action| match action {
        RuleAction::Wait { millis } => millis.is_some(),
        RuleAction::WriteAttribute {
            attribute_name,
            target,
            ..
        } => attribute_name.is_some() && validate_asset_target(rule, target.as_ref()),
        RuleAction::UpdateAttribute {
            attribute_name,
            update_action,
            target,
            ..
        } => {
            attribute_name.is_some()
                && update_action.is_some()
                && validate_asset_target(rule, target.as_ref())
        }
        RuleAction::Notification { .. } => true,
        RuleAction::Unknown(_) => false,
    })
}

/// Check where an action applies.
///
/// An absent target is valid. A tag reference must resolve to a tagged
/// condition somewhere in the rule's `when` tree.
#[must_use]
pub fn validate_asset_target(rule: &JsonRule, target: Option<&RuleActionTarget>) -> bool {
    let Some(target) = target else {
        return true;
    };

    if let Some(assets) = &target.assets {
        return validate_asset_query(assets, false, false);
    }
    if let Some(matched) = &target.matched_assets {
        return validate_asset_query(matched, false, true);
    }

    let Some(tag) = target.rule_condition_tag.as_deref() else {
        return false;
    };
    rule.when.as_ref().is_some_and(|when| {
        type_and_tags_from_group(when)
            .iter()
            .any(|pair| pair.tag.as_deref() == Some(tag))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::rule::{
        AssetQueryMatch, LogicGroupOperator, SunPosition, SunPositionTrigger, UpdateAction,
    };

    fn rule_from(json: serde_json::Value) -> JsonRule {
        serde_json::from_value(json).unwrap()
    }

    fn predicate_from(json: serde_json::Value) -> ValuePredicate {
        serde_json::from_value(json).unwrap()
    }

    fn scenario_a() -> serde_json::Value {
        json!({
            "when": {"operator": "OR", "items": [{
                "assets": {
                    "types": [{"value": "ThingAsset", "predicateType": "string"}],
                    "attributes": {"items": [{
                        "name": {"match": "EXACT", "value": "foo"},
                        "value": {"predicateType": "value-empty"}
                    }]}
                }
            }]},
            "then": [{"action": "wait", "millis": 5000}]
        })
    }

    fn when_query() -> AssetQuery {
        AssetQuery::of_type("ThingAsset")
            .with_attribute(AttributePredicate::new("foo", ValuePredicate::ValueNotEmpty))
    }

    fn valid_condition() -> RuleCondition {
        RuleCondition::assets(when_query())
    }

    fn rule_with(when: LogicGroup<RuleCondition>, then: Vec<RuleAction>) -> JsonRule {
        JsonRule {
            when: Some(when),
            then: Some(then),
            ..JsonRule::default()
        }
    }

    fn wait() -> RuleAction {
        RuleAction::Wait {
            millis: Some(json!(1000)),
        }
    }

    fn write_to(target: RuleActionTarget) -> RuleAction {
        RuleAction::WriteAttribute {
            target: Some(target),
            attribute_name: Some("foo".to_string()),
            value: Some(json!(1)),
        }
    }

    fn single(condition: RuleCondition) -> LogicGroup<RuleCondition> {
        LogicGroup::new(LogicGroupOperator::Or).with_item(condition)
    }

    // -- validate --------------------------------------------------------

    #[test]
    fn should_accept_scenario_a() {
        assert!(validate(Some(&rule_from(scenario_a()))));
    }

    #[test]
    fn should_reject_scenario_b_when_query_has_no_attribute_predicates() {
        let mut json = scenario_a();
        json["when"]["items"][0]["assets"]["attributes"]["items"] = json!([]);
        assert!(!validate(Some(&rule_from(json))));
    }

    #[test]
    fn should_reject_absent_rule() {
        assert!(!validate(None));
    }

    #[test]
    fn should_reject_rule_without_when() {
        let rule = JsonRule {
            then: Some(vec![wait()]),
            ..JsonRule::default()
        };
        assert!(!validate(Some(&rule)));
    }

    #[test]
    fn should_reject_rule_with_absent_or_empty_then() {
        let mut rule = rule_with(single(valid_condition()), vec![]);
        assert!(!validate(Some(&rule)));
        rule.then = None;
        assert!(!validate(Some(&rule)));
    }

    #[test]
    fn should_not_validate_otherwise_actions() {
        let mut rule = rule_with(single(valid_condition()), vec![wait()]);
        rule.otherwise = Some(vec![RuleAction::Unknown(json!({"action": "webhook"}))]);
        assert!(validate(Some(&rule)));
    }

    #[test]
    fn should_return_same_result_when_called_twice() {
        let valid = rule_from(scenario_a());
        assert_eq!(validate(Some(&valid)), validate(Some(&valid)));
        let invalid = JsonRule::new_default();
        assert_eq!(validate(Some(&invalid)), validate(Some(&invalid)));
    }

    #[test]
    fn should_still_validate_after_envelope_roundtrip() {
        let rule = rule_from(scenario_a());
        let envelope = json!({ "rules": [rule] }).to_string();
        let parsed: serde_json::Value = serde_json::from_str(&envelope).unwrap();
        let back = rule_from(parsed["rules"][0].clone());
        assert_eq!(back, rule);
        assert!(validate(Some(&back)));
    }

    // -- validate_condition_group ---------------------------------------

    #[test]
    fn should_reject_group_without_items_or_groups() {
        assert!(!validate_condition_group(&LogicGroup::default()));
        let group = LogicGroup {
            operator: Some(LogicGroupOperator::And),
            items: Some(vec![]),
            groups: Some(vec![]),
        };
        assert!(!validate_condition_group(&group));
    }

    #[test]
    fn should_reject_condition_without_trigger() {
        assert!(!validate_condition_group(&single(RuleCondition::default())));
    }

    #[test]
    fn should_accept_each_trigger_shape_alone() {
        let datetime = RuleCondition::datetime(ValuePredicate::Datetime {
            operator: Some(AssetQueryOperator::GreaterThan),
            value: Some(json!("2024-01-01T00:00:00Z")),
            range_value: None,
            negate: None,
        });
        let sun = RuleCondition {
            sun: Some(SunPositionTrigger {
                position: Some(SunPosition::Sunset),
                ..SunPositionTrigger::default()
            }),
            ..RuleCondition::default()
        };
        let cron = RuleCondition {
            cron: Some("0 0 12 * * ?".to_string()),
            ..RuleCondition::default()
        };
        for condition in [
            valid_condition(),
            RuleCondition::timer("PT1H"),
            datetime,
            sun,
            cron,
        ] {
            assert!(
                validate_condition_group(&single(condition.clone())),
                "{condition:?} should be valid"
            );
        }
    }

    #[test]
    fn should_reject_condition_with_two_trigger_shapes() {
        let condition = RuleCondition {
            timer: Some("1h".to_string()),
            ..valid_condition()
        };
        assert!(!validate_condition_group(&single(condition)));
    }

    #[test]
    fn should_reject_unparsable_timer() {
        assert!(!validate_condition_group(&single(RuleCondition::timer(
            "soon"
        ))));
        assert!(!validate_condition_group(&single(RuleCondition::timer(
            "  "
        ))));
    }

    #[test]
    fn should_reject_malformed_cron_and_incomplete_sun() {
        let cron = RuleCondition {
            cron: Some("every day".to_string()),
            ..RuleCondition::default()
        };
        assert!(!validate_condition_group(&single(cron)));
        let sun = RuleCondition {
            sun: Some(SunPositionTrigger::default()),
            ..RuleCondition::default()
        };
        assert!(!validate_condition_group(&single(sun)));
    }

    #[test]
    fn should_reject_incomplete_datetime_predicate() {
        let condition = RuleCondition::datetime(ValuePredicate::Datetime {
            operator: None,
            value: Some(json!(0)),
            range_value: None,
            negate: None,
        });
        assert!(!validate_condition_group(&single(condition)));
    }

    #[test]
    fn should_reject_group_when_nested_group_is_invalid() {
        let group = single(valid_condition())
            .with_group(LogicGroup::new(LogicGroupOperator::And).with_item(RuleCondition::default()));
        assert!(!validate_condition_group(&group));
    }

    #[test]
    fn should_accept_group_made_only_of_valid_nested_groups() {
        let group = LogicGroup::new(LogicGroupOperator::And)
            .with_group(single(valid_condition()))
            .with_group(single(RuleCondition::timer("5m")));
        assert!(validate_condition_group(&group));
    }

    // -- validate_asset_query -------------------------------------------

    #[test]
    fn should_require_types_on_every_query() {
        let mut query = when_query();
        query.types = None;
        assert!(!validate_asset_query(&query, true, false));
        query.types = Some(vec![]);
        assert!(!validate_asset_query(&query, true, false));
    }

    #[test]
    fn should_require_value_and_predicate_type_on_type_filters() {
        let mut query = when_query();
        query.types = Some(vec![StringMatcher {
            predicate_type: None,
            ..StringMatcher::exact("ThingAsset")
        }]);
        assert!(!validate_asset_query(&query, true, false));
        query.types = Some(vec![StringMatcher {
            value: None,
            ..StringMatcher::exact("ThingAsset")
        }]);
        assert!(!validate_asset_query(&query, true, false));
    }

    #[test]
    fn should_require_ids_on_target_query_unless_matched_assets() {
        let query = AssetQuery::of_type("ThingAsset");
        assert!(!validate_asset_query(&query, false, false));
        assert!(validate_asset_query(&query, false, true));
        assert!(validate_asset_query(
            &query.clone().with_ids(["asset1"]),
            false,
            false
        ));
        assert!(!validate_asset_query(
            &query.with_ids(Vec::<String>::new()),
            false,
            false
        ));
    }

    #[test]
    fn should_reject_attribute_with_incomplete_name() {
        let mut predicate = AttributePredicate::new("foo", ValuePredicate::ValueNotEmpty);
        predicate.name.as_mut().unwrap().match_mode = None;
        let query = AssetQuery::of_type("ThingAsset").with_attribute(predicate);
        assert!(!validate_asset_query(&query, true, false));
    }

    #[test]
    fn should_reject_attribute_without_value_predicate() {
        let mut predicate = AttributePredicate::new("foo", ValuePredicate::ValueNotEmpty);
        predicate.value = None;
        let query = AssetQuery::of_type("ThingAsset").with_attribute(predicate);
        assert!(!validate_asset_query(&query, true, false));
    }

    #[test]
    fn should_check_attributes_in_nested_attribute_groups() {
        let mut query = when_query();
        query.attributes.as_mut().unwrap().groups = Some(vec![
            LogicGroup::default().with_item(AttributePredicate::new(
                "bar",
                ValuePredicate::Unknown(json!({"predicateType": "calendar-event"})),
            )),
        ]);
        assert!(!validate_asset_query(&query, true, false));
    }

    // -- validate_value_predicate ---------------------------------------

    #[test]
    fn should_reject_scenario_d_between_without_range_value() {
        let mut json = json!({"predicateType": "number", "operator": "BETWEEN", "value": 5});
        assert!(!validate_value_predicate(&predicate_from(json.clone())));
        json["rangeValue"] = json!(10);
        assert!(validate_value_predicate(&predicate_from(json)));
    }

    #[test]
    fn should_apply_predicate_table() {
        let cases = [
            (json!({"predicateType": "string", "match": "EXACT", "value": "a"}), true),
            (json!({"predicateType": "string", "value": "a"}), false),
            (json!({"predicateType": "boolean", "value": false}), true),
            (json!({"predicateType": "boolean"}), false),
            (
                json!({"predicateType": "string-array", "predicates": [{"match": "BEGIN", "value": "x"}]}),
                true,
            ),
            (json!({"predicateType": "string-array", "predicates": []}), false),
            (
                json!({"predicateType": "string-array", "predicates": [{"match": "BEGIN"}]}),
                false,
            ),
            (
                json!({"predicateType": "datetime", "operator": "LESS_THAN", "value": "2024-01-01"}),
                true,
            ),
            (json!({"predicateType": "datetime", "value": "2024-01-01"}), false),
            (json!({"predicateType": "number", "operator": "EQUALS", "value": 0}), true),
            (json!({"predicateType": "number", "operator": "EQUALS"}), false),
            (json!({"predicateType": "radial", "radius": 100, "lat": 1.0, "lng": 2.0}), true),
            (json!({"predicateType": "radial", "radius": 100, "lat": 1.0}), false),
            (
                json!({"predicateType": "rect", "latMin": 0, "latMax": 1, "lngMin": 0, "lngMax": 1}),
                true,
            ),
            (json!({"predicateType": "rect", "latMin": 0, "latMax": 1, "lngMin": 0}), false),
            (json!({"predicateType": "object-value-key", "key": "k"}), true),
            (json!({"predicateType": "object-value-key"}), false),
            (json!({"predicateType": "array", "index": 0}), true),
            (json!({"predicateType": "array", "value": "v"}), true),
            (json!({"predicateType": "array", "lengthEquals": 2}), true),
            (json!({"predicateType": "array", "lengthLessThan": 2}), true),
            (json!({"predicateType": "array", "lengthGreaterThan": 2}), true),
            (json!({"predicateType": "array"}), false),
            (json!({"predicateType": "value-empty"}), true),
            (json!({"predicateType": "value-not-empty"}), true),
            (json!({"predicateType": "calendar-event"}), false),
        ];
        for (json, expected) in cases {
            assert_eq!(
                validate_value_predicate(&predicate_from(json.clone())),
                expected,
                "{json}"
            );
        }
    }

    // -- validate_actions / validate_asset_target -----------------------

    #[test]
    fn should_reject_scenario_c_target_without_ids() {
        let mut json = scenario_a();
        json["then"] = json!([{
            "action": "write-attribute",
            "attributeName": "foo",
            "target": {"assets": {"types": [{"value": "ThingAsset", "predicateType": "string"}]}}
        }]);
        assert!(!validate(Some(&rule_from(json.clone()))));

        json["then"][0]["target"]["assets"]["ids"] = json!(["asset1"]);
        assert!(validate(Some(&rule_from(json))));
    }

    #[test]
    fn should_require_millis_on_wait() {
        let rule = rule_from(scenario_a());
        assert!(!validate_actions(&rule, &[RuleAction::Wait { millis: None }]));
        assert!(validate_actions(&rule, &[RuleAction::Wait { millis: Some(json!(0)) }]));
        assert!(validate_actions(&rule, &[RuleAction::Wait { millis: Some(json!("5000")) }]));
    }

    #[test]
    fn should_require_attribute_name_on_write_attribute() {
        let rule = rule_from(scenario_a());
        let action = RuleAction::WriteAttribute {
            target: None,
            attribute_name: None,
            value: None,
        };
        assert!(!validate_actions(&rule, &[action]));
    }

    #[test]
    fn should_require_update_action_on_update_attribute() {
        let rule = rule_from(scenario_a());
        let mut action = RuleAction::UpdateAttribute {
            target: None,
            attribute_name: Some("tags".to_string()),
            value: None,
            key: None,
            index: None,
            update_action: None,
        };
        assert!(!validate_actions(&rule, std::slice::from_ref(&action)));
        if let RuleAction::UpdateAttribute { update_action, .. } = &mut action {
            *update_action = Some(UpdateAction::Add);
        }
        assert!(validate_actions(&rule, &[action]));
    }

    #[test]
    fn should_accept_notification_without_checks() {
        let rule = rule_from(scenario_a());
        let action = RuleAction::Notification {
            target: None,
            notification: None,
        };
        assert!(validate_actions(&rule, &[action]));
    }

    #[test]
    fn should_reject_unknown_action() {
        let rule = rule_from(scenario_a());
        let webhook = RuleAction::Unknown(json!({"action": "webhook", "webhook": {}}));
        assert!(!validate_actions(&rule, &[wait(), webhook]));
    }

    #[test]
    fn should_accept_absent_target() {
        assert!(validate_asset_target(&JsonRule::default(), None));
    }

    #[test]
    fn should_accept_matched_assets_target_without_ids() {
        let rule = rule_with(single(valid_condition()), vec![]);
        let target = RuleActionTarget::matched_assets(AssetQuery::of_type("ThingAsset"));
        assert!(validate_asset_target(&rule, Some(&target)));
    }

    #[test]
    fn should_prefer_assets_over_matched_assets() {
        let rule = rule_with(single(valid_condition()), vec![]);
        let target = RuleActionTarget {
            assets: Some(AssetQuery::of_type("ThingAsset")),
            matched_assets: Some(AssetQuery::of_type("ThingAsset")),
            ..RuleActionTarget::default()
        };
        assert!(!validate_asset_target(&rule, Some(&target)));
    }

    #[test]
    fn should_reject_target_with_only_users() {
        let rule = rule_with(single(valid_condition()), vec![]);
        let target = RuleActionTarget {
            users: Some(json!({})),
            ..RuleActionTarget::default()
        };
        assert!(!validate_asset_target(&rule, Some(&target)));
    }

    #[test]
    fn should_reject_dangling_tag_reference() {
        let rule = rule_with(
            single(valid_condition()),
            vec![write_to(RuleActionTarget::condition_tag("X"))],
        );
        assert!(!validate(Some(&rule)));
    }

    #[test]
    fn should_resolve_tag_declared_at_top_level() {
        let rule = rule_with(
            single(valid_condition().tagged("X")),
            vec![write_to(RuleActionTarget::condition_tag("X"))],
        );
        assert!(validate(Some(&rule)));
    }

    #[test]
    fn should_resolve_tag_declared_in_nested_group() {
        let when = single(valid_condition()).with_group(single(valid_condition().tagged("X")));
        let rule = rule_with(when, vec![write_to(RuleActionTarget::condition_tag("X"))]);
        assert!(validate(Some(&rule)));
    }

    #[test]
    fn should_resolve_duplicated_tags() {
        let when = single(valid_condition().tagged("X")).with_item(valid_condition().tagged("X"));
        let rule = rule_with(when, vec![write_to(RuleActionTarget::condition_tag("X"))]);
        assert!(validate(Some(&rule)));
    }

    #[test]
    fn should_not_resolve_tag_of_condition_without_asset_type() {
        let when = single(valid_condition()).with_item(RuleCondition::timer("1h").tagged("X"));
        let rule = rule_with(when, vec![write_to(RuleActionTarget::condition_tag("X"))]);
        assert!(!validate(Some(&rule)));
    }

    #[test]
    fn should_match_string_predicates_regardless_of_mode() {
        let predicate = ValuePredicate::String {
            match_mode: Some(AssetQueryMatch::Contains),
            value: Some(String::new()),
            case_sensitive: None,
            negate: None,
        };
        assert!(validate_value_predicate(&predicate));
    }
}
