//! Ruleset — the stored record wrapping a single JSON rule.
//!
//! The backend keeps the rule as an opaque string holding a
//! [`JsonRulesetDefinition`] envelope: `{"rules": [rule]}`. The editor only
//! handles envelopes with exactly one rule.

use serde::{Deserialize, Serialize};

use crate::error::{RuledeskError, RulesetError, ValidationError};
use crate::id::RulesetId;
use crate::rule::JsonRule;
use crate::time::{self, Timestamp};

/// The stored envelope around JSON rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonRulesetDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<JsonRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Map<String, serde_json::Value>>,
}

impl JsonRulesetDefinition {
    /// Envelope holding exactly `rule`.
    #[must_use]
    pub fn single(rule: JsonRule) -> Self {
        Self {
            rules: Some(vec![rule]),
            meta: None,
        }
    }

    /// Parse an envelope and extract its only rule.
    ///
    /// # Errors
    ///
    /// Returns [`RulesetError::Json`] when `text` does not parse, and
    /// [`RulesetError::Unsupported`] when the envelope has no rule list or
    /// anything but exactly one rule.
    pub fn parse_single(text: &str) -> Result<JsonRule, RulesetError> {
        let definition: Self = serde_json::from_str(text)?;
        definition.into_single()
    }

    /// Extract the only rule of this envelope.
    ///
    /// # Errors
    ///
    /// Returns [`RulesetError::Unsupported`] unless there is exactly one rule.
    pub fn into_single(self) -> Result<JsonRule, RulesetError> {
        let mut rules = self.rules.unwrap_or_default();
        if rules.len() != 1 {
            return Err(RulesetError::Unsupported {
                rule_count: rules.len(),
            });
        }
        Ok(rules.remove(0))
    }
}

/// A stored ruleset record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    pub id: RulesetId,
    pub name: String,
    pub realm: String,
    pub enabled: bool,
    /// Serialized [`JsonRulesetDefinition`]; `None` until first saved.
    pub rules: Option<String>,
    pub created_on: Timestamp,
    pub last_modified: Timestamp,
}

impl Ruleset {
    /// Create a builder for constructing a [`Ruleset`].
    #[must_use]
    pub fn builder() -> RulesetBuilder {
        RulesetBuilder::default()
    }

    /// Check record invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RuledeskError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `realm` is empty ([`ValidationError::EmptyRealm`])
    pub fn validate(&self) -> Result<(), RuledeskError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.realm.trim().is_empty() {
            return Err(ValidationError::EmptyRealm.into());
        }
        Ok(())
    }

    /// The rule held by this ruleset, `None` for a ruleset never saved.
    ///
    /// # Errors
    ///
    /// See [`JsonRulesetDefinition::parse_single`].
    pub fn parse_rule(&self) -> Result<Option<JsonRule>, RulesetError> {
        self.rules
            .as_deref()
            .map(JsonRulesetDefinition::parse_single)
            .transpose()
    }

    /// Rule to open in an editor: the stored rule, else a copy of
    /// `template`, else [`JsonRule::new_default`].
    ///
    /// # Errors
    ///
    /// See [`JsonRulesetDefinition::parse_single`].
    pub fn rule_or_template(&self, template: Option<&JsonRule>) -> Result<JsonRule, RulesetError> {
        Ok(self.parse_rule()?.unwrap_or_else(|| {
            template
                .cloned()
                .unwrap_or_else(JsonRule::new_default)
        }))
    }

    /// Name `rule` after this ruleset and store it as the only rule.
    ///
    /// # Errors
    ///
    /// Returns [`RulesetError::Json`] if the rule cannot be serialized.
    pub fn store_rule(&mut self, mut rule: JsonRule) -> Result<(), RulesetError> {
        rule.name = Some(self.name.clone());
        let text = serde_json::to_string(&JsonRulesetDefinition::single(rule))?;
        self.rules = Some(text);
        self.last_modified = time::now();
        Ok(())
    }
}

/// Step-by-step builder for [`Ruleset`].
#[derive(Debug, Default)]
pub struct RulesetBuilder {
    id: Option<RulesetId>,
    name: Option<String>,
    realm: Option<String>,
    enabled: Option<bool>,
    rules: Option<String>,
}

impl RulesetBuilder {
    #[must_use]
    pub fn id(mut self, id: RulesetId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Raw envelope text, as read from storage or a file.
    #[must_use]
    pub fn rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    /// Consume the builder, validate, and return a [`Ruleset`].
    ///
    /// # Errors
    ///
    /// Returns [`RuledeskError::Validation`] if name or realm is missing.
    pub fn build(self) -> Result<Ruleset, RuledeskError> {
        let now = time::now();
        let ruleset = Ruleset {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            realm: self.realm.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            rules: self.rules,
            created_on: now,
            last_modified: now,
        };
        ruleset.validate()?;
        Ok(ruleset)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::rule::{
        AssetQuery, AttributePredicate, LogicGroup, LogicGroupOperator, RuleAction,
        RuleCondition, ValuePredicate,
    };

    fn valid_rule() -> JsonRule {
        JsonRule {
            when: Some(LogicGroup::new(LogicGroupOperator::Or).with_item(RuleCondition::assets(
                AssetQuery::of_type("ThingAsset")
                    .with_attribute(AttributePredicate::new("foo", ValuePredicate::ValueNotEmpty)),
            ))),
            then: Some(vec![RuleAction::Wait {
                millis: Some(json!(5000)),
            }]),
            ..JsonRule::new_default()
        }
    }

    fn ruleset() -> Ruleset {
        Ruleset::builder()
            .name("Lights off")
            .realm("master")
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_enabled_ruleset_without_rules() {
        let rs = ruleset();
        assert!(rs.enabled);
        assert!(rs.rules.is_none());
        assert_eq!(rs.created_on, rs.last_modified);
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = Ruleset::builder().realm("master").build();
        assert!(matches!(
            result,
            Err(RuledeskError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_realm_is_blank() {
        let result = Ruleset::builder().name("x").realm("  ").build();
        assert!(matches!(
            result,
            Err(RuledeskError::Validation(ValidationError::EmptyRealm))
        ));
    }

    #[test]
    fn should_parse_no_rule_for_new_ruleset() {
        assert_eq!(ruleset().parse_rule().unwrap(), None);
    }

    #[test]
    fn should_start_from_default_rule_without_template() {
        let rule = ruleset().rule_or_template(None).unwrap();
        assert_eq!(rule, JsonRule::new_default());
    }

    #[test]
    fn should_start_from_template_copy_when_provided() {
        let template = valid_rule();
        let rule = ruleset().rule_or_template(Some(&template)).unwrap();
        assert_eq!(rule, template);
    }

    #[test]
    fn should_prefer_stored_rule_over_template() {
        let mut rs = ruleset();
        rs.store_rule(valid_rule()).unwrap();
        let rule = rs.rule_or_template(Some(&JsonRule::default())).unwrap();
        assert_eq!(rule.name.as_deref(), Some("Lights off"));
    }

    #[test]
    fn should_store_rule_named_after_ruleset_in_envelope() {
        let mut rs = ruleset();
        rs.store_rule(valid_rule()).unwrap();

        let stored: serde_json::Value = serde_json::from_str(rs.rules.as_deref().unwrap()).unwrap();
        assert_eq!(stored["rules"].as_array().unwrap().len(), 1);
        assert_eq!(stored["rules"][0]["name"], "Lights off");
        assert!(stored.get("meta").is_none());
    }

    #[test]
    fn should_roundtrip_valid_rule_through_envelope() {
        let mut rs = ruleset();
        let rule = valid_rule();
        assert!(rule.is_valid());
        rs.store_rule(rule.clone()).unwrap();

        let parsed = rs.parse_rule().unwrap().unwrap();
        assert!(parsed.is_valid());
        assert_eq!(
            parsed,
            JsonRule {
                name: Some("Lights off".to_string()),
                ..rule
            }
        );
    }

    #[test]
    fn should_reject_envelope_with_several_rules() {
        let text = json!({"rules": [{}, {}]}).to_string();
        assert!(matches!(
            JsonRulesetDefinition::parse_single(&text),
            Err(RulesetError::Unsupported { rule_count: 2 })
        ));
    }

    #[test]
    fn should_reject_envelope_without_rules() {
        for text in [r#"{}"#, r#"{"rules": []}"#] {
            assert!(matches!(
                JsonRulesetDefinition::parse_single(text),
                Err(RulesetError::Unsupported { rule_count: 0 })
            ));
        }
    }

    #[test]
    fn should_report_json_error_for_malformed_definition() {
        let rs = Ruleset::builder()
            .name("broken")
            .realm("master")
            .rules("{not json")
            .build()
            .unwrap();
        assert!(matches!(rs.parse_rule(), Err(RulesetError::Json(_))));
    }

    #[test]
    fn should_keep_meta_when_parsing_envelope() {
        let text = json!({"rules": [{}], "meta": {"editor": "json"}}).to_string();
        let definition: JsonRulesetDefinition = serde_json::from_str(&text).unwrap();
        assert_eq!(definition.meta.unwrap()["editor"], "json");
    }

    #[test]
    fn should_store_rule_without_losing_content_it_does_not_model() {
        let rule = json!({
            "name": "Lights off",
            "when": {"operator": "OR", "items": [{
                "assets": {
                    "types": [{"predicateType": "string", "match": "EXACT", "value": "ThingAsset"}],
                    "orderBy": {"property": "CREATED_ON", "descending": true},
                    "attributes": {"items": [{
                        "name": {"predicateType": "string", "match": "EXACT", "value": "foo"},
                        "value": {"predicateType": "value-not-empty"},
                        "previousValue": {"predicateType": "calendar-event", "timestamp": 0}
                    }]}
                },
                "tag": "lights"
            }]},
            "then": [{"action": "wait", "millis": "5000"}],
            "otherwise": [{
                "action": "webhook",
                "webhook": {"url": "https://example.org/hook", "httpMethod": "POST"}
            }],
            "recurrence": {"mins": 0}
        });
        let mut rs = Ruleset::builder()
            .name("Lights off")
            .realm("master")
            .rules(json!({"rules": [rule.clone()]}).to_string())
            .build()
            .unwrap();

        let parsed = rs.parse_rule().unwrap().unwrap();
        assert!(parsed.is_valid());
        rs.store_rule(parsed).unwrap();

        let stored: serde_json::Value = serde_json::from_str(rs.rules.as_deref().unwrap()).unwrap();
        assert_eq!(stored["rules"][0], rule);
    }
}
