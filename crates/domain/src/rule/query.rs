//! Asset query — asset types plus attribute predicates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::logic_group::LogicGroup;
use super::predicate::{StringMatcher, ValuePredicate};

/// Restricts a query to a realm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmPredicate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A predicate on one attribute: name matcher plus value predicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributePredicate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<StringMatcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValuePredicate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<ValuePredicate>,
    /// Keys such as `meta` or `path` that are carried through unread.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AttributePredicate {
    /// Predicate on the attribute named exactly `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: ValuePredicate) -> Self {
        Self {
            name: Some(StringMatcher::exact(name)),
            value: Some(value),
            negated: None,
            previous_value: None,
            extra: Map::new(),
        }
    }
}

/// Structured filter resolving to a set of assets and attributes.
///
/// Used both to trigger rules (inside a condition) and to target actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<StringMatcher>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<StringMatcher>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<RealmPredicate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<LogicGroup<AttributePredicate>>,
    /// Query options this crate does not interpret, e.g. `select`,
    /// `parents` or `orderBy`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AssetQuery {
    /// Query for assets of the given type.
    #[must_use]
    pub fn of_type(asset_type: impl Into<String>) -> Self {
        Self {
            types: Some(vec![StringMatcher::exact(asset_type)]),
            ..Self::default()
        }
    }

    /// Restrict the query to explicit asset ids.
    #[must_use]
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Add an attribute predicate to the top-level attribute group.
    #[must_use]
    pub fn with_attribute(mut self, predicate: AttributePredicate) -> Self {
        self.attributes
            .get_or_insert_with(LogicGroup::default)
            .items
            .get_or_insert_with(Vec::new)
            .push(predicate);
        self
    }

    /// The asset type this query selects: the value of its first type filter.
    #[must_use]
    pub fn asset_type(&self) -> Option<&str> {
        self.types
            .as_deref()
            .and_then(|types| types.first())
            .and_then(|matcher| matcher.value.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_first_type_as_asset_type() {
        let mut query = AssetQuery::of_type("ThingAsset");
        query
            .types
            .as_mut()
            .unwrap()
            .push(StringMatcher::exact("RoomAsset"));
        assert_eq!(query.asset_type(), Some("ThingAsset"));
    }

    #[test]
    fn should_return_no_asset_type_when_types_absent_or_empty() {
        assert_eq!(AssetQuery::default().asset_type(), None);
        let query = AssetQuery {
            types: Some(vec![]),
            ..AssetQuery::default()
        };
        assert_eq!(query.asset_type(), None);
    }

    #[test]
    fn should_accumulate_attribute_predicates() {
        let query = AssetQuery::of_type("ThingAsset")
            .with_attribute(AttributePredicate::new("a", ValuePredicate::ValueNotEmpty))
            .with_attribute(AttributePredicate::new("b", ValuePredicate::ValueNotEmpty));
        assert_eq!(query.attributes.unwrap().items().len(), 2);
    }

    #[test]
    fn should_deserialize_query_from_backend_json() {
        let json = serde_json::json!({
            "types": [{"predicateType": "string", "match": "EXACT", "value": "ThingAsset"}],
            "ids": ["asset1"],
            "attributes": {"items": [{
                "name": {"predicateType": "string", "match": "EXACT", "value": "foo"},
                "value": {"predicateType": "value-empty"}
            }]}
        });
        let query: AssetQuery = serde_json::from_value(json).unwrap();
        assert_eq!(query.ids.as_deref(), Some(&["asset1".to_string()][..]));
        let attrs = query.attributes.unwrap();
        assert_eq!(attrs.items()[0].name.as_ref().unwrap().value.as_deref(), Some("foo"));
    }

    #[test]
    fn should_write_back_unread_query_options() {
        let json = serde_json::json!({
            "types": [{"predicateType": "string", "match": "EXACT", "value": "ThingAsset"}],
            "select": {"attributes": ["foo"]},
            "orderBy": {"property": "NAME", "descending": true},
            "attributes": {"items": [{
                "name": {"predicateType": "string", "match": "EXACT", "value": "foo"},
                "value": {"predicateType": "value-not-empty"},
                "meta": [{"name": {"predicateType": "string", "match": "EXACT", "value": "unit"}}]
            }]}
        });
        let query: AssetQuery = serde_json::from_value(json.clone()).unwrap();
        assert!(query.extra.contains_key("orderBy"));
        assert!(query.attributes.as_ref().unwrap().items()[0].extra.contains_key("meta"));
        assert_eq!(serde_json::to_value(&query).unwrap(), json);
    }
}
