//! Value predicates — typed comparisons applied to an attribute's value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// How a string predicate compares its `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetQueryMatch {
    Exact,
    Begin,
    End,
    Contains,
}

/// Comparison operator for number and datetime predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetQueryOperator {
    Equals,
    GreaterThan,
    GreaterEquals,
    LessThan,
    LessEquals,
    Between,
}

/// A string matcher: match mode plus value.
///
/// Used for asset type filters, attribute name matchers and the members of
/// a `string-array` predicate. Every field is optional so that an incomplete
/// matcher coming from an editor still parses and is rejected by validation
/// instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringMatcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate_type: Option<String>,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<AssetQueryMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negate: Option<bool>,
}

impl StringMatcher {
    /// A complete `string` matcher with the given mode and value.
    #[must_use]
    pub fn new(match_mode: AssetQueryMatch, value: impl Into<String>) -> Self {
        Self {
            predicate_type: Some("string".to_string()),
            match_mode: Some(match_mode),
            value: Some(value.into()),
            case_sensitive: None,
            negate: None,
        }
    }

    /// An exact-match `string` matcher.
    #[must_use]
    pub fn exact(value: impl Into<String>) -> Self {
        Self::new(AssetQueryMatch::Exact, value)
    }
}

/// Typed predicate applied to an attribute value, tagged by `predicateType`.
///
/// Objects this crate cannot read as a known variant are kept verbatim in
/// [`ValuePredicate::Unknown`]: validation rejects them and saving writes
/// them back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", tag = "predicateType", rename_all = "kebab-case")]
pub enum ValuePredicate {
    #[serde(rename_all = "camelCase")]
    String {
        #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
        match_mode: Option<AssetQueryMatch>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        case_sensitive: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        negate: Option<bool>,
    },
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<bool>,
    },
    StringArray {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        predicates: Option<Vec<StringMatcher>>,
    },
    #[serde(rename_all = "camelCase")]
    Datetime {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator: Option<AssetQueryOperator>,
        /// ISO-8601 date-time string or epoch milliseconds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range_value: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        negate: Option<bool>,
    },
    #[serde(rename_all = "camelCase")]
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator: Option<AssetQueryOperator>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range_value: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        negate: Option<bool>,
    },
    Radial {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lat: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lng: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        negated: Option<bool>,
    },
    #[serde(rename_all = "camelCase")]
    Rect {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lat_min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lat_max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lng_min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lng_max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        negated: Option<bool>,
    },
    ObjectValueKey {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        negated: Option<bool>,
    },
    #[serde(rename_all = "camelCase")]
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length_equals: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length_less_than: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length_greater_than: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        negated: Option<bool>,
    },
    ValueEmpty {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        negate: Option<bool>,
    },
    ValueNotEmpty,
    #[serde(skip)]
    Unknown(Value),
}

impl<'de> Deserialize<'de> for ValuePredicate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("expected a predicate object"));
        }
        Ok(Self::deserialize(&value).unwrap_or_else(|_| Self::Unknown(value)))
    }
}

impl Serialize for ValuePredicate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Unknown(raw) => raw.serialize(serializer),
            known => Self::serialize(known, serializer),
        }
    }
}

impl ValuePredicate {
    /// The wire tag of this predicate, as written in `predicateType`.
    #[must_use]
    pub fn predicate_type(&self) -> Option<&str> {
        match self {
            Self::String { .. } => Some("string"),
            Self::Boolean { .. } => Some("boolean"),
            Self::StringArray { .. } => Some("string-array"),
            Self::Datetime { .. } => Some("datetime"),
            Self::Number { .. } => Some("number"),
            Self::Radial { .. } => Some("radial"),
            Self::Rect { .. } => Some("rect"),
            Self::ObjectValueKey { .. } => Some("object-value-key"),
            Self::Array { .. } => Some("array"),
            Self::ValueEmpty { .. } => Some("value-empty"),
            Self::ValueNotEmpty => Some("value-not-empty"),
            Self::Unknown(raw) => raw.get("predicateType").and_then(Value::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deserialize_number_predicate_with_camel_case_fields() {
        let json = serde_json::json!({
            "predicateType": "number",
            "operator": "BETWEEN",
            "value": 5,
            "rangeValue": 10
        });
        let p: ValuePredicate = serde_json::from_value(json).unwrap();
        assert_eq!(
            p,
            ValuePredicate::Number {
                operator: Some(AssetQueryOperator::Between),
                value: Some(5.0),
                range_value: Some(10.0),
                negate: None,
            }
        );
    }

    #[test]
    fn should_keep_unknown_predicate_type_verbatim() {
        let json = serde_json::json!({"predicateType": "calendar-event", "timestamp": 0});
        let p: ValuePredicate = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(p, ValuePredicate::Unknown(json.clone()));
        assert_eq!(p.predicate_type(), Some("calendar-event"));
        assert_eq!(serde_json::to_value(&p).unwrap(), json);
    }

    #[test]
    fn should_accept_array_bounds_given_as_strings() {
        let json = serde_json::json!({"predicateType": "array", "index": "2", "lengthEquals": 3});
        let p: ValuePredicate = serde_json::from_value(json).unwrap();
        assert!(matches!(
            p,
            ValuePredicate::Array { index: Some(Value::String(ref index)), .. } if index == "2"
        ));
    }

    #[test]
    fn should_deserialize_string_predicate_match_field() {
        let json = serde_json::json!({"predicateType": "string", "match": "BEGIN", "value": "ab"});
        let p: ValuePredicate = serde_json::from_value(json).unwrap();
        assert!(matches!(
            p,
            ValuePredicate::String { match_mode: Some(AssetQueryMatch::Begin), ref value, .. }
                if value.as_deref() == Some("ab")
        ));
    }

    #[test]
    fn should_serialize_tag_and_skip_absent_fields() {
        let p = ValuePredicate::Rect {
            lat_min: Some(1.0),
            lat_max: Some(2.0),
            lng_min: None,
            lng_max: None,
            negated: None,
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"predicateType": "rect", "latMin": 1.0, "latMax": 2.0})
        );
    }

    #[test]
    fn should_report_wire_tag_for_kebab_case_variants() {
        assert_eq!(
            ValuePredicate::ObjectValueKey { key: None, negated: None }.predicate_type(),
            Some("object-value-key")
        );
        assert_eq!(ValuePredicate::ValueNotEmpty.predicate_type(), Some("value-not-empty"));
    }

    #[test]
    fn should_build_exact_string_matcher() {
        let m = StringMatcher::exact("ThingAsset");
        assert_eq!(m.predicate_type.as_deref(), Some("string"));
        assert_eq!(m.match_mode, Some(AssetQueryMatch::Exact));
        assert_eq!(m.value.as_deref(), Some("ThingAsset"));
    }
}
