//! Rule actions — what a rule does once its `when` tree matches.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::query::AssetQuery;

/// How an `update-attribute` action modifies a collection value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateAction {
    Add,
    AddOrReplace,
    Replace,
    Delete,
    Clear,
}

/// The asset(s) an action applies to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleActionTarget {
    /// Reference to the assets matched by the `when` condition with this tag.
    #[serde(
        default,
        alias = "conditionAssets",
        skip_serializing_if = "Option::is_none"
    )]
    pub rule_condition_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_assets: Option<AssetQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<AssetQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
    /// Keys not modelled here, such as `linkedUsers`, kept for the round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RuleActionTarget {
    /// Target the assets matched by the condition tagged `tag`.
    #[must_use]
    pub fn condition_tag(tag: impl Into<String>) -> Self {
        Self {
            rule_condition_tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// Target an explicit asset query.
    #[must_use]
    pub fn assets(query: AssetQuery) -> Self {
        Self {
            assets: Some(query),
            ..Self::default()
        }
    }

    /// Target the triggering assets, filtered by `query`.
    #[must_use]
    pub fn matched_assets(query: AssetQuery) -> Self {
        Self {
            matched_assets: Some(query),
            ..Self::default()
        }
    }
}

/// A rule action, tagged by `action`.
///
/// An object this crate cannot read as one of the known variants, either an
/// unknown tag or a known tag with mistyped fields, is kept verbatim in
/// [`RuleAction::Unknown`] and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", tag = "action", rename_all = "kebab-case")]
#[allow(clippy::large_enum_variant)]
pub enum RuleAction {
    Wait {
        /// Any JSON value; only its presence is checked.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        millis: Option<Value>,
    },
    #[serde(rename_all = "camelCase")]
    WriteAttribute {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<RuleActionTarget>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<serde_json::Value>,
    },
    #[serde(rename_all = "camelCase")]
    UpdateAttribute {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<RuleActionTarget>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        update_action: Option<UpdateAction>,
    },
    Notification {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<RuleActionTarget>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notification: Option<serde_json::Value>,
    },
    #[serde(skip)]
    Unknown(Value),
}

impl<'de> Deserialize<'de> for RuleAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("expected an action object"));
        }
        Ok(Self::deserialize(&value).unwrap_or_else(|_| Self::Unknown(value)))
    }
}

impl Serialize for RuleAction {
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

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wait {
                millis: Some(Value::String(millis)),
            } => write!(f, "wait({millis}ms)"),
            Self::Wait {
                millis: Some(millis),
            } => write!(f, "wait({millis}ms)"),
            Self::Wait { millis: None } => f.write_str("wait(?)"),
            Self::WriteAttribute { attribute_name, .. } => {
                write!(f, "write-attribute({})", attribute_name.as_deref().unwrap_or("?"))
            }
            Self::UpdateAttribute { attribute_name, .. } => {
                write!(f, "update-attribute({})", attribute_name.as_deref().unwrap_or("?"))
            }
            Self::Notification { .. } => f.write_str("notification"),
            Self::Unknown(raw) => f.write_str(
                raw.get("action")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown"),
            ),
        }
    }
}
