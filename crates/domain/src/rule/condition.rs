//! Rule condition — a leaf of the `when` tree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::predicate::ValuePredicate;
use super::query::AssetQuery;

/// Sun position a sun trigger fires at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SunPosition {
    Sunrise,
    Sunset,
    TwilightMorningVisual,
    TwilightMorningVisualLower,
    TwilightMorningHorizon,
    TwilightMorningCivil,
    TwilightMorningNautical,
    TwilightMorningAstronomical,
    TwilightMorningGoldenHour,
    TwilightMorningBlueHour,
    TwilightMorningNightHour,
    TwilightEveningVisual,
    TwilightEveningVisualLower,
    TwilightEveningHorizon,
    TwilightEveningCivil,
    TwilightEveningNautical,
    TwilightEveningAstronomical,
    TwilightEveningGoldenHour,
    TwilightEveningBlueHour,
    TwilightEveningNightHour,
}

/// A `GeoJSON` point, `[lng, lat]` ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

/// Sun-relative trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SunPositionTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SunPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoJsonPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_mins: Option<i32>,
}

/// The mutually exclusive ways a condition can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerShape {
    /// An asset-attribute query (`assets`).
    Assets,
    /// A recurring time trigger (`timer` or `cron`).
    Timer,
    /// An absolute or sun-relative date-time (`datetime` or `sun`).
    Datetime,
}

/// A single trigger condition, optionally tagged so actions can target
/// the assets it matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<AssetQuery>,
    /// Time duration between firings, e.g. `"1h30m"` or `"PT90M"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<ValuePredicate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun: Option<SunPositionTrigger>,
    /// How long the condition must hold before it counts as matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RuleCondition {
    /// Condition fired by an asset query.
    #[must_use]
    pub fn assets(query: AssetQuery) -> Self {
        Self {
            assets: Some(query),
            ..Self::default()
        }
    }

    /// Condition fired on a recurring timer.
    #[must_use]
    pub fn timer(duration: impl Into<String>) -> Self {
        Self {
            timer: Some(duration.into()),
            ..Self::default()
        }
    }

    /// Condition fired by a date-time predicate.
    #[must_use]
    pub fn datetime(predicate: ValuePredicate) -> Self {
        Self {
            datetime: Some(predicate),
            ..Self::default()
        }
    }

    /// Attach a tag, returning the condition.
    #[must_use]
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Every trigger shape this condition populates, in declaration order.
    #[must_use]
    pub fn trigger_shapes(&self) -> Vec<TriggerShape> {
        let mut shapes = Vec::with_capacity(1);
        if self.assets.is_some() {
            shapes.push(TriggerShape::Assets);
        }
        if self.timer.is_some() || self.cron.is_some() {
            shapes.push(TriggerShape::Timer);
        }
        if self.datetime.is_some() || self.sun.is_some() {
            shapes.push(TriggerShape::Datetime);
        }
        shapes
    }

    /// Asset type selected by the condition's query, if any.
    #[must_use]
    pub fn asset_type(&self) -> Option<&str> {
        self.assets.as_ref().and_then(AssetQuery::asset_type)
    }
}
